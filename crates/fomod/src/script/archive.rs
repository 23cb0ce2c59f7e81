//! Mod archive collaborator
//!
//! The engine never reads archive bytes; it only needs the archive's file
//! listing to resolve source patterns and expand folders, plus the path
//! prefix under which the mod's payload lives. Paths are matched
//! case-insensitively with either separator, as mod archives are authored on
//! Windows.

#[derive(Debug, Clone)]
pub struct ModArchive {
    prefix: String,
    screenshot_path: Option<String>,
    files: Vec<String>,
}

impl ModArchive {
    pub fn new(prefix: impl Into<String>, files: Vec<String>) -> Self {
        ModArchive {
            prefix: prefix.into(),
            screenshot_path: None,
            files,
        }
    }

    pub fn with_screenshot(mut self, path: impl Into<String>) -> Self {
        self.screenshot_path = Some(path.into());
        self
    }

    /// Path prefix under which the mod's installable payload lives
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn screenshot_path(&self) -> Option<&str> {
        self.screenshot_path.as_deref()
    }

    /// Lists archive entries under `dir`.
    ///
    /// An entry equal to `dir` itself is included, so a `dir` naming a file
    /// exactly yields a single match. With `drop_prefix` the returned paths
    /// are relative to `dir`.
    pub fn file_list(&self, dir: &str, recursive: bool, drop_prefix: bool) -> Vec<String> {
        let needle = normalize(dir);
        let mut matches = Vec::new();
        for file in &self.files {
            let hay = normalize(file);
            let relative_len = if needle.is_empty() {
                hay.len()
            } else if hay == needle {
                0
            } else if hay.len() > needle.len()
                && hay.starts_with(&needle)
                && hay.as_bytes()[needle.len()] == b'/'
            {
                hay.len() - needle.len() - 1
            } else {
                continue;
            };
            let relative = &hay[hay.len() - relative_len..];
            if !recursive && relative.contains('/') {
                continue;
            }
            if drop_prefix {
                // slice the original (case-preserved) text; trim it the same
                // way normalize does so the lengths line up
                let trimmed = file.trim_end_matches(['/', '\\']);
                matches.push(trimmed[trimmed.len() - relative_len..].to_string());
            } else {
                matches.push(file.clone());
            }
        }
        matches
    }
}

/// Joins an archive prefix and a script path with a single separator
pub(crate) fn join_prefix(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return prefix.to_string();
    }
    format!(
        "{}/{}",
        prefix.trim_end_matches(['/', '\\']),
        path.trim_start_matches(['/', '\\'])
    )
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
        .trim_end_matches('/')
        .to_ascii_lowercase()
}
