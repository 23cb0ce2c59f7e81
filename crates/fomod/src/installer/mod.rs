//! Instruction building and conflict resolution
//!
//! Files are installed in three passes that map to three disjoint priority
//! bands: unconditional required files (authored priority minus 10^9), files
//! from selected options (authored priority as-is) and conditionally
//! installed file sets (authored priority plus 10^9). The bands reproduce
//! the legacy multi-phase install order, where later phases override earlier
//! ones regardless of authored priorities.
//!
//! Copy candidates are merged per destination: strictly higher priority
//! wins; on a tie the lexically greater source wins; otherwise the existing
//! candidate stays. Mkdir instructions are appended without dedup.

use thiserror::Error;
use tracing::{debug, warn};

use crate::delegates::CoreDelegates;
use crate::instruction::{ErrorSeverity, Instruction, InstructionType};
use crate::script::archive::join_prefix;
use crate::script::{InstallableFile, ModArchive, Script};
use crate::state::ConditionStateManager;

/// Band offset separating required files, option files and conditional sets
pub(crate) const PRIORITY_OFFSET: i64 = 1_000_000_000;

/// Errors that abort instruction building
///
/// Any of these collapses the whole batch into a single fatal error
/// instruction; warnings (unmatched sources) are emitted inline instead.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Failed to install \"{0}\" as folder")]
    FolderLayout(String),
}

/// Builds the final instruction list for one script run
pub struct ScriptInstaller<'a> {
    archive: &'a ModArchive,
    instructions: Vec<Instruction>,
}

impl<'a> ScriptInstaller<'a> {
    pub fn new(archive: &'a ModArchive) -> Self {
        ScriptInstaller {
            archive,
            instructions: Vec::new(),
        }
    }

    /// Runs the three install passes and returns the instruction list.
    ///
    /// Never fails: an error during building replaces whatever was built so
    /// far with a single fatal error instruction.
    pub async fn install(
        mut self,
        script: &Script,
        state: &ConditionStateManager,
        delegates: &CoreDelegates,
        files_to_install: &[InstallableFile],
    ) -> Vec<Instruction> {
        match self
            .install_files(script, state, delegates, files_to_install)
            .await
        {
            Ok(()) => self.instructions,
            Err(err) => {
                warn!(error = %err, "instruction building failed, collapsing to fatal error");
                vec![Instruction::install_error(
                    ErrorSeverity::Fatal,
                    err.to_string(),
                )]
            }
        }
    }

    async fn install_files(
        &mut self,
        script: &Script,
        state: &ConditionStateManager,
        delegates: &CoreDelegates,
        files_to_install: &[InstallableFile],
    ) -> Result<(), InstallError> {
        for file in &script.required_files {
            self.install_file(file, -PRIORITY_OFFSET)?;
        }

        for file in files_to_install {
            self.install_file(file, 0)?;
        }

        for file_set in &script.conditional_file_sets {
            if file_set.condition.is_fulfilled(state, delegates).await {
                for file in &file_set.files {
                    self.install_file(file, PRIORITY_OFFSET)?;
                }
            }
        }

        self.instructions.push(Instruction::enable_all_plugins());
        Ok(())
    }

    /// Installs one declared file or folder, offset into its priority band
    fn install_file(
        &mut self,
        file: &InstallableFile,
        priority_offset: i64,
    ) -> Result<(), InstallError> {
        if file.is_folder {
            return self.install_folder(file);
        }

        let source = join_prefix(self.archive.prefix(), &file.source);
        let matched = self.archive.file_list(&source, true, false);
        match matched.len() {
            1 => self.push_file(&source, &file.destination, file.priority + priority_offset),
            0 => {
                warn!(source = %source, "source pattern matched no archive entries");
                self.instructions.push(Instruction::install_error(
                    ErrorSeverity::Warning,
                    format!("Source doesn't match any files: \"{source}\""),
                ));
            }
            _ => {
                warn!(source = %source, "source pattern matched multiple archive entries");
                self.instructions.push(Instruction::install_error(
                    ErrorSeverity::Warning,
                    format!("Source matches a directory, was supposed to be a file: \"{source}\""),
                ));
            }
        }
        Ok(())
    }

    /// Expands a folder entry into one copy per contained archive entry.
    ///
    /// Every expanded copy uses the folder's authored priority; folder
    /// entries are never offset into a band.
    fn install_folder(&mut self, file: &InstallableFile) -> Result<(), InstallError> {
        let prefixed = join_prefix(self.archive.prefix(), &file.source);
        let entries = self.archive.file_list(&prefixed, true, false);

        let mut from = prefixed.replace('\\', "/");
        if !from.ends_with('/') {
            from.push('/');
        }
        let mut to = file.destination.replace('\\', "/");
        if !to.is_empty() && !to.ends_with('/') {
            to.push('/');
        }

        for entry in &entries {
            let normalized = entry.replace('\\', "/");
            if normalized.len() <= from.len() {
                return Err(InstallError::FolderLayout(from));
            }
            let relative = &normalized[from.len()..];
            let destination = format!("{to}{relative}");
            self.push_file(entry, &destination, file.priority);
        }
        Ok(())
    }

    /// Records one copy or mkdir, merging same-destination copy candidates
    fn push_file(&mut self, from: &str, to: &str, priority: i64) {
        if to.ends_with('/') || to.ends_with('\\') {
            self.instructions.push(Instruction::mkdir(to));
            return;
        }

        let to = if to.is_empty() { file_name(from) } else { to };
        let existing = self.instructions.iter().position(|instruction| {
            instruction.kind == InstructionType::Copy
                && instruction.destination.as_deref() == Some(to)
        });
        match existing {
            None => self
                .instructions
                .push(Instruction::copy(from, to, priority)),
            Some(idx) => {
                if should_update(&self.instructions[idx], from, priority) {
                    debug!(destination = %to, source = %from, priority, "replacing lower-ranked copy candidate");
                    self.instructions[idx] = Instruction::copy(from, to, priority);
                }
            }
        }
    }
}

/// Whether a new copy candidate displaces the pending one: higher priority
/// wins, ties go to the ordinally greater source path
fn should_update(pending: &Instruction, from: &str, priority: i64) -> bool {
    if priority != pending.priority {
        return priority > pending.priority;
    }
    Some(from) > pending.source.as_deref()
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
