//! Structural script tree: steps, groups, options and files

use serde::{Deserialize, Serialize};

use crate::conditions::Condition;
use crate::script::option_type::OptionTypeResolver;

/// A parsed install script.
///
/// Immutable once parsed and shared read-only across a run; all per-run
/// adjustments (resolver overrides, cardinality relaxation) live in the
/// executor's run state, so one `Script` may serve concurrent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// Top-level prerequisite; when unfulfilled the run aborts with a single
    /// fatal instruction before any interaction
    pub prerequisites: Option<Condition>,
    pub header: HeaderInfo,
    pub steps: Vec<InstallStep>,
    /// Installed unconditionally, in the lowest priority band
    pub required_files: Vec<InstallableFile>,
    /// Installed when their condition holds, in the highest priority band
    pub conditional_file_sets: Vec<ConditionallyInstalledFileSet>,
}

impl Script {
    pub fn new(title: impl Into<String>) -> Self {
        Script {
            prerequisites: None,
            header: HeaderInfo {
                title: title.into(),
                image_path: None,
                show_image: true,
                show_fade: true,
                height: -1,
            },
            steps: Vec::new(),
            required_files: Vec::new(),
            conditional_file_sets: Vec::new(),
        }
    }
}

/// Header metadata shown by the installer dialog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub title: String,
    pub image_path: Option<String>,
    pub show_image: bool,
    pub show_fade: bool,
    pub height: i32,
}

/// One wizard page of the installer
///
/// Steps are identified by their position in the script; names are not
/// unique across steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallStep {
    pub name: String,
    /// When present and unfulfilled, navigation skips this step
    pub visibility: Option<Condition>,
    pub groups: Vec<OptionGroup>,
    pub sort_order: GroupSortOrder,
}

impl InstallStep {
    pub fn new(name: impl Into<String>, groups: Vec<OptionGroup>) -> Self {
        InstallStep {
            name: name.into(),
            visibility: None,
            groups,
            sort_order: GroupSortOrder::Explicit,
        }
    }

    pub fn with_visibility(mut self, condition: Condition) -> Self {
        self.visibility = Some(condition);
        self
    }
}

/// Display ordering of a step's groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupSortOrder {
    Ascending,
    Descending,
    Explicit,
}

impl GroupSortOrder {
    pub fn label(self) -> &'static str {
        match self {
            GroupSortOrder::Ascending => "Ascending",
            GroupSortOrder::Descending => "Descending",
            GroupSortOrder::Explicit => "Explicit",
        }
    }
}

/// Selection cardinality of an option group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupType {
    SelectAny,
    SelectAtMostOne,
    SelectExactlyOne,
    SelectAtLeastOne,
    SelectAll,
}

impl GroupType {
    pub fn label(self) -> &'static str {
        match self {
            GroupType::SelectAny => "SelectAny",
            GroupType::SelectAtMostOne => "SelectAtMostOne",
            GroupType::SelectExactlyOne => "SelectExactlyOne",
            GroupType::SelectAtLeastOne => "SelectAtLeastOne",
            GroupType::SelectAll => "SelectAll",
        }
    }
}

/// A named group of options with a selection cardinality
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionGroup {
    pub name: String,
    pub group_type: GroupType,
    pub options: Vec<InstallOption>,
}

impl OptionGroup {
    pub fn new(
        name: impl Into<String>,
        group_type: GroupType,
        options: Vec<InstallOption>,
    ) -> Self {
        OptionGroup {
            name: name.into(),
            group_type,
            options,
        }
    }
}

/// A selectable option carrying files to install and flags to set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallOption {
    pub name: String,
    pub description: String,
    pub image_path: Option<String>,
    pub files: Vec<InstallableFile>,
    /// Applied to the flag state when the option is enabled
    pub flags: Vec<ConditionalFlag>,
    pub type_resolver: OptionTypeResolver,
}

impl InstallOption {
    pub fn new(name: impl Into<String>) -> Self {
        InstallOption {
            name: name.into(),
            description: String::new(),
            image_path: None,
            files: Vec::new(),
            flags: Vec::new(),
            type_resolver: OptionTypeResolver::default(),
        }
    }

    pub fn with_files(mut self, files: Vec<InstallableFile>) -> Self {
        self.files = files;
        self
    }

    pub fn with_flags(mut self, flags: Vec<ConditionalFlag>) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_resolver(mut self, resolver: OptionTypeResolver) -> Self {
        self.type_resolver = resolver;
        self
    }
}

/// Identifies an option by its position in the script tree.
///
/// Option names are not unique, so selection state, flag ownership and
/// per-run overrides all key on this identity instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionId {
    pub step: usize,
    pub group: usize,
    pub option: usize,
}

/// Flag name and value applied when the owning option is enabled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionalFlag {
    pub name: String,
    pub value: String,
}

impl ConditionalFlag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        ConditionalFlag {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A file or folder to copy out of the mod archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallableFile {
    /// Path into the mod archive, relative to the archive prefix
    pub source: String,
    /// Destination path; empty means "the source's file name", a trailing
    /// separator means "create this directory"
    pub destination: String,
    /// Authored conflict priority within the file's band
    pub priority: i64,
    pub is_folder: bool,
    /// Install even when the owning option is not selected
    pub always_install: bool,
    /// Install when unselected as long as the owning option is not NotUsable
    pub install_if_usable: bool,
}

impl InstallableFile {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        InstallableFile {
            source: source.into(),
            destination: destination.into(),
            priority: 0,
            is_folder: false,
            always_install: false,
            install_if_usable: false,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn folder(mut self) -> Self {
        self.is_folder = true;
        self
    }

    pub fn always_install(mut self) -> Self {
        self.always_install = true;
        self
    }

    pub fn install_if_usable(mut self) -> Self {
        self.install_if_usable = true;
        self
    }
}

/// Files installed together when a condition holds at build time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionallyInstalledFileSet {
    pub condition: Condition,
    pub files: Vec<InstallableFile>,
}
