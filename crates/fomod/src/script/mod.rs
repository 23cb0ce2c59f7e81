//! Parsed install-script data model
//!
//! This module contains the structural tree an install script parses into:
//! steps, option groups, options, installable files and conditional flags,
//! plus the option-type resolvers, the headless preset shape and the mod
//! archive collaborator. How scripts are parsed into this model is the host's
//! concern; the engine consumes it read-only.

pub mod archive;
pub mod model;
pub mod option_type;
pub mod preset;

pub use archive::ModArchive;
pub use model::{
    ConditionalFlag, ConditionallyInstalledFileSet, GroupSortOrder, GroupType, HeaderInfo,
    InstallOption, InstallStep, InstallableFile, OptionGroup, OptionId, Script,
};
pub use option_type::{ConditionalTypePattern, OptionType, OptionTypeResolver};
pub use preset::{OptionsPreset, PresetChoice, PresetGroup, PresetStep};
