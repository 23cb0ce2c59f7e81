//! Headless selection presets
//!
//! A preset replaces interactive dialog callbacks with a recorded set of
//! choices, matched by step/group/option *name*. Names are not unique, so
//! matching always considers every entry with the right name. The JSON shape
//! mirrors what the host sends over IPC.

use serde::{Deserialize, Serialize};

/// Recorded installer choices for a headless run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsPreset {
    #[serde(default)]
    pub steps: Vec<PresetStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetStep {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<PresetGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetGroup {
    pub name: String,
    #[serde(default)]
    pub choices: Vec<PresetChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetChoice {
    pub name: String,
    /// Index the option had when the preset was recorded; informational,
    /// matching is by name
    #[serde(default)]
    pub idx: usize,
}
