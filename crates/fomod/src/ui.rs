//! View models sent to the host UI
//!
//! The full step tree is rebuilt and resent on every state change rather
//! than diffed; the host tracks installer choices from complete snapshots.

use serde::{Deserialize, Serialize};

/// Banner image shown at the top of the installer dialog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderImage {
    pub path: Option<String>,
    pub show_fade: bool,
    pub height: i32,
}

/// One installer step with its current visibility and groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepView {
    pub id: usize,
    pub name: String,
    pub visible: bool,
    pub sort_order: String,
    pub groups: Vec<GroupView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupView {
    pub id: usize,
    pub name: String,
    /// Cardinality label, e.g. "SelectExactlyOne"
    #[serde(rename = "type")]
    pub group_type: String,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionView {
    pub id: usize,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub selected: bool,
    /// Whether the active preset names this option (never set for Required
    /// options or SelectAll groups, where the preset has no say)
    pub preset: bool,
    /// Resolved type label, e.g. "Recommended"
    #[serde(rename = "type")]
    pub option_type: String,
    /// Explanation shown for disabled-but-visible options
    pub condition_message: Option<String>,
}
