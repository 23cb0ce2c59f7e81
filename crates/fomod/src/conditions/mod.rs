//! Condition evaluation for install scripts
//!
//! Conditions gate step visibility, option types and conditionally installed
//! file sets. The set of condition kinds is closed: flag equality, AND/OR
//! composition, and three version-threshold checks answered by the host
//! through the context delegates.
//!
//! Composites deliberately evaluate every child instead of short-circuiting:
//! the failure message collects the messages of *all* failing children, so a
//! lazy fold would lose explanations.

pub mod version;

pub use version::{Version, VersionParseError};

use serde::{Deserialize, Serialize};

use crate::delegates::CoreDelegates;
use crate::state::ConditionStateManager;

/// How a composite combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    /// Every child must be fulfilled
    And,
    /// At least one child must be fulfilled
    Or,
}

/// A single condition from an install script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Condition {
    /// Fulfilled when the named flag currently holds the given value.
    /// An empty value means "flag unset or empty".
    Flag { flag: String, value: String },
    /// AND/OR combination of sub-conditions
    Composite {
        operator: ConditionOperator,
        conditions: Vec<Condition>,
    },
    /// Minimum game version; an unreadable installed version is treated as
    /// 0.0.0.0 and compared normally
    GameVersion { minimum: Version },
    /// Minimum script-extender version; an unreadable installed version
    /// fails the condition outright
    ExtenderVersion { extender: String, minimum: Version },
    /// Minimum loader version; unreadable fails outright, like the extender
    /// variant but with its own message
    LoaderVersion { loader: String, minimum: Version },
}

impl Condition {
    /// Evaluates the condition against the current flag state and the host
    pub async fn is_fulfilled(
        &self,
        state: &ConditionStateManager,
        delegates: &CoreDelegates,
    ) -> bool {
        match self {
            Condition::Flag { flag, value } => {
                let current = state.flag_value(flag);
                if value.is_empty() {
                    current.is_none_or(str::is_empty)
                } else {
                    current == Some(value.as_str())
                }
            }
            Condition::Composite {
                operator,
                conditions,
            } => {
                let mut all = matches!(operator, ConditionOperator::And);
                for condition in conditions {
                    let fulfilled = Box::pin(condition.is_fulfilled(state, delegates)).await;
                    match operator {
                        ConditionOperator::And => all &= fulfilled,
                        ConditionOperator::Or => all |= fulfilled,
                    }
                }
                all
            }
            Condition::GameVersion { minimum } => {
                installed_game_version(delegates).await >= *minimum
            }
            Condition::ExtenderVersion { extender, minimum } => {
                match installed_extender_version(delegates, extender).await {
                    Some(installed) => installed >= *minimum,
                    None => false,
                }
            }
            Condition::LoaderVersion { loader, minimum } => {
                match installed_extender_version(delegates, loader).await {
                    Some(installed) => installed >= *minimum,
                    None => false,
                }
            }
        }
    }

    /// Describes the evaluation outcome.
    ///
    /// Returns `"Passed"` for a fulfilled, non-inverted condition. With
    /// `invert` set the message explains why the condition *passed* instead,
    /// used when a fulfilled condition is the reason an option is not usable.
    pub async fn message(
        &self,
        state: &ConditionStateManager,
        delegates: &CoreDelegates,
        invert: bool,
    ) -> String {
        match self {
            Condition::Flag { flag, value } => {
                if self.is_fulfilled(state, delegates).await && !invert {
                    return "Passed".to_string();
                }
                format!(
                    "Flag '{}' is {}{}.",
                    flag,
                    if invert { "" } else { "not " },
                    value
                )
            }
            Condition::Composite {
                operator,
                conditions,
            } => {
                let mut all = matches!(operator, ConditionOperator::And);
                let mut lines = Vec::new();
                for condition in conditions {
                    let fulfilled = Box::pin(condition.is_fulfilled(state, delegates)).await;
                    if !fulfilled {
                        lines.push(Box::pin(condition.message(state, delegates, invert)).await);
                    }
                    match operator {
                        ConditionOperator::And => all &= fulfilled,
                        ConditionOperator::Or => all |= fulfilled,
                    }
                }
                if all && !invert {
                    return "Passed".to_string();
                }
                let separator = match operator {
                    ConditionOperator::And => "\n",
                    ConditionOperator::Or => " OR\n",
                };
                lines.join(separator)
            }
            Condition::GameVersion { minimum } => {
                let installed = installed_game_version(delegates).await;
                if installed < *minimum && !invert {
                    format!(
                        "This mod requires v{minimum} or higher of the game. You have {installed}. Please update your game."
                    )
                } else {
                    "Passed".to_string()
                }
            }
            Condition::ExtenderVersion { extender, minimum } => {
                match installed_extender_version(delegates, extender).await {
                    None if !invert => format!(
                        "This mod requires {extender} v{minimum} or higher. Please download from http://{extender}.silverlock.org"
                    ),
                    Some(installed) if installed < *minimum => format!(
                        "This mod requires {extender} v{minimum} or higher. You have {installed}. Please update from http://{extender}.silverlock.org"
                    ),
                    _ => "Passed".to_string(),
                }
            }
            Condition::LoaderVersion { loader, minimum } => {
                match installed_extender_version(delegates, loader).await {
                    None if !invert => {
                        format!("This mod requires {loader} v{minimum} or higher")
                    }
                    Some(installed) if installed < *minimum => format!(
                        "This mod requires {loader} v{minimum} or higher. You have {installed}"
                    ),
                    _ => "Passed".to_string(),
                }
            }
        }
    }
}

/// Game version as reported by the host, 0.0.0.0 when missing or unparsable
async fn installed_game_version(delegates: &CoreDelegates) -> Version {
    delegates
        .current_game_version()
        .await
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(Version::ZERO)
}

/// Extender/loader version as reported by the host, None when missing or
/// unparsable
async fn installed_extender_version(delegates: &CoreDelegates, extender: &str) -> Option<Version> {
    delegates
        .extender_version(extender)
        .await
        .ok()
        .and_then(|raw| raw.parse().ok())
}
