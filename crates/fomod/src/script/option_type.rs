//! Option eligibility types and their resolvers

use serde::{Deserialize, Serialize};

use crate::conditions::Condition;
use crate::delegates::CoreDelegates;
use crate::state::ConditionStateManager;

/// The resolved eligibility of an option at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    /// Must be installed; never deselectable
    Required,
    Optional,
    /// Preselected when no preset drives the run
    Recommended,
    /// Visible but not selectable; a prerequisite is missing
    NotUsable,
    /// A prerequisite is present but not active, so selection is allowed
    CouldBeUsable,
}

impl OptionType {
    pub fn label(self) -> &'static str {
        match self {
            OptionType::Required => "Required",
            OptionType::Optional => "Optional",
            OptionType::Recommended => "Recommended",
            OptionType::NotUsable => "NotUsable",
            OptionType::CouldBeUsable => "CouldBeUsable",
        }
    }
}

/// Condition/type pair of a conditional resolver; the first fulfilled
/// pattern decides the option type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionalTypePattern {
    pub condition: Condition,
    pub option_type: OptionType,
}

/// Determines an option's type, either fixed or from flag/version state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OptionTypeResolver {
    Static { option_type: OptionType },
    Conditional {
        default: OptionType,
        patterns: Vec<ConditionalTypePattern>,
    },
}

impl Default for OptionTypeResolver {
    fn default() -> Self {
        OptionTypeResolver::Static {
            option_type: OptionType::Optional,
        }
    }
}

impl OptionTypeResolver {
    pub fn fixed(option_type: OptionType) -> Self {
        OptionTypeResolver::Static { option_type }
    }

    pub fn conditional(default: OptionType, patterns: Vec<ConditionalTypePattern>) -> Self {
        OptionTypeResolver::Conditional { default, patterns }
    }

    /// Resolves the option type against the current state
    pub async fn resolve(
        &self,
        state: &ConditionStateManager,
        delegates: &CoreDelegates,
    ) -> OptionType {
        match self {
            OptionTypeResolver::Static { option_type } => *option_type,
            OptionTypeResolver::Conditional { default, patterns } => {
                for pattern in patterns {
                    if pattern.condition.is_fulfilled(state, delegates).await {
                        return pattern.option_type;
                    }
                }
                *default
            }
        }
    }

    /// Explains why the option resolved to NotUsable.
    ///
    /// Returns `None` for every other resolution, and for static resolvers,
    /// which have no condition to explain.
    pub async fn condition_message(
        &self,
        state: &ConditionStateManager,
        delegates: &CoreDelegates,
    ) -> Option<String> {
        let OptionTypeResolver::Conditional { patterns, .. } = self else {
            return None;
        };
        for pattern in patterns {
            if pattern.option_type == OptionType::NotUsable
                && pattern.condition.is_fulfilled(state, delegates).await
            {
                // inverted: the condition passing is what disables the option
                return Some(pattern.condition.message(state, delegates, true).await);
            }
        }
        None
    }
}
