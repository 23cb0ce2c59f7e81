//! Per-run flag state
//!
//! Flags are named string values set by enabling options and consulted by
//! flag conditions. Every entry remembers which option set it so that
//! disabling one option cannot clear a flag another option has since
//! overwritten with its own value.

use std::collections::HashMap;

use crate::script::OptionId;

#[derive(Debug, Clone)]
struct FlagEntry {
    value: String,
    owner: OptionId,
}

/// Mutable flag store owned by a single execution run
#[derive(Debug, Default)]
pub struct ConditionStateManager {
    flags: HashMap<String, FlagEntry>,
}

impl ConditionStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of the named flag, if any option has set it
    pub fn flag_value(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(|entry| entry.value.as_str())
    }

    /// Sets a flag value, (re)assigning ownership to the given option
    pub fn set_flag_value(&mut self, name: &str, value: &str, owner: OptionId) {
        self.flags.insert(
            name.to_string(),
            FlagEntry {
                value: value.to_string(),
                owner,
            },
        );
    }

    /// Removes all flags the given option still owns.
    ///
    /// Flags the option once set but another option has overwritten since
    /// belong to that other option and are left untouched.
    pub fn remove_flags(&mut self, owner: OptionId) {
        self.flags.retain(|_, entry| entry.owner != owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(step: usize, option: usize) -> OptionId {
        OptionId {
            step,
            group: 0,
            option,
        }
    }

    #[test]
    fn set_and_read_back() {
        let mut state = ConditionStateManager::new();
        assert_eq!(state.flag_value("mode"), None);
        state.set_flag_value("mode", "full", option(0, 0));
        assert_eq!(state.flag_value("mode"), Some("full"));
    }

    #[test]
    fn remove_flags_clears_owned_entries() {
        let mut state = ConditionStateManager::new();
        state.set_flag_value("a", "1", option(0, 0));
        state.set_flag_value("b", "2", option(0, 0));
        state.set_flag_value("c", "3", option(0, 1));

        state.remove_flags(option(0, 0));
        assert_eq!(state.flag_value("a"), None);
        assert_eq!(state.flag_value("b"), None);
        assert_eq!(state.flag_value("c"), Some("3"));
    }

    #[test]
    fn overwritten_flag_survives_removal_by_previous_owner() {
        let mut state = ConditionStateManager::new();
        state.set_flag_value("mode", "full", option(0, 0));
        state.set_flag_value("mode", "lite", option(0, 1));

        // option 0 no longer owns "mode", so disabling it leaves the value
        state.remove_flags(option(0, 0));
        assert_eq!(state.flag_value("mode"), Some("lite"));

        state.remove_flags(option(0, 1));
        assert_eq!(state.flag_value("mode"), None);
    }
}
