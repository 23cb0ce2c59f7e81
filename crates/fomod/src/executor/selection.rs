//! Selection engine: preselection rules and the fix-up passes that keep the
//! selected set consistent with dynamically changing flag state

use tracing::debug;

use crate::script::{GroupType, OptionId, OptionType, PresetGroup};

use super::Run;

impl<'a> Run<'a> {
    /// Adds the option to the selection and applies its flags, taking
    /// ownership of each
    pub(super) fn enable_option(&mut self, id: OptionId) {
        self.state.selected.insert(id);
        let script = self.script;
        let option = &script.steps[id.step].groups[id.group].options[id.option];
        for flag in &option.flags {
            self.state.flags.set_flag_value(&flag.name, &flag.value, id);
        }
    }

    /// Removes the option from the selection and clears the flags it still
    /// owns
    pub(super) fn disable_option(&mut self, id: OptionId) {
        self.state.selected.remove(&id);
        self.state.flags.remove_flags(id);
    }

    /// Resolved type of an option, honoring any per-run override
    pub(super) async fn resolve_option_type(&self, id: OptionId) -> OptionType {
        if let Some(forced) = self.state.type_overrides.get(&id) {
            return *forced;
        }
        let option = &self.script.steps[id.step].groups[id.group].options[id.option];
        option
            .type_resolver
            .resolve(&self.state.flags, self.delegates)
            .await
    }

    /// Group cardinality, honoring any `fix_steps` relaxation
    pub(super) fn effective_group_type(&self, step: usize, group: usize) -> GroupType {
        self.state
            .group_type_overrides
            .get(&(step, group))
            .copied()
            .unwrap_or(self.script.steps[step].groups[group].group_type)
    }

    /// Relaxes group cardinalities that multiple Required options would make
    /// unsatisfiable. Runs once, before any navigation.
    pub(super) async fn fix_steps(&mut self) {
        let script = self.script;
        for (step_idx, step) in script.steps.iter().enumerate() {
            for (group_idx, group) in step.groups.iter().enumerate() {
                let mut required = 0;
                for option_idx in 0..group.options.len() {
                    let id = OptionId {
                        step: step_idx,
                        group: group_idx,
                        option: option_idx,
                    };
                    if self.resolve_option_type(id).await == OptionType::Required {
                        required += 1;
                    }
                }
                if required < 2 {
                    continue;
                }
                let relaxed = match group.group_type {
                    GroupType::SelectAtMostOne => Some(GroupType::SelectAny),
                    GroupType::SelectExactlyOne => Some(GroupType::SelectAtLeastOne),
                    _ => None,
                };
                if let Some(group_type) = relaxed {
                    debug!(
                        step = step_idx,
                        group = group_idx,
                        required,
                        ?group_type,
                        "relaxing group cardinality for multiple required options"
                    );
                    self.state
                        .group_type_overrides
                        .insert((step_idx, group_idx), group_type);
                }
            }
        }
    }

    /// Force-enables Required and force-disables NotUsable options in the
    /// step. Re-run after every change, since enabling one option can flip
    /// another option's resolved type through flags.
    pub(super) async fn fix_selected(&mut self, step_idx: usize) {
        let script = self.script;
        let step = &script.steps[step_idx];
        for (group_idx, group) in step.groups.iter().enumerate() {
            for option_idx in 0..group.options.len() {
                let id = OptionId {
                    step: step_idx,
                    group: group_idx,
                    option: option_idx,
                };
                match self.resolve_option_type(id).await {
                    OptionType::Required => self.enable_option(id),
                    OptionType::NotUsable => self.disable_option(id),
                    _ => {}
                }
            }
        }
    }

    /// Applies preset/recommended/default selection rules to every group of
    /// the step that has no selected option yet
    pub(super) async fn preselect_options(&mut self, step_idx: usize) {
        let script = self.script;
        let step = &script.steps[step_idx];
        let has_preset = self.preset.is_some();

        for (group_idx, group) in step.groups.iter().enumerate() {
            // step and group names are not unique; collect every preset
            // entry that matches both
            let group_presets: Vec<PresetGroup> = self
                .preset
                .as_ref()
                .map(|preset| {
                    preset
                        .steps
                        .iter()
                        .filter(|preset_step| preset_step.name == step.name)
                        .flat_map(|preset_step| {
                            preset_step
                                .groups
                                .iter()
                                .filter(|preset_group| preset_group.name == group.name)
                                .cloned()
                        })
                        .collect()
                })
                .unwrap_or_default();

            let already_selected = (0..group.options.len()).any(|option_idx| {
                self.state.selected.contains(&OptionId {
                    step: step_idx,
                    group: group_idx,
                    option: option_idx,
                })
            });
            if already_selected {
                continue;
            }

            let group_type = self.effective_group_type(step_idx, group_idx);
            let mut set_first = group_type == GroupType::SelectExactlyOne;

            for (option_idx, option) in group.options.iter().enumerate() {
                let id = OptionId {
                    step: step_idx,
                    group: group_idx,
                    option: option_idx,
                };
                let mut resolved = self.resolve_option_type(id).await;
                let is_preset = group_presets.iter().any(|preset_group| {
                    preset_group
                        .choices
                        .iter()
                        .any(|choice| choice.name == option.name)
                });
                if is_preset && resolved == OptionType::NotUsable {
                    // keep preset picks selectable, otherwise the user could
                    // not deselect an option that is actually invalid
                    debug!(option = %option.name, "forcing preset option from NotUsable to CouldBeUsable");
                    self.state
                        .type_overrides
                        .insert(id, OptionType::CouldBeUsable);
                    resolved = OptionType::CouldBeUsable;
                }

                if resolved == OptionType::Required
                    || (!has_preset && resolved == OptionType::Recommended)
                    || group_type == GroupType::SelectAll
                    || is_preset
                {
                    // multiple recommended options in a single-selection
                    // group would form an invalid pre-selection; clear the
                    // group before enabling this one
                    if !has_preset
                        && resolved == OptionType::Recommended
                        && matches!(
                            group_type,
                            GroupType::SelectExactlyOne | GroupType::SelectAtMostOne
                        )
                    {
                        for inner_idx in 0..group.options.len() {
                            self.disable_option(OptionId {
                                step: step_idx,
                                group: group_idx,
                                option: inner_idx,
                            });
                        }
                    }

                    set_first = false;

                    if !group_presets.is_empty() && !is_preset {
                        // the preset is authoritative for this group and
                        // does not name this option
                        self.disable_option(id);
                    } else {
                        self.enable_option(id);
                    }
                }
            }

            if set_first && !group.options.is_empty() {
                debug!(
                    step = step_idx,
                    group = group_idx,
                    "no option qualified in SelectExactlyOne group, enabling the first"
                );
                self.enable_option(OptionId {
                    step: step_idx,
                    group: group_idx,
                    option: 0,
                });
            }
        }
    }
}
