//! Script execution: navigation state machine and run state
//!
//! One `execute` call drives a whole run. The flow is:
//!
//! Host (preset or dialog callbacks)
//! ↓
//! ScriptExecutor (this file)
//! ↓
//! selection engine (selection.rs)
//! ↓
//! ScriptInstaller (installer)
//! ↓
//! Vec<Instruction>
//!
//! Interactive runs are callback-driven: the UI's select/continue/cancel
//! handles enqueue messages on an internal channel and return immediately,
//! and the executor consumes them sequentially. A continue carrying a stale
//! step id is dropped, which shields the state machine from duplicated or
//! out-of-order round-trips. Headless runs (a preset was supplied) never
//! touch the UI delegates at all.

mod selection;


use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::delegates::{CancelCallback, ContinueCallback, CoreDelegates, SelectCallback};
use crate::installer::ScriptInstaller;
use crate::instruction::{ErrorSeverity, Instruction};
use crate::script::archive::join_prefix;
use crate::script::{
    GroupType, InstallableFile, ModArchive, OptionId, OptionType, OptionsPreset, Script,
};
use crate::state::ConditionStateManager;
use crate::ui::{GroupView, HeaderImage, OptionView, StepView};

/// Terminal result of a run.
///
/// The engine always yields one of these; failures surface as error
/// instructions inside `Completed`, never as a Rust error.
#[derive(Debug)]
pub enum ExecutionOutcome {
    Completed(Vec<Instruction>),
    Cancelled,
}

/// Messages enqueued by the UI callbacks
#[derive(Debug)]
enum UiMessage {
    Select {
        step_id: usize,
        group_id: usize,
        option_ids: Vec<usize>,
    },
    Continue {
        forward: bool,
        current_step: Option<usize>,
    },
    Cancel,
}

/// Per-run mutable state; created fresh for every `execute` call
#[derive(Debug, Default)]
struct RunState {
    selected: HashSet<OptionId>,
    flags: ConditionStateManager,
    /// Resolver overrides from preset reconciliation; the parsed script is
    /// never mutated, so it can serve concurrent runs
    type_overrides: HashMap<OptionId, OptionType>,
    /// Cardinality relaxations from `fix_steps`
    group_type_overrides: HashMap<(usize, usize), GroupType>,
}

pub(crate) struct Run<'a> {
    script: &'a Script,
    archive: &'a ModArchive,
    delegates: &'a CoreDelegates,
    preset: Option<OptionsPreset>,
    state: RunState,
}

/// Executes install scripts against a mod archive and a set of host
/// delegates
pub struct ScriptExecutor {
    archive: ModArchive,
    delegates: CoreDelegates,
}

impl ScriptExecutor {
    pub fn new(archive: ModArchive, delegates: CoreDelegates) -> Self {
        ScriptExecutor { archive, delegates }
    }

    /// Runs the script to a terminal outcome.
    ///
    /// With a preset the run is headless: every visible step is preselected
    /// from the preset and instructions are built without any UI traffic.
    /// Without one the host's dialog drives the run through its callbacks.
    pub async fn execute(
        &self,
        script: &Script,
        preset: Option<OptionsPreset>,
    ) -> ExecutionOutcome {
        let mut run = Run {
            script,
            archive: &self.archive,
            delegates: &self.delegates,
            preset,
            state: RunState::default(),
        };

        if let Some(prerequisite) = &script.prerequisites {
            if !prerequisite
                .is_fulfilled(&run.state.flags, run.delegates)
                .await
            {
                let message = prerequisite
                    .message(&run.state.flags, run.delegates, false)
                    .await;
                info!("script prerequisites not fulfilled, aborting before interaction");
                // message spelling matches what existing hosts pattern-match on
                return ExecutionOutcome::Completed(vec![Instruction::install_error(
                    ErrorSeverity::Fatal,
                    format!("Installer Prerequisits not fulfilled: {message}"),
                )]);
            }
        }

        run.fix_steps().await;

        if run.preset.is_some() {
            info!("preset supplied, running headless");
            for step_idx in 0..script.steps.len() {
                if !run.step_visible(step_idx).await {
                    continue;
                }
                run.preselect_options(step_idx).await;
                run.fix_selected(step_idx).await;
            }
            return ExecutionOutcome::Completed(run.collect_instructions().await);
        }

        self.run_interactive(&mut run).await
    }

    async fn run_interactive(&self, run: &mut Run<'_>) -> ExecutionOutcome {
        let script = run.script;
        let header = self.header_image(script);

        let (queue, mut messages) = mpsc::unbounded_channel();
        let select: SelectCallback = {
            let queue = queue.clone();
            std::sync::Arc::new(move |step_id, group_id, option_ids| {
                let _ = queue.send(UiMessage::Select {
                    step_id,
                    group_id,
                    option_ids,
                });
            })
        };
        let cont: ContinueCallback = {
            let queue = queue.clone();
            std::sync::Arc::new(move |forward, current_step| {
                let _ = queue.send(UiMessage::Continue {
                    forward,
                    current_step,
                });
            })
        };
        let cancel: CancelCallback = {
            let queue = queue.clone();
            std::sync::Arc::new(move || {
                let _ = queue.send(UiMessage::Cancel);
            })
        };
        // the callbacks hold the only senders from here on; if the host
        // drops them without a terminal message the run ends as cancelled
        drop(queue);

        self.delegates
            .ui
            .start_dialog(&script.header.title, &header, select, cont, cancel)
            .await;

        let mut current = match run.find_next_idx(None).await {
            Some(first) => {
                run.preselect_options(first).await;
                run.send_state(first).await;
                first
            }
            None => {
                self.delegates.ui.end_dialog().await;
                return ExecutionOutcome::Completed(run.collect_instructions().await);
            }
        };

        while let Some(message) = messages.recv().await {
            match message {
                UiMessage::Select {
                    step_id,
                    group_id,
                    option_ids,
                } => {
                    if step_id >= script.steps.len()
                        || group_id >= script.steps[step_id].groups.len()
                    {
                        debug!(step_id, group_id, "ignoring select for unknown group");
                        continue;
                    }
                    let chosen: HashSet<usize> = option_ids.into_iter().collect();
                    for option_idx in 0..script.steps[step_id].groups[group_id].options.len() {
                        let id = OptionId {
                            step: step_id,
                            group: group_id,
                            option: option_idx,
                        };
                        // Required options are never deselectable
                        if chosen.contains(&option_idx)
                            || run.resolve_option_type(id).await == OptionType::Required
                        {
                            run.enable_option(id);
                        } else {
                            run.disable_option(id);
                        }
                    }
                    run.fix_selected(current).await;
                    run.send_state(current).await;
                }
                UiMessage::Continue {
                    forward,
                    current_step,
                } => {
                    if let Some(claimed) = current_step {
                        if claimed != current {
                            debug!(claimed, current, "ignoring stale continue");
                            continue;
                        }
                    }
                    let next = if forward {
                        run.find_next_idx(Some(current)).await
                    } else {
                        Some(run.find_prev_idx(current).await)
                    };
                    match next {
                        Some(step_idx) => {
                            debug!(from = current, to = step_idx, forward, "step transition");
                            current = step_idx;
                            run.preselect_options(step_idx).await;
                            run.send_state(step_idx).await;
                        }
                        None => {
                            self.delegates.ui.end_dialog().await;
                            return ExecutionOutcome::Completed(
                                run.collect_instructions().await,
                            );
                        }
                    }
                }
                UiMessage::Cancel => {
                    info!("installation cancelled by host");
                    return ExecutionOutcome::Cancelled;
                }
            }
        }

        info!("dialog callbacks dropped without a terminal message");
        ExecutionOutcome::Cancelled
    }

    /// Banner for the dialog; falls back to the archive screenshot when the
    /// script header declares no image
    fn header_image(&self, script: &Script) -> HeaderImage {
        let prefix = self.archive.prefix();
        let path = match script.header.image_path.as_deref() {
            Some(image) if !image.is_empty() => Some(join_prefix(prefix, image)),
            _ => self
                .archive
                .screenshot_path()
                .map(|screenshot| join_prefix(prefix, screenshot)),
        };
        let height = if script.header.height < 0 && script.header.show_image {
            75
        } else {
            script.header.height
        };
        HeaderImage {
            path,
            show_fade: script.header.show_fade,
            height,
        }
    }
}

impl<'a> Run<'a> {
    async fn step_visible(&self, step_idx: usize) -> bool {
        match &self.script.steps[step_idx].visibility {
            None => true,
            Some(condition) => condition.is_fulfilled(&self.state.flags, self.delegates).await,
        }
    }

    /// Next visible step after `current`, or `None` past the last step.
    /// Visibility is re-evaluated on every call since flag state may have
    /// changed.
    async fn find_next_idx(&self, current: Option<usize>) -> Option<usize> {
        let start = current.map_or(0, |idx| idx + 1);
        for step_idx in start..self.script.steps.len() {
            if self.step_visible(step_idx).await {
                return Some(step_idx);
            }
        }
        None
    }

    /// Previous visible step before `current`, clamped to the first step
    async fn find_prev_idx(&self, current: usize) -> usize {
        let mut step_idx = current;
        while step_idx > 0 {
            step_idx -= 1;
            if self.step_visible(step_idx).await {
                return step_idx;
            }
        }
        0
    }

    /// Rebuilds the full step view and pushes it to the host UI
    async fn send_state(&self, current: usize) {
        let steps = self.build_views().await;
        self.delegates.ui.update_state(&steps, current).await;
    }

    async fn build_views(&self) -> Vec<StepView> {
        let script = self.script;
        let mut views = Vec::with_capacity(script.steps.len());
        for (step_idx, step) in script.steps.iter().enumerate() {
            let step_preset = self.preset.as_ref().and_then(|preset| {
                preset
                    .steps
                    .iter()
                    .find(|preset_step| preset_step.name == step.name)
            });

            let mut groups = Vec::with_capacity(step.groups.len());
            for (group_idx, group) in step.groups.iter().enumerate() {
                let group_type = self.effective_group_type(step_idx, group_idx);
                let group_preset = step_preset.and_then(|preset_step| {
                    preset_step
                        .groups
                        .iter()
                        .find(|preset_group| preset_group.name == group.name)
                });

                let mut options = Vec::with_capacity(group.options.len());
                for (option_idx, option) in group.options.iter().enumerate() {
                    let id = OptionId {
                        step: step_idx,
                        group: group_idx,
                        option: option_idx,
                    };
                    let resolved = self.resolve_option_type(id).await;
                    let preset_match = resolved != OptionType::Required
                        && group_type != GroupType::SelectAll
                        && group_preset.is_some_and(|preset_group| {
                            preset_group
                                .choices
                                .iter()
                                .any(|choice| choice.name == option.name)
                        });
                    let condition_message = if resolved == OptionType::NotUsable {
                        option
                            .type_resolver
                            .condition_message(&self.state.flags, self.delegates)
                            .await
                    } else {
                        None
                    };
                    options.push(OptionView {
                        id: option_idx,
                        name: option.name.clone(),
                        description: option.description.clone(),
                        image: option
                            .image_path
                            .as_deref()
                            .filter(|image| !image.is_empty())
                            .map(|image| join_prefix(self.archive.prefix(), image)),
                        selected: self.state.selected.contains(&id),
                        preset: preset_match,
                        option_type: resolved.label().to_string(),
                        condition_message,
                    });
                }
                groups.push(GroupView {
                    id: group_idx,
                    name: group.name.clone(),
                    group_type: group_type.label().to_string(),
                    options,
                });
            }
            views.push(StepView {
                id: step_idx,
                name: step.name.clone(),
                visible: self.step_visible(step_idx).await,
                sort_order: step.sort_order.label().to_string(),
                groups,
            });
        }
        views
    }

    /// Gathers the files the final selection installs and hands them to the
    /// instruction builder
    async fn collect_instructions(&self) -> Vec<Instruction> {
        let script = self.script;
        let mut files: Vec<InstallableFile> = Vec::new();
        for (step_idx, step) in script.steps.iter().enumerate() {
            for (group_idx, group) in step.groups.iter().enumerate() {
                for (option_idx, option) in group.options.iter().enumerate() {
                    let id = OptionId {
                        step: step_idx,
                        group: group_idx,
                        option: option_idx,
                    };
                    if self.state.selected.contains(&id) {
                        files.extend(option.files.iter().cloned());
                        continue;
                    }
                    for file in &option.files {
                        let install_anyway = file.always_install
                            || (file.install_if_usable
                                && self.resolve_option_type(id).await != OptionType::NotUsable);
                        if install_anyway {
                            files.push(file.clone());
                        }
                    }
                }
            }
        }
        debug!(count = files.len(), "collecting instructions");
        ScriptInstaller::new(self.archive)
            .install(script, &self.state.flags, self.delegates, &files)
            .await
    }
}
