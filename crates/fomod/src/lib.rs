//! FOMOD install-script engine
//!
//! This library interprets declarative mod install scripts: it evaluates
//! conditions against flag and game state, drives the option-selection
//! wizard (interactively through host callbacks or headless from a recorded
//! preset) and resolves the final selection into an ordered list of install
//! instructions. It never touches the file system itself; everything the
//! host must do comes back as [`Instruction`] values.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fomod::{ExecutionOutcome, ModArchive, Script, ScriptExecutor};
//!
//! # async fn example(delegates: fomod::CoreDelegates, script: Script) {
//! // List the archive entries once up front; the engine matches script
//! // sources against this listing
//! let archive = ModArchive::new(
//!     "fomod",
//!     vec!["fomod/textures/armor.dds".to_string()],
//! );
//!
//! let executor = ScriptExecutor::new(archive, delegates);
//! match executor.execute(&script, None).await {
//!     ExecutionOutcome::Completed(instructions) => {
//!         for instruction in instructions {
//!             println!("{instruction:?}");
//!         }
//!     }
//!     ExecutionOutcome::Cancelled => println!("user cancelled"),
//! }
//! # }
//! ```
//!
//! # Features
//!
//! - **Condition evaluation**: flag equality, AND/OR composition and
//!   game/extender/loader version thresholds answered by the host
//! - **Wizard navigation**: visibility-aware forward/back stepping with
//!   enqueue-and-return UI callbacks
//! - **Headless presets**: recorded choices replay without any UI traffic
//! - **Priority merging**: per-destination conflict resolution across the
//!   required/selected/conditional priority bands
//! - **Host delegates**: all game, plugin, INI and UI access behind async
//!   traits with bounded timeouts

pub mod conditions;
pub mod delegates;
pub mod executor;
pub mod installer;
pub mod instruction;
pub mod script;
pub mod state;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use conditions::{Condition, ConditionOperator, Version};
pub use delegates::{
    ContextDelegates, CoreDelegates, DelegateError, IniDelegates, PluginDelegates, UiDelegates,
};
pub use executor::{ExecutionOutcome, ScriptExecutor};
pub use instruction::{ErrorSeverity, Instruction, InstructionType};
pub use script::{
    GroupType, InstallOption, InstallStep, InstallableFile, ModArchive, OptionGroup, OptionType,
    OptionsPreset, Script,
};
pub use state::ConditionStateManager;
