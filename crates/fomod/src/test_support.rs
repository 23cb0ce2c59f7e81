//! Shared fixtures for unit and integration tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::delegates::{
    CancelCallback, ContextDelegates, ContinueCallback, CoreDelegates, DelegateError,
    IniDelegates, PluginDelegates, Result, SelectCallback, UiDelegates,
};
use crate::ui::{HeaderImage, StepView};

/// Installs a fmt subscriber so failing tests print the engine's trace.
/// Safe to call from every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Canned host answers; anything left unset answers with a failure, which
/// exercises the non-fulfilling fallback paths
#[derive(Debug, Default)]
pub struct TestDelegates {
    pub game_version: Option<String>,
    pub app_version: Option<String>,
    pub extender_versions: HashMap<String, String>,
    pub extender_present: bool,
    pub plugins: Vec<String>,
    pub active_plugins: Vec<String>,
    pub data_files: Vec<String>,
    pub ini_values: HashMap<(String, String, String), String>,
}

#[async_trait]
impl PluginDelegates for TestDelegates {
    async fn get_all(&self, active_only: bool) -> Result<Vec<String>> {
        if active_only {
            Ok(self.active_plugins.clone())
        } else {
            Ok(self.plugins.clone())
        }
    }

    async fn is_active(&self, plugin_name: &str) -> Result<bool> {
        Ok(self
            .active_plugins
            .iter()
            .any(|plugin| plugin.eq_ignore_ascii_case(plugin_name)))
    }

    async fn is_present(&self, plugin_name: &str) -> Result<bool> {
        Ok(self
            .plugins
            .iter()
            .any(|plugin| plugin.eq_ignore_ascii_case(plugin_name)))
    }
}

#[async_trait]
impl ContextDelegates for TestDelegates {
    async fn app_version(&self) -> Result<String> {
        self.app_version
            .clone()
            .ok_or_else(|| DelegateError::Failed("app version not available".to_string()))
    }

    async fn current_game_version(&self) -> Result<String> {
        self.game_version
            .clone()
            .ok_or_else(|| DelegateError::Failed("game version not available".to_string()))
    }

    async fn extender_version(&self, extender: &str) -> Result<String> {
        self.extender_versions
            .get(extender)
            .cloned()
            .ok_or_else(|| DelegateError::Failed(format!("no extender {extender}")))
    }

    async fn is_extender_present(&self) -> Result<bool> {
        Ok(self.extender_present)
    }

    async fn check_file_exists(&self, path: &str) -> Result<bool> {
        Ok(self
            .data_files
            .iter()
            .any(|file| file.eq_ignore_ascii_case(path)))
    }

    async fn existing_data_file(&self, path: &str) -> Result<Vec<u8>> {
        if self.check_file_exists(path).await? {
            Ok(Vec::new())
        } else {
            Err(DelegateError::Failed(format!("no data file {path}")))
        }
    }

    async fn existing_data_file_list(
        &self,
        folder: &str,
        _pattern: &str,
        _recursive: bool,
    ) -> Result<Vec<String>> {
        let prefix = folder.to_ascii_lowercase();
        Ok(self
            .data_files
            .iter()
            .filter(|file| file.to_ascii_lowercase().starts_with(&prefix))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl IniDelegates for TestDelegates {
    async fn ini_string(&self, file: &str, section: &str, key: &str) -> Result<String> {
        self.ini_values
            .get(&(file.to_string(), section.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| DelegateError::Failed(format!("no ini value {file}/{section}/{key}")))
    }

    async fn ini_int(&self, file: &str, section: &str, key: &str) -> Result<i64> {
        let raw = self.ini_string(file, section, key).await?;
        raw.parse()
            .map_err(|_| DelegateError::Failed(format!("ini value {key} is not numeric")))
    }
}

/// UI that must never be reached; used by tests of the headless and
/// non-interactive paths
pub struct NullUi;

#[async_trait]
impl UiDelegates for NullUi {
    async fn start_dialog(
        &self,
        _module_name: &str,
        _image: &HeaderImage,
        _select: SelectCallback,
        _cont: ContinueCallback,
        _cancel: CancelCallback,
    ) {
        panic!("unexpected start_dialog call");
    }

    async fn end_dialog(&self) {
        panic!("unexpected end_dialog call");
    }

    async fn update_state(&self, _steps: &[StepView], _current_step: usize) {
        panic!("unexpected update_state call");
    }

    async fn report_error(&self, title: &str, message: &str, _details: &str) {
        panic!("unexpected report_error call: {title}: {message}");
    }
}

pub fn core_delegates(fixture: TestDelegates) -> CoreDelegates {
    core_delegates_with_ui(fixture, Arc::new(NullUi))
}

pub fn core_delegates_with_ui(
    fixture: TestDelegates,
    ui: Arc<dyn UiDelegates>,
) -> CoreDelegates {
    let shared = Arc::new(fixture);
    CoreDelegates::new(shared.clone(), shared.clone(), shared, ui)
}

/// One scripted host interaction
#[derive(Debug, Clone)]
pub enum UiAction {
    Select {
        step: usize,
        group: usize,
        options: Vec<usize>,
    },
    /// Advance, claiming the step the engine just reported
    Continue,
    /// Advance, claiming a specific (possibly stale) step
    ContinueFrom(usize),
    Back,
    Cancel,
}

struct ScriptedCallbacks {
    select: SelectCallback,
    cont: ContinueCallback,
    cancel: CancelCallback,
}

/// Deterministic dialog: plays one batch of actions per state update.
///
/// The engine pushes a fresh state after every processed message, so each
/// `update_state` consumes exactly one batch. Batches the engine never asks
/// for are simply left unplayed.
pub struct ScriptedUi {
    batches: Mutex<VecDeque<Vec<UiAction>>>,
    callbacks: Mutex<Option<ScriptedCallbacks>>,
    pub states: Mutex<Vec<(Vec<StepView>, usize)>>,
    pub ended: AtomicBool,
}

impl ScriptedUi {
    pub fn new(batches: Vec<Vec<UiAction>>) -> Arc<Self> {
        Arc::new(ScriptedUi {
            batches: Mutex::new(batches.into_iter().collect()),
            callbacks: Mutex::new(None),
            states: Mutex::new(Vec::new()),
            ended: AtomicBool::new(false),
        })
    }

    pub fn dialog_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UiDelegates for ScriptedUi {
    async fn start_dialog(
        &self,
        _module_name: &str,
        _image: &HeaderImage,
        select: SelectCallback,
        cont: ContinueCallback,
        cancel: CancelCallback,
    ) {
        *self.callbacks.lock().unwrap() = Some(ScriptedCallbacks {
            select,
            cont,
            cancel,
        });
    }

    async fn end_dialog(&self) {
        self.ended.store(true, Ordering::SeqCst);
        *self.callbacks.lock().unwrap() = None;
    }

    async fn update_state(&self, steps: &[StepView], current_step: usize) {
        self.states
            .lock()
            .unwrap()
            .push((steps.to_vec(), current_step));

        let batch = self.batches.lock().unwrap().pop_front();
        let callbacks = self.callbacks.lock().unwrap();
        let Some(callbacks) = callbacks.as_ref() else {
            return;
        };
        for action in batch.unwrap_or_default() {
            match action {
                UiAction::Select {
                    step,
                    group,
                    options,
                } => (callbacks.select)(step, group, options),
                UiAction::Continue => (callbacks.cont)(true, Some(current_step)),
                UiAction::ContinueFrom(claimed) => (callbacks.cont)(true, Some(claimed)),
                UiAction::Back => (callbacks.cont)(false, Some(current_step)),
                UiAction::Cancel => (callbacks.cancel)(),
            }
        }
    }

    async fn report_error(&self, title: &str, message: &str, _details: &str) {
        panic!("unexpected report_error call: {title}: {message}");
    }
}
