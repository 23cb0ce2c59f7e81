//! Host capability interfaces
//!
//! The engine never talks to the game installation, the plugin list or the
//! UI directly; it consumes four capability traits implemented by whatever
//! adapter fronts the host process. Every query crosses a process boundary
//! in practice, so `CoreDelegates` wraps each one with a bounded timeout and
//! a single retry. Query failures never propagate out of condition
//! evaluation; callers degrade them to non-fulfilling defaults.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::timeout;
use tracing::warn;

use crate::ui::{HeaderImage, StepView};

/// Upper bound for a single host query
pub const QUERY_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Errors surfaced by host delegate queries
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("delegate query timed out")]
    Timeout,

    #[error("delegate query failed: {0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, DelegateError>;

/// Enables the select callback: step id, group id, selected option indices
pub type SelectCallback = Arc<dyn Fn(usize, usize, Vec<usize>) + Send + Sync>;
/// Advances (true) or retreats (false) from the step the host believes is
/// current; a stale step id makes the engine ignore the call
pub type ContinueCallback = Arc<dyn Fn(bool, Option<usize>) + Send + Sync>;
/// Terminates the run with no instructions
pub type CancelCallback = Arc<dyn Fn() + Send + Sync>;

/// Plugin queries against the host's load order
#[async_trait]
pub trait PluginDelegates: Send + Sync {
    async fn get_all(&self, active_only: bool) -> Result<Vec<String>>;
    async fn is_active(&self, plugin_name: &str) -> Result<bool>;
    async fn is_present(&self, plugin_name: &str) -> Result<bool>;
}

/// Game/installation context queries
#[async_trait]
pub trait ContextDelegates: Send + Sync {
    async fn app_version(&self) -> Result<String>;
    async fn current_game_version(&self) -> Result<String>;
    async fn extender_version(&self, extender: &str) -> Result<String>;
    async fn is_extender_present(&self) -> Result<bool>;
    async fn check_file_exists(&self, path: &str) -> Result<bool>;
    async fn existing_data_file(&self, path: &str) -> Result<Vec<u8>>;
    async fn existing_data_file_list(
        &self,
        folder: &str,
        pattern: &str,
        recursive: bool,
    ) -> Result<Vec<String>>;
}

/// INI value lookups in the game's configuration files
#[async_trait]
pub trait IniDelegates: Send + Sync {
    async fn ini_string(&self, file: &str, section: &str, key: &str) -> Result<String>;
    async fn ini_int(&self, file: &str, section: &str, key: &str) -> Result<i64>;
}

/// Installer dialog driven by the host.
///
/// The three callbacks handed to `start_dialog` only enqueue work and return
/// immediately; the engine performs the actual state change afterwards, so a
/// single-threaded host can never deadlock itself by calling back from
/// within `update_state`.
#[async_trait]
pub trait UiDelegates: Send + Sync {
    async fn start_dialog(
        &self,
        module_name: &str,
        image: &HeaderImage,
        select: SelectCallback,
        cont: ContinueCallback,
        cancel: CancelCallback,
    );
    async fn end_dialog(&self);
    async fn update_state(&self, steps: &[StepView], current_step: usize);
    async fn report_error(&self, title: &str, message: &str, details: &str);
}

/// Bundle of the four host capability interfaces.
///
/// All non-UI accessors apply the bounded timeout and retry once; UI calls
/// go through untimed since the dialog legitimately waits on the user.
#[derive(Clone)]
pub struct CoreDelegates {
    pub plugin: Arc<dyn PluginDelegates>,
    pub context: Arc<dyn ContextDelegates>,
    pub ini: Arc<dyn IniDelegates>,
    pub ui: Arc<dyn UiDelegates>,
}

impl CoreDelegates {
    pub fn new(
        plugin: Arc<dyn PluginDelegates>,
        context: Arc<dyn ContextDelegates>,
        ini: Arc<dyn IniDelegates>,
        ui: Arc<dyn UiDelegates>,
    ) -> Self {
        CoreDelegates {
            plugin,
            context,
            ini,
            ui,
        }
    }

    pub async fn all_plugins(&self, active_only: bool) -> Result<Vec<String>> {
        bounded(|| self.plugin.get_all(active_only)).await
    }

    pub async fn is_plugin_active(&self, plugin_name: &str) -> Result<bool> {
        bounded(|| self.plugin.is_active(plugin_name)).await
    }

    pub async fn is_plugin_present(&self, plugin_name: &str) -> Result<bool> {
        bounded(|| self.plugin.is_present(plugin_name)).await
    }

    pub async fn app_version(&self) -> Result<String> {
        bounded(|| self.context.app_version()).await
    }

    pub async fn current_game_version(&self) -> Result<String> {
        bounded(|| self.context.current_game_version()).await
    }

    pub async fn extender_version(&self, extender: &str) -> Result<String> {
        bounded(|| self.context.extender_version(extender)).await
    }

    pub async fn is_extender_present(&self) -> Result<bool> {
        bounded(|| self.context.is_extender_present()).await
    }

    pub async fn check_file_exists(&self, path: &str) -> Result<bool> {
        bounded(|| self.context.check_file_exists(path)).await
    }

    pub async fn existing_data_file(&self, path: &str) -> Result<Vec<u8>> {
        bounded(|| self.context.existing_data_file(path)).await
    }

    pub async fn existing_data_file_list(
        &self,
        folder: &str,
        pattern: &str,
        recursive: bool,
    ) -> Result<Vec<String>> {
        bounded(|| self.context.existing_data_file_list(folder, pattern, recursive)).await
    }

    pub async fn ini_string(&self, file: &str, section: &str, key: &str) -> Result<String> {
        bounded(|| self.ini.ini_string(file, section, key)).await
    }

    pub async fn ini_int(&self, file: &str, section: &str, key: &str) -> Result<i64> {
        bounded(|| self.ini.ini_int(file, section, key)).await
    }
}

/// Runs a query with the bounded timeout, retrying once on timeout
async fn bounded<T, F, Fut>(query: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match timeout(QUERY_TIMEOUT, query()).await {
        Ok(result) => result,
        Err(_) => {
            warn!("delegate query timed out, retrying once");
            match timeout(QUERY_TIMEOUT, query()).await {
                Ok(result) => result,
                Err(_) => Err(DelegateError::Timeout),
            }
        }
    }
}
