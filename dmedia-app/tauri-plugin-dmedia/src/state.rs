use tauri::Runtime;

use crate::bridge::{Bridge, NATIVE_METHOD};
use crate::config::Config;
use crate::models::{LifecycleEvent, LifecycleResponse, MethodCall, MethodResponse};
use crate::{Backend, Error, Result};

/// Managed plugin state.
///
/// The bridge locks its own state and never holds that lock while a
/// backend call or a folder selection is outstanding.
pub struct Dmedia<R: Runtime> {
    bridge: Bridge<Backend<R>>,
}

impl<R: Runtime> Dmedia<R> {
    pub(crate) fn new(backend: Backend<R>, config: &Config) -> Self {
        Self {
            bridge: Bridge::new(backend, config),
        }
    }

    /// Generic method-channel entry: route by name, answer exactly once.
    pub async fn invoke(&self, call: MethodCall) -> MethodResponse {
        self.bridge.dispatch(&call).into_response().await
    }

    pub fn get_intent_action(&self) -> Option<String> {
        self.bridge.intent_action()
    }

    pub fn set_result(&self, path: Option<String>, paths: Option<Vec<String>>) -> Result<()> {
        self.bridge.set_result(path, paths)
    }

    pub fn remove_file(&self, path: Option<String>) -> Result<bool> {
        let path = path.ok_or(Error::MissingPath)?;
        Ok(self.bridge.remove_file(&path))
    }

    /// Resolves with the picked folder's absolute path, or `None` when the
    /// user cancelled or a newer pick replaced this one.
    pub async fn folder_picker(&self) -> Result<Option<String>> {
        let rx = self.bridge.folder_picker()?;
        Ok(rx.await.ok().flatten())
    }

    /// Diagnostic round trip; always answers null.
    pub fn native_method(&self) {
        let reply = self.bridge.dispatch(&MethodCall::new(NATIVE_METHOD));
        drop(reply);
    }

    pub fn handle_lifecycle(&self, event: LifecycleEvent) -> LifecycleResponse {
        self.bridge.handle_lifecycle(event)
    }
}
