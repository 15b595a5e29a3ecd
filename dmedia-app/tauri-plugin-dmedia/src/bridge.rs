//! Method-call router between the application layer and the platform.
//!
//! [`Bridge`] owns every piece of bridge state: the launch-intent
//! descriptor, the storage helper and the single pending folder-picker
//! caller. Method calls and lifecycle events are the only ways in, and each
//! method call produces exactly one [`Reply`].
//!
//! State sits behind one lock that is never held across a platform call.
//! On Android those calls block until the main thread answers, and the main
//! thread is also where lifecycle events come from.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::intent::IntentInspector;
use crate::models::{
    ActivityResult, Bundle, LaunchIntent, LifecycleEvent, LifecycleResponse, MethodCall,
    MethodResponse,
};
use crate::platform::Platform;
use crate::publisher::ResultPublisher;
use crate::slot::{Completer, PendingReply, ResultSlot};
use crate::storage::{PermissionStep, StorageHelper};
use crate::{Error, Result};

pub const GET_INTENT_ACTION: &str = "getIntentAction";
pub const SET_RESULT: &str = "setResult";
pub const REMOVE_FILE: &str = "removeFile";
pub const FOLDER_PICKER: &str = "folderPicker";
pub const NATIVE_METHOD: &str = "nativeMethod";

/// Outcome of one dispatched call.
#[must_use]
#[derive(Debug)]
pub enum Reply {
    Success(Value),
    Error(Error),
    NotImplemented,
    /// Answered later, once the platform reports the folder selection.
    Pending(PendingReply<String>),
}

impl Reply {
    /// Wait for the final answer and encode it for the wire.
    pub async fn into_response(self) -> MethodResponse {
        match self {
            Reply::Success(value) => MethodResponse::success(value),
            Reply::Error(e) => MethodResponse::from(&e),
            Reply::NotImplemented => MethodResponse::NotImplemented,
            Reply::Pending(rx) => {
                // A completer dropped with the bridge answers null.
                let path = rx.await.ok().flatten();
                MethodResponse::success(path.map(Value::String).unwrap_or(Value::Null))
            }
        }
    }
}

struct BridgeState {
    inspector: IntentInspector,
    storage: StorageHelper,
    folder_slot: ResultSlot<String>,
}

impl BridgeState {
    /// Answer a waiting caller whose request is no longer the one in flight.
    /// Nothing would ever complete it otherwise.
    fn release_orphaned_caller(&mut self) {
        let pending = self.folder_slot.pending_request();
        if pending.is_some() && pending != self.storage.in_flight() {
            info!(
                "Folder picker request {:?} lost by lifecycle restore, completing it with null",
                pending
            );
            self.folder_slot.complete_any(None);
        }
    }
}

pub struct Bridge<P: Platform> {
    platform: P,
    publisher: ResultPublisher,
    state: Mutex<BridgeState>,
}

impl<P: Platform> Bridge<P> {
    pub fn new(platform: P, config: &Config) -> Self {
        Self {
            platform,
            publisher: ResultPublisher::new(config.authority_suffix.clone()),
            state: Mutex::new(BridgeState {
                inspector: IntentInspector::new(),
                storage: StorageHelper::new(config.picker_request_code),
                folder_slot: ResultSlot::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn intent_action(&self) -> Option<String> {
        self.state().inspector.intent_action()
    }

    pub fn has_pending_folder_pick(&self) -> bool {
        self.state().folder_slot.is_pending()
    }

    pub fn dispatch(&self, call: &MethodCall) -> Reply {
        debug!("Bridge call: {}", call.method);
        match call.method.as_str() {
            GET_INTENT_ACTION => Reply::Success(
                self.intent_action()
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            ),
            SET_RESULT => match self.set_result(call.argument("path"), call.argument("paths")) {
                Ok(()) => Reply::Success(Value::Null),
                Err(e) => Reply::Error(e),
            },
            REMOVE_FILE => match call.argument::<String>("path") {
                Some(path) => Reply::Success(Value::Bool(self.remove_file(&path))),
                None => Reply::Error(Error::MissingPath),
            },
            FOLDER_PICKER => match self.folder_picker() {
                Ok(rx) => Reply::Pending(rx),
                Err(e) => Reply::Error(e),
            },
            NATIVE_METHOD => {
                info!("nativeMethod called with {} argument(s)", call.arguments.len());
                Reply::Success(Value::Null)
            }
            other => {
                debug!("Method not implemented: {}", other);
                Reply::NotImplemented
            }
        }
    }

    pub fn set_result(&self, path: Option<String>, paths: Option<Vec<String>>) -> Result<()> {
        self.publisher
            .publish(&self.platform, path, paths)
            .map(|_| ())
    }

    pub fn remove_file(&self, path: &str) -> bool {
        StorageHelper::remove_file(&self.platform, path)
    }

    /// Start a folder pick. Any caller still waiting is answered with null
    /// before the new one starts waiting.
    pub fn folder_picker(&self) -> Result<PendingReply<String>> {
        if self.state().folder_slot.complete_any(None) {
            debug!("Previous folderPicker call completed with null");
        }

        let granted = self
            .platform
            .has_storage_permission()
            .map_err(picker_error)?;

        let (request_id, request_code, rx) = {
            let mut state = self.state();
            let request_id = state.storage.begin_request(granted);
            let (completer, rx) = Completer::channel();
            state.folder_slot.replace(request_id, completer);
            (request_id, state.storage.request_code(), rx)
        };

        if let Err(e) = StorageHelper::launch(&self.platform, request_code, granted) {
            warn!("Could not open folder picker: {}", e);
            let mut state = self.state();
            state.storage.abandon(request_id);
            state.folder_slot.complete(request_id, None);
            return Err(picker_error(e));
        }
        Ok(rx)
    }

    pub fn on_create(&self, intent: &LaunchIntent, saved_state: Option<&Bundle>) {
        let mut state = self.state();
        state.inspector.update("onCreate", intent);
        state.storage.restore_instance_state(saved_state);
        state.release_orphaned_caller();
    }

    pub fn on_new_intent(&self, intent: &LaunchIntent) {
        self.state().inspector.update("onNewIntent", intent);
    }

    /// Returns whether the result belonged to the folder picker.
    pub fn on_activity_result(&self, result: &ActivityResult) -> bool {
        let mut state = self.state();
        match state.storage.on_activity_result(result) {
            Some(outcome) => {
                let delivered = state
                    .folder_slot
                    .complete(outcome.request_id, outcome.selection.into_path());
                if !delivered {
                    info!(
                        "Folder selection for request {} arrived with no caller waiting",
                        outcome.request_id
                    );
                }
                true
            }
            None => false,
        }
    }

    /// A grant is answered with `launch_picker` set: the host shows the
    /// picker itself, right after this call returns.
    pub fn on_request_permissions_result(
        &self,
        request_code: i32,
        grant_results: &[i32],
    ) -> LifecycleResponse {
        let mut state = self.state();
        let handled = request_code == state.storage.request_code();
        let launch_picker = match state
            .storage
            .on_request_permissions_result(request_code, grant_results)
        {
            Some(PermissionStep::LaunchPicker(code)) => Some(code),
            Some(PermissionStep::Denied(outcome)) => {
                state
                    .folder_slot
                    .complete(outcome.request_id, outcome.selection.into_path());
                None
            }
            None => None,
        };
        LifecycleResponse {
            handled,
            launch_picker,
            ..LifecycleResponse::default()
        }
    }

    pub fn on_save_instance_state(&self) -> Bundle {
        let mut bundle = Bundle::new();
        self.state().storage.save_instance_state(&mut bundle);
        bundle
    }

    pub fn on_restore_instance_state(&self, saved_state: Option<&Bundle>) {
        let mut state = self.state();
        state.storage.restore_instance_state(saved_state);
        state.release_orphaned_caller();
    }

    /// Single entry for lifecycle events forwarded by the host activity.
    pub fn handle_lifecycle(&self, event: LifecycleEvent) -> LifecycleResponse {
        match event {
            LifecycleEvent::Create {
                intent,
                saved_state,
            } => {
                self.on_create(&intent, saved_state.as_ref());
                handled()
            }
            LifecycleEvent::NewIntent { intent } => {
                self.on_new_intent(&intent);
                handled()
            }
            LifecycleEvent::ActivityResult { result } => LifecycleResponse {
                handled: self.on_activity_result(&result),
                ..LifecycleResponse::default()
            },
            LifecycleEvent::SaveInstanceState => LifecycleResponse {
                handled: true,
                saved_state: Some(self.on_save_instance_state()),
                ..LifecycleResponse::default()
            },
            LifecycleEvent::RestoreInstanceState { saved_state } => {
                self.on_restore_instance_state(saved_state.as_ref());
                handled()
            }
            LifecycleEvent::RequestPermissionsResult {
                request_code,
                permissions,
                grant_results,
            } => {
                debug!("Permission result for {:?}", permissions);
                self.on_request_permissions_result(request_code, &grant_results)
            }
        }
    }
}

fn picker_error(e: Error) -> Error {
    match e {
        Error::Picker(_) => e,
        other => Error::Picker(other.to_string()),
    }
}

fn handled() -> LifecycleResponse {
    LifecycleResponse {
        handled: true,
        ..LifecycleResponse::default()
    }
}
