//! Storage Access Framework gateway state.
//!
//! [`StorageHelper`] keeps track of the folder-picker request that is in
//! flight so that an activity result arriving after a configuration change,
//! or after the activity was torn down and restored, is matched to the right
//! request. Its event handlers only update state; the few platform calls
//! (launch, permission request, delete) go through a [`DocumentProvider`]
//! and are made by the caller outside the bridge lock.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{ActivityResult, Bundle, RESULT_OK};
use crate::platform::DocumentProvider;
use crate::Result;

/// Bundle key the helper state is saved under.
pub const SNAPSHOT_KEY: &str = "dmedia.storage_helper";

/// `PackageManager.PERMISSION_GRANTED`.
pub const PERMISSION_GRANTED: i32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSelection {
    /// Absolute path of the chosen folder.
    Selected(String),
    Cancelled,
}

impl FolderSelection {
    pub fn into_path(self) -> Option<String> {
        match self {
            FolderSelection::Selected(path) => Some(path),
            FolderSelection::Cancelled => None,
        }
    }
}

/// A finished folder-picker request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOutcome {
    pub request_id: u64,
    pub selection: FolderSelection,
}

/// What a permission result means for the request waiting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionStep {
    /// Granted: the host launches the picker with this request code.
    LaunchPicker(i32),
    /// Denied: the request is over.
    Denied(PickerOutcome),
}

/// Saved-state image of a [`StorageHelper`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleSnapshot {
    pub request_code: i32,
    pub in_flight: Option<u64>,
    pub awaiting_permission: bool,
    pub next_request_id: u64,
}

#[derive(Debug)]
pub struct StorageHelper {
    request_code: i32,
    in_flight: Option<u64>,
    awaiting_permission: bool,
    next_request_id: u64,
}

impl StorageHelper {
    pub fn new(request_code: i32) -> Self {
        Self {
            request_code,
            in_flight: None,
            awaiting_permission: false,
            next_request_id: 1,
        }
    }

    pub fn request_code(&self) -> i32 {
        self.request_code
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Delete the document at `path`. Unresolvable paths yield `false`.
    pub fn remove_file<D: DocumentProvider>(provider: &D, path: &str) -> bool {
        let document = match provider.find_document(path, true) {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!("removeFile: no document at {}", path);
                return false;
            }
            Err(e) => {
                warn!("removeFile: could not resolve {}: {}", path, e);
                return false;
            }
        };

        match provider.delete_document(&document) {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!("removeFile: delete of {} failed: {}", document.uri, e);
                false
            }
        }
    }

    /// Put a new folder-picker request in flight and return its id.
    ///
    /// Without the storage permission the request waits for
    /// [`Self::on_request_permissions_result`] before the picker is shown.
    pub fn begin_request(&mut self, permission_granted: bool) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        self.in_flight = Some(request_id);
        self.awaiting_permission = !permission_granted;
        debug!(
            "Folder picker request {} in flight (awaiting permission: {})",
            request_id, self.awaiting_permission
        );
        request_id
    }

    /// Platform side of [`Self::begin_request`]: show the picker, or ask for
    /// the storage permission first.
    pub fn launch<D: DocumentProvider>(
        provider: &D,
        request_code: i32,
        permission_granted: bool,
    ) -> Result<()> {
        if permission_granted {
            provider.launch_folder_picker(request_code)
        } else {
            info!("Storage permission missing, requesting it before the folder picker");
            provider.request_storage_permission(request_code)
        }
    }

    /// Drop `request_id` if it is still the one in flight.
    pub fn abandon(&mut self, request_id: u64) {
        if self.in_flight == Some(request_id) {
            self.in_flight = None;
            self.awaiting_permission = false;
        }
    }

    /// Translate an activity result into a picker outcome, if it is ours.
    pub fn on_activity_result(&mut self, result: &ActivityResult) -> Option<PickerOutcome> {
        if result.request_code != self.request_code {
            return None;
        }
        let Some(request_id) = self.in_flight.take() else {
            debug!(
                "Activity result for code {} with no picker in flight",
                result.request_code
            );
            return None;
        };
        self.awaiting_permission = false;

        let selection = match (result.result_code, &result.data, &result.path) {
            (RESULT_OK, _, Some(path)) => FolderSelection::Selected(path.clone()),
            (RESULT_OK, Some(tree_uri), None) => {
                warn!("Picked folder {} could not be resolved to a path", tree_uri);
                FolderSelection::Cancelled
            }
            _ => FolderSelection::Cancelled,
        };

        Some(PickerOutcome {
            request_id,
            selection,
        })
    }

    /// Continue or abandon a picker request that was waiting on permission.
    pub fn on_request_permissions_result(
        &mut self,
        request_code: i32,
        grant_results: &[i32],
    ) -> Option<PermissionStep> {
        if request_code != self.request_code || !self.awaiting_permission {
            return None;
        }
        self.awaiting_permission = false;

        let granted =
            !grant_results.is_empty() && grant_results.iter().all(|g| *g == PERMISSION_GRANTED);
        if granted {
            return Some(PermissionStep::LaunchPicker(self.request_code));
        }

        info!("Storage permission denied");
        self.in_flight.take().map(|request_id| {
            PermissionStep::Denied(PickerOutcome {
                request_id,
                selection: FolderSelection::Cancelled,
            })
        })
    }

    pub fn snapshot(&self) -> LifecycleSnapshot {
        LifecycleSnapshot {
            request_code: self.request_code,
            in_flight: self.in_flight,
            awaiting_permission: self.awaiting_permission,
            next_request_id: self.next_request_id,
        }
    }

    pub fn save_instance_state(&self, bundle: &mut Bundle) {
        match serde_json::to_value(self.snapshot()) {
            Ok(value) => {
                bundle.insert(SNAPSHOT_KEY.to_string(), value);
            }
            Err(e) => warn!("Failed to save storage helper state: {}", e),
        }
    }

    /// Restore from a saved bundle. Missing or unreadable state resets the
    /// helper to idle instead of failing.
    pub fn restore_instance_state(&mut self, bundle: Option<&Bundle>) {
        let snapshot = bundle
            .and_then(|b| b.get(SNAPSHOT_KEY))
            .and_then(|v| match serde_json::from_value::<LifecycleSnapshot>(v.clone()) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!("Discarding unreadable storage helper state: {}", e);
                    None
                }
            });

        match snapshot {
            Some(snapshot) => {
                debug!("Restored storage helper state: {:?}", snapshot);
                self.request_code = snapshot.request_code;
                self.in_flight = snapshot.in_flight;
                self.awaiting_permission = snapshot.awaiting_permission;
                // Ids never go backwards within a process.
                self.next_request_id = self.next_request_id.max(snapshot.next_request_id);
            }
            None => {
                self.in_flight = None;
                self.awaiting_permission = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RESULT_CANCELED;
    use crate::testing::{FakePlatform, PlatformCall};

    fn picked(code: i32, path: &str) -> ActivityResult {
        ActivityResult {
            request_code: code,
            result_code: RESULT_OK,
            data: Some("content://tree/primary%3A".to_string()),
            path: Some(path.to_string()),
        }
    }

    #[test]
    fn test_remove_missing_file_returns_false() {
        let platform = FakePlatform::new();
        assert!(!StorageHelper::remove_file(&platform, "/storage/emulated/0/missing.jpg"));
    }

    #[test]
    fn test_remove_existing_file() {
        let platform = FakePlatform::new().with_file("/storage/emulated/0/DCIM/a.jpg");
        assert!(StorageHelper::remove_file(&platform, "/storage/emulated/0/DCIM/a.jpg"));
        assert!(!platform.has_file("/storage/emulated/0/DCIM/a.jpg"));
        assert!(!StorageHelper::remove_file(&platform, "/storage/emulated/0/DCIM/a.jpg"));
    }

    #[test]
    fn test_launch_asks_for_permission_first() {
        let platform = FakePlatform::new();
        StorageHelper::launch(&platform, 1, true).unwrap();
        StorageHelper::launch(&platform, 1, false).unwrap();
        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::LaunchFolderPicker(1),
                PlatformCall::RequestStoragePermission(1)
            ]
        );
    }

    #[test]
    fn test_picker_outcome_carries_resolved_path() {
        let mut helper = StorageHelper::new(1);
        let id = helper.begin_request(true);

        let outcome = helper
            .on_activity_result(&picked(1, "/storage/emulated/0/DCIM"))
            .unwrap();
        assert_eq!(outcome.request_id, id);
        assert_eq!(
            outcome.selection,
            FolderSelection::Selected("/storage/emulated/0/DCIM".into())
        );
        assert_eq!(helper.in_flight(), None);
    }

    #[test]
    fn test_unresolved_tree_is_cancelled() {
        let mut helper = StorageHelper::new(1);
        helper.begin_request(true);

        let result = ActivityResult {
            path: None,
            ..picked(1, "")
        };
        let outcome = helper.on_activity_result(&result).unwrap();
        assert_eq!(outcome.selection, FolderSelection::Cancelled);
    }

    #[test]
    fn test_foreign_and_cancelled_results() {
        let mut helper = StorageHelper::new(1);
        helper.begin_request(true);

        assert_eq!(helper.on_activity_result(&picked(99, "/x")), None);

        let cancelled = ActivityResult {
            request_code: 1,
            result_code: RESULT_CANCELED,
            data: None,
            path: None,
        };
        let outcome = helper.on_activity_result(&cancelled).unwrap();
        assert_eq!(outcome.selection, FolderSelection::Cancelled);

        // Nothing in flight any more.
        assert_eq!(helper.on_activity_result(&cancelled), None);
    }

    #[test]
    fn test_permission_grant_asks_host_to_launch() {
        let mut helper = StorageHelper::new(3);
        let id = helper.begin_request(false);

        assert_eq!(
            helper.on_request_permissions_result(3, &[PERMISSION_GRANTED]),
            Some(PermissionStep::LaunchPicker(3))
        );
        assert_eq!(helper.in_flight(), Some(id));

        // Only the first permission result counts.
        assert_eq!(helper.on_request_permissions_result(3, &[PERMISSION_GRANTED]), None);
    }

    #[test]
    fn test_permission_denied_cancels_request() {
        let mut helper = StorageHelper::new(1);
        let id = helper.begin_request(false);

        let step = helper.on_request_permissions_result(1, &[-1]).unwrap();
        assert_eq!(
            step,
            PermissionStep::Denied(PickerOutcome {
                request_id: id,
                selection: FolderSelection::Cancelled,
            })
        );
        assert_eq!(helper.in_flight(), None);
    }

    #[test]
    fn test_abandon_only_clears_matching_request() {
        let mut helper = StorageHelper::new(1);
        let id = helper.begin_request(true);
        helper.abandon(id + 1);
        assert_eq!(helper.in_flight(), Some(id));
        helper.abandon(id);
        assert_eq!(helper.in_flight(), None);
    }

    #[test]
    fn test_snapshot_survives_recreation() {
        let mut helper = StorageHelper::new(1);
        let id = helper.begin_request(true);

        let mut bundle = Bundle::new();
        helper.save_instance_state(&mut bundle);

        let mut restored = StorageHelper::new(1);
        restored.restore_instance_state(Some(&bundle));
        assert_eq!(restored.in_flight(), Some(id));

        let outcome = restored
            .on_activity_result(&picked(1, "/storage/emulated/0/Music"))
            .unwrap();
        assert_eq!(outcome.request_id, id);

        // The next request does not reuse the id.
        assert!(restored.begin_request(true) > id);
    }

    #[test]
    fn test_restore_without_state_resets() {
        let mut helper = StorageHelper::new(1);
        helper.begin_request(true);

        helper.restore_instance_state(None);
        assert_eq!(helper.in_flight(), None);

        let mut garbage = Bundle::new();
        garbage.insert(SNAPSHOT_KEY.into(), serde_json::json!("not a snapshot"));
        helper.restore_instance_state(Some(&garbage));
        assert_eq!(helper.in_flight(), None);
    }
}
