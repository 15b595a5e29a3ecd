//! Narrow platform surfaces the bridge is written against.
//!
//! Android implements these through the Kotlin shim (see `mobile.rs`),
//! desktop through the filesystem and the native dialog (see `desktop.rs`).
//! On Android every call blocks until the main thread answers, so the bridge
//! never calls in here while its state lock is held.

use serde::{Deserialize, Serialize};

use crate::models::ResultIntent;
use crate::Result;

/// Opaque reference to a document resolved through the document provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHandle {
    pub uri: String,
}

/// Document-provider side: folder chooser and deletion.
pub trait DocumentProvider {
    /// Whether the storage permission the folder chooser needs is already held.
    fn has_storage_permission(&self) -> Result<bool>;

    fn request_storage_permission(&self, request_code: i32) -> Result<()>;

    /// Start the native folder chooser. The outcome arrives later as an activity result.
    fn launch_folder_picker(&self, request_code: i32) -> Result<()>;

    /// Resolve a full path to a document, `None` if nothing is there.
    fn find_document(&self, path: &str, requires_write: bool) -> Result<Option<DocumentHandle>>;

    fn delete_document(&self, document: &DocumentHandle) -> Result<bool>;
}

/// Activity side: URI grants and the activity result.
pub trait ResultHost {
    fn package_name(&self) -> Result<String>;

    /// FileProvider URI for a local file under the given authority.
    fn uri_for_file(&self, authority: &str, path: &str) -> Result<String>;

    fn set_result(&self, result_code: i32, intent: Option<ResultIntent>) -> Result<()>;

    fn finish(&self) -> Result<()>;
}

/// Everything the bridge needs from its host platform.
pub trait Platform: DocumentProvider + ResultHost {}

impl<T: DocumentProvider + ResultHost> Platform for T {}
