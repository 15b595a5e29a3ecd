//! Non-Android backend.
//!
//! Documents are plain files, the folder chooser is the native dialog from
//! `tauri-plugin-dialog` (the host must register that plugin), and the
//! activity result is emitted to the frontend as an event since there is no
//! calling activity to return to.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tauri::{plugin::PluginApi, AppHandle, Emitter, Runtime, Url};
use tracing::warn;

use crate::error::Error;
use crate::models::ResultIntent;
use crate::platform::{DocumentHandle, DocumentProvider, ResultHost};

/// Event carrying what would have been the activity result.
pub const ACTIVITY_RESULT_EVENT: &str = "dmedia://activity-result";
/// Event asking the frontend to close the result flow.
pub const FINISH_EVENT: &str = "dmedia://finish";

pub fn init<R: Runtime, C: DeserializeOwned>(
    app: &AppHandle<R>,
    _api: PluginApi<R, C>,
) -> crate::Result<DesktopBackend<R>> {
    Ok(DesktopBackend(app.clone()))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivityResultPayload {
    result_code: i32,
    intent: Option<ResultIntent>,
}

pub struct DesktopBackend<R: Runtime>(AppHandle<R>);

/// Show the folder dialog. Its answer comes back through the same lifecycle
/// path an Android activity result takes.
#[cfg(desktop)]
fn pick_folder<R: Runtime>(app: &AppHandle<R>, request_code: i32) {
    use tauri_plugin_dialog::DialogExt;
    use tracing::debug;

    use crate::models::{ActivityResult, LifecycleEvent, RESULT_CANCELED, RESULT_OK};
    use crate::DmediaExt;

    let handle = app.clone();
    app.dialog().file().pick_folder(move |folder| {
        let data = folder
            .and_then(|f| f.into_path().ok())
            .map(|p| p.to_string_lossy().into_owned());
        let result = ActivityResult {
            request_code,
            result_code: if data.is_some() { RESULT_OK } else { RESULT_CANCELED },
            path: data.clone(),
            data,
        };
        debug!("Folder dialog closed: {:?}", result);
        handle
            .dmedia()
            .handle_lifecycle(LifecycleEvent::ActivityResult { result });
    });
}

impl<R: Runtime> DocumentProvider for DesktopBackend<R> {
    fn has_storage_permission(&self) -> crate::Result<bool> {
        Ok(true)
    }

    fn request_storage_permission(&self, _request_code: i32) -> crate::Result<()> {
        Ok(())
    }

    fn launch_folder_picker(&self, request_code: i32) -> crate::Result<()> {
        #[cfg(desktop)]
        {
            pick_folder(&self.0, request_code);
            Ok(())
        }
        #[cfg(not(desktop))]
        {
            Err(Error::Picker(format!(
                "no folder chooser on this platform (request {})",
                request_code
            )))
        }
    }

    fn find_document(&self, path: &str, _requires_write: bool) -> crate::Result<Option<DocumentHandle>> {
        Ok(Path::new(path).is_file().then(|| DocumentHandle {
            uri: path.to_string(),
        }))
    }

    fn delete_document(&self, document: &DocumentHandle) -> crate::Result<bool> {
        match std::fs::remove_file(&document.uri) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl<R: Runtime> ResultHost for DesktopBackend<R> {
    fn package_name(&self) -> crate::Result<String> {
        Ok(self.0.config().identifier.clone())
    }

    fn uri_for_file(&self, _authority: &str, path: &str) -> crate::Result<String> {
        let canonical = std::fs::canonicalize(path)
            .map_err(|e| Error::Resolution(format!("{}: {}", path, e)))?;
        Url::from_file_path(&canonical)
            .map(|url| url.to_string())
            .map_err(|_| Error::Resolution(format!("not an absolute path: {}", canonical.display())))
    }

    fn set_result(&self, result_code: i32, intent: Option<ResultIntent>) -> crate::Result<()> {
        self.0
            .emit(
                ACTIVITY_RESULT_EVENT,
                ActivityResultPayload {
                    result_code,
                    intent,
                },
            )
            .map_err(|e| Error::Platform(e.to_string()))
    }

    fn finish(&self) -> crate::Result<()> {
        if let Err(e) = self.0.emit(FINISH_EVENT, ()) {
            warn!("Failed to emit {}: {}", FINISH_EVENT, e);
        }
        Ok(())
    }
}
