//! Android backend: every platform call goes to the Kotlin shim
//! (`DmediaPlugin`), which wraps FileProvider, DocumentFileCompat and the
//! hosting activity.
//!
//! `run_mobile_plugin` blocks until the shim answers on the main thread, so
//! nothing here may run from a lifecycle event. The shim therefore resolves a
//! picked tree URI to its absolute path before it sends `activityResult`, and
//! launches the picker itself when a lifecycle response carries
//! `launchPicker`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tauri::{
    plugin::{PluginApi, PluginHandle},
    AppHandle, Runtime,
};
use tracing::debug;

use crate::config::Config;
use crate::error::Error;
use crate::models::ResultIntent;
use crate::platform::{DocumentHandle, DocumentProvider, ResultHost};

const PLUGIN_CLASS: &str = "DmediaPlugin";

/// Register the Kotlin shim and wrap its handle.
pub fn init<R: Runtime, C: DeserializeOwned>(
    _app: &AppHandle<R>,
    api: PluginApi<R, C>,
    config: &Config,
) -> crate::Result<MobileBackend<R>> {
    let handle = api.register_android_plugin(&config.android_package, PLUGIN_CLASS)?;
    debug!(
        "Registered {}.{} android plugin",
        config.android_package, PLUGIN_CLASS
    );
    Ok(MobileBackend(handle))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UriForFileArgs<'a> {
    authority: &'a str,
    path: &'a str,
}

#[derive(Debug, Deserialize)]
struct UriResponse {
    uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageNameResponse {
    package_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetActivityResultArgs {
    result_code: i32,
    intent: Option<ResultIntent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestCodeArgs {
    request_code: i32,
}

#[derive(Debug, Deserialize)]
struct PermissionResponse {
    granted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindDocumentArgs<'a> {
    path: &'a str,
    requires_write_access: bool,
}

#[derive(Debug, Deserialize)]
struct FindDocumentResponse {
    document: Option<DocumentHandle>,
}

#[derive(Debug, Deserialize)]
struct DeleteDocumentResponse {
    deleted: bool,
}

/// Access to the Kotlin side of the bridge.
pub struct MobileBackend<R: Runtime>(PluginHandle<R>);

impl<R: Runtime> MobileBackend<R> {
    /// Call a shim method whose answer carries no data.
    ///
    /// Kotlin resolves with an empty JSObject, so deserialize to Value and discard it.
    fn run_unit<P: Serialize>(&self, method: &str, payload: P) -> crate::Result<()> {
        self.0
            .run_mobile_plugin::<serde_json::Value>(method, payload)
            .map(|_| ())
            .map_err(Into::into)
    }
}

impl<R: Runtime> DocumentProvider for MobileBackend<R> {
    fn has_storage_permission(&self) -> crate::Result<bool> {
        let response: PermissionResponse = self.0.run_mobile_plugin("hasStoragePermission", ())?;
        Ok(response.granted)
    }

    fn request_storage_permission(&self, request_code: i32) -> crate::Result<()> {
        self.run_unit("requestStoragePermission", RequestCodeArgs { request_code })
    }

    fn launch_folder_picker(&self, request_code: i32) -> crate::Result<()> {
        self.run_unit("openFolderPicker", RequestCodeArgs { request_code })
            .map_err(|e| Error::Picker(e.to_string()))
    }

    fn find_document(&self, path: &str, requires_write: bool) -> crate::Result<Option<DocumentHandle>> {
        let response: FindDocumentResponse = self.0.run_mobile_plugin(
            "findDocument",
            FindDocumentArgs {
                path,
                requires_write_access: requires_write,
            },
        )?;
        Ok(response.document)
    }

    fn delete_document(&self, document: &DocumentHandle) -> crate::Result<bool> {
        let response: DeleteDocumentResponse =
            self.0.run_mobile_plugin("deleteDocument", document)?;
        Ok(response.deleted)
    }
}

impl<R: Runtime> ResultHost for MobileBackend<R> {
    fn package_name(&self) -> crate::Result<String> {
        let response: PackageNameResponse = self.0.run_mobile_plugin("getPackageName", ())?;
        Ok(response.package_name)
    }

    fn uri_for_file(&self, authority: &str, path: &str) -> crate::Result<String> {
        // FileProvider throws IllegalArgumentException for paths outside its roots.
        let response: UriResponse = self
            .0
            .run_mobile_plugin("getUriForFile", UriForFileArgs { authority, path })
            .map_err(|e| Error::Resolution(e.to_string()))?;
        Ok(response.uri)
    }

    fn set_result(&self, result_code: i32, intent: Option<ResultIntent>) -> crate::Result<()> {
        self.run_unit(
            "setActivityResult",
            SetActivityResultArgs {
                result_code,
                intent,
            },
        )
    }

    fn finish(&self) -> crate::Result<()> {
        self.run_unit("finishActivity", ())
    }
}
