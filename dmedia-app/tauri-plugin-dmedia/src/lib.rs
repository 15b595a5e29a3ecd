use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};
use tracing::info;

pub use models::*;

#[cfg(not(target_os = "android"))]
mod desktop;
#[cfg(target_os = "android")]
mod mobile;
#[cfg(target_os = "android")]
mod android;

mod bridge;
mod commands;
mod config;
mod error;
mod intent;
pub mod lifecycle;
mod models;
mod platform;
mod publisher;
mod slot;
mod state;
mod storage;
#[cfg(test)]
mod testing;

pub use bridge::{Bridge, Reply};
pub use config::Config;
pub use error::{Error, Result};
pub use intent::ActionDescriptor;
pub use platform::{DocumentHandle, DocumentProvider, Platform, ResultHost};
pub use slot::{Completer, PendingReply, ResultSlot};
pub use state::Dmedia;
pub use storage::{
    FolderSelection, LifecycleSnapshot, PermissionStep, PickerOutcome, StorageHelper, SNAPSHOT_KEY,
};

#[cfg(not(target_os = "android"))]
pub use desktop::{ACTIVITY_RESULT_EVENT, FINISH_EVENT};

#[cfg(not(target_os = "android"))]
pub(crate) type Backend<R> = desktop::DesktopBackend<R>;
#[cfg(target_os = "android")]
pub(crate) type Backend<R> = mobile::MobileBackend<R>;

/// Extensions to [`tauri::App`], [`tauri::AppHandle`] and [`tauri::Window`] to access the dmedia APIs.
pub trait DmediaExt<R: Runtime> {
    fn dmedia(&self) -> &Dmedia<R>;
}

impl<R: Runtime, T: Manager<R>> crate::DmediaExt<R> for T {
    fn dmedia(&self) -> &Dmedia<R> {
        self.state::<Dmedia<R>>().inner()
    }
}

/// Initializes the dmedia plugin.
///
/// - Reports the launch intent's action to the frontend
/// - Returns picked files to the calling app as readable content URIs
/// - Picks folders and deletes files through the Storage Access Framework
///
/// Outside Android the folder chooser is `tauri-plugin-dialog`, which the
/// host app must register as well.
pub fn init<R: Runtime>() -> TauriPlugin<R, Config> {
    Builder::<R, Config>::new("dmedia")
        .invoke_handler(tauri::generate_handler![
            commands::get_intent_action,
            commands::set_result,
            commands::remove_file,
            commands::folder_picker,
            commands::native_method,
            commands::invoke_method,
        ])
        .setup(|app, api| {
            let config = api.config().clone();
            #[cfg(target_os = "android")]
            let backend = mobile::init(app, api, &config)?;
            #[cfg(not(target_os = "android"))]
            let backend = desktop::init(app, api)?;
            app.manage(Dmedia::new(backend, &config));

            let handle = app.clone();
            lifecycle::register(move |event| handle.dmedia().handle_lifecycle(event));

            info!(
                "dmedia plugin ready (picker request code {})",
                config.picker_request_code
            );
            Ok(())
        })
        .build()
}
