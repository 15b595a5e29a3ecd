//! Tauri command handlers for the dmedia plugin.

use serde_json::{Map, Value};
use tauri::{command, AppHandle, Runtime};

use crate::models::*;
use crate::DmediaExt;
use crate::Result;

/// Encoded action of the intent that (re)launched the activity, e.g.
/// `android.intent.action.GET_CONTENT|MULTIPLE|image/*`.
#[command]
pub(crate) async fn get_intent_action<R: Runtime>(app: AppHandle<R>) -> Result<Option<String>> {
    Ok(app.dmedia().get_intent_action())
}

/// Hand files back to the calling app and finish the activity.
///
/// `paths` wins over `path` when it is non-empty.
#[command]
pub(crate) async fn set_result<R: Runtime>(app: AppHandle<R>, args: SetResultArgs) -> Result<()> {
    app.dmedia().set_result(args.path, args.paths)
}

#[command]
pub(crate) async fn remove_file<R: Runtime>(app: AppHandle<R>, args: RemoveFileArgs) -> Result<bool> {
    app.dmedia().remove_file(args.path)
}

/// Let the user pick a folder. Resolves with its absolute path, or null on
/// cancel.
#[command]
pub(crate) async fn folder_picker<R: Runtime>(app: AppHandle<R>) -> Result<Option<String>> {
    app.dmedia().folder_picker().await
}

#[command]
pub(crate) async fn native_method<R: Runtime>(app: AppHandle<R>) -> Result<()> {
    app.dmedia().native_method();
    Ok(())
}

/// Method-channel style entry: any method name, answered with a tagged
/// [`MethodResponse`] instead of a command error.
#[command]
pub(crate) async fn invoke_method<R: Runtime>(
    app: AppHandle<R>,
    method: String,
    arguments: Option<Map<String, Value>>,
) -> Result<MethodResponse> {
    let call = MethodCall {
        method,
        arguments: arguments.unwrap_or_default(),
    };
    Ok(app.dmedia().invoke(call).await)
}
