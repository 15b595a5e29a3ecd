//! JNI entry for `org.altlimit.dmedia.NativeBridge`.
//!
//! The Kotlin side calls `dispatchLifecycle(json)` from `onCreate`,
//! `onNewIntent`, `onActivityResult`, `onSaveInstanceState`,
//! `onRestoreInstanceState` and `onRequestPermissionsResult`, on the main
//! thread. Handling an event never calls back into the shim. Instead the
//! shim fills in `result.path` for a picked tree, and when the answer carries
//! `launchPicker` it opens the folder picker with that request code (a launch
//! failure is reported as a cancelled `activityResult`).

use std::ptr;

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use tracing::error;

use crate::lifecycle;

#[no_mangle]
pub extern "system" fn Java_org_altlimit_dmedia_NativeBridge_dispatchLifecycle(
    mut env: JNIEnv,
    _class: JClass,
    input: JString,
) -> jstring {
    let output = match env.get_string(&input) {
        Ok(s) => {
            let input: String = s.into();
            std::panic::catch_unwind(|| lifecycle::dispatch_json(&input)).unwrap_or_else(|_| {
                error!("Panic while handling lifecycle event");
                lifecycle::encode(&lifecycle::failure("panic"))
            })
        }
        Err(e) => {
            error!("Failed to read lifecycle event string: {}", e);
            lifecycle::encode(&lifecycle::failure("jni string error"))
        }
    };

    env.new_string(output)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}
