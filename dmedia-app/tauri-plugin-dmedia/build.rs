const COMMANDS: &[&str] = &[
    "get_intent_action",
    "set_result",
    "remove_file",
    "folder_picker",
    "native_method",
    "invoke_method",
];

fn main() {
    // The Kotlin shim (org.altlimit.dmedia.DmediaPlugin) ships with the host
    // Android project, so no android_path() here.
    tauri_plugin::Builder::new(COMMANDS).build();
}
