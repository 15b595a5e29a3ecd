use serde::{Deserialize, Serialize};

/// Plugin configuration, read from `plugins.dmedia` in the Tauri config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Appended to the package name to form the FileProvider authority.
    pub authority_suffix: String,
    /// Request code used for the folder picker and its permission request.
    pub picker_request_code: i32,
    /// Package holding the Kotlin shim classes.
    pub android_package: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            authority_suffix: ".provider".to_string(),
            picker_request_code: 1,
            android_package: "org.altlimit.dmedia".to_string(),
        }
    }
}

impl Config {
    pub fn provider_authority(&self, package_name: &str) -> String {
        format!("{}{}", package_name, self.authority_suffix)
    }
}
