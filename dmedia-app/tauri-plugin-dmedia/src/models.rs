//! Data types crossing the bridge, in both directions.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON image of an Android `Bundle` (saved instance state).
pub type Bundle = Map<String, Value>;

/// `Activity.RESULT_OK`.
pub const RESULT_OK: i32 = -1;
/// `Activity.RESULT_CANCELED`.
pub const RESULT_CANCELED: i32 = 0;
/// `Intent.FLAG_GRANT_READ_URI_PERMISSION`.
pub const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x0000_0001;

/// The parts of a (re)launch intent the bridge cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchIntent {
    pub action: Option<String>,
    /// `Intent.EXTRA_ALLOW_MULTIPLE`
    #[serde(default)]
    pub allow_multiple: bool,
    pub mime_type: Option<String>,
}

/// Outcome of an activity started for result, as delivered to `onActivityResult`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResult {
    pub request_code: i32,
    pub result_code: i32,
    /// `Intent.getData()` of the returned intent, if any.
    pub data: Option<String>,
    /// Absolute path of a picked folder. The host resolves it before the
    /// event is delivered so no platform call is needed while handling it.
    #[serde(default)]
    pub path: Option<String>,
}

/// Result intent handed back to the calling application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultIntent {
    /// Primary data URI; set only for a single-file result.
    pub data: Option<String>,
    /// Clip data items in input order; set only for a multi-file result.
    pub clip_items: Vec<String>,
    pub flags: i32,
}

/// One call arriving over the method channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.to_string(), value.into());
        self
    }

    /// Typed argument lookup. Absent, null and wrongly typed values all read as `None`.
    pub fn argument<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.arguments
            .get(key)
            .filter(|v| !v.is_null())
            .and_then(|v| T::deserialize(v).ok())
    }
}

/// Wire form of a finished call: exactly one of success, error or not-implemented.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success {
        value: Value,
    },
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(value: impl Into<Value>) -> Self {
        MethodResponse::Success {
            value: value.into(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        MethodResponse::Error {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<&crate::Error> for MethodResponse {
    fn from(err: &crate::Error) -> Self {
        MethodResponse::error(err.code(), err.to_string())
    }
}

/// Activity lifecycle events forwarded from the host activity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum LifecycleEvent {
    #[serde(rename_all = "camelCase")]
    Create {
        intent: LaunchIntent,
        saved_state: Option<Bundle>,
    },
    NewIntent {
        intent: LaunchIntent,
    },
    ActivityResult {
        result: ActivityResult,
    },
    SaveInstanceState,
    #[serde(rename_all = "camelCase")]
    RestoreInstanceState {
        saved_state: Option<Bundle>,
    },
    #[serde(rename_all = "camelCase")]
    RequestPermissionsResult {
        request_code: i32,
        permissions: Vec<String>,
        grant_results: Vec<i32>,
    },
}

/// Answer to a lifecycle event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleResponse {
    /// Whether the bridge consumed the event.
    pub handled: bool,
    /// State to put into the outgoing bundle (save events only).
    pub saved_state: Option<Bundle>,
    /// Request code the host must now launch the folder picker with.
    pub launch_picker: Option<i32>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetResultArgs {
    pub path: Option<String>,
    pub paths: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFileArgs {
    pub path: Option<String>,
}
