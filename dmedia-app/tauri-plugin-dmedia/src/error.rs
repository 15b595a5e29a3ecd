//! Error types for the dmedia bridge.
//!
//! Every variant maps to a stable bridge error code so the application layer
//! can branch on it without parsing messages.

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// `removeFile` was called without a usable `path` argument.
    #[error("path not provided")]
    MissingPath,

    /// A local path could not be turned into a grantable content URI.
    #[error("Error: {0}")]
    Resolution(String),

    /// The platform refused to show the folder chooser.
    #[error("Folder picker failed: {0}")]
    Picker(String),

    /// Any other failure reported by the platform layer.
    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Mobile plugin invocation error.
    #[cfg(target_os = "android")]
    #[error("Plugin invoke error: {0}")]
    PluginInvoke(String),
}

impl Error {
    /// Bridge-level error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingPath => "path error",
            Error::Resolution(_) => "failed",
            Error::Picker(_) => "picker failed",
            Error::Platform(_) | Error::Io(_) => "platform error",
            Error::InvalidArgument(_) | Error::Serialization(_) => "invalid argument",
            #[cfg(target_os = "android")]
            Error::PluginInvoke(_) => "plugin invoke error",
        }
    }
}

#[cfg(target_os = "android")]
impl From<tauri::plugin::mobile::PluginInvokeError> for Error {
    fn from(err: tauri::plugin::mobile::PluginInvokeError) -> Self {
        Error::PluginInvoke(err.to_string())
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Error", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
