//! Launch intent inspection.
//!
//! The application layer asks "why was I started?" through `getIntentAction`.
//! The answer is an [`ActionDescriptor`] rebuilt on every create and
//! new-intent event and kept in memory only.

use tracing::debug;

use crate::models::LaunchIntent;

const MULTIPLE_MARKER: &str = "MULTIPLE";
const SEPARATOR: char = '|';

/// Normalized view of a launch intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub action: Option<String>,
    pub multiple: bool,
    pub mime_type: Option<String>,
}

impl ActionDescriptor {
    pub fn from_intent(intent: &LaunchIntent) -> Self {
        Self {
            action: intent.action.clone(),
            multiple: intent.allow_multiple,
            mime_type: intent.mime_type.clone(),
        }
    }

    /// Boundary encoding `action[|MULTIPLE][|mime]`.
    ///
    /// Suffixes are still emitted without a base action, so consumers must
    /// accept a leading separator. Nothing at all encodes as `None`.
    pub fn encode(&self) -> Option<String> {
        if self.action.is_none() && !self.multiple && self.mime_type.is_none() {
            return None;
        }

        let mut encoded = self.action.clone().unwrap_or_default();
        if self.multiple {
            encoded.push(SEPARATOR);
            encoded.push_str(MULTIPLE_MARKER);
        }
        if let Some(mime) = &self.mime_type {
            encoded.push(SEPARATOR);
            encoded.push_str(mime);
        }
        Some(encoded)
    }
}

#[derive(Debug, Default)]
pub struct IntentInspector {
    current: Option<ActionDescriptor>,
}

impl IntentInspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the descriptor with one derived from the delivered intent.
    pub fn update(&mut self, source: &str, intent: &LaunchIntent) {
        let descriptor = ActionDescriptor::from_intent(intent);
        debug!(
            "{}: IntentAction {:?}",
            source,
            descriptor.encode().as_deref().unwrap_or("null")
        );
        self.current = Some(descriptor);
    }

    pub fn intent_action(&self) -> Option<String> {
        self.current.as_ref().and_then(ActionDescriptor::encode)
    }
}
