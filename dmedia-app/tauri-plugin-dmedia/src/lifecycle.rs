//! Process-wide entry for activity lifecycle events.
//!
//! The host activity calls in from Java without a handle to the app, and on a
//! cold start `onCreate` runs before the plugin's setup has registered a
//! handler. Events that arrive that early are queued and replayed, in order,
//! when the handler is registered. Events and answers cross the boundary as
//! JSON.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, warn};

use crate::models::{LifecycleEvent, LifecycleResponse};

type Handler = Box<dyn Fn(LifecycleEvent) -> LifecycleResponse + Send + Sync>;

/// Events kept before registration; the oldest is dropped beyond this.
const MAX_EARLY_EVENTS: usize = 16;

static REGISTRY: LifecycleRegistry = LifecycleRegistry::new();

struct Inner {
    handler: Option<Handler>,
    early: VecDeque<LifecycleEvent>,
}

pub struct LifecycleRegistry {
    inner: Mutex<Inner>,
}

impl Default for LifecycleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleRegistry {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                handler: None,
                early: VecDeque::new(),
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install the handler and replay queued events through it. Only the
    /// first registration wins.
    ///
    /// The registry stays locked during the replay so that an event arriving
    /// meanwhile is handled after the queued ones.
    pub fn register<F>(&self, handler: F) -> bool
    where
        F: Fn(LifecycleEvent) -> LifecycleResponse + Send + Sync + 'static,
    {
        let mut inner = self.inner();
        if inner.handler.is_some() {
            warn!("Lifecycle handler already registered, ignoring");
            return false;
        }

        let early = std::mem::take(&mut inner.early);
        if !early.is_empty() {
            debug!("Replaying {} early lifecycle event(s)", early.len());
        }
        for event in early {
            let response = handler(event);
            if let Some(e) = response.error {
                warn!("Replayed lifecycle event failed: {}", e);
            }
        }
        inner.handler = Some(Box::new(handler));
        true
    }

    pub fn dispatch(&self, event: LifecycleEvent) -> LifecycleResponse {
        let mut inner = self.inner();
        if let Some(handler) = &inner.handler {
            return handler(event);
        }

        match event {
            // Nothing has been restored yet, so there is nothing to save.
            LifecycleEvent::SaveInstanceState => LifecycleResponse::default(),
            event => {
                debug!("Queueing lifecycle event until plugin setup: {:?}", event);
                if inner.early.len() == MAX_EARLY_EVENTS {
                    warn!("Too many lifecycle events before plugin setup, dropping the oldest");
                    inner.early.pop_front();
                }
                inner.early.push_back(event);
                LifecycleResponse {
                    handled: true,
                    ..LifecycleResponse::default()
                }
            }
        }
    }

    /// Decode one JSON event, dispatch it and encode the answer.
    pub fn dispatch_json(&self, input: &str) -> String {
        let response = match serde_json::from_str::<LifecycleEvent>(input) {
            Ok(event) => self.dispatch(event),
            Err(e) => {
                warn!("Malformed lifecycle event: {}", e);
                failure(format!("invalid lifecycle event: {}", e))
            }
        };
        encode(&response)
    }
}

/// Install the process-wide lifecycle handler.
pub fn register<F>(handler: F) -> bool
where
    F: Fn(LifecycleEvent) -> LifecycleResponse + Send + Sync + 'static,
{
    REGISTRY.register(handler)
}

/// Entry used by the host activity.
pub fn dispatch_json(input: &str) -> String {
    REGISTRY.dispatch_json(input)
}

pub(crate) fn failure(message: impl Into<String>) -> LifecycleResponse {
    LifecycleResponse {
        error: Some(message.into()),
        ..LifecycleResponse::default()
    }
}

pub(crate) fn encode(response: &LifecycleResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!("Failed to encode lifecycle response: {}", e);
        r#"{"handled":false,"savedState":null,"launchPicker":null,"error":"encode failed"}"#
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentInspector;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn recording(registry: &LifecycleRegistry) -> Arc<Mutex<Vec<LifecycleEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        assert!(registry.register(move |event| {
            sink.lock().unwrap().push(event);
            LifecycleResponse {
                handled: true,
                ..LifecycleResponse::default()
            }
        }));
        seen
    }

    #[test]
    fn test_dispatch_decodes_event_and_encodes_response() {
        let registry = LifecycleRegistry::new();
        registry.register(|_| LifecycleResponse {
            handled: true,
            saved_state: Some(serde_json::Map::new()),
            ..LifecycleResponse::default()
        });

        let out = registry.dispatch_json(r#"{"event":"saveInstanceState"}"#);
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            json!({"handled": true, "savedState": {}, "launchPicker": null, "error": null})
        );
    }

    #[test]
    fn test_activity_result_reaches_handler() {
        let registry = LifecycleRegistry::new();
        let seen = recording(&registry);

        registry.dispatch_json(
            &json!({
                "event": "activityResult",
                "result": {"requestCode": 1, "resultCode": -1, "data": "content://tree/x"}
            })
            .to_string(),
        );

        match seen.lock().unwrap().as_slice() {
            [LifecycleEvent::ActivityResult { result }] => {
                assert_eq!(result.request_code, 1);
                assert_eq!(result.data.as_deref(), Some("content://tree/x"));
                assert_eq!(result.path, None);
            }
            other => panic!("unexpected events: {:?}", other),
        };
    }

    #[test]
    fn test_malformed_event_is_an_error_response() {
        let registry = LifecycleRegistry::new();
        let out = registry.dispatch_json(r#"{"event":"explode"}"#);
        let response: LifecycleResponse = serde_json::from_str(&out).unwrap();
        assert!(!response.handled);
        assert!(response.error.unwrap().starts_with("invalid lifecycle event"));
    }

    #[test]
    fn test_launch_intent_before_setup_is_replayed() {
        let registry = LifecycleRegistry::new();
        let out = registry.dispatch_json(
            &json!({
                "event": "create",
                "intent": {
                    "action": "android.intent.action.GET_CONTENT",
                    "allowMultiple": true,
                    "mimeType": "image/*"
                },
                "savedState": null
            })
            .to_string(),
        );
        let response: LifecycleResponse = serde_json::from_str(&out).unwrap();
        assert!(response.handled);
        assert_eq!(response.error, None);

        let inspector = Arc::new(Mutex::new(IntentInspector::new()));
        let target = Arc::clone(&inspector);
        registry.register(move |event| {
            if let LifecycleEvent::Create { intent, .. } = event {
                target.lock().unwrap().update("onCreate", &intent);
            }
            LifecycleResponse::default()
        });

        assert_eq!(
            inspector.lock().unwrap().intent_action().as_deref(),
            Some("android.intent.action.GET_CONTENT|MULTIPLE|image/*")
        );
    }

    #[test]
    fn test_early_events_replay_in_order_then_dispatch_directly() {
        let registry = LifecycleRegistry::new();
        let intent = crate::models::LaunchIntent::default();
        registry.dispatch(LifecycleEvent::Create {
            intent: intent.clone(),
            saved_state: None,
        });
        registry.dispatch(LifecycleEvent::NewIntent { intent });
        registry.dispatch(LifecycleEvent::SaveInstanceState);

        let seen = recording(&registry);
        registry.dispatch(LifecycleEvent::RestoreInstanceState { saved_state: None });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[0], LifecycleEvent::Create { .. }));
        assert!(matches!(seen[1], LifecycleEvent::NewIntent { .. }));
        assert!(matches!(seen[2], LifecycleEvent::RestoreInstanceState { .. }));
    }

    #[test]
    fn test_early_queue_is_bounded() {
        let registry = LifecycleRegistry::new();
        for _ in 0..MAX_EARLY_EVENTS + 4 {
            registry.dispatch(LifecycleEvent::NewIntent {
                intent: Default::default(),
            });
        }
        let seen = recording(&registry);
        assert_eq!(seen.lock().unwrap().len(), MAX_EARLY_EVENTS);
    }

    #[test]
    fn test_second_registration_is_ignored() {
        let registry = LifecycleRegistry::new();
        recording(&registry);
        assert!(!registry.register(|_| LifecycleResponse::default()));
    }
}
