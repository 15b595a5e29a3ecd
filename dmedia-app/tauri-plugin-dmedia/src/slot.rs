//! Single pending-result holder for asynchronous bridge calls.

use tokio::sync::oneshot;
use tracing::debug;

/// Completes one waiting caller exactly once.
#[derive(Debug)]
pub struct Completer<T> {
    tx: oneshot::Sender<Option<T>>,
}

/// The waiting side of a [`Completer`].
pub type PendingReply<T> = oneshot::Receiver<Option<T>>;

impl<T> Completer<T> {
    pub fn channel() -> (Self, PendingReply<T>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Consumes the completer. A caller that stopped waiting is ignored.
    pub fn complete(self, value: Option<T>) {
        if self.tx.send(value).is_err() {
            debug!("Pending caller went away before completion");
        }
    }
}

#[derive(Debug)]
struct Pending<T> {
    request_id: u64,
    completer: Completer<T>,
}

/// Holds at most one pending caller.
///
/// Installing a new caller resolves the previous one with `None` first, so
/// no caller is ever dropped silently and two callers never wait at once.
#[derive(Debug)]
pub struct ResultSlot<T> {
    pending: Option<Pending<T>>,
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> ResultSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, request_id: u64, completer: Completer<T>) {
        if let Some(old) = self.pending.take() {
            debug!(
                "Request {} replaced by {}, completing it with null",
                old.request_id, request_id
            );
            old.completer.complete(None);
        }
        self.pending = Some(Pending {
            request_id,
            completer,
        });
    }

    /// Complete the held caller if it belongs to `request_id`.
    ///
    /// Returns false when nothing matching was held; the value is dropped.
    pub fn complete(&mut self, request_id: u64, value: Option<T>) -> bool {
        match self.pending.take() {
            Some(p) if p.request_id == request_id => {
                p.completer.complete(value);
                true
            }
            other => {
                self.pending = other;
                debug!("No caller waiting for request {}", request_id);
                false
            }
        }
    }

    /// Complete whatever caller is held, regardless of request.
    pub fn complete_any(&mut self, value: Option<T>) -> bool {
        match self.pending.take() {
            Some(p) => {
                p.completer.complete(value);
                true
            }
            None => false,
        }
    }

    pub fn pending_request(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.request_id)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
