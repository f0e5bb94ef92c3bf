//! The request correlator: identifiers and the pending-response table.
//!
//! Every outbound request gets a fresh message identifier and a slot
//! where its eventual response lands. Responses arrive on the read-loop
//! task while requests are issued from caller tasks, so the table sits
//! behind a lock; critical sections are short and never held across an
//! await point.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use obsremote_protocol::ResponseEnvelope;
use tokio::sync::oneshot;

/// A request's correlation token: an unsigned counter value, encoded as
/// a decimal string on the wire.
///
/// Identifiers start at 1, increase by one per request, and wrap to 0
/// after 4294967295. Uniqueness holds within one wrap window; a session
/// keeping over four billion requests outstanding could collide — an
/// accepted limitation, not a defect to patch silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(u32);

impl MessageId {
    /// Creates a `MessageId` from a raw counter value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying counter value.
    pub fn into_inner(self) -> u32 {
        self.0
    }
}

/// Displays as the wire encoding: plain decimal.
impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct CorrelatorState {
    counter: u32,
    pending: HashMap<u32, oneshot::Sender<ResponseEnvelope>>,
}

/// Owns the identifier counter and the pending-response table for one
/// session.
///
/// ## Delivery guarantees
///
/// - A given identifier's slot is completed at most once, ever.
/// - Unknown or duplicate identifiers are a silent no-op (they occur
///   legitimately after a reset).
/// - [`reset`](Self::reset) drops every pending slot without delivering
///   a response; the awaiting side observes its channel closing instead.
pub struct RequestCorrelator {
    inner: Mutex<CorrelatorState>,
}

impl RequestCorrelator {
    /// Creates an empty correlator. The first allocated identifier is 1.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CorrelatorState {
                counter: 0,
                pending: HashMap::new(),
            }),
        }
    }

    /// Allocates the next identifier and a receiver for its response.
    pub fn register(
        &self,
    ) -> (MessageId, oneshot::Receiver<ResponseEnvelope>) {
        let mut state = self.inner.lock().expect("correlator poisoned");
        state.counter = state.counter.wrapping_add(1);
        let id = state.counter;
        let (tx, rx) = oneshot::channel();
        state.pending.insert(id, tx);
        (MessageId(id), rx)
    }

    /// Delivers a response to its pending slot.
    ///
    /// Returns `false` when the identifier is unknown — garbled, already
    /// resolved, or discarded by a reset. Stale responses are expected
    /// traffic after a reconnect, so this is not an error path.
    pub fn resolve(&self, response: ResponseEnvelope) -> bool {
        let id: u32 = match response.message_id.parse() {
            Ok(id) => id,
            Err(_) => {
                tracing::trace!(
                    message_id = %response.message_id,
                    "response with non-numeric identifier"
                );
                return false;
            }
        };

        let sender = {
            let mut state =
                self.inner.lock().expect("correlator poisoned");
            state.pending.remove(&id)
        };
        match sender {
            // A dropped receiver means the caller gave up waiting;
            // delivery failure is theirs to ignore.
            Some(tx) => tx.send(response).is_ok(),
            None => false,
        }
    }

    /// Discards one pending slot without delivering a response.
    ///
    /// Used when the request never made it onto the wire (the send
    /// failed after registration), so no response can ever arrive.
    pub fn discard(&self, id: MessageId) {
        let mut state = self.inner.lock().expect("correlator poisoned");
        state.pending.remove(&id.into_inner());
    }

    /// Discards all pending slots and restarts the identifier sequence.
    ///
    /// Called when a connection goes away (the protocol's only
    /// cancellation mechanic) and when a new connection opens. Awaiting
    /// callers see their channel close; no response is delivered.
    pub fn reset(&self) {
        let mut state = self.inner.lock().expect("correlator poisoned");
        let dropped = state.pending.len();
        state.pending.clear();
        state.counter = 0;
        if dropped > 0 {
            tracing::debug!(dropped, "discarded pending requests");
        }
    }

    /// Number of requests currently awaiting a response.
    pub fn pending(&self) -> usize {
        self.inner.lock().expect("correlator poisoned").pending.len()
    }
}

impl Default for RequestCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
