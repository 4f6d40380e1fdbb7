// Environment notification source ports
// Two source styles exist in the wild: a modern push source emitting raw
// typed events, and a legacy broadcast source delivering keyed payloads on
// one well-known topic.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::error::TetherError;
use crate::domain::event::{LastKnownState, RawTetherEvent};

/// Single well-known topic carrying legacy tether state broadcasts.
///
/// The broadcast is sticky on every known platform: subscribers receive the
/// most recent payload state transitions as they happen.
pub const TETHER_STATE_CHANGED_TOPIC: &str = "netshare.conn.TETHER_STATE_CHANGED";

/// Payload key: interfaces currently tethered (DHCPv4, forwarded/NATed).
pub const EXTRA_ACTIVE_TETHER: &str = "tetherArray";
/// Payload key: interfaces in local-only mode, legacy key name.
pub const EXTRA_ACTIVE_LOCAL_ONLY_LEGACY: &str = "localOnlyArray";
/// Payload key: interfaces in local-only mode, modern key name.
pub const EXTRA_ACTIVE_LOCAL_ONLY: &str = "activeLocalOnly";
/// Payload key: interfaces that failed to tether; per-interface codes come
/// from the error-code table.
pub const EXTRA_ERRORED_TETHER: &str = "erroredArray";

/// Opaque token for an installed push handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PushRegistration(pub u64);

/// Opaque token for an armed broadcast subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BroadcastRegistration(pub u64);

/// Receiver for raw typed events from the push source.
pub trait PushHandler: Send + Sync {
    fn handle(&self, event: RawTetherEvent);
}

/// Modern push-style notification source.
pub trait PushEventSource: Send + Sync {
    /// Install a demultiplexing handler; the source delivers raw typed
    /// events to it until uninstalled.
    fn install(&self, handler: Arc<dyn PushHandler>) -> Result<PushRegistration, TetherError>;

    /// Remove a previously installed handler.
    ///
    /// A source that is already torn down reports an error; callers treat
    /// a stale/disconnected source as successful removal.
    fn uninstall(&self, registration: PushRegistration) -> Result<(), TetherError>;

    /// Sticky snapshot of the source's current per-category state, used for
    /// replay-on-register.
    fn current_state(&self) -> LastKnownState;
}

/// Receiver for legacy broadcast payloads.
pub trait BroadcastHandler: Send + Sync {
    fn handle(&self, payload: &BroadcastPayload);
}

/// Legacy broadcast-style notification source scoped to one topic.
pub trait BroadcastSource: Send + Sync {
    fn subscribe(
        &self,
        topic: &str,
        handler: Arc<dyn BroadcastHandler>,
    ) -> Result<BroadcastRegistration, TetherError>;

    /// Disarm a subscription; tolerant of double-disarm.
    fn unsubscribe(&self, registration: BroadcastRegistration) -> Result<(), TetherError>;
}

/// String-keyed payload delivered with a legacy broadcast.
#[derive(Debug, Clone, Default)]
pub struct BroadcastPayload {
    values: BTreeMap<String, serde_json::Value>,
}

impl BroadcastPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string_list(
        mut self,
        key: &str,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let list: Vec<serde_json::Value> = values
            .into_iter()
            .map(|v| serde_json::Value::String(v.into()))
            .collect();
        self.values.insert(key.to_string(), list.into());
        self
    }

    /// String list stored under `key`, if present and well-formed.
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        let list = self.values.get(key)?.as_array()?;
        Some(
            list.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }

    /// Interfaces currently tethered.
    pub fn tethered_interfaces(&self) -> Option<Vec<String>> {
        self.string_list(EXTRA_ACTIVE_TETHER)
    }

    /// Interfaces in local-only mode; the key name changed between platform
    /// generations.
    pub fn local_only_interfaces(&self, modern: bool) -> Option<Vec<String>> {
        let key = if modern {
            EXTRA_ACTIVE_LOCAL_ONLY
        } else {
            EXTRA_ACTIVE_LOCAL_ONLY_LEGACY
        };
        self.string_list(key)
    }

    /// Interfaces that failed to tether.
    pub fn errored_interfaces(&self) -> Option<Vec<String>> {
        self.string_list(EXTRA_ERRORED_TETHER)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    /// In-memory push source: records installs, lets tests emit events and
    /// mutate the sticky snapshot.
    #[derive(Default)]
    pub struct FakePushSource {
        next_id: AtomicU64,
        handlers: Mutex<HashMap<u64, Arc<dyn PushHandler>>>,
        snapshot: Mutex<LastKnownState>,
        disconnected: AtomicBool,
        uninstall_count: AtomicU64,
    }

    impl FakePushSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_snapshot(&self, snapshot: LastKnownState) {
            *self.snapshot.lock().unwrap() = snapshot;
        }

        /// Deliver an event to every installed handler.
        pub fn emit(&self, event: RawTetherEvent) {
            let handlers: Vec<Arc<dyn PushHandler>> =
                self.handlers.lock().unwrap().values().cloned().collect();
            for handler in handlers {
                handler.handle(event.clone());
            }
        }

        /// Simulate the source being torn down underneath its clients.
        pub fn disconnect(&self) {
            self.disconnected.store(true, Ordering::SeqCst);
        }

        pub fn installed_count(&self) -> usize {
            self.handlers.lock().unwrap().len()
        }

        pub fn uninstall_count(&self) -> u64 {
            self.uninstall_count.load(Ordering::SeqCst)
        }
    }

    impl PushEventSource for FakePushSource {
        fn install(&self, handler: Arc<dyn PushHandler>) -> Result<PushRegistration, TetherError> {
            if self.disconnected.load(Ordering::SeqCst) {
                return Err(TetherError::io("push source disconnected"));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.handlers.lock().unwrap().insert(id, handler);
            Ok(PushRegistration(id))
        }

        fn uninstall(&self, registration: PushRegistration) -> Result<(), TetherError> {
            self.uninstall_count.fetch_add(1, Ordering::SeqCst);
            if self.disconnected.load(Ordering::SeqCst) {
                return Err(TetherError::io("push source disconnected"));
            }
            self.handlers.lock().unwrap().remove(&registration.0);
            Ok(())
        }

        fn current_state(&self) -> LastKnownState {
            self.snapshot.lock().unwrap().clone()
        }
    }

    /// In-memory broadcast source: records topics, lets tests deliver
    /// payloads, counts disarms.
    #[derive(Default)]
    pub struct FakeBroadcastSource {
        next_id: AtomicU64,
        subscriptions: Mutex<HashMap<u64, (String, Arc<dyn BroadcastHandler>)>>,
        disconnected: AtomicBool,
        unsubscribe_count: AtomicU64,
    }

    impl FakeBroadcastSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// Deliver a payload to every subscriber of `topic`.
        pub fn deliver(&self, topic: &str, payload: &BroadcastPayload) {
            let handlers: Vec<Arc<dyn BroadcastHandler>> = self
                .subscriptions
                .lock()
                .unwrap()
                .values()
                .filter(|(t, _)| t == topic)
                .map(|(_, h)| h.clone())
                .collect();
            for handler in handlers {
                handler.handle(payload);
            }
        }

        pub fn disconnect(&self) {
            self.disconnected.store(true, Ordering::SeqCst);
        }

        pub fn subscription_count(&self) -> usize {
            self.subscriptions.lock().unwrap().len()
        }

        pub fn unsubscribe_count(&self) -> u64 {
            self.unsubscribe_count.load(Ordering::SeqCst)
        }
    }

    impl BroadcastSource for FakeBroadcastSource {
        fn subscribe(
            &self,
            topic: &str,
            handler: Arc<dyn BroadcastHandler>,
        ) -> Result<BroadcastRegistration, TetherError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.subscriptions
                .lock()
                .unwrap()
                .insert(id, (topic.to_string(), handler));
            Ok(BroadcastRegistration(id))
        }

        fn unsubscribe(&self, registration: BroadcastRegistration) -> Result<(), TetherError> {
            self.unsubscribe_count.fetch_add(1, Ordering::SeqCst);
            if self.disconnected.load(Ordering::SeqCst) {
                return Err(TetherError::io("broadcast source disconnected"));
            }
            self.subscriptions.lock().unwrap().remove(&registration.0);
            Ok(())
        }
    }
}
