// Subscription multiplexer - maps external subscribers to adapted
// notification sources

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::application::adapter::{select_adapter, AdapterHandle};
use crate::domain::error::TetherError;
use crate::domain::event::{OffloadStatus, TetherClient, UpstreamNetwork};
use crate::domain::request::TargetKind;
use crate::port::{BroadcastSource, CapabilityResolver, PushEventSource};

/// Uniform notification contract delivered to subscribers.
///
/// Under a modern environment every method below can fire, and all cached
/// categories except `on_interface_patterns_changed` are replayed
/// synchronously during registration. Under a legacy environment only
/// `on_tethered_interfaces_changed` ever fires, with no replay.
pub trait TetheringEventCallback: Send + Sync {
    /// Tethering supported status changed. Replayed on registration.
    fn on_supported_changed(&self, _supported: bool) {}

    /// The set of supported tethering types changed; unknown platform codes
    /// have already been filtered out. Replayed on registration.
    fn on_supported_types_changed(&self, _types: Vec<TargetKind>) {}

    /// Tethering upstream changed; `None` means no upstream. Replayed on
    /// registration.
    fn on_upstream_changed(&self, _upstream: Option<UpstreamNetwork>) {}

    /// Tetherable interface-name patterns changed.
    ///
    /// Never fires as part of registration; only on a genuine subsequent
    /// change.
    fn on_interface_patterns_changed(&self, _patterns: Vec<String>) {}

    /// The list of interfaces available for tethering changed. Replayed on
    /// registration.
    fn on_tetherable_interfaces_changed(&self, _interfaces: Vec<String>) {}

    /// The list of currently tethered interfaces changed. Replayed on
    /// registration under the push adapter; the only category the legacy
    /// adapter can observe.
    fn on_tethered_interfaces_changed(&self, _interfaces: Vec<String>) {}

    /// An error occurred configuring tethering on an interface. Replayed on
    /// registration when the latest status for the interface is an error.
    fn on_interface_error(&self, _iface: &str, _code: i32) {}

    /// The best-effort set of tethered clients changed. Replayed on
    /// registration.
    fn on_clients_changed(&self, _clients: Vec<TetherClient>) {}

    /// Hardware offload status changed. Replayed on registration.
    fn on_offload_status_changed(&self, _status: OffloadStatus) {}
}

/// Subscriber identity by reference: the same `Arc` is the same subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

impl SubscriberId {
    pub fn of(subscriber: &Arc<dyn TetheringEventCallback>) -> Self {
        Self(Arc::as_ptr(subscriber) as *const () as usize)
    }
}

/// Owns the subscriber → adapter-handle registry.
///
/// The registry lock is held only for map reads/writes, never across
/// adapter installation, disposal, or subscriber callback invocation, so an
/// adapter-originated callback may freely call back into
/// register/unregister.
pub struct SubscriptionMultiplexer {
    capabilities: Arc<dyn CapabilityResolver>,
    push_source: Arc<dyn PushEventSource>,
    broadcast_source: Arc<dyn BroadcastSource>,
    registry: Mutex<HashMap<SubscriberId, AdapterHandle>>,
}

impl SubscriptionMultiplexer {
    pub fn new(
        capabilities: Arc<dyn CapabilityResolver>,
        push_source: Arc<dyn PushEventSource>,
        broadcast_source: Arc<dyn BroadcastSource>,
    ) -> Self {
        Self {
            capabilities,
            push_source,
            broadcast_source,
            registry: Mutex::new(HashMap::new()),
        }
    }

    /// Register a subscriber for tethering notifications.
    ///
    /// Idempotent: a subscriber that already holds an adapter keeps it and
    /// no second adapter is installed. The adapter holds only a weak
    /// reference to the subscriber, so registration never extends the
    /// subscriber's lifetime.
    pub fn register(
        &self,
        subscriber: &Arc<dyn TetheringEventCallback>,
    ) -> Result<(), TetherError> {
        let id = SubscriberId::of(subscriber);
        if self.registry.lock().unwrap().contains_key(&id) {
            debug!(subscriber = ?id, "subscriber already registered");
            return Ok(());
        }

        // Install outside the lock: push installation replays cached state
        // into the subscriber synchronously.
        let handle = select_adapter(
            &self.capabilities,
            &self.push_source,
            &self.broadcast_source,
            subscriber,
        )?;

        let raced = match self.registry.lock().unwrap().entry(id) {
            Entry::Occupied(_) => Some(handle),
            Entry::Vacant(slot) => {
                slot.insert(handle);
                None
            }
        };
        // Lost a registration race for the same subscriber: drop our
        // adapter, the existing one stays authoritative.
        if let Some(handle) = raced {
            handle.dispose();
        }
        Ok(())
    }

    /// Remove a subscriber and dispose its adapter.
    ///
    /// Unregistering an unknown subscriber is a no-op. A notification
    /// source that is already torn down counts as successful removal.
    pub fn unregister(&self, subscriber: &Arc<dyn TetheringEventCallback>) {
        let id = SubscriberId::of(subscriber);
        let handle = self.registry.lock().unwrap().remove(&id);
        match handle {
            Some(handle) => handle.dispose(),
            None => debug!(subscriber = ?id, "unregister for unknown subscriber"),
        }
    }

    /// Number of active subscriptions.
    pub fn active_subscribers(&self) -> usize {
        self.registry.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::capability_resolver::mocks::FixedCapabilities;
    use crate::port::event_source::mocks::{FakeBroadcastSource, FakePushSource};

    #[derive(Default)]
    struct CountingCallback;

    impl TetheringEventCallback for CountingCallback {}

    fn multiplexer(
        modern: bool,
    ) -> (
        SubscriptionMultiplexer,
        Arc<FakePushSource>,
        Arc<FakeBroadcastSource>,
    ) {
        let push = Arc::new(FakePushSource::new());
        let broadcast = Arc::new(FakeBroadcastSource::new());
        let caps = if modern {
            FixedCapabilities::modern()
        } else {
            FixedCapabilities::legacy()
        };
        let mux = SubscriptionMultiplexer::new(Arc::new(caps), push.clone(), broadcast.clone());
        (mux, push, broadcast)
    }

    #[test]
    fn test_register_is_idempotent_per_subscriber() {
        let (mux, push, _broadcast) = multiplexer(true);
        let subscriber: Arc<dyn TetheringEventCallback> = Arc::new(CountingCallback);

        mux.register(&subscriber).unwrap();
        mux.register(&subscriber).unwrap();

        assert_eq!(mux.active_subscribers(), 1);
        assert_eq!(push.installed_count(), 1);
    }

    #[test]
    fn test_distinct_subscribers_get_distinct_adapters() {
        let (mux, push, _broadcast) = multiplexer(true);
        let a: Arc<dyn TetheringEventCallback> = Arc::new(CountingCallback);
        let b: Arc<dyn TetheringEventCallback> = Arc::new(CountingCallback);

        mux.register(&a).unwrap();
        mux.register(&b).unwrap();

        assert_eq!(mux.active_subscribers(), 2);
        assert_eq!(push.installed_count(), 2);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let (mux, _push, _broadcast) = multiplexer(true);
        let subscriber: Arc<dyn TetheringEventCallback> = Arc::new(CountingCallback);
        mux.unregister(&subscriber);
        assert_eq!(mux.active_subscribers(), 0);
    }

    #[test]
    fn test_unregister_disposes_adapter() {
        let (mux, push, _broadcast) = multiplexer(true);
        let subscriber: Arc<dyn TetheringEventCallback> = Arc::new(CountingCallback);

        mux.register(&subscriber).unwrap();
        mux.unregister(&subscriber);

        assert_eq!(mux.active_subscribers(), 0);
        assert_eq!(push.installed_count(), 0);
        assert_eq!(push.uninstall_count(), 1);
    }

    #[test]
    fn test_unregister_tolerates_disconnected_source() {
        let (mux, push, _broadcast) = multiplexer(true);
        let subscriber: Arc<dyn TetheringEventCallback> = Arc::new(CountingCallback);

        mux.register(&subscriber).unwrap();
        push.disconnect();
        mux.unregister(&subscriber);

        assert_eq!(mux.active_subscribers(), 0);
    }

    #[test]
    fn test_legacy_capability_selects_broadcast_adapter() {
        let (mux, push, broadcast) = multiplexer(false);
        let subscriber: Arc<dyn TetheringEventCallback> = Arc::new(CountingCallback);

        mux.register(&subscriber).unwrap();

        assert_eq!(push.installed_count(), 0);
        assert_eq!(broadcast.subscription_count(), 1);
    }
}
