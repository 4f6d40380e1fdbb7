// Legacy broadcast adapter - forwards the tethered-interface list from the
// well-known state-changed topic

use std::sync::{Arc, Weak};
use tracing::debug;

use crate::application::multiplexer::TetheringEventCallback;
use crate::domain::error::TetherError;
use crate::port::{
    BroadcastHandler, BroadcastPayload, BroadcastRegistration, BroadcastSource,
    TETHER_STATE_CHANGED_TOPIC,
};

/// Forwards tethered-interface changes to a weakly held subscriber.
///
/// The broadcast signal is the only notification category a legacy
/// environment can observe; nothing is synthesized for the others and
/// nothing is replayed at registration.
struct BroadcastForwarder {
    subscriber: Weak<dyn TetheringEventCallback>,
}

impl BroadcastHandler for BroadcastForwarder {
    fn handle(&self, payload: &BroadcastPayload) {
        let Some(subscriber) = self.subscriber.upgrade() else {
            return;
        };
        // Payloads without the tethered list are unrelated state updates.
        let Some(interfaces) = payload.tethered_interfaces() else {
            return;
        };
        subscriber.on_tethered_interfaces_changed(interfaces);
    }
}

/// Legacy broadcast-source adapter for one subscriber.
pub struct BroadcastAdapter {
    source: Arc<dyn BroadcastSource>,
    registration: BroadcastRegistration,
}

impl BroadcastAdapter {
    /// Arm the subscription on the well-known topic.
    pub fn install(
        source: &Arc<dyn BroadcastSource>,
        subscriber: &Arc<dyn TetheringEventCallback>,
    ) -> Result<Self, TetherError> {
        let forwarder = Arc::new(BroadcastForwarder {
            subscriber: Arc::downgrade(subscriber),
        });
        let registration = source.subscribe(TETHER_STATE_CHANGED_TOPIC, forwarder)?;
        Ok(Self {
            source: source.clone(),
            registration,
        })
    }

    /// Disarm the subscription; double-disarm and a torn-down source are
    /// both fine.
    pub fn dispose(self) {
        if let Err(e) = self.source.unsubscribe(self.registration) {
            debug!(error = %e, "broadcast source already gone during unsubscribe");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::event_source::mocks::FakeBroadcastSource;
    use crate::port::EXTRA_ACTIVE_TETHER;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        tethered: Mutex<Vec<Vec<String>>>,
        supported: Mutex<Vec<bool>>,
    }

    impl TetheringEventCallback for RecordingCallback {
        fn on_supported_changed(&self, supported: bool) {
            self.supported.lock().unwrap().push(supported);
        }
        fn on_tethered_interfaces_changed(&self, interfaces: Vec<String>) {
            self.tethered.lock().unwrap().push(interfaces);
        }
    }

    fn subscriber() -> (Arc<RecordingCallback>, Arc<dyn TetheringEventCallback>) {
        let concrete = Arc::new(RecordingCallback::default());
        let erased: Arc<dyn TetheringEventCallback> = concrete.clone();
        (concrete, erased)
    }

    #[test]
    fn test_install_replays_nothing() {
        let source = Arc::new(FakeBroadcastSource::new());
        let broadcast_source: Arc<dyn BroadcastSource> = source;
        let (recording, erased) = subscriber();

        let _adapter = BroadcastAdapter::install(&broadcast_source, &erased).unwrap();

        assert!(recording.tethered.lock().unwrap().is_empty());
        assert!(recording.supported.lock().unwrap().is_empty());
    }

    #[test]
    fn test_forwards_tethered_interface_list() {
        let source = Arc::new(FakeBroadcastSource::new());
        let broadcast_source: Arc<dyn BroadcastSource> = source.clone();
        let (recording, erased) = subscriber();
        let _adapter = BroadcastAdapter::install(&broadcast_source, &erased).unwrap();

        let payload =
            BroadcastPayload::new().with_string_list(EXTRA_ACTIVE_TETHER, ["wlan0", "usb0"]);
        source.deliver(TETHER_STATE_CHANGED_TOPIC, &payload);

        assert_eq!(
            *recording.tethered.lock().unwrap(),
            vec![vec!["wlan0".to_string(), "usb0".to_string()]]
        );
    }

    #[test]
    fn test_payload_without_tethered_key_is_ignored() {
        let source = Arc::new(FakeBroadcastSource::new());
        let broadcast_source: Arc<dyn BroadcastSource> = source.clone();
        let (recording, erased) = subscriber();
        let _adapter = BroadcastAdapter::install(&broadcast_source, &erased).unwrap();

        source.deliver(TETHER_STATE_CHANGED_TOPIC, &BroadcastPayload::new());

        assert!(recording.tethered.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispose_tolerates_disconnected_source() {
        let source = Arc::new(FakeBroadcastSource::new());
        let broadcast_source: Arc<dyn BroadcastSource> = source.clone();
        let (_recording, erased) = subscriber();
        let adapter = BroadcastAdapter::install(&broadcast_source, &erased).unwrap();

        source.disconnect();
        adapter.dispose();

        assert_eq!(source.unsubscribe_count(), 1);
    }
}
