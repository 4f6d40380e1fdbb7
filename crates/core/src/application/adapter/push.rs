// Push adapter - demultiplexes the modern push source into the uniform
// callback contract, with replay-on-register

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

use crate::application::multiplexer::TetheringEventCallback;
use crate::domain::error::TetherError;
use crate::domain::event::{filter_supported_types, LastKnownState, RawTetherEvent};
use crate::port::{PushEventSource, PushHandler, PushRegistration};

/// Replay-on-register policy for the interface-name-pattern category.
///
/// Kept false: replaying it is known to produce a spurious duplicate right
/// after registration, so the category only fires on a genuine change.
const REPLAY_INTERFACE_PATTERNS: bool = false;

/// One stable handler installed into the push source per subscriber.
///
/// Holds only a weak reference to the subscriber callback; once the
/// subscriber's owner drops it, events are silently discarded.
struct PushDemux {
    subscriber: Weak<dyn TetheringEventCallback>,
    /// Adapter-owned cache, seeded from the source snapshot at install and
    /// mutated only on receipt of a real event.
    state: Mutex<LastKnownState>,
    /// First patterns delivery after install is swallowed; see
    /// [`REPLAY_INTERFACE_PATTERNS`].
    patterns_armed: AtomicBool,
}

impl PushDemux {
    /// Synchronously deliver every observed category of `snapshot` to the
    /// subscriber. Interface patterns are exempt by policy.
    fn replay(&self, subscriber: &Arc<dyn TetheringEventCallback>, snapshot: &LastKnownState) {
        if let Some(supported) = snapshot.supported {
            subscriber.on_supported_changed(supported);
        }
        if let Some(types) = &snapshot.supported_types {
            subscriber.on_supported_types_changed(types.clone());
        }
        if let Some(upstream) = &snapshot.upstream {
            subscriber.on_upstream_changed(upstream.clone());
        }
        if let Some(tetherable) = &snapshot.tetherable {
            subscriber.on_tetherable_interfaces_changed(tetherable.clone());
        }
        if let Some(tethered) = &snapshot.tethered {
            subscriber.on_tethered_interfaces_changed(tethered.clone());
        }
        for (iface, code) in &snapshot.interface_errors {
            subscriber.on_interface_error(iface, *code);
        }
        if let Some(clients) = &snapshot.clients {
            subscriber.on_clients_changed(clients.clone());
        }
        if let Some(offload) = snapshot.offload {
            subscriber.on_offload_status_changed(offload);
        }
    }
}

impl PushHandler for PushDemux {
    fn handle(&self, event: RawTetherEvent) {
        let Some(subscriber) = self.subscriber.upgrade() else {
            // Subscriber owner is gone; drop silently.
            return;
        };
        match event {
            RawTetherEvent::SupportedChanged(supported) => {
                self.state.lock().unwrap().supported = Some(supported);
                subscriber.on_supported_changed(supported);
            }
            RawTetherEvent::SupportedTypesChanged(raw) => {
                let types = filter_supported_types(&raw);
                self.state.lock().unwrap().supported_types = Some(types.clone());
                subscriber.on_supported_types_changed(types);
            }
            RawTetherEvent::UpstreamChanged(upstream) => {
                self.state.lock().unwrap().upstream = Some(upstream.clone());
                subscriber.on_upstream_changed(upstream);
            }
            RawTetherEvent::InterfacePatternsChanged(patterns) => {
                if self.patterns_armed.swap(true, Ordering::SeqCst) || REPLAY_INTERFACE_PATTERNS {
                    subscriber.on_interface_patterns_changed(patterns);
                }
            }
            RawTetherEvent::TetherableInterfacesChanged(interfaces) => {
                self.state.lock().unwrap().tetherable = Some(interfaces.clone());
                subscriber.on_tetherable_interfaces_changed(interfaces);
            }
            RawTetherEvent::TetheredInterfacesChanged(interfaces) => {
                self.state.lock().unwrap().tethered = Some(interfaces.clone());
                subscriber.on_tethered_interfaces_changed(interfaces);
            }
            RawTetherEvent::InterfaceError { iface, code } => {
                self.state
                    .lock()
                    .unwrap()
                    .interface_errors
                    .insert(iface.clone(), code);
                subscriber.on_interface_error(&iface, code);
            }
            RawTetherEvent::ClientsChanged(clients) => {
                self.state.lock().unwrap().clients = Some(clients.clone());
                subscriber.on_clients_changed(clients);
            }
            RawTetherEvent::OffloadStatusChanged(status) => {
                self.state.lock().unwrap().offload = Some(status);
                subscriber.on_offload_status_changed(status);
            }
        }
    }
}

/// Modern push-source adapter for one subscriber.
pub struct PushAdapter {
    source: Arc<dyn PushEventSource>,
    registration: PushRegistration,
}

impl PushAdapter {
    /// Install into the source and synchronously replay the current state
    /// to the subscriber as part of registration.
    pub fn install(
        source: &Arc<dyn PushEventSource>,
        subscriber: &Arc<dyn TetheringEventCallback>,
    ) -> Result<Self, TetherError> {
        let snapshot = source.current_state();
        let demux = Arc::new(PushDemux {
            subscriber: Arc::downgrade(subscriber),
            state: Mutex::new(snapshot.clone()),
            patterns_armed: AtomicBool::new(false),
        });
        let registration = source.install(demux.clone())?;
        demux.replay(subscriber, &snapshot);
        Ok(Self {
            source: source.clone(),
            registration,
        })
    }

    pub fn dispose(self) {
        if let Err(e) = self.source.uninstall(self.registration) {
            debug!(error = %e, "push source already gone during uninstall");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{OffloadStatus, UpstreamNetwork};
    use crate::domain::request::TargetKind;
    use crate::port::event_source::mocks::FakePushSource;

    #[derive(Default)]
    struct RecordingCallback {
        supported: Mutex<Vec<bool>>,
        types: Mutex<Vec<Vec<TargetKind>>>,
        upstreams: Mutex<Vec<Option<UpstreamNetwork>>>,
        patterns: Mutex<Vec<Vec<String>>>,
        tethered: Mutex<Vec<Vec<String>>>,
        errors: Mutex<Vec<(String, i32)>>,
        offload: Mutex<Vec<OffloadStatus>>,
    }

    impl TetheringEventCallback for RecordingCallback {
        fn on_supported_changed(&self, supported: bool) {
            self.supported.lock().unwrap().push(supported);
        }
        fn on_supported_types_changed(&self, types: Vec<TargetKind>) {
            self.types.lock().unwrap().push(types);
        }
        fn on_upstream_changed(&self, upstream: Option<UpstreamNetwork>) {
            self.upstreams.lock().unwrap().push(upstream);
        }
        fn on_interface_patterns_changed(&self, patterns: Vec<String>) {
            self.patterns.lock().unwrap().push(patterns);
        }
        fn on_tethered_interfaces_changed(&self, interfaces: Vec<String>) {
            self.tethered.lock().unwrap().push(interfaces);
        }
        fn on_interface_error(&self, iface: &str, code: i32) {
            self.errors.lock().unwrap().push((iface.to_string(), code));
        }
        fn on_offload_status_changed(&self, status: OffloadStatus) {
            self.offload.lock().unwrap().push(status);
        }
    }

    fn subscriber() -> (Arc<RecordingCallback>, Arc<dyn TetheringEventCallback>) {
        let concrete = Arc::new(RecordingCallback::default());
        let erased: Arc<dyn TetheringEventCallback> = concrete.clone();
        (concrete, erased)
    }

    #[test]
    fn test_install_replays_cached_categories() {
        let source = Arc::new(FakePushSource::new());
        source.set_snapshot(LastKnownState {
            supported: Some(true),
            upstream: Some(Some(UpstreamNetwork("wwan0".into()))),
            tethered: Some(vec!["wlan0".into()]),
            offload: Some(OffloadStatus::Started),
            ..Default::default()
        });
        let push_source: Arc<dyn PushEventSource> = source;
        let (recording, erased) = subscriber();

        let _adapter = PushAdapter::install(&push_source, &erased).unwrap();

        assert_eq!(*recording.supported.lock().unwrap(), vec![true]);
        assert_eq!(
            *recording.upstreams.lock().unwrap(),
            vec![Some(UpstreamNetwork("wwan0".into()))]
        );
        assert_eq!(
            *recording.tethered.lock().unwrap(),
            vec![vec!["wlan0".to_string()]]
        );
        assert_eq!(
            *recording.offload.lock().unwrap(),
            vec![OffloadStatus::Started]
        );
    }

    #[test]
    fn test_unobserved_categories_are_not_replayed() {
        let source = Arc::new(FakePushSource::new());
        let push_source: Arc<dyn PushEventSource> = source;
        let (recording, erased) = subscriber();

        let _adapter = PushAdapter::install(&push_source, &erased).unwrap();

        assert!(recording.supported.lock().unwrap().is_empty());
        assert!(recording.upstreams.lock().unwrap().is_empty());
        assert!(recording.tethered.lock().unwrap().is_empty());
    }

    #[test]
    fn test_first_patterns_event_is_swallowed() {
        let source = Arc::new(FakePushSource::new());
        let push_source: Arc<dyn PushEventSource> = source.clone();
        let (recording, erased) = subscriber();
        let _adapter = PushAdapter::install(&push_source, &erased).unwrap();

        source.emit(RawTetherEvent::InterfacePatternsChanged(vec![
            "wlan\\d".into()
        ]));
        source.emit(RawTetherEvent::InterfacePatternsChanged(vec![
            "wlan\\d".into(),
            "rndis\\d".into(),
        ]));

        let delivered = recording.patterns.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].len(), 2);
    }

    #[test]
    fn test_unknown_supported_type_codes_filtered() {
        let source = Arc::new(FakePushSource::new());
        let push_source: Arc<dyn PushEventSource> = source.clone();
        let (recording, erased) = subscriber();
        let _adapter = PushAdapter::install(&push_source, &erased).unwrap();

        source.emit(RawTetherEvent::SupportedTypesChanged(vec![1, 2, 42]));

        let delivered = recording.types.lock().unwrap();
        assert_eq!(
            delivered.as_slice(),
            &[vec![TargetKind::Usb, TargetKind::Bluetooth]]
        );
    }

    #[test]
    fn test_events_after_drop_of_subscriber_are_silently_discarded() {
        let source = Arc::new(FakePushSource::new());
        let push_source: Arc<dyn PushEventSource> = source.clone();
        let (recording, erased) = subscriber();
        let _adapter = PushAdapter::install(&push_source, &erased).unwrap();

        drop(erased);
        drop(recording);
        // Must not panic; the weak reference is dead.
        source.emit(RawTetherEvent::SupportedChanged(false));
    }

    #[test]
    fn test_events_update_cache_then_forward() {
        let source = Arc::new(FakePushSource::new());
        let push_source: Arc<dyn PushEventSource> = source.clone();
        let (recording, erased) = subscriber();
        let _adapter = PushAdapter::install(&push_source, &erased).unwrap();

        source.emit(RawTetherEvent::InterfaceError {
            iface: "rndis0".into(),
            code: 10,
        });

        assert_eq!(
            *recording.errors.lock().unwrap(),
            vec![("rndis0".to_string(), 10)]
        );
    }
}
