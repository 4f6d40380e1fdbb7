// Platform boundary stubs
// The real service transport and notification feeds are environment glue
// supplied by the embedder; these stand-ins keep the daemon wired end to
// end and make the integration points explicit.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use netshare_core::application::TetheringEventCallback;
use netshare_core::domain::error::TetherError;
use netshare_core::domain::error_code;
use netshare_core::domain::event::{LastKnownState, OffloadStatus, TetherClient, UpstreamNetwork};
use netshare_core::domain::request::TargetKind;
use netshare_core::port::{
    BroadcastHandler, BroadcastRegistration, BroadcastSource, DirectTethering, PushEventSource,
    PushHandler, PushRegistration,
};

/// Direct surface placeholder. Every call reports the transport as not
/// wired; the engine surfaces that verbatim as a terminal failure.
pub struct UnwiredDirectTethering;

impl UnwiredDirectTethering {
    fn unwired() -> TetherError {
        TetherError::unsupported("platform tethering transport not wired")
    }
}

#[async_trait]
impl DirectTethering for UnwiredDirectTethering {
    async fn start(
        &self,
        _target: TargetKind,
        _exempt_entitlement: bool,
        _show_ui: bool,
    ) -> Result<(), TetherError> {
        Err(Self::unwired())
    }

    async fn start_legacy(&self, _target: TargetKind, _show_ui: bool) -> Result<(), TetherError> {
        Err(Self::unwired())
    }

    async fn stop(&self, _target: TargetKind) -> Result<(), TetherError> {
        Err(Self::unwired())
    }

    async fn stop_legacy(&self, _target: TargetKind) -> Result<(), TetherError> {
        Err(Self::unwired())
    }
}

/// Push source placeholder: accepts handlers, never emits.
#[derive(Default)]
pub struct UnwiredPushSource {
    next_id: AtomicU64,
}

impl PushEventSource for UnwiredPushSource {
    fn install(&self, _handler: Arc<dyn PushHandler>) -> Result<PushRegistration, TetherError> {
        Ok(PushRegistration(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn uninstall(&self, _registration: PushRegistration) -> Result<(), TetherError> {
        Ok(())
    }

    fn current_state(&self) -> LastKnownState {
        LastKnownState::default()
    }
}

/// Broadcast source placeholder: arms subscriptions, never delivers.
#[derive(Default)]
pub struct UnwiredBroadcastSource {
    next_id: AtomicU64,
}

impl BroadcastSource for UnwiredBroadcastSource {
    fn subscribe(
        &self,
        _topic: &str,
        _handler: Arc<dyn BroadcastHandler>,
    ) -> Result<BroadcastRegistration, TetherError> {
        Ok(BroadcastRegistration(
            self.next_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    fn unsubscribe(&self, _registration: BroadcastRegistration) -> Result<(), TetherError> {
        Ok(())
    }
}

/// Subscriber that mirrors every notification into the log.
pub struct LoggingSubscriber;

impl TetheringEventCallback for LoggingSubscriber {
    fn on_supported_changed(&self, supported: bool) {
        info!(supported = %supported, "tethering supported changed");
    }

    fn on_supported_types_changed(&self, types: Vec<TargetKind>) {
        info!(types = ?types, "supported tethering types changed");
    }

    fn on_upstream_changed(&self, upstream: Option<UpstreamNetwork>) {
        info!(upstream = ?upstream, "tethering upstream changed");
    }

    fn on_interface_patterns_changed(&self, patterns: Vec<String>) {
        info!(patterns = ?patterns, "tetherable interface patterns changed");
    }

    fn on_tetherable_interfaces_changed(&self, interfaces: Vec<String>) {
        info!(interfaces = ?interfaces, "tetherable interfaces changed");
    }

    fn on_tethered_interfaces_changed(&self, interfaces: Vec<String>) {
        info!(interfaces = ?interfaces, "tethered interfaces changed");
    }

    fn on_interface_error(&self, iface: &str, code: i32) {
        info!(
            iface = %iface,
            error = %error_code::describe(code),
            "tethering interface error"
        );
    }

    fn on_clients_changed(&self, clients: Vec<TetherClient>) {
        if !clients.is_empty() {
            info!(clients = ?clients, "tethered clients changed");
        }
    }

    fn on_offload_status_changed(&self, status: OffloadStatus) {
        info!(status = ?status, "offload status changed");
    }
}
