// Notification adapters - normalize raw environment events into the
// uniform callback contract

pub mod broadcast;
pub mod push;

use std::sync::Arc;

use crate::application::multiplexer::TetheringEventCallback;
use crate::domain::error::TetherError;
use crate::port::{BroadcastSource, CapabilityResolver, PushEventSource};

pub use broadcast::BroadcastAdapter;
pub use push::PushAdapter;

/// Installed adapter for one subscriber; exactly one exists per subscriber
/// at a time, owned by the multiplexer.
pub enum AdapterHandle {
    Push(PushAdapter),
    Broadcast(BroadcastAdapter),
}

impl AdapterHandle {
    /// Tear the adapter down. A source that is already gone is treated as
    /// successfully disarmed.
    pub fn dispose(self) {
        match self {
            AdapterHandle::Push(adapter) => adapter.dispose(),
            AdapterHandle::Broadcast(adapter) => adapter.dispose(),
        }
    }
}

/// Pick and install the capability-appropriate adapter for a subscriber.
pub fn select_adapter(
    capabilities: &Arc<dyn CapabilityResolver>,
    push_source: &Arc<dyn PushEventSource>,
    broadcast_source: &Arc<dyn BroadcastSource>,
    subscriber: &Arc<dyn TetheringEventCallback>,
) -> Result<AdapterHandle, TetherError> {
    if capabilities.supports_modern_notifications() {
        Ok(AdapterHandle::Push(PushAdapter::install(
            push_source,
            subscriber,
        )?))
    } else {
        Ok(AdapterHandle::Broadcast(BroadcastAdapter::install(
            broadcast_source,
            subscriber,
        )?))
    }
}
