// Port Layer - Interfaces for external collaborators

pub mod capability_resolver;
pub mod direct_tethering;
pub mod event_source;
pub mod privileged_executor;

// Re-exports
pub use capability_resolver::CapabilityResolver;
pub use direct_tethering::DirectTethering;
pub use event_source::{
    BroadcastHandler, BroadcastPayload, BroadcastRegistration, BroadcastSource, PushEventSource,
    PushHandler, PushRegistration, EXTRA_ACTIVE_LOCAL_ONLY, EXTRA_ACTIVE_LOCAL_ONLY_LEGACY,
    EXTRA_ACTIVE_TETHER, EXTRA_ERRORED_TETHER, TETHER_STATE_CHANGED_TOPIC,
};
pub use privileged_executor::{HelperOperation, PrivilegedExecutor};
