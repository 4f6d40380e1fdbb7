// Domain Layer - Tethering operation and notification model

pub mod error;
pub mod error_code;
pub mod event;
pub mod outcome;
pub mod request;

// Re-exports
pub use error::{ErrorClass, TetherError};
pub use event::{
    filter_supported_types, LastKnownState, OffloadStatus, RawTetherEvent, TetherClient,
    UpstreamNetwork,
};
pub use outcome::{AttemptOutcome, EscalationTier, FailureReport};
pub use request::{OperationDescriptor, OperationKind, RequestOptions, TargetKind};
