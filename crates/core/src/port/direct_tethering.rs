// Direct tethering port
// The platform's own start/stop surface at its boundary. Errors arrive
// pre-classified: the permission class (with or without an explicit
// platform code) is the only one the engine escalates on.

use async_trait::async_trait;

use crate::domain::error::TetherError;
use crate::domain::request::TargetKind;

/// The environment's tethering control surface.
///
/// Implementations adapt whatever transport the platform exposes; every
/// method resolves once the platform has delivered a definitive result for
/// the call.
#[async_trait]
pub trait DirectTethering: Send + Sync {
    /// Modern request-based start.
    ///
    /// # Errors
    /// - `PermissionDenied` (optionally carrying
    ///   `TETHER_ERROR_NO_CHANGE_TETHERING_PERMISSION`) when the caller may
    ///   not use the requested entitlement exemption
    /// - any other class for terminal platform failures
    async fn start(
        &self,
        target: TargetKind,
        exempt_entitlement: bool,
        show_ui: bool,
    ) -> Result<(), TetherError>;

    /// Legacy start path for environments without the modern surface.
    async fn start_legacy(&self, target: TargetKind, show_ui: bool) -> Result<(), TetherError>;

    /// Modern connector-based stop.
    async fn stop(&self, target: TargetKind) -> Result<(), TetherError>;

    /// Legacy stop path.
    async fn stop_legacy(&self, target: TargetKind) -> Result<(), TetherError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One recorded call against the direct surface.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DirectCall {
        Start {
            target: TargetKind,
            exempt_entitlement: bool,
            show_ui: bool,
        },
        StartLegacy {
            target: TargetKind,
            show_ui: bool,
        },
        Stop {
            target: TargetKind,
        },
        StopLegacy {
            target: TargetKind,
        },
    }

    /// Direct surface with per-call scripted results and a call log.
    ///
    /// Results are consumed front-to-back per method; an unscripted call
    /// succeeds.
    #[derive(Default)]
    pub struct ScriptedDirect {
        start_results: Mutex<VecDeque<Result<(), TetherError>>>,
        start_legacy_results: Mutex<VecDeque<Result<(), TetherError>>>,
        stop_results: Mutex<VecDeque<Result<(), TetherError>>>,
        stop_legacy_results: Mutex<VecDeque<Result<(), TetherError>>>,
        calls: Mutex<Vec<DirectCall>>,
    }

    impl ScriptedDirect {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script_start(&self, result: Result<(), TetherError>) {
            self.start_results.lock().unwrap().push_back(result);
        }

        pub fn script_start_legacy(&self, result: Result<(), TetherError>) {
            self.start_legacy_results.lock().unwrap().push_back(result);
        }

        pub fn script_stop(&self, result: Result<(), TetherError>) {
            self.stop_results.lock().unwrap().push_back(result);
        }

        pub fn script_stop_legacy(&self, result: Result<(), TetherError>) {
            self.stop_legacy_results.lock().unwrap().push_back(result);
        }

        pub fn calls(&self) -> Vec<DirectCall> {
            self.calls.lock().unwrap().clone()
        }

        fn next(queue: &Mutex<VecDeque<Result<(), TetherError>>>) -> Result<(), TetherError> {
            queue.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }
    }

    #[async_trait]
    impl DirectTethering for ScriptedDirect {
        async fn start(
            &self,
            target: TargetKind,
            exempt_entitlement: bool,
            show_ui: bool,
        ) -> Result<(), TetherError> {
            self.calls.lock().unwrap().push(DirectCall::Start {
                target,
                exempt_entitlement,
                show_ui,
            });
            Self::next(&self.start_results)
        }

        async fn start_legacy(
            &self,
            target: TargetKind,
            show_ui: bool,
        ) -> Result<(), TetherError> {
            self.calls
                .lock()
                .unwrap()
                .push(DirectCall::StartLegacy { target, show_ui });
            Self::next(&self.start_legacy_results)
        }

        async fn stop(&self, target: TargetKind) -> Result<(), TetherError> {
            self.calls.lock().unwrap().push(DirectCall::Stop { target });
            Self::next(&self.stop_results)
        }

        async fn stop_legacy(&self, target: TargetKind) -> Result<(), TetherError> {
            self.calls
                .lock()
                .unwrap()
                .push(DirectCall::StopLegacy { target });
            Self::next(&self.stop_legacy_results)
        }
    }
}
