// Privileged executor port
// Opaque out-of-process execution of a named operation with elevated
// privilege. One async call per invocation; the caller must not assume
// ordering or internal retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::error::TetherError;
use crate::domain::request::TargetKind;

/// Operation dispatched to the privileged helper. Doubles as the helper
/// wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HelperOperation {
    Start { target: TargetKind, show_ui: bool },
    StartLegacy { target: TargetKind, show_ui: bool },
    Stop { target: TargetKind },
    StopLegacy { target: TargetKind },
}

/// Executes a named operation out-of-process with elevated privilege.
///
/// `Ok(None)` means the helper performed the operation; `Ok(Some(code))`
/// is a structured platform error code reported by the helper; `Err` means
/// the helper call itself failed (unavailable, crashed, rejected).
#[async_trait]
pub trait PrivilegedExecutor: Send + Sync {
    async fn execute(&self, op: HelperOperation) -> Result<Option<i32>, TetherError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Helper with scripted results and a call log.
    ///
    /// Results are consumed front-to-back; an unscripted call reports
    /// success.
    #[derive(Default)]
    pub struct ScriptedHelper {
        results: Mutex<VecDeque<Result<Option<i32>, TetherError>>>,
        calls: Mutex<Vec<HelperOperation>>,
    }

    impl ScriptedHelper {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script(&self, result: Result<Option<i32>, TetherError>) {
            self.results.lock().unwrap().push_back(result);
        }

        pub fn calls(&self) -> Vec<HelperOperation> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PrivilegedExecutor for ScriptedHelper {
        async fn execute(&self, op: HelperOperation) -> Result<Option<i32>, TetherError> {
            self.calls.lock().unwrap().push(op);
            self.results.lock().unwrap().pop_front().unwrap_or(Ok(None))
        }
    }
}
