// Tethering error taxonomy with suppressed-cause chaining

use std::fmt;
use thiserror::Error;
use tracing::warn;

use super::error_code;

/// Failure classes produced while driving a tethering operation.
///
/// Only `PermissionDenied` ever triggers escalation; every other class is
/// terminal at whichever tier produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    #[error("permission denied")]
    PermissionDenied,

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("operation failed: {0}")]
    Other(String),

    #[error("privileged helper unreachable: {0}")]
    HelperUnreachable(String),

    #[error("cancelled")]
    Cancelled,
}

/// Structured tethering error.
///
/// Carries the optional platform error code that produced it and the prior
/// causes accumulated while falling through escalation tiers, in attempt
/// order, so diagnostics can reconstruct the full path.
#[derive(Debug, Clone)]
pub struct TetherError {
    pub class: ErrorClass,
    pub code: Option<i32>,
    pub suppressed: Vec<TetherError>,
}

impl fmt::Display for TetherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} ({})", self.class, error_code::describe(code)),
            None => write!(f, "{}", self.class),
        }
    }
}

impl std::error::Error for TetherError {}

impl TetherError {
    fn new(class: ErrorClass, code: Option<i32>) -> Self {
        Self {
            class,
            code,
            suppressed: Vec::new(),
        }
    }

    pub fn permission_denied(code: Option<i32>) -> Self {
        Self::new(ErrorClass::PermissionDenied, code)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported(message.into()), None)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Malformed(message.into()), None)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Io(message.into()), None)
    }

    pub fn helper_unreachable(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::HelperUnreachable(message.into()), None)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorClass::Cancelled, None)
    }

    /// Classify a structured platform failure code.
    ///
    /// The engine only ever branches on the permission class; the original
    /// code stays recoverable through [`TetherError::code`].
    pub fn from_platform_code(code: i32) -> Self {
        let class = match code {
            error_code::TETHER_ERROR_NO_CHANGE_TETHERING_PERMISSION
            | error_code::TETHER_ERROR_NO_ACCESS_TETHERING_PERMISSION => {
                ErrorClass::PermissionDenied
            }
            error_code::TETHER_ERROR_SERVICE_UNAVAIL | error_code::TETHER_ERROR_UNSUPPORTED => {
                ErrorClass::Unsupported(error_code::describe(code))
            }
            _ => ErrorClass::Other(error_code::describe(code)),
        };
        Self::new(class, Some(code))
    }

    /// Attach a prior cause to the end of the suppressed chain.
    pub fn with_suppressed(mut self, prior: TetherError) -> Self {
        self.suppressed.push(prior);
        self
    }

    pub fn with_suppressed_opt(self, prior: Option<TetherError>) -> Self {
        match prior {
            Some(prior) => self.with_suppressed(prior),
            None => self,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.class == ErrorClass::PermissionDenied
    }

    pub fn is_cancellation(&self) -> bool {
        self.class == ErrorClass::Cancelled
    }

    /// Platform error code, when the failure carried one.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Warn-level diagnostic honoring the probing-noise policy: permission
    /// and cancellation failures are expected outcomes of privilege probing
    /// and stay out of the warning log.
    pub fn log_warn(&self) {
        match self.class {
            ErrorClass::PermissionDenied | ErrorClass::Cancelled => {}
            _ => warn!(
                error = %self,
                suppressed = self.suppressed.len(),
                "tethering failure"
            ),
        }
    }
}
