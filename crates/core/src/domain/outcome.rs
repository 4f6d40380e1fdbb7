// Terminal outcomes and escalation tiers

use super::error::TetherError;

/// Ordered privilege tiers a request escalates through.
///
/// A request only ever advances forward (`Direct` → `PrivilegedHelper` →
/// `Legacy`) and never revisits a tier it already failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EscalationTier {
    Direct,
    PrivilegedHelper,
    Legacy,
}

/// Structured failure delivered through the outcome callback.
#[derive(Debug, Clone)]
pub struct FailureReport {
    /// Platform error code, when the terminal failure carried one.
    pub code: Option<i32>,
    /// Terminal cause, including any suppressed prior causes in attempt
    /// order.
    pub cause: Option<TetherError>,
}

/// Terminal result of one top-level request.
///
/// Exactly one of these is produced per request, delivered through the
/// caller's outcome callback.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Success,
    Failure(FailureReport),
}

impl AttemptOutcome {
    /// Failure carrying only a structured platform code.
    pub fn failure_code(code: i32) -> Self {
        AttemptOutcome::Failure(FailureReport {
            code: Some(code),
            cause: None,
        })
    }

    /// Failure derived from an error, lifting its platform code if any.
    pub fn failure_from(cause: TetherError) -> Self {
        AttemptOutcome::Failure(FailureReport {
            code: cause.code(),
            cause: Some(cause),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }

    pub fn failure(&self) -> Option<&FailureReport> {
        match self {
            AttemptOutcome::Success => None,
            AttemptOutcome::Failure(report) => Some(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering_is_monotonic() {
        assert!(EscalationTier::Direct < EscalationTier::PrivilegedHelper);
        assert!(EscalationTier::PrivilegedHelper < EscalationTier::Legacy);
    }

    #[test]
    fn test_failure_from_lifts_code() {
        let outcome = AttemptOutcome::failure_from(TetherError::from_platform_code(11));
        let report = outcome.failure().unwrap();
        assert_eq!(report.code, Some(11));
        assert!(report.cause.is_some());
    }

    #[test]
    fn test_failure_code_has_no_cause() {
        let outcome = AttemptOutcome::failure_code(5);
        let report = outcome.failure().unwrap();
        assert_eq!(report.code, Some(5));
        assert!(report.cause.is_none());
    }
}
