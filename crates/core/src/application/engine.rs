// Fallback-chain engine - ordered retry-with-escalation for start/stop

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::error::TetherError;
use crate::domain::error_code;
use crate::domain::outcome::{AttemptOutcome, EscalationTier, FailureReport};
use crate::domain::request::{OperationDescriptor, OperationKind, TargetKind};
use crate::port::{CapabilityResolver, DirectTethering, HelperOperation, PrivilegedExecutor};

/// Terminal-outcome callback; invoked exactly once per request, from the
/// request's own task.
pub type OutcomeCallback = Box<dyn FnOnce(AttemptOutcome) + Send + 'static>;

/// Drives one start/stop request through escalating privilege tiers.
///
/// Tier order is `Direct` → `PrivilegedHelper` → `Legacy` (the degraded
/// direct retry). Escalation is reserved strictly for permission-denied
/// failures; every other error class terminates the request at the tier
/// that produced it. A request never revisits a tier.
#[derive(Clone)]
pub struct FallbackChainEngine {
    capabilities: Arc<dyn CapabilityResolver>,
    direct: Arc<dyn DirectTethering>,
    helper: Arc<dyn PrivilegedExecutor>,
}

impl FallbackChainEngine {
    pub fn new(
        capabilities: Arc<dyn CapabilityResolver>,
        direct: Arc<dyn DirectTethering>,
        helper: Arc<dyn PrivilegedExecutor>,
    ) -> Self {
        Self {
            capabilities,
            direct,
            helper,
        }
    }

    /// Start tethering on the descriptor's target. Fire-and-forget: the
    /// result arrives through `callback`, exactly once, from some task.
    pub fn start_tethering(&self, descriptor: OperationDescriptor, callback: OutcomeCallback) {
        self.dispatch(OperationKind::Start, descriptor, callback);
    }

    /// Stop tethering on the descriptor's target. Fire-and-forget.
    pub fn stop_tethering(&self, descriptor: OperationDescriptor, callback: OutcomeCallback) {
        self.dispatch(OperationKind::Stop, descriptor, callback);
    }

    fn dispatch(
        &self,
        expected: OperationKind,
        descriptor: OperationDescriptor,
        callback: OutcomeCallback,
    ) {
        if descriptor.kind != expected {
            callback(AttemptOutcome::failure_from(TetherError::malformed(
                format!("descriptor kind {:?} does not match entry point", descriptor.kind),
            )));
            return;
        }
        let engine = self.clone();
        tokio::spawn(async move {
            let outcome = engine.execute(descriptor).await;
            callback(outcome);
        });
    }

    /// Run the full escalation chain for one request and return its single
    /// terminal outcome.
    pub async fn execute(&self, descriptor: OperationDescriptor) -> AttemptOutcome {
        let request = Uuid::new_v4();
        info!(
            request = %request,
            kind = ?descriptor.kind,
            target = %descriptor.target,
            "executing tethering request"
        );
        let outcome = match descriptor.kind {
            OperationKind::Start => self.run_start(request, &descriptor).await,
            OperationKind::Stop => self.run_stop(request, &descriptor).await,
        };
        match &outcome {
            AttemptOutcome::Success => info!(request = %request, "request succeeded"),
            AttemptOutcome::Failure(report) => {
                info!(
                    request = %request,
                    code = ?report.code,
                    "request failed"
                );
                match (&report.cause, report.code) {
                    (Some(cause), _) => cause.log_warn(),
                    (None, Some(code)) => TetherError::from_platform_code(code).log_warn(),
                    (None, None) => {}
                }
            }
        }
        outcome
    }

    // ------------------------------------------------------------------
    // Start chain
    // ------------------------------------------------------------------

    async fn run_start(&self, request: Uuid, descriptor: &OperationDescriptor) -> AttemptOutcome {
        if self.capabilities.supports_modern_operations() {
            self.run_start_modern(request, descriptor).await
        } else {
            self.run_start_legacy(request, descriptor).await
        }
    }

    async fn run_start_modern(
        &self,
        request: Uuid,
        descriptor: &OperationDescriptor,
    ) -> AttemptOutcome {
        let target = descriptor.target;
        let show_ui = descriptor.options.show_ui;

        debug!(request = %request, tier = ?EscalationTier::Direct, "attempting direct start");
        let denial = match self.direct.start(target, true, show_ui).await {
            Ok(()) => return AttemptOutcome::Success,
            Err(e) if e.is_permission_denied() => e,
            Err(e) => return AttemptOutcome::failure_from(e),
        };

        debug!(
            request = %request,
            tier = ?EscalationTier::PrivilegedHelper,
            cause = %denial,
            "direct start denied, escalating"
        );
        match self
            .helper
            .execute(HelperOperation::Start { target, show_ui })
            .await
        {
            Ok(None) => AttemptOutcome::Success,
            Ok(Some(code))
                if code == error_code::TETHER_ERROR_NO_CHANGE_TETHERING_PERMISSION =>
            {
                // Helper may not bypass entitlement either: one degraded
                // attempt without the exemption, surfacing whatever it yields.
                self.start_without_exemption(request, target, show_ui, None)
                    .await
            }
            Ok(Some(code)) => AttemptOutcome::failure_code(code),
            Err(helper_err) => {
                self.start_without_exemption(request, target, show_ui, Some(helper_err))
                    .await
            }
        }
    }

    /// Last-resort modern start with the entitlement exemption withdrawn.
    async fn start_without_exemption(
        &self,
        request: Uuid,
        target: TargetKind,
        show_ui: bool,
        helper_failure: Option<TetherError>,
    ) -> AttemptOutcome {
        debug!(request = %request, tier = ?EscalationTier::Legacy, "retrying start without entitlement exemption");
        match self.direct.start(target, false, show_ui).await {
            Ok(()) => {
                if let Some(helper_failure) = helper_failure {
                    helper_failure.log_warn();
                }
                AttemptOutcome::Success
            }
            Err(e) => AttemptOutcome::failure_from(e.with_suppressed_opt(helper_failure)),
        }
    }

    async fn run_start_legacy(
        &self,
        request: Uuid,
        descriptor: &OperationDescriptor,
    ) -> AttemptOutcome {
        let target = descriptor.target;
        let show_ui = descriptor.options.show_ui;

        debug!(request = %request, tier = ?EscalationTier::Direct, "attempting legacy direct start");
        let denial = match self.direct.start_legacy(target, show_ui).await {
            Ok(()) => return AttemptOutcome::Success,
            Err(e) if e.is_permission_denied() => e,
            Err(e) => return AttemptOutcome::failure_from(e),
        };

        debug!(
            request = %request,
            tier = ?EscalationTier::PrivilegedHelper,
            cause = %denial,
            "legacy start denied, escalating"
        );
        match self
            .helper
            .execute(HelperOperation::StartLegacy { target, show_ui })
            .await
        {
            Ok(None) => AttemptOutcome::Success,
            Ok(Some(code)) => AttemptOutcome::failure_code(code),
            Err(helper_err) => {
                debug!(request = %request, tier = ?EscalationTier::Legacy, "helper failed, retrying legacy start");
                match self.direct.start_legacy(target, show_ui).await {
                    Ok(()) => {
                        helper_err.log_warn();
                        AttemptOutcome::Success
                    }
                    Err(e) => AttemptOutcome::failure_from(e.with_suppressed(helper_err)),
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Stop chain
    // ------------------------------------------------------------------

    async fn run_stop(&self, request: Uuid, descriptor: &OperationDescriptor) -> AttemptOutcome {
        let target = descriptor.target;
        if !self.capabilities.supports_modern_operations() {
            // Legacy-only environment: helper escalation still available.
            return self.stop_legacy_tier(request, target, None, false).await;
        }

        debug!(request = %request, tier = ?EscalationTier::Direct, "attempting direct stop");
        match self.direct.stop(target).await {
            Ok(()) => AttemptOutcome::Success,
            Err(e) if e.is_permission_denied() => self.stop_via_helper(request, target, None).await,
            Err(e) => AttemptOutcome::failure_from(e),
        }
    }

    async fn stop_via_helper(
        &self,
        request: Uuid,
        target: TargetKind,
        suppressed: Option<TetherError>,
    ) -> AttemptOutcome {
        debug!(request = %request, tier = ?EscalationTier::PrivilegedHelper, "escalating stop");
        match self.helper.execute(HelperOperation::Stop { target }).await {
            Ok(None) => {
                if let Some(suppressed) = suppressed {
                    suppressed.log_warn();
                }
                AttemptOutcome::Success
            }
            Ok(Some(code)) => {
                warn!(
                    request = %request,
                    code = %error_code::describe(code),
                    "unexpected helper stop error, falling back to legacy stop"
                );
                self.stop_legacy_tier(request, target, suppressed, true)
                    .await
            }
            Err(helper_err) => {
                // A cancelled helper call is not itself diagnostic context;
                // keep whatever was already chained instead.
                let chained = if helper_err.is_cancellation() {
                    suppressed
                } else {
                    Some(helper_err.with_suppressed_opt(suppressed))
                };
                self.stop_legacy_tier(request, target, chained, true).await
            }
        }
    }

    /// Legacy stop attempt. `helper_attempted` guards the tier-order
    /// invariant: once the helper tier has failed in this request it is
    /// never re-entered, even on a fresh permission error.
    async fn stop_legacy_tier(
        &self,
        request: Uuid,
        target: TargetKind,
        suppressed: Option<TetherError>,
        helper_attempted: bool,
    ) -> AttemptOutcome {
        debug!(request = %request, tier = ?EscalationTier::Legacy, "attempting legacy stop");
        match self.direct.stop_legacy(target).await {
            Ok(()) => {
                if let Some(suppressed) = suppressed {
                    suppressed.log_warn();
                }
                AttemptOutcome::Success
            }
            Err(e) if e.is_permission_denied() && !helper_attempted => {
                debug!(request = %request, tier = ?EscalationTier::PrivilegedHelper, "legacy stop denied, escalating");
                match self
                    .helper
                    .execute(HelperOperation::StopLegacy { target })
                    .await
                {
                    Ok(None) => AttemptOutcome::Success,
                    Ok(Some(code)) => AttemptOutcome::Failure(FailureReport {
                        code: Some(code),
                        cause: Some(
                            TetherError::from_platform_code(code)
                                .with_suppressed(e)
                                .with_suppressed_opt(suppressed),
                        ),
                    }),
                    Err(helper_err) => AttemptOutcome::failure_from(
                        helper_err.with_suppressed(e).with_suppressed_opt(suppressed),
                    ),
                }
            }
            Err(e) => AttemptOutcome::failure_from(e.with_suppressed_opt(suppressed)),
        }
    }
}
