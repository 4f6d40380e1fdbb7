//! Netshare Daemon - Main Entry Point
//! Brings up configured tethering targets through the fallback-chain
//! engine and mirrors state-change notifications into the log.

mod platform;
mod settings;
mod telemetry;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use netshare_core::application::{
    FallbackChainEngine, SubscriptionMultiplexer, TetheringEventCallback,
};
use netshare_core::domain::request::{OperationDescriptor, TargetKind};
use netshare_core::port::{
    BroadcastSource, CapabilityResolver, DirectTethering, PrivilegedExecutor, PushEventSource,
};
use netshare_infra_system::{EnvCapabilityResolver, HelperProcessExecutor};
use platform::{
    LoggingSubscriber, UnwiredBroadcastSource, UnwiredDirectTethering, UnwiredPushSource,
};
use settings::DaemonConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const STOP_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration, then logging (logging format comes from config)
    let config = DaemonConfig::load()?;
    let _log_guard = telemetry::init_logging(&config)?;

    info!("Netshare daemon v{} starting...", VERSION);

    // Parse managed targets up front so a bad config fails fast.
    let targets = config
        .targets
        .iter()
        .map(|raw| raw.parse::<TargetKind>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;

    // 2. Dependency wiring
    let capabilities: Arc<dyn CapabilityResolver> = Arc::new(EnvCapabilityResolver::detect());
    info!(
        modern_operations = %capabilities.supports_modern_operations(),
        modern_notifications = %capabilities.supports_modern_notifications(),
        "resolved environment capabilities"
    );

    let helper = HelperProcessExecutor::new(&config.helper_path, config.env_allowlist.clone())
        .with_deadline(Duration::from_millis(config.helper_timeout_ms));
    if let Err(e) = helper.preflight() {
        warn!(error = %e, "privileged helper unavailable, escalation will fail");
    }
    let helper: Arc<dyn PrivilegedExecutor> = Arc::new(helper);

    // Platform transport and notification feeds are embedder glue; see
    // platform.rs for the integration points.
    let direct: Arc<dyn DirectTethering> = Arc::new(UnwiredDirectTethering);
    let push_source: Arc<dyn PushEventSource> = Arc::new(UnwiredPushSource::default());
    let broadcast_source: Arc<dyn BroadcastSource> = Arc::new(UnwiredBroadcastSource::default());

    let engine = FallbackChainEngine::new(capabilities.clone(), direct, helper);
    let multiplexer =
        SubscriptionMultiplexer::new(capabilities, push_source, broadcast_source);

    // 3. Subscribe for notifications
    let subscriber: Arc<dyn TetheringEventCallback> = Arc::new(LoggingSubscriber);
    multiplexer
        .register(&subscriber)
        .map_err(|e| anyhow::anyhow!("registering notifications: {e}"))?;

    // 4. Bring up configured targets
    for target in &targets {
        let descriptor = OperationDescriptor::start(*target).show_ui(config.show_ui);
        let target = *target;
        engine.start_tethering(
            descriptor,
            Box::new(move |outcome| {
                if outcome.is_success() {
                    info!(target = %target, "tethering started");
                } else {
                    warn!(target = %target, "tethering start failed");
                }
            }),
        );
    }

    info!("Netshare ready. Press Ctrl+C to shut down");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 6. Tear down managed targets, bounded by a grace period each
    let mut pending = Vec::new();
    for target in &targets {
        let (tx, rx) = tokio::sync::oneshot::channel();
        engine.stop_tethering(
            OperationDescriptor::stop(*target),
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
        );
        pending.push((*target, rx));
    }
    for (target, rx) in pending {
        match tokio::time::timeout(STOP_GRACE_PERIOD, rx).await {
            Ok(Ok(outcome)) if outcome.is_success() => {
                info!(target = %target, "tethering stopped")
            }
            Ok(Ok(_)) => warn!(target = %target, "tethering stop failed"),
            _ => warn!(target = %target, "tethering stop timed out"),
        }
    }

    multiplexer.unregister(&subscriber);
    info!("Shutdown complete.");

    Ok(())
}
