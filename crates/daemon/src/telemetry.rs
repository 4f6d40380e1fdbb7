// Logging setup for the daemon

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::settings::DaemonConfig;

/// Initialize tracing: env-filtered, pretty or JSON per config, optionally
/// mirrored into daily-rotated files.
///
/// Returns the appender guard; dropping it flushes buffered log lines, so
/// the caller keeps it alive for the process lifetime.
pub fn init_logging(config: &DaemonConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("netshare=info"))
        .expect("default env filter must parse");

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "netshared.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().boxed())
                .with(file_layer)
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().boxed())
                .with(file_layer)
                .init();
        }
    }

    Ok(guard)
}
