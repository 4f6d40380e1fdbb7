// Capability probe implementation
// The single place that knows which platform level unlocks which
// capability; everything above branches on the resolved flags.

use sysinfo::System;
use tracing::{debug, info};

use netshare_core::port::CapabilityResolver;

/// Explicit deployment override for the detected platform level.
pub const PLATFORM_LEVEL_ENV: &str = "NETSHARE_PLATFORM_LEVEL";

/// Feature-gate table: platform level at which each capability appears.
const MODERN_OPERATIONS_MIN_LEVEL: u32 = 30;
const MODERN_NOTIFICATIONS_MIN_LEVEL: u32 = 30;

/// Capability resolver backed by the deployment environment.
///
/// The platform level comes from the `NETSHARE_PLATFORM_LEVEL` override
/// when set, otherwise from the OS release reported by the system. An
/// undetectable level resolves to 0, keeping every modern capability off
/// and the degraded paths in use.
pub struct EnvCapabilityResolver {
    level: u32,
}

impl EnvCapabilityResolver {
    pub fn with_level(level: u32) -> Self {
        Self { level }
    }

    /// Detect the platform level from the environment.
    pub fn detect() -> Self {
        if let Some(level) = Self::level_from_env() {
            info!(level = %level, source = "env", "platform level resolved");
            return Self { level };
        }
        let level = Self::level_from_os().unwrap_or(0);
        info!(level = %level, source = "os-release", "platform level resolved");
        Self { level }
    }

    fn level_from_env() -> Option<u32> {
        let raw = std::env::var(PLATFORM_LEVEL_ENV).ok()?;
        match raw.trim().parse() {
            Ok(level) => Some(level),
            Err(_) => {
                debug!(raw = %raw, "ignoring unparsable platform level override");
                None
            }
        }
    }

    /// Leading integer of the OS release, e.g. "34" out of "34.1".
    fn level_from_os() -> Option<u32> {
        let release = System::os_version()?;
        let digits: String = release.chars().take_while(|c| c.is_ascii_digit()).collect();
        let level = digits.parse().ok()?;
        debug!(release = %release, level = %level, "probed OS release");
        Some(level)
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl CapabilityResolver for EnvCapabilityResolver {
    fn supports_modern_operations(&self) -> bool {
        self.level >= MODERN_OPERATIONS_MIN_LEVEL
    }

    fn supports_modern_notifications(&self) -> bool {
        self.level >= MODERN_NOTIFICATIONS_MIN_LEVEL
    }
}
