// Capability resolver port
// All environment-version knowledge lives behind this interface; callers
// branch on capability flags, never on raw version numbers.

/// Reports which operation variants and notification styles the running
/// environment exposes.
pub trait CapabilityResolver: Send + Sync {
    /// Modern request-based start/stop surface is available.
    fn supports_modern_operations(&self) -> bool;

    /// Modern push-style event callbacks are available.
    fn supports_modern_notifications(&self) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Capability resolver with fixed answers.
    pub struct FixedCapabilities {
        pub modern_operations: bool,
        pub modern_notifications: bool,
    }

    impl FixedCapabilities {
        pub fn modern() -> Self {
            Self {
                modern_operations: true,
                modern_notifications: true,
            }
        }

        pub fn legacy() -> Self {
            Self {
                modern_operations: false,
                modern_notifications: false,
            }
        }
    }

    impl CapabilityResolver for FixedCapabilities {
        fn supports_modern_operations(&self) -> bool {
            self.modern_operations
        }

        fn supports_modern_notifications(&self) -> bool {
            self.modern_notifications
        }
    }
}
