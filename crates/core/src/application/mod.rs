// Application Layer - Engine, multiplexer, and notification adapters

pub mod adapter;
pub mod engine;
pub mod multiplexer;

pub use engine::{FallbackChainEngine, OutcomeCallback};
pub use multiplexer::{SubscriptionMultiplexer, TetheringEventCallback};
