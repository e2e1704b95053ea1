//! Controllable energy assets.

/// Stationary battery storage model.
pub mod battery;
pub mod types;

// Re-export the main types for convenience
pub use battery::Battery;
pub use types::Asset;
pub use types::ChargeMode;
