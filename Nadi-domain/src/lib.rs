// NADI Domain
// This crate contains the analysis logic: the one-step extrapolator, the
// anomaly classifier and the per-subject orchestration around them.

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Analysis configuration loaded from the environment
pub mod config;

// Health checks and system status
pub mod health;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
