// Storage models
pub mod analysis;
pub mod counter;
