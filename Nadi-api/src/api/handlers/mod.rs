pub mod analysis;
pub mod health;
pub mod results;

// Tests module
#[cfg(test)]
pub(crate) mod tests;

// Re-export handlers for easier imports
pub use analysis::{analyze_batch, analyze_personal, get_template};
pub use health::health_check;
pub use results::{get_latest, get_stats, record_visit, reset_latest};
