// Repository module structure
pub mod errors;
mod results;
mod in_memory;
mod counter;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use results::{ResultRepository, ResultRepositoryTrait};
pub use counter::{InMemoryUsageCounter, UsageCounterTrait};

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use results::tests;
