pub mod analysis;
pub mod classifier;
pub mod extrapolation;
pub mod results;

// Domain services
// The numeric core (extrapolation, classifier) is pure; analysis orchestrates
// it per subject and results keeps the last report for redisplay.

// Re-export service traits and factory functions
pub use analysis::{create_default_analysis_service, AnalysisError, AnalysisService, AnalysisServiceTrait};
pub use classifier::{AnomalyClassifier, ClassifierPolicy, ExtendedPolicy, Thresholds};
pub use results::{create_default_result_service, ResultService, ResultServiceTrait};
