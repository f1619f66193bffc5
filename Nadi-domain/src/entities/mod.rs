// Domain entities and value objects
pub mod analysis;
pub mod conversions;
pub mod reading;
pub mod template;

// Re-export common types for easier imports
pub use analysis::{
    AlertLevel, AnalysisMode, AnalysisReport, AnalyzedReading, Classification, ReadingLabel,
    SecondaryFlags, StoredAnalysis, SubjectSummary,
};
pub use reading::{PersonalAnalysisRequest, PersonalReading, ReadingRow};
