use serde::{Deserialize, Serialize};

/// Kinds of usage events the presentation layer counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    /// A visitor opened the application
    Visits,
    /// An analysis (batch or personal) completed
    Analyses,
}

impl std::fmt::Display for CounterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CounterKind::Visits => write!(f, "visits"),
            CounterKind::Analyses => write!(f, "analyses"),
        }
    }
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub visits: u64,
    pub analyses: u64,
}
