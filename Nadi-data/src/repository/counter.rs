use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::models::counter::{CounterKind, CounterSnapshot};

/// Usage counters the presentation layer reads and bumps.
///
/// Implementations are injected wherever counting is needed; there is no
/// process-wide counter.
pub trait UsageCounterTrait: Send + Sync + std::fmt::Debug {
    /// Increment a counter and return its new value
    fn increment(&self, kind: CounterKind) -> u64;

    /// Current value of a counter
    fn get(&self, kind: CounterKind) -> u64;

    /// Current value of every counter
    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            visits: self.get(CounterKind::Visits),
            analyses: self.get(CounterKind::Analyses),
        }
    }
}

/// Atomic in-memory counters. Clones share the same values.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUsageCounter {
    visits: Arc<AtomicU64>,
    analyses: Arc<AtomicU64>,
}

impl InMemoryUsageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: CounterKind) -> &AtomicU64 {
        match kind {
            CounterKind::Visits => &self.visits,
            CounterKind::Analyses => &self.analyses,
        }
    }
}

impl UsageCounterTrait for InMemoryUsageCounter {
    fn increment(&self, kind: CounterKind) -> u64 {
        self.slot(kind).fetch_add(1, Ordering::Relaxed) + 1
    }

    fn get(&self, kind: CounterKind) -> u64 {
        self.slot(kind).load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_independent() {
        let counter = InMemoryUsageCounter::new();
        assert_eq!(counter.increment(CounterKind::Visits), 1);
        assert_eq!(counter.increment(CounterKind::Visits), 2);
        assert_eq!(counter.increment(CounterKind::Analyses), 1);

        assert_eq!(
            counter.snapshot(),
            CounterSnapshot { visits: 2, analyses: 1 }
        );
    }

    #[test]
    fn test_clones_share_counts() {
        let counter = InMemoryUsageCounter::new();
        let clone = counter.clone();
        clone.increment(CounterKind::Analyses);
        assert_eq!(counter.get(CounterKind::Analyses), 1);
    }

    #[test]
    fn test_concurrent_increments() {
        let counter = InMemoryUsageCounter::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        c.increment(CounterKind::Visits);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.get(CounterKind::Visits), 1000);
    }
}
