use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// Shared accumulator owned by the factory and handed to one process.
///
/// The kernel is cooperatively single-threaded, so a plain `Cell` behind an
/// `Rc` is all the synchronization this needs.
#[derive(Debug, Clone, Default)]
pub struct Counter(Rc<Cell<u64>>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, amount: u64) {
        self.0.set(self.0.get() + amount);
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

/// Production accounting, incremented by the processes as they complete work
/// and read once after the run.
#[derive(Debug, Clone, Default)]
pub struct FactoryMetrics {
    pub shafts_built: Counter,
    pub blades_built: Counter,
    pub paint_batches: Counter,
    pub sticks_assembled: Counter,
    pub graphite_restocks: Counter,
    pub polyurethane_restocks: Counter,
}

impl FactoryMetrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            shafts_built: self.shafts_built.get(),
            blades_built: self.blades_built.get(),
            paint_batches: self.paint_batches.get(),
            sticks_assembled: self.sticks_assembled.get(),
            graphite_restocks: self.graphite_restocks.get(),
            polyurethane_restocks: self.polyurethane_restocks.get(),
        }
    }
}

/// Plain-data copy of the counters taken at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub shafts_built: u64,
    pub blades_built: u64,
    pub paint_batches: u64,
    pub sticks_assembled: u64,
    pub graphite_restocks: u64,
    pub polyurethane_restocks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_clones_share_state() {
        let counter = Counter::new();
        let clone = counter.clone();
        clone.add(3);
        counter.add(2);
        assert_eq!(counter.get(), 5);
        assert_eq!(clone.get(), 5);
    }

    #[test]
    fn test_snapshot_copies_current_totals() {
        let metrics = FactoryMetrics::default();
        metrics.shafts_built.add(4);
        metrics.blades_built.add(8);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.shafts_built, 4);
        assert_eq!(snapshot.blades_built, 8);
        assert_eq!(snapshot.sticks_assembled, 0);
    }
}
