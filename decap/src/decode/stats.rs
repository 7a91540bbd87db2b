//! Per-codec counters. Workers account into their own `CodecStats` and the
//! totals are folded into a `GlobalStats` once a worker is done, so counting
//! on the hot path never contends on shared state.

use std::collections::HashMap;

use log::info;

/// Counters a single codec maintains.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Pegs {
    /// Frames this codec processed.
    pub(crate) processed: u64,
    /// Frames this codec discarded with a diagnostic.
    pub(crate) discards: u64,
}

/// Per-worker statistics, keyed by codec name.
#[derive(Debug, Default)]
pub(crate) struct CodecStats {
    pegs: HashMap<&'static str, Pegs>,
}

impl CodecStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn processed(&mut self, codec: &'static str) {
        self.pegs.entry(codec).or_default().processed += 1;
    }

    pub(crate) fn discarded(&mut self, codec: &'static str) {
        self.pegs.entry(codec).or_default().discards += 1;
    }

    pub(crate) fn get(&self, codec: &str) -> Pegs {
        self.pegs.get(codec).copied().unwrap_or_default()
    }
}

/// Aggregated statistics over all workers.
#[derive(Debug, Default)]
pub(crate) struct GlobalStats {
    pegs: HashMap<&'static str, Pegs>,
}

impl GlobalStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fold a worker's counters into the totals and reset them, so a worker
    /// can be folded more than once without double counting.
    pub(crate) fn fold(&mut self, worker: &mut CodecStats) {
        for (codec, pegs) in worker.pegs.drain() {
            let total = self.pegs.entry(codec).or_default();
            total.processed += pegs.processed;
            total.discards += pegs.discards;
        }
    }

    pub(crate) fn get(&self, codec: &str) -> Pegs {
        self.pegs.get(codec).copied().unwrap_or_default()
    }

    /// Log a one line summary per codec, sorted by name for stable output.
    pub(crate) fn log_summary(&self) {
        let mut names: Vec<&&str> = self.pegs.keys().collect();
        names.sort_unstable();

        for name in names {
            let pegs = self.pegs[*name];
            info!(
                "{}: {} processed, {} discards",
                name, pegs.processed, pegs.discards
            );
        }
    }
}
