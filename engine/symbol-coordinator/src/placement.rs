use std::hash::Hasher;

use siphasher::sip::SipHasher13;

use crate::error::CoordError;
use crate::random::RandomSource;
use crate::types::{Assignment, SymbolSet, WorkerIndex};

/// Spread `symbols` over `worker_count` consumers
///
/// Each symbol, in input order, goes to an index drawn uniformly from `rng`. There
/// is no rebalancing: two runs over the same symbols may place them differently.
pub fn partition(
    symbols: &SymbolSet,
    worker_count: usize,
    rng: &mut dyn RandomSource,
) -> Result<Assignment, CoordError> {
    if worker_count == 0 {
        return Err(CoordError::InvalidWorkerCount(worker_count));
    }

    let mut assignment = Assignment::with_worker_count(worker_count);
    for symbol in symbols.iter() {
        let worker = rng.index_below(worker_count);
        if worker >= worker_count {
            return Err(CoordError::DrawOutOfRange { draw: worker, worker_count });
        }
        assignment.place(symbol.to_string(), worker);
    }

    tracing::debug!(
        "Partitioned {} symbols across {} workers ({} workers received symbols)",
        assignment.len(),
        worker_count,
        assignment.by_worker().len()
    );
    Ok(assignment)
}

/// Policy for placing symbols that arrive after the assignment was built
pub trait PlacementPolicy: std::fmt::Debug + Send + Sync {
    fn assign_worker(&self, symbol: &str) -> WorkerIndex;
}

/// Hash-based placement: the same symbol always lands on the same worker
#[derive(Debug, Clone)]
pub struct HashBasedPolicy {
    num_workers: usize,
}

impl HashBasedPolicy {
    pub fn new(num_workers: usize) -> Self {
        Self { num_workers: num_workers.max(1) }
    }
}

impl PlacementPolicy for HashBasedPolicy {
    fn assign_worker(&self, symbol: &str) -> WorkerIndex {
        let mut hasher = SipHasher13::new();
        hasher.write(symbol.as_bytes());
        (hasher.finish() % self.num_workers as u64) as WorkerIndex
    }
}
