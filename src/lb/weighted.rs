use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use super::{BalanceError, LoadBalancer};
use crate::pool::{ReplicaAddr, ReplicaEntry};

/// Per-replica selection budget for the current cycle
#[derive(Debug)]
struct WeightEntry {
    /// Configured weight, fixed for the entry's lifetime
    weight: u32,

    /// Selections left this cycle; invariant `0 <= remaining <= weight`.
    /// Only mutated inside the selection lock, so relaxed atomics suffice.
    remaining: AtomicU32,
}

impl WeightEntry {
    fn new(weight: u32) -> Self {
        Self {
            weight,
            remaining: AtomicU32::new(weight),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.remaining.load(Ordering::Relaxed) == 0
    }

    fn consume(&self) {
        self.remaining.fetch_sub(1, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.remaining.store(self.weight, Ordering::Relaxed);
    }
}

/// Weighted round-robin selection over replica connection entries
///
/// Each replica carries a budget equal to its configured weight. Within one
/// cycle a replica is handed out at most `weight` times; once every budget
/// is spent, the table resets and a new cycle begins. Replicas first seen at
/// selection time are admitted with the default weight, and an entry keeps
/// its budget across availability changes: a replica that disappears and
/// reappears resumes where it left off.
///
/// Selection stays live when availability and configuration disagree. If the
/// available candidates are a strict subset of the weighted replicas and
/// that subset runs out of budget while absent replicas still hold some, the
/// table resets rather than starving the caller.
#[derive(Debug)]
pub struct WeightedRoundRobinBalancer {
    /// Budgets per replica; entries are added lazily and never removed
    weights: DashMap<ReplicaAddr, Arc<WeightEntry>>,

    /// Weight assigned to replicas missing from the configured map
    default_weight: u32,

    /// Shared selection cursor; wraps freely, see the index computation
    cursor: AtomicI32,

    /// Serializes the exhaustion check, resets and the budget decrement
    select_lock: Mutex<()>,
}

impl WeightedRoundRobinBalancer {
    /// Create a balancer from per-address weights plus a default weight for
    /// replicas missing from the map
    ///
    /// Every configured weight and the default must be greater than zero,
    /// and every key must parse as a replica address; otherwise construction
    /// fails and no balancer is produced.
    pub fn new(
        weights: &HashMap<String, u32>,
        default_weight: u32,
    ) -> Result<Self, BalanceError> {
        let table = DashMap::with_capacity(weights.len());
        for (addr, &weight) in weights {
            let addr = ReplicaAddr::parse(addr)?;
            if weight == 0 {
                return Err(BalanceError::InvalidWeight(addr.to_string()));
            }
            table.insert(addr, Arc::new(WeightEntry::new(weight)));
        }
        if default_weight == 0 {
            return Err(BalanceError::InvalidDefaultWeight);
        }

        Ok(Self {
            weights: table,
            default_weight,
            cursor: AtomicI32::new(-1),
            select_lock: Mutex::new(()),
        })
    }

    /// Admit candidates the table has never seen, with the default weight
    ///
    /// Runs outside the selection lock. The table's own sharding makes each
    /// get-or-insert atomic, so two threads racing on the same new replica
    /// end up sharing one entry rather than corrupting the table.
    fn admit_new(&self, candidates: &[Arc<ReplicaEntry>]) {
        for candidate in candidates {
            if self.weights.contains_key(candidate.addr()) {
                continue;
            }
            self.weights
                .entry(candidate.addr().clone())
                .or_insert_with(|| {
                    debug!(
                        replica = %candidate.addr(),
                        weight = self.default_weight,
                        "admitting unconfigured replica"
                    );
                    Arc::new(WeightEntry::new(self.default_weight))
                });
        }
    }

    /// Restore every entry's budget to its full weight, starting a new cycle
    fn reset_all(&self) {
        for entry in self.weights.iter() {
            entry.value().reset();
        }
        debug!(replicas = self.weights.len(), "weight budgets reset");
    }

    /// Defensive copy of the live table; the copied values alias the live
    /// entries, so decrements through the copy land on the real budgets
    fn snapshot(&self) -> HashMap<ReplicaAddr, Arc<WeightEntry>> {
        self.weights
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Candidates whose address is a key of `table`, in candidate order
    fn filter_known<'a>(
        candidates: &'a [Arc<ReplicaEntry>],
        table: &HashMap<ReplicaAddr, Arc<WeightEntry>>,
    ) -> Vec<&'a Arc<ReplicaEntry>> {
        candidates
            .iter()
            .filter(|candidate| table.contains_key(candidate.addr()))
            .collect()
    }
}

impl LoadBalancer for WeightedRoundRobinBalancer {
    fn entry(&self, candidates: &[Arc<ReplicaEntry>]) -> Result<Arc<ReplicaEntry>, BalanceError> {
        if candidates.is_empty() {
            return Err(BalanceError::NoCandidates);
        }

        self.admit_new(candidates);

        let _guard = self.select_lock.lock();

        // Entries that still hold budget this cycle.
        let mut table_copy = self.snapshot();
        table_copy.retain(|_, entry| !entry.is_exhausted());

        // The whole table is spent: start a fresh cycle.
        if table_copy.is_empty() {
            self.reset_all();
            table_copy = self.snapshot();
        }

        let mut eligible = Self::filter_known(candidates, &table_copy);

        // Every available candidate is spent while absent replicas still
        // hold budget. Reset again so selection cannot starve; admission
        // above guarantees every candidate has an entry afterwards.
        if eligible.is_empty() {
            self.reset_all();
            table_copy = self.snapshot();
            eligible = Self::filter_known(candidates, &table_copy);
        }

        // Absolute value after the modulo keeps the index non-negative once
        // the cursor wraps at the i32 boundary.
        let turn = self.cursor.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let index = (turn % eligible.len() as i32).unsigned_abs() as usize;
        let chosen = eligible[index];

        if let Some(entry) = table_copy.get(chosen.addr()) {
            entry.consume();
        }

        Ok(Arc::clone(chosen))
    }
}
