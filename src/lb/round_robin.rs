use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use super::{BalanceError, LoadBalancer};
use crate::pool::ReplicaEntry;

/// Plain round-robin: cycles through the candidates in arrival order
#[derive(Debug)]
pub struct RoundRobinBalancer {
    cursor: AtomicI32,
}

impl RoundRobinBalancer {
    /// Create a new round-robin balancer
    pub fn new() -> Self {
        Self {
            cursor: AtomicI32::new(-1),
        }
    }
}

impl Default for RoundRobinBalancer {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBalancer for RoundRobinBalancer {
    fn entry(&self, candidates: &[Arc<ReplicaEntry>]) -> Result<Arc<ReplicaEntry>, BalanceError> {
        if candidates.is_empty() {
            return Err(BalanceError::NoCandidates);
        }

        // Absolute value after the modulo keeps the index non-negative once
        // the cursor wraps at the i32 boundary.
        let turn = self.cursor.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let index = (turn % candidates.len() as i32).unsigned_abs() as usize;
        Ok(Arc::clone(&candidates[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::ReplicaAddr;

    fn entry(addr: &str) -> Arc<ReplicaEntry> {
        Arc::new(ReplicaEntry::new(ReplicaAddr::parse(addr).unwrap()))
    }

    #[test]
    fn test_cycles_in_order() {
        let balancer = RoundRobinBalancer::new();
        let candidates = vec![entry("kv://a:6650"), entry("kv://b:6650"), entry("kv://c:6650")];

        let picked: Vec<String> = (0..6)
            .map(|_| balancer.entry(&candidates).unwrap().addr().to_string())
            .collect();
        assert_eq!(
            picked,
            [
                "kv://a:6650",
                "kv://b:6650",
                "kv://c:6650",
                "kv://a:6650",
                "kv://b:6650",
                "kv://c:6650",
            ]
        );
    }

    #[test]
    fn test_single_candidate() {
        let balancer = RoundRobinBalancer::new();
        let candidates = vec![entry("kv://a:6650")];

        for _ in 0..3 {
            assert_eq!(
                balancer.entry(&candidates).unwrap().addr().to_string(),
                "kv://a:6650"
            );
        }
    }

    #[test]
    fn test_empty_candidates() {
        let balancer = RoundRobinBalancer::new();
        let err = balancer.entry(&[]).unwrap_err();
        assert!(matches!(err, BalanceError::NoCandidates));
    }
}
