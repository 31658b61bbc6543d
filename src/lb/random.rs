use std::sync::Arc;

use rand::Rng;

use super::{BalanceError, LoadBalancer};
use crate::pool::ReplicaEntry;

/// Uniform random pick across the candidates
#[derive(Debug)]
pub struct RandomBalancer;

impl RandomBalancer {
    /// Create a new random balancer
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomBalancer {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBalancer for RandomBalancer {
    fn entry(&self, candidates: &[Arc<ReplicaEntry>]) -> Result<Arc<ReplicaEntry>, BalanceError> {
        if candidates.is_empty() {
            return Err(BalanceError::NoCandidates);
        }

        let index = rand::thread_rng().gen_range(0..candidates.len());
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
    fn test_always_returns_a_candidate() {
        let balancer = RandomBalancer::new();
        let candidates = vec![entry("kv://a:6650"), entry("kv://b:6650"), entry("kv://c:6650")];

        for _ in 0..100 {
            let picked = balancer.entry(&candidates).unwrap();
            assert!(candidates.iter().any(|c| c.addr() == picked.addr()));
        }
    }

    #[test]
    fn test_empty_candidates() {
        let balancer = RandomBalancer::new();
        let err = balancer.entry(&[]).unwrap_err();
        assert!(matches!(err, BalanceError::NoCandidates));
    }
}
