//! Load balancer module for kvpool
//!
//! This module selects which replica connection a request should use, given
//! the entries that are currently available.
//!
//! # Components
//!
//! - [`LoadBalancer`]: the selection seam consumed by pool code
//! - [`WeightedRoundRobinBalancer`]: weighted cycles with per-replica budgets
//! - [`RoundRobinBalancer`]: plain sequential distribution
//! - [`RandomBalancer`]: uniform random pick
//!
//! # Selection Contract
//!
//! Every balancer receives the currently available entries fresh on each
//! call and returns one of them. The candidate list is never stored; a
//! replica that was unavailable on one call can reappear on the next.
//! Passing an empty list is a caller bug and fails with
//! [`BalanceError::NoCandidates`].
//!
//! # Example Usage
//!
//! ```rust
//! use kvpool::lb::{LoadBalancer, WeightedRoundRobinBalancer};
//! use kvpool::pool::{ReplicaAddr, ReplicaEntry};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), kvpool::lb::BalanceError> {
//! let mut weights = HashMap::new();
//! weights.insert("kv://replica-1:6650".to_string(), 3);
//! weights.insert("kv://replica-2:6650".to_string(), 1);
//!
//! let balancer = WeightedRoundRobinBalancer::new(&weights, 1)?;
//!
//! let candidates = vec![
//!     Arc::new(ReplicaEntry::new(ReplicaAddr::parse("kv://replica-1:6650")?)),
//!     Arc::new(ReplicaEntry::new(ReplicaAddr::parse("kv://replica-2:6650")?)),
//! ];
//!
//! // replica-1 receives three of every four selections
//! let entry = balancer.entry(&candidates)?;
//! println!("routing to {}", entry.addr());
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! All balancers are `Send + Sync` and designed to be shared behind an `Arc`
//! across threads or async tasks. The weighted balancer serializes its
//! budget accounting internally; the critical section is pure in-memory work
//! and is never held across I/O.

pub mod random;
pub mod round_robin;
pub mod weighted;

use std::sync::Arc;

use crate::pool::{AddrError, ReplicaEntry};

pub use random::RandomBalancer;
pub use round_robin::RoundRobinBalancer;
pub use weighted::WeightedRoundRobinBalancer;

/// Error types for balancer construction and selection
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("no candidate replicas available for selection")]
    NoCandidates,

    #[error("weight for replica {0} must be greater than zero")]
    InvalidWeight(String),

    #[error("default weight must be greater than zero")]
    InvalidDefaultWeight,

    #[error("invalid replica address: {0}")]
    Addr(#[from] AddrError),
}

/// Picks one replica connection entry out of the currently available candidates
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Select the entry the calling request should use
    ///
    /// `candidates` is the list of currently live entries, supplied fresh on
    /// every call. Fails with [`BalanceError::NoCandidates`] if it is empty.
    fn entry(&self, candidates: &[Arc<ReplicaEntry>]) -> Result<Arc<ReplicaEntry>, BalanceError>;
}
