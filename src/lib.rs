//! kvpool - Replica connection balancing for clustered key-value stores

pub mod config;
pub mod lb;
pub mod pool;

pub use config::Config;
pub use lb::{BalanceError, LoadBalancer, WeightedRoundRobinBalancer};
pub use pool::{ReplicaAddr, ReplicaEntry};
