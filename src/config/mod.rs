use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::lb::{
    BalanceError, LoadBalancer, RandomBalancer, RoundRobinBalancer, WeightedRoundRobinBalancer,
};
use crate::pool::{AddrError, ReplicaAddr, ReplicaEntry};

/// Balancer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancerConfig {
    /// Selection strategy: round_robin, random, weighted_round_robin
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Per-replica weights for the weighted strategy, keyed by address
    #[serde(default)]
    pub weights: HashMap<String, u32>,

    /// Weight assigned to replicas missing from the weights map
    #[serde(default = "default_weight")]
    pub default_weight: u32,
}

fn default_strategy() -> String {
    "round_robin".to_string()
}

fn default_weight() -> u32 {
    1
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            weights: HashMap::new(),
            default_weight: default_weight(),
        }
    }
}

impl BalancerConfig {
    /// Build the configured balancer
    ///
    /// Unknown strategy names fall back to round-robin. Weight validation
    /// happens inside the weighted constructor, so a bad weight table fails
    /// here rather than at first selection.
    pub fn build(&self) -> Result<Box<dyn LoadBalancer>, BalanceError> {
        match self.strategy.as_str() {
            "weighted_round_robin" => Ok(Box::new(WeightedRoundRobinBalancer::new(
                &self.weights,
                self.default_weight,
            )?)),
            "random" => Ok(Box::new(RandomBalancer::new())),
            _ => Ok(Box::new(RoundRobinBalancer::new())),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Replica addresses the pool connects to
    #[serde(default)]
    pub replicas: Vec<String>,

    /// Balancer settings
    #[serde(default)]
    pub balancer: BalancerConfig,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            replicas: Vec::new(),
            balancer: BalancerConfig::default(),
        }
    }

    /// Parse the replica list into pool entries
    pub fn build_replicas(&self) -> Result<Vec<Arc<ReplicaEntry>>, AddrError> {
        self.replicas
            .iter()
            .map(|addr| Ok(Arc::new(ReplicaEntry::new(ReplicaAddr::parse(addr)?))))
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

    let config: Config =
        serde_yaml::from_str(&content).context("Failed to parse YAML configuration")?;

    Ok(config)
}

/// Load configuration from environment variables
///
/// - KVPOOL_REPLICAS (comma-separated list of replica addresses, required)
/// - KVPOOL_STRATEGY (optional, defaults to round_robin)
/// - KVPOOL_WEIGHTS (optional, comma-separated `addr=weight` pairs)
/// - KVPOOL_DEFAULT_WEIGHT (optional, defaults to 1)
pub fn load_from_env() -> Result<Config> {
    // Try to load .env file if it exists (don't fail if it doesn't)
    let _ = dotenvy::dotenv();

    let mut config = Config::new();

    let replicas_str =
        std::env::var("KVPOOL_REPLICAS").context("KVPOOL_REPLICAS environment variable not set")?;

    let replicas: Vec<String> = replicas_str
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if replicas.is_empty() {
        anyhow::bail!("KVPOOL_REPLICAS contains no valid addresses");
    }

    config.replicas = replicas;

    if let Ok(strategy) = std::env::var("KVPOOL_STRATEGY") {
        config.balancer.strategy = strategy;
    }

    if let Ok(weights) = std::env::var("KVPOOL_WEIGHTS") {
        config.balancer.weights =
            parse_weight_list(&weights).context("Failed to parse KVPOOL_WEIGHTS")?;
    }

    if let Ok(weight) = std::env::var("KVPOOL_DEFAULT_WEIGHT") {
        if let Ok(val) = weight.parse() {
            config.balancer.default_weight = val;
        }
    }

    Ok(config)
}

/// Parse comma-separated `addr=weight` pairs
fn parse_weight_list(input: &str) -> Result<HashMap<String, u32>> {
    let mut weights = HashMap::new();

    for pair in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (addr, weight) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid weight entry '{}': expected addr=weight", pair))?;

        let weight = weight
            .trim()
            .parse()
            .context(format!("Invalid weight value in '{}'", pair))?;

        weights.insert(addr.trim().to_string(), weight);
    }

    Ok(weights)
}

/// Load configuration from file or environment
///
/// This is a convenience function that loads from a YAML file when a path is
/// given and falls back to environment variables otherwise.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    if let Some(path) = config_path {
        load_from_yaml(path)
    } else {
        load_from_env()
    }
}
