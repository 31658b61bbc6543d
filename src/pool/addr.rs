use std::fmt;
use std::str::FromStr;

use url::Url;

/// Error types for replica address parsing
#[derive(Debug, thiserror::Error)]
pub enum AddrError {
    #[error("invalid replica address '{0}': {1}")]
    Parse(String, #[source] url::ParseError),

    #[error("replica address '{0}' has no host")]
    MissingHost(String),

    #[error("replica address '{0}' has no port")]
    MissingPort(String),
}

/// Identity of a single replica endpoint (scheme + host + port)
///
/// Equality and hashing are value-based, so two addresses parsed from the
/// same string are interchangeable as weight-table keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplicaAddr {
    scheme: String,
    host: String,
    port: u16,
}

impl ReplicaAddr {
    /// Parse an address like `kv://replica-1.example.com:6650`
    ///
    /// The scheme and an explicit port are required; there is no default
    /// port to fall back to.
    pub fn parse(input: &str) -> Result<Self, AddrError> {
        let url = Url::parse(input).map_err(|e| AddrError::Parse(input.to_string(), e))?;

        let host = url
            .host_str()
            .ok_or_else(|| AddrError::MissingHost(input.to_string()))?
            .to_string();
        let port = url
            .port()
            .ok_or_else(|| AddrError::MissingPort(input.to_string()))?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port,
        })
    }

    /// Get the address scheme (e.g., "kv")
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the host name or IP
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the port
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ReplicaAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl FromStr for ReplicaAddr {
    type Err = AddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_address() {
        let addr = ReplicaAddr::parse("kv://replica-1.example.com:6650").unwrap();
        assert_eq!(addr.scheme(), "kv");
        assert_eq!(addr.host(), "replica-1.example.com");
        assert_eq!(addr.port(), 6650);
    }

    #[test]
    fn test_parse_missing_port() {
        let err = ReplicaAddr::parse("kv://replica-1.example.com").unwrap_err();
        assert!(matches!(err, AddrError::MissingPort(_)));
    }

    #[test]
    fn test_parse_garbage() {
        let err = ReplicaAddr::parse("not an address").unwrap_err();
        assert!(matches!(err, AddrError::Parse(..)));
    }

    #[test]
    fn test_value_equality() {
        let a = ReplicaAddr::parse("kv://10.0.0.1:6650").unwrap();
        let b = ReplicaAddr::parse("kv://10.0.0.1:6650").unwrap();
        let c = ReplicaAddr::parse("kv://10.0.0.1:6651").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);

        // Hashing must agree with equality for map keys
        let mut map = HashMap::new();
        map.insert(a, 1);
        assert!(map.contains_key(&b));
        assert!(!map.contains_key(&c));
    }

    #[test]
    fn test_display_round_trip() {
        let addr = ReplicaAddr::parse("kv://replica-2:7000").unwrap();
        let rendered = addr.to_string();
        assert_eq!(rendered, "kv://replica-2:7000");
        assert_eq!(rendered.parse::<ReplicaAddr>().unwrap(), addr);
    }
}
