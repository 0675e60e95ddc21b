//! Runtime configuration for a log server.

use serde::{Deserialize, Serialize};

use crate::ring::DEFAULT_CAPACITY;

/// Server configuration with builder-style setters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interface the listener binds to.
    pub bind_address: String,

    /// TCP port for client connections.
    pub port: u16,

    /// Maximum number of records retained; older records are overwritten.
    pub capacity: usize,

    /// Seconds between timestamp records. `0` disables them.
    pub heartbeat_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 9000,
            capacity: DEFAULT_CAPACITY,
            heartbeat_secs: 10,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind_address(mut self, addr: impl Into<String>) -> Self {
        self.bind_address = addr.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_heartbeat_secs(mut self, secs: u64) -> Self {
        self.heartbeat_secs = secs;
        self
    }

    /// `host:port` string for binding a listener.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn heartbeat_enabled(&self) -> bool {
        self.heartbeat_secs > 0
    }
}
