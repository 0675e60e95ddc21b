//! CLI argument parsing for the ring log daemon.

use clap::Parser;
use ringlog_core::Config;

/// ringlogd - bounded in-memory record log over TCP
///
/// Clients send newline-terminated records; after each complete record the
/// daemon replies with the full current log content. A bounded number of
/// records is retained, oldest first to be overwritten.
#[derive(Parser, Debug)]
#[command(name = "ringlogd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Interface to bind the listener to
    #[arg(short, long, default_value = "0.0.0.0", env = "RINGLOG_BIND")]
    pub bind: String,

    /// TCP port for client connections
    #[arg(short, long, default_value = "9000", env = "RINGLOG_PORT")]
    pub port: u16,

    /// Maximum number of records retained before the oldest is overwritten
    #[arg(short, long, default_value = "10", env = "RINGLOG_CAPACITY")]
    pub capacity: usize,

    /// Seconds between timestamp records (0 disables them)
    #[arg(long, default_value = "10", env = "RINGLOG_HEARTBEAT_SECS")]
    pub heartbeat_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn to_config(&self) -> Config {
        Config::new()
            .with_bind_address(self.bind.clone())
            .with_port(self.port)
            .with_capacity(self.capacity)
            .with_heartbeat_secs(self.heartbeat_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ringlogd"]);
        assert_eq!(cli.bind, "0.0.0.0");
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.capacity, 10);
        assert_eq!(cli.heartbeat_secs, 10);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_to_config() {
        let cli = Cli::parse_from([
            "ringlogd",
            "--bind",
            "127.0.0.1",
            "--port",
            "0",
            "--capacity",
            "3",
            "--heartbeat-secs",
            "0",
        ]);
        let config = cli.to_config();
        assert_eq!(config.server_address(), "127.0.0.1:0");
        assert_eq!(config.capacity, 3);
        assert!(!config.heartbeat_enabled());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let cli = Cli::parse_from(["ringlogd", "--capacity", "0"]);
        assert!(cli.validate().is_err());
    }
}
