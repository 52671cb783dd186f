//! Configuration types.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default broadcast capacity for lifecycle events.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Hub configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Address the HTTP/WebSocket transport binds to.
    pub bind: IpAddr,
    /// Port for the HTTP/WebSocket transport.
    pub port: u16,
    /// Capacity of the lifecycle event broadcast channel.
    pub event_capacity: usize,
    /// Whether the stdin console is started.
    pub console: bool,
    /// Directory for daily rolling log files (stderr only when unset).
    pub log_dir: Option<PathBuf>,
    /// Artificial delay applied by the placeholder capabilities.
    pub simulated_latency: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8787,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            console: true,
            log_dir: None,
            simulated_latency: Duration::ZERO,
        }
    }
}

impl HubConfig {
    /// Load configuration from `AGENT_HUB_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind = match lookup("AGENT_HUB_BIND") {
            Some(raw) => parse_value("AGENT_HUB_BIND", &raw)?,
            None => defaults.bind,
        };
        let port = match lookup("AGENT_HUB_PORT") {
            Some(raw) => parse_value("AGENT_HUB_PORT", &raw)?,
            None => defaults.port,
        };
        let event_capacity = match lookup("AGENT_HUB_EVENT_CAPACITY") {
            Some(raw) => parse_value::<usize>("AGENT_HUB_EVENT_CAPACITY", &raw)?,
            None => defaults.event_capacity,
        };
        if event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "AGENT_HUB_EVENT_CAPACITY".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        let console = match lookup("AGENT_HUB_CONSOLE") {
            Some(raw) => parse_flag("AGENT_HUB_CONSOLE", &raw)?,
            None => defaults.console,
        };
        let simulated_latency = match lookup("AGENT_HUB_SIMULATED_LATENCY_MS") {
            Some(raw) => Duration::from_millis(parse_value("AGENT_HUB_SIMULATED_LATENCY_MS", &raw)?),
            None => defaults.simulated_latency,
        };
        let log_dir = lookup("AGENT_HUB_LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind,
            port,
            event_capacity,
            console,
            log_dir,
            simulated_latency,
        })
    }

    /// Socket address for the transport.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}
