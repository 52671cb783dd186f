//! Error types for Agent Hub.

use std::net::SocketAddr;

use crate::agent::AgentKind;

/// Top-level error type for the hub.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Agent lifecycle and task errors.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Unknown agent type: {kind}")]
    UnknownKind { kind: String },

    #[error("Agent {id} not found")]
    NotFound { id: String },

    #[error("Agent {id} is busy ({label})")]
    Busy { id: String, label: String },

    #[error("Agent {id} task failed: {source}")]
    TaskFailed {
        id: String,
        #[source]
        source: CapabilityError,
    },

    #[error("Agent {id} expected {expected} output, capability returned {actual}")]
    OutputMismatch {
        id: String,
        expected: AgentKind,
        actual: AgentKind,
    },

    #[error("No capability registered for {kind}")]
    NoCapability { kind: AgentKind },
}

/// Errors raised by a capability while doing the actual work.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("Capability {capability} failed: {reason}")]
    Failed { capability: String, reason: String },

    #[error("Invalid input for capability {capability}: {reason}")]
    InvalidInput { capability: String, reason: String },
}

/// HTTP/WebSocket transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Result type alias for the hub.
pub type Result<T> = std::result::Result<T, Error>;
