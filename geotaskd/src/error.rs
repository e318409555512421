//! Daemon error types.

use geotask_domain::DomainError;
use geotask_store::StoreError;
use geotask_zone::ZoneError;
use thiserror::Error;

/// Errors from the courier tracker and the order lifecycle manager.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain error (invalid direction)
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Zone engine error
    #[error("Zone error: {0}")]
    Zone(#[from] ZoneError),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store unreachable at startup
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Service error
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// I/O error (listener bind, server)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
