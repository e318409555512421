//! Storage layer errors

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in the storage layer.
///
/// A missing key is not an error; lookups return `Option`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Serialization or deserialization of a stored record failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Store rejected the command or returned an unexpected value
    #[error("Database error: {0}")]
    Database(String),

    /// Store could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Store call did not complete within the configured bound
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl StoreError {
    /// Classify a Redis client error; client-side timeouts report `timeout`.
    pub(crate) fn from_redis(err: redis::RedisError, timeout: Duration) -> Self {
        if err.is_timeout() {
            StoreError::Timeout(timeout)
        } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Database(err.to_string())
        }
    }
}

#[cfg(feature = "redis")]
impl From<deadpool_redis::PoolError> for StoreError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_is_serialization() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(StoreError::from(err), StoreError::Serialization(_)));
    }

    #[cfg(feature = "redis")]
    #[test]
    fn test_redis_error_classification() {
        use std::io;

        let bound = Duration::from_millis(500);
        let timed_out = redis::RedisError::from(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
        let refused = redis::RedisError::from(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        let rejected = redis::RedisError::from((redis::ErrorKind::TypeError, "WRONGTYPE"));

        assert!(matches!(StoreError::from_redis(timed_out, bound), StoreError::Timeout(d) if d == bound));
        assert!(matches!(StoreError::from_redis(refused, bound), StoreError::Connection(_)));
        assert!(matches!(StoreError::from_redis(rejected, bound), StoreError::Database(_)));
    }
}
