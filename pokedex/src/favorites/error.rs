//! Storage Errors
//!
//! `TigerStyle`: Explicit error types with context.

use thiserror::Error;

/// Errors from favorites storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Database could not be opened or its schema created
    #[error("open failed: {message}")]
    Open {
        /// Error message
        message: String,
    },

    /// Read query failed
    #[error("read failed: {message}")]
    Read {
        /// Error message
        message: String,
    },

    /// Write query failed
    #[error("write failed: {message}")]
    Write {
        /// Error message
        message: String,
    },

    /// Stored row could not be decoded
    #[error("corrupted row: {message}")]
    Corrupted {
        /// Error message
        message: String,
    },

    /// Caller passed an invalid argument
    #[error("validation error: {message}")]
    Validation {
        /// Validation error message
        message: String,
    },

    /// The task running a mutation stopped before reporting a result
    #[error("operation interrupted: {message}")]
    Interrupted {
        /// Error message
        message: String,
    },

    /// Simulated fault (for DST)
    #[error("simulated fault: {fault_type}")]
    SimulatedFault {
        /// Type of simulated fault
        fault_type: String,
    },
}

impl StorageError {
    /// Create an open error.
    #[must_use]
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open {
            message: message.into(),
        }
    }

    /// Create a read error.
    #[must_use]
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Create a write error.
    #[must_use]
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Create a corruption error.
    #[must_use]
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an interrupted error.
    #[must_use]
    pub fn interrupted(message: impl Into<String>) -> Self {
        Self::Interrupted {
            message: message.into(),
        }
    }

    /// Create a simulated fault error.
    #[must_use]
    pub fn simulated_fault(fault_type: impl Into<String>) -> Self {
        Self::SimulatedFault {
            fault_type: fault_type.into(),
        }
    }

    /// Check if this is a transient error (the same call may succeed later).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Open { .. }
                | Self::Read { .. }
                | Self::Write { .. }
                | Self::Interrupted { .. }
                | Self::SimulatedFault { .. }
        )
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = StorageError::validation("pokemon id must be positive");
        assert!(
            matches!(err, StorageError::Validation { ref message } if message == "pokemon id must be positive")
        );
        assert_eq!(
            StorageError::write("disk full").to_string(),
            "write failed: disk full"
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(StorageError::open("locked").is_transient());
        assert!(StorageError::read("io").is_transient());
        assert!(StorageError::simulated_fault("StorageWriteFail").is_transient());

        assert!(!StorageError::validation("bad").is_transient());
        assert!(!StorageError::corrupted("added_at").is_transient());
    }
}
