//! Sizing configuration for a pool.

use serde::{Deserialize, Serialize};

use crate::error::PoolError;

/// Configuration for a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of handles to create up front
    #[serde(default)]
    pub initial_size: usize,

    /// Maximum number of idle handles retained
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    10
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: 0,
            capacity: default_capacity(),
        }
    }
}

impl PoolConfig {
    /// Create a configuration with the given sizes
    pub fn new(initial_size: usize, capacity: usize) -> Self {
        Self {
            initial_size,
            capacity,
        }
    }

    /// Check that the sizes describe a usable pool.
    ///
    /// The capacity must be non-zero and at least as large as the initial size.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.capacity == 0 || self.initial_size > self.capacity {
            return Err(PoolError::InvalidCapacity {
                initial_size: self.initial_size,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
