//! Errors reported by the pool.
//!
//! Only two things can go wrong: the pool was configured with impossible
//! sizes, or a handle had to be created and could not be. Overflow on return
//! and validation failure on borrow are normal capacity management and are
//! never reported as errors.

use std::fmt;

use thiserror::Error;

use crate::pool::Pool;

/// Boxed error produced by a caller-supplied creation function
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by pool operations
#[derive(Error, Debug)]
pub enum PoolError {
    /// The requested sizes cannot describe a pool
    #[error("invalid capacity settings: initial size {initial_size}, capacity {capacity}")]
    InvalidCapacity {
        /// Number of handles requested up front
        initial_size: usize,

        /// Maximum number of idle handles
        capacity: usize,
    },

    /// A handle had to be created but the pool has no creation function
    #[error("no creation function configured, can not create resource")]
    NoCreator,

    /// The creation function itself failed
    #[error("failed to create resource: {0}")]
    CreationFailed(#[source] BoxError),
}

impl PoolError {
    /// Whether this error came from an attempt to create a handle
    pub fn is_creation_error(&self) -> bool {
        matches!(self, Self::NoCreator | Self::CreationFailed(_))
    }

    /// Whether this error came from invalid pool parameters
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::InvalidCapacity { .. })
    }
}

/// Error returned when a pool cannot be fully constructed.
///
/// When the sizes are valid but pre-filling stops early, the partially
/// filled pool travels with the error and stays usable.
#[derive(Error)]
#[error("{error}")]
pub struct InitError<T> {
    #[source]
    error: PoolError,
    pool: Option<Pool<T>>,
}

impl<T> InitError<T> {
    pub(crate) fn config(error: PoolError) -> Self {
        Self { error, pool: None }
    }

    pub(crate) fn prefill(error: PoolError, pool: Pool<T>) -> Self {
        Self {
            error,
            pool: Some(pool),
        }
    }

    /// The underlying error
    pub fn error(&self) -> &PoolError {
        &self.error
    }

    /// The partially filled pool, if one was built
    pub fn pool(&self) -> Option<&Pool<T>> {
        self.pool.as_ref()
    }

    /// Split into the error and the partially filled pool
    pub fn into_parts(self) -> (PoolError, Option<Pool<T>>) {
        (self.error, self.pool)
    }

    /// Keep the partially filled pool and drop the error
    pub fn into_pool(self) -> Option<Pool<T>> {
        self.pool
    }
}

impl<T> fmt::Debug for InitError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitError")
            .field("error", &self.error)
            .field("pool", &self.pool)
            .finish()
    }
}

impl<T> From<InitError<T>> for PoolError {
    fn from(err: InitError<T>) -> Self {
        err.error
    }
}
