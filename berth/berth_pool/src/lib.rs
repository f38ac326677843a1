#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Berth Pool
//!
//! A bounded pool of reusable handles (network connections, sessions, ...)
//! that are expensive to create and cheap to reuse.
//!
//! The pool keeps at most `capacity` idle handles. Borrowing never blocks:
//! when no idle handle is available a fresh one is created, and handles
//! returned to a full pool are disposed instead of stored.
//!
//! ```
//! use berth_pool::Pool;
//!
//! let pool = Pool::new(2, 10, || Ok::<_, std::io::Error>(Vec::<u8>::with_capacity(64)))
//!     .expect("pool construction");
//! assert_eq!(pool.len(), 2);
//!
//! let buffer = pool.get().expect("borrow");
//! assert_eq!(pool.len(), 1);
//!
//! pool.put(buffer);
//! assert_eq!(pool.len(), 2);
//!
//! pool.destroy();
//! assert_eq!(pool.len(), 0);
//! ```

/// Pool sizing configuration
pub mod config;

/// Error types for pool construction and borrowing
pub mod error;

/// RAII guard returning borrowed handles on drop
pub mod guard;

/// The pool itself
pub mod pool;

pub use config::PoolConfig;
pub use error::{BoxError, InitError, PoolError};
pub use guard::Pooled;
pub use pool::{Creator, Disposer, Pool, PoolBuilder, Validator};
