//! Bounded pooling of reusable resources like connections.
//!
//! Idle resources live in a bounded channel. Borrowing takes from the channel
//! without waiting and falls back to creating a fresh resource; returning
//! offers the resource back without waiting and disposes it when the channel
//! is full. Nothing runs in the background.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, info, trace, warn};
use parking_lot::RwLock;

use crate::config::PoolConfig;
use crate::error::{BoxError, InitError, PoolError};
use crate::guard::Pooled;

/// Creates a new resource
pub type Creator<T> = Box<dyn Fn() -> Result<T, BoxError> + Send + Sync>;

/// Reports whether an idle resource is still usable
pub type Validator<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Releases a resource that will never be reused
pub type Disposer<T> = Box<dyn Fn(T) + Send + Sync>;

/// Both ends of the bounded idle channel
struct IdleStore<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> IdleStore<T> {
    fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }
}

/// Builder for a [`Pool`]
pub struct PoolBuilder<T> {
    config: PoolConfig,
    creator: Option<Creator<T>>,
    validator: Option<Validator<T>>,
    disposer: Option<Disposer<T>>,
}

impl<T> PoolBuilder<T> {
    /// Start building a pool with the given sizes
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            creator: None,
            validator: None,
            disposer: None,
        }
    }

    /// Set the function used to create resources
    pub fn creator<F, E>(mut self, create: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.creator = Some(Box::new(move || create().map_err(Into::into)));
        self
    }

    /// Set the function used to check idle resources before lending them out
    pub fn validator<F>(mut self, validate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validate));
        self
    }

    /// Set the function used to release resources the pool gives up on
    pub fn disposer<F>(mut self, dispose: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.disposer = Some(Box::new(dispose));
        self
    }

    /// Build the pool, creating `initial_size` resources up front.
    ///
    /// Invalid sizes fail without producing a pool. If pre-filling stops
    /// early, the error carries the partially filled pool.
    pub fn build(self) -> Result<Pool<T>, InitError<T>> {
        if let Err(err) = self.config.validate() {
            return Err(InitError::config(err));
        }

        let pool = Pool {
            idle: RwLock::new(Some(IdleStore::with_capacity(self.config.capacity))),
            capacity: self.config.capacity,
            creator: self.creator,
            validator: self.validator,
            disposer: self.disposer,
        };

        info!(
            "Initializing pool with {} of {} resources",
            self.config.initial_size, self.config.capacity
        );

        for filled in 0..self.config.initial_size {
            match pool.create() {
                Ok(resource) => pool.put(resource),
                Err(err) => {
                    warn!(
                        "Pool pre-fill stopped after {} of {} resources: {}",
                        filled, self.config.initial_size, err
                    );
                    return Err(InitError::prefill(err, pool));
                }
            }
        }

        debug!("Pool initialized with {} idle resources", pool.len());
        Ok(pool)
    }
}

impl<T> fmt::Debug for PoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolBuilder")
            .field("config", &self.config)
            .field("creator", &self.creator.is_some())
            .field("validator", &self.validator.is_some())
            .field("disposer", &self.disposer.is_some())
            .finish()
    }
}

/// A bounded pool of reusable resources.
///
/// At most `capacity` idle resources are retained. Borrowing never waits:
/// when no idle resource is available a new one is created, even if more
/// than `capacity` resources are then in use. Returning never waits either:
/// a resource returned to a full pool is disposed.
///
/// After [`Pool::destroy`] the pool keeps working without pooling. Every
/// borrow creates a fresh resource and every return disposes it.
pub struct Pool<T> {
    /// Idle resources, `None` once the pool is destroyed
    idle: RwLock<Option<IdleStore<T>>>,

    /// Maximum number of idle resources
    capacity: usize,

    creator: Option<Creator<T>>,
    validator: Option<Validator<T>>,
    disposer: Option<Disposer<T>>,
}

impl<T> Pool<T> {
    /// Create a pool holding up to `capacity` idle resources, `initial_size`
    /// of which are created immediately with `create`.
    pub fn new<F, E>(initial_size: usize, capacity: usize, create: F) -> Result<Self, InitError<T>>
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        PoolBuilder::new(PoolConfig::new(initial_size, capacity))
            .creator(create)
            .build()
    }

    /// Start building a pool from a configuration
    pub fn builder(config: PoolConfig) -> PoolBuilder<T> {
        PoolBuilder::new(config)
    }

    /// Install a validation function, replacing any previous one
    pub fn with_validator<F>(mut self, validate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validate));
        self
    }

    /// Install a disposal function, replacing any previous one
    pub fn with_disposer<F>(mut self, dispose: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.disposer = Some(Box::new(dispose));
        self
    }

    /// Maximum number of idle resources this pool retains
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of idle resources right now.
    ///
    /// This is a snapshot; concurrent borrows and returns may change it
    /// immediately.
    pub fn len(&self) -> usize {
        self.idle
            .read()
            .as_ref()
            .map_or(0, |store| store.receiver.len())
    }

    /// Whether there are no idle resources right now
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`Pool::destroy`] has run
    pub fn is_destroyed(&self) -> bool {
        self.idle.read().is_none()
    }

    /// Borrow a resource.
    ///
    /// Takes an idle resource if one passes validation, otherwise creates a
    /// new one. Idle resources that fail validation are dropped without
    /// being handed to the disposer.
    pub fn get(&self) -> Result<T, PoolError> {
        loop {
            let taken = self
                .idle
                .read()
                .as_ref()
                .and_then(|store| store.receiver.try_recv().ok());

            let Some(resource) = taken else {
                return self.create();
            };

            match &self.validator {
                Some(validate) if !validate(&resource) => {
                    trace!("Discarding idle resource that failed validation");
                    drop(resource);
                }
                _ => return Ok(resource),
            }
        }
    }

    /// Borrow a resource wrapped in a guard that returns it on drop
    pub fn checkout(self: &Arc<Self>) -> Result<Pooled<T>, PoolError> {
        let resource = self.get()?;
        Ok(Pooled::new(resource, self))
    }

    /// Return a resource to the pool.
    ///
    /// The resource is disposed if the pool is full or destroyed.
    pub fn put(&self, resource: T) {
        let rejected = match self.idle.read().as_ref() {
            Some(store) => match store.sender.try_send(resource) {
                Ok(()) => return,
                Err(TrySendError::Full(resource)) => {
                    trace!("Pool is full, disposing returned resource");
                    resource
                }
                Err(TrySendError::Disconnected(resource)) => resource,
            },
            None => {
                trace!("Pool is destroyed, disposing returned resource");
                resource
            }
        };

        self.dispose(rejected);
    }

    /// Dispose every idle resource and stop pooling.
    ///
    /// Calling this again has no effect.
    pub fn destroy(&self) {
        // Taking the store under the write lock closes it to returns still in flight.
        let store = self.idle.write().take();
        let Some(IdleStore { sender, receiver }) = store else {
            trace!("Pool already destroyed");
            return;
        };
        drop(sender);

        let mut disposed = 0;
        for resource in receiver.try_iter() {
            self.dispose(resource);
            disposed += 1;
        }

        info!("Pool destroyed, disposed {} idle resources", disposed);
    }

    fn create(&self) -> Result<T, PoolError> {
        let create = self.creator.as_ref().ok_or(PoolError::NoCreator)?;
        create().map_err(PoolError::CreationFailed)
    }

    fn dispose(&self, resource: T) {
        if let Some(dispose) = &self.disposer {
            dispose(resource);
        }
    }
}

impl<T> Drop for Pool<T> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("capacity", &self.capacity)
            .field("idle", &self.len())
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}
