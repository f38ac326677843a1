//! Guard for a borrowed resource.
//!
//! A [`Pooled`] hands its resource back to the pool when dropped, so callers
//! that use [`Pool::checkout`] cannot forget to return it.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use log::trace;

use crate::pool::Pool;

/// A borrowed resource that returns itself to its pool on drop
pub struct Pooled<T> {
    /// The resource, taken out when the guard is consumed
    resource: Option<T>,

    /// Pool this resource returns to
    pool: Weak<Pool<T>>,

    /// When this resource was borrowed
    acquired_at: Instant,
}

impl<T> Pooled<T> {
    pub(crate) fn new(resource: T, pool: &Arc<Pool<T>>) -> Self {
        Self {
            resource: Some(resource),
            pool: Arc::downgrade(pool),
            acquired_at: Instant::now(),
        }
    }

    /// Return the resource to the pool now
    pub fn return_to_pool(mut self) {
        self.release();
    }

    /// Keep the resource and never return it to the pool
    pub fn detach(mut self) -> T {
        self.resource.take().expect("Resource missing")
    }

    /// Time since this resource was borrowed
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }

    fn release(&mut self) {
        let Some(resource) = self.resource.take() else {
            return;
        };
        match self.pool.upgrade() {
            Some(pool) => pool.put(resource),
            // The pool and its disposer are gone, dropping is all that is left.
            None => trace!("Pool no longer exists, dropping borrowed resource"),
        }
    }
}

impl<T> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.resource.as_ref().expect("Resource missing")
    }
}

impl<T> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.resource.as_mut().expect("Resource missing")
    }
}

impl<T> Drop for Pooled<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "Pooled({:?})", resource),
            None => write!(f, "Pooled(returned)"),
        }
    }
}
