//! Shared handle to the state store

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

use super::store::State;

/// Cheap-to-clone handle to the state store
///
/// The gateway receive loop is the only writer. Guards must not be held
/// across an await point.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<State>>,
}

impl SharedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the state for reading
    pub fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner.read()
    }

    /// Lock the state for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner.write()
    }

    /// Run a closure against a read guard
    pub fn with<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.inner.read())
    }
}
