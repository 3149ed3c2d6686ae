// sluice/src/core/shared.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;
use std::sync::Arc;

/// A cloneable handle to a record that several pipeline stages mutate in place.
///
/// Entries, stores and component contexts are all `Shared`: cloning the handle
/// never copies the data, so a data-handler writing through one clone is seen by
/// every query bucket that holds another.
///
/// IMPORTANT: guards are blocking `parking_lot` guards and MUST be dropped
/// before any `.await` point.
#[derive(Debug)]
pub struct Shared<T: Send + Sync + 'static>(Arc<RwLock<T>>);

/// One structured record produced by a source.
pub type Entry = Shared<Value>;

/// Free-form local state of a component.
pub type Fields = serde_json::Map<String, Value>;

impl<T: Send + Sync + 'static> Shared<T> {
  pub fn new(data: T) -> Self {
    Shared(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Swaps the whole record, returning the previous value.
  pub fn replace(&self, data: T) -> T {
    std::mem::replace(&mut *self.write(), data)
  }

  /// True when both handles point at the same record.
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl<T: Send + Sync + Clone + 'static> Shared<T> {
  /// Copies the current value out from under the lock.
  pub fn snapshot(&self) -> T {
    self.read().clone()
  }
}

impl<T: Send + Sync + 'static> Clone for Shared<T> {
  fn clone(&self) -> Self {
    Shared(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for Shared<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}

impl From<Value> for Entry {
  fn from(value: Value) -> Self {
    Shared::new(value)
  }
}
