// sluice/src/source/store.rs

//! The per-source container of entries.

use crate::core::shared::{Entry, Shared};
use crate::error::{SluiceError, SluiceResult};
use crate::matching::matcher::matches;
use crate::matching::Predicate;
use serde_json::Value;

/// An ordered, shared, mutable sequence of entries.
///
/// Cloning a `Store` clones the handle: the engine's store map and the owning
/// source's context point at the same data. Contents are only ever replaced
/// wholesale.
#[derive(Debug, Clone, Default)]
pub struct Store(Shared<Vec<Entry>>);

impl Store {
  pub fn new() -> Self {
    Self::default()
  }

  /// Validated write path. Arrays contribute their elements, objects their
  /// values; scalars are rejected and leave the store untouched.
  pub fn assign(&self, input: Value) -> SluiceResult<()> {
    let entries = match input {
      Value::Array(items) => items.into_iter().map(Entry::from).collect(),
      Value::Object(map) => map.into_iter().map(|(_, v)| Entry::from(v)).collect(),
      scalar => {
        return Err(SluiceError::InvalidStoreValue {
          kind: value_kind(&scalar),
        })
      }
    };
    self.replace(entries);
    Ok(())
  }

  pub fn replace(&self, entries: Vec<Entry>) {
    self.0.replace(entries);
  }

  /// Handles to every entry, in store order.
  pub fn entries(&self) -> Vec<Entry> {
    self.0.snapshot()
  }

  /// Entries accepted by `predicate`, or all of them when there is none.
  pub fn find(&self, predicate: Option<&Predicate>) -> Vec<Entry> {
    let guard = self.0.read();
    match predicate {
      Some(p) => guard.iter().filter(|entry| matches(p, entry)).cloned().collect(),
      None => guard.clone(),
    }
  }

  pub fn len(&self) -> usize {
    self.0.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.read().is_empty()
  }

  /// Copies of the current entry values, in store order.
  pub fn snapshot(&self) -> Vec<Value> {
    self.0.read().iter().map(|entry| entry.snapshot()).collect()
  }

  pub fn ptr_eq(&self, other: &Store) -> bool {
    self.0.ptr_eq(&other.0)
  }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
