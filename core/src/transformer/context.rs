// sluice/src/transformer/context.rs

use crate::core::shared::{Entry, Fields, Shared};
use serde_json::Value;

/// Explicit context handed to a transformer's initialize hook, preprocessors
/// and execute hook.
///
/// Besides free-form `fields` it carries the per-run scratch data: one bucket
/// per query and the flattened view of every entry the transformer reads.
/// Both are rebuilt from the stores at the start of every run.
#[derive(Debug, Default)]
pub struct TransformerState {
  pub fields: Fields,
  buckets: Vec<(String, Vec<Entry>)>,
  entries: Vec<Entry>,
}

pub type TransformerContext = Shared<TransformerState>;

impl TransformerState {
  pub fn field(&self, name: &str) -> Option<&Value> {
    self.fields.get(name)
  }

  pub fn set_field(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
    self.fields.insert(name.into(), value)
  }

  /// Entries gathered by the query called `name` during the current run.
  pub fn bucket(&self, name: &str) -> Option<&[Entry]> {
    self
      .buckets
      .iter()
      .find(|(bucket, _)| bucket == name)
      .map(|(_, entries)| entries.as_slice())
  }

  /// Copies of the entries in bucket `name`, convenient for building output.
  pub fn bucket_values(&self, name: &str) -> Option<Vec<Value>> {
    self
      .bucket(name)
      .map(|entries| entries.iter().map(Shared::snapshot).collect())
  }

  pub fn buckets(&self) -> &[(String, Vec<Entry>)] {
    &self.buckets
  }

  /// Every entry of every source this transformer reads from, in source order.
  pub fn entries(&self) -> &[Entry] {
    &self.entries
  }

  pub fn entry_values(&self) -> Vec<Value> {
    self.entries.iter().map(Shared::snapshot).collect()
  }

  pub(crate) fn set_scratch(&mut self, buckets: Vec<(String, Vec<Entry>)>, entries: Vec<Entry>) {
    self.buckets = buckets;
    self.entries = entries;
  }
}
