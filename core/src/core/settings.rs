// sluice/src/core/settings.rs

//! Concurrency caps used by the engine's batched stages.

use crate::error::{SluiceError, SluiceResult};
use serde::Deserialize;

/// Tunables for one engine. Every field falls back to its default when absent,
/// so `{}` is a valid settings document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
  /// Data-handlers applied to one entry at the same time.
  pub handler_concurrency: usize,
  /// Outputs fed by one transformer at the same time.
  pub output_concurrency: usize,
  /// Data-handlers initialized at the same time.
  pub data_handler_init_concurrency: usize,
  /// Transformers, and outputs per transformer, initialized at the same time.
  pub output_init_concurrency: usize,
  /// Helper sources and helper engines set up at the same time.
  pub helper_concurrency: usize,
}

impl Default for EngineSettings {
  fn default() -> Self {
    Self {
      handler_concurrency: 10,
      output_concurrency: 2,
      data_handler_init_concurrency: 20,
      output_init_concurrency: 2,
      helper_concurrency: 2,
    }
  }
}

impl EngineSettings {
  pub fn from_json_str(input: &str) -> SluiceResult<Self> {
    serde_json::from_str(input).map_err(|e| SluiceError::HandlerError {
      source: anyhow::Error::new(e).context("invalid engine settings"),
    })
  }
}
