// sluice/src/core/control.rs

//! Lifecycle states of an engine and the stages a refresh walks through.

use std::fmt;

/// Where an `Engine` is in its two-phase lifecycle.
///
/// `Created -> Initializing -> Initialized -> Refreshing -> Idle`, and then
/// `Idle -> Refreshing -> Idle` for every further refresh.
///
/// A refresh initializes everything as its first stage, so `refresh` on a
/// `Created` engine goes straight to `Refreshing`. `initialize` is refused
/// while the engine is `Refreshing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
  /// Constructed; nothing has been initialized yet.
  Created,
  /// `initialize` is running.
  Initializing,
  /// `initialize` finished successfully and no refresh has run yet.
  Initialized,
  /// A refresh cycle is in flight.
  Refreshing,
  /// The last refresh cycle has settled, successfully or not.
  Idle,
}

/// The serial stages of one refresh cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Initialize,
  RefreshSources,
  RunDataHandlers,
  RunTransformers,
}

impl Stage {
  pub const ALL: [Stage; 4] = [
    Stage::Initialize,
    Stage::RefreshSources,
    Stage::RunDataHandlers,
    Stage::RunTransformers,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Stage::Initialize => "initialize",
      Stage::RefreshSources => "refresh_sources",
      Stage::RunDataHandlers => "run_data_handlers",
      Stage::RunTransformers => "run_transformers",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
