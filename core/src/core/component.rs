// sluice/src/core/component.rs

//! The initialize half of the lifecycle, shared by every pluggable component.

use crate::core::settings::EngineSettings;
use crate::error::SluiceResult;
use crate::matching::MatchCompiler;
use async_trait::async_trait;

/// What a component may need while it initializes.
pub struct InitEnv<'a> {
  pub compiler: &'a dyn MatchCompiler,
  pub settings: &'a EngineSettings,
}

/// A pluggable part of an engine (source, data-handler, transformer, output).
///
/// `initialize` runs once per engine initialize and must leave the component
/// ready for the refresh stages: matchers compiled, stores allocated, helper
/// pipelines wired.
#[async_trait]
pub trait Component: Send + Sync {
  /// Short human-readable label used in logs and errors.
  fn label(&self) -> String;

  async fn initialize(&self, env: &InitEnv<'_>) -> SluiceResult<()>;
}
