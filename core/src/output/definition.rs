// sluice/src/output/definition.rs

use crate::core::component::{Component, InitEnv};
use crate::core::hooks::{hook, run_optional, Hook};
use crate::core::shared::{Fields, Shared};
use crate::error::{SluiceError, SluiceResult};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use tracing::{event, Level};

/// Receives the data produced by a transformer run.
///
/// Each output gets its own copy of the data. An output without an execute
/// hook is skipped.
pub struct Output {
  pub(crate) name: Option<String>,
  pub(crate) state: Shared<Fields>,
  pub(crate) initialize: Option<Hook<Shared<Fields>>>,
  pub(crate) execute: Option<Hook<Value>>,
}

impl Output {
  pub fn new() -> Self {
    Self {
      name: None,
      state: Shared::default(),
      initialize: None,
      execute: None,
    }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn with_field(self, name: impl Into<String>, value: Value) -> Self {
    self.state.write().insert(name.into(), value);
    self
  }

  pub fn on_initialize<F, Fut, E>(mut self, handler_fn: F) -> Self
  where
    F: Fn(Shared<Fields>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    self.initialize = Some(hook(handler_fn));
    self
  }

  pub fn on_execute<F, Fut, E>(mut self, handler_fn: F) -> Self
  where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    self.execute = Some(hook(handler_fn));
    self
  }

  pub fn state(&self) -> Shared<Fields> {
    self.state.clone()
  }

  pub fn has_execute(&self) -> bool {
    self.execute.is_some()
  }

  /// Hands `data` to the execute hook, if there is one.
  pub async fn execute(&self, data: Value) -> SluiceResult<()> {
    match &self.execute {
      Some(execute) => execute(data).await,
      None => {
        event!(Level::TRACE, output = %self.label(), "No execute hook, skipping.");
        Ok(())
      }
    }
  }
}

impl Default for Output {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Component for Output {
  fn label(&self) -> String {
    match &self.name {
      Some(name) => format!("output '{}'", name),
      None => "output".to_string(),
    }
  }

  async fn initialize(&self, _env: &InitEnv<'_>) -> SluiceResult<()> {
    run_optional(self.initialize.as_ref(), self.state.clone()).await
  }
}

impl fmt::Debug for Output {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Output")
      .field("name", &self.name)
      .field("initialize_present", &self.initialize.is_some())
      .field("execute_present", &self.execute.is_some())
      .finish()
  }
}
