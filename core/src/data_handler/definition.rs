// sluice/src/data_handler/definition.rs

use crate::core::component::{Component, InitEnv};
use crate::core::hooks::{hook, run_optional, Hook};
use crate::core::shared::{Entry, Fields, Shared};
use crate::error::{SluiceError, SluiceResult};
use crate::matching::{Matcher, Predicate};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use tracing::{event, Level};

/// A match-then-mutate operation applied to individual entries across all sources.
pub struct DataHandler {
  pub(crate) name: Option<String>,
  pub(crate) matcher: RwLock<Matcher>,
  pub(crate) state: Shared<Fields>,
  pub(crate) initialize: Option<Hook<Shared<Fields>>>,
  pub(crate) execute: Hook<Entry>,
}

impl DataHandler {
  /// `execute` only ever sees entries for which `matcher` holds. It receives the
  /// shared entry itself, so writes land in the source's store.
  pub fn new<F, Fut, E>(matcher: impl Into<Matcher>, execute: F) -> Self
  where
    F: Fn(Entry) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    Self {
      name: None,
      matcher: RwLock::new(matcher.into()),
      state: Shared::default(),
      initialize: None,
      execute: hook(execute),
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

  /// Local state of this handler, as seen by its initialize hook.
  pub fn state(&self) -> Shared<Fields> {
    self.state.clone()
  }

  pub fn is_compiled(&self) -> bool {
    self.matcher.read().is_compiled()
  }

  pub(crate) fn predicate(&self) -> SluiceResult<Predicate> {
    self.matcher.read().compiled(|| self.label())
  }
}

#[async_trait]
impl Component for DataHandler {
  fn label(&self) -> String {
    match &self.name {
      Some(name) => format!("data-handler '{}'", name),
      None => "data-handler".to_string(),
    }
  }

  async fn initialize(&self, env: &InitEnv<'_>) -> SluiceResult<()> {
    self.matcher.write().compile(env.compiler)?;
    event!(Level::TRACE, handler = %self.label(), "Matcher compiled.");
    run_optional(self.initialize.as_ref(), self.state.clone()).await
  }
}

impl fmt::Debug for DataHandler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DataHandler")
      .field("name", &self.name)
      .field("matcher", &*self.matcher.read())
      .field("initialize_present", &self.initialize.is_some())
      .finish()
  }
}
