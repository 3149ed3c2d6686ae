// sluice/src/transformer/definition.rs

//! Contains the `Transformer` struct and the builder methods used to assemble one.

use crate::core::hooks::{hook, Hook};
use crate::core::shared::Shared;
use crate::engine::Engine;
use crate::error::{SluiceError, SluiceResult};
use crate::matching::{Matcher, Predicate};
use crate::output::Output;
use crate::transformer::context::{TransformerContext, TransformerState};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A named selection of entries. Without a matcher the query takes every entry.
#[derive(Debug, Clone)]
pub struct Query {
  pub name: String,
  pub matcher: Option<Matcher>,
}

impl Query {
  pub fn new(name: impl Into<String>, matcher: impl Into<Matcher>) -> Self {
    Self {
      name: name.into(),
      matcher: Some(matcher.into()),
    }
  }

  pub fn unfiltered(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      matcher: None,
    }
  }

  pub(crate) fn predicate(&self, owner: impl FnOnce() -> String) -> SluiceResult<Option<Predicate>> {
    self.matcher.as_ref().map(|m| m.compiled(owner)).transpose()
  }
}

/// Builds a data result from the entries of one or more sources and hands it
/// to its outputs.
///
/// A run goes: helper engines, gather, preprocessors, execute, postprocessors,
/// outputs. Helper engines are nested engines whose first transformer writes its
/// result into a field of this transformer's context instead of to outputs.
pub struct Transformer {
  pub(crate) name: Option<String>,
  pub(crate) position: usize,
  pub(crate) context: TransformerContext,
  pub(crate) queries: RwLock<Vec<Query>>,
  pub(crate) sources: Option<Vec<String>>,
  pub(crate) initialize: Option<Hook<TransformerContext>>,
  pub(crate) preprocessors: Vec<Hook<TransformerContext>>,
  pub(crate) execute: Hook<TransformerContext, Value>,
  pub(crate) postprocessors: Vec<Hook<Shared<Value>>>,
  pub(crate) outputs: RwLock<Vec<Arc<Output>>>,
  pub(crate) helpers: Vec<(String, Engine)>,
  // Fields already handed to helper engines, so re-initializing does not trip
  // the collision check on our own reservations.
  pub(crate) reserved: Mutex<HashSet<String>>,
}

impl Transformer {
  pub fn new<F, Fut, E>(execute: F) -> Self
  where
    F: Fn(TransformerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    Self {
      name: None,
      position: 0,
      context: Shared::new(TransformerState::default()),
      queries: RwLock::new(Vec::new()),
      sources: None,
      initialize: None,
      preprocessors: Vec::new(),
      execute: hook(execute),
      postprocessors: Vec::new(),
      outputs: RwLock::new(Vec::new()),
      helpers: Vec::new(),
      reserved: Mutex::new(HashSet::new()),
    }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn with_query(self, name: impl Into<String>, matcher: impl Into<Matcher>) -> Self {
    self.queries.write().push(Query::new(name, matcher));
    self
  }

  pub fn with_unfiltered_query(self, name: impl Into<String>) -> Self {
    self.queries.write().push(Query::unfiltered(name));
    self
  }

  /// Restricts the transformer to the listed source titles, in that order.
  /// By default it reads every source of its engine.
  pub fn with_sources<I, S>(mut self, titles: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.sources = Some(titles.into_iter().map(Into::into).collect());
    self
  }

  pub fn with_field(self, name: impl Into<String>, value: Value) -> Self {
    self.context.write().set_field(name, value);
    self
  }

  pub fn with_output(self, output: Output) -> Self {
    self.outputs.write().push(Arc::new(output));
    self
  }

  /// Declares a helper engine whose result lands in the field `name`.
  pub fn with_helper(mut self, name: impl Into<String>, engine: Engine) -> Self {
    self.helpers.push((name.into(), engine));
    self
  }

  pub fn on_initialize<F, Fut, E>(mut self, handler_fn: F) -> Self
  where
    F: Fn(TransformerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    self.initialize = Some(hook(handler_fn));
    self
  }

  /// Preprocessors run in registration order, after gathering and before execute.
  pub fn with_preprocessor<F, Fut, E>(mut self, handler_fn: F) -> Self
  where
    F: Fn(TransformerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    self.preprocessors.push(hook(handler_fn));
    self
  }

  /// Postprocessors run in registration order on the produced data and may
  /// rewrite it in place.
  pub fn with_postprocessor<F, Fut, E>(mut self, handler_fn: F) -> Self
  where
    F: Fn(Shared<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    self.postprocessors.push(hook(handler_fn));
    self
  }

  pub fn context(&self) -> TransformerContext {
    self.context.clone()
  }

  pub fn queries(&self) -> Vec<Query> {
    self.queries.read().clone()
  }

  pub fn outputs(&self) -> Vec<Arc<Output>> {
    self.outputs.read().clone()
  }

  pub fn helper(&self, name: &str) -> Option<&Engine> {
    self.helpers.iter().find(|(n, _)| n == name).map(|(_, engine)| engine)
  }

  pub(crate) fn set_position(&mut self, position: usize) {
    self.position = position;
  }

  /// Swaps every output for `output`. Used to point a helper engine's first
  /// transformer at its parent.
  pub(crate) fn replace_outputs(&self, output: Output) {
    *self.outputs.write() = vec![Arc::new(output)];
  }
}

impl fmt::Debug for Transformer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Transformer")
      .field("name", &self.name)
      .field("position", &self.position)
      .field("queries", &*self.queries.read())
      .field("sources", &self.sources)
      .field("num_preprocessors", &self.preprocessors.len())
      .field("num_postprocessors", &self.postprocessors.len())
      .field("num_outputs", &self.outputs.read().len())
      .field("helpers", &self.helpers.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>())
      .finish()
  }
}
