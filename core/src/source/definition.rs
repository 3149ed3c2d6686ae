// sluice/src/source/definition.rs

//! Contains the `Source` struct, its context, and the methods used to build one.

use crate::core::hooks::{hook, Hook};
use crate::core::shared::{Fields, Shared};
use crate::error::SluiceError;
use crate::source::store::Store;
use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Name of the local namespace under which helper sources are exposed.
pub const SOURCES_NAMESPACE: &str = "sources";

/// Explicit context handed to every source hook.
#[derive(Debug)]
pub struct SourceState {
  title: String,
  pub fields: Fields,
  store: Store,
  sources: Option<Vec<(String, Store)>>,
}

pub type SourceContext = Shared<SourceState>;

impl SourceState {
  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn store(&self) -> &Store {
    &self.store
  }

  pub fn field(&self, name: &str) -> Option<&Value> {
    self.fields.get(name)
  }

  pub fn set_field(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
    self.fields.insert(name.into(), value)
  }

  /// Store of the helper source called `title`, once helpers are initialized.
  pub fn helper(&self, title: &str) -> Option<&Store> {
    self
      .sources
      .as_ref()?
      .iter()
      .find(|(t, _)| t == title)
      .map(|(_, store)| store)
  }

  /// The `sources` namespace, if this source declares helpers.
  pub fn helpers(&self) -> Option<&[(String, Store)]> {
    self.sources.as_deref()
  }

  pub(crate) fn attach_store(&mut self, store: Store) {
    self.store = store;
  }

  pub(crate) fn attach_namespace(&mut self, namespace: Vec<(String, Store)>) {
    self.sources = Some(namespace);
  }
}

/// A named provider of entries.
///
/// Every hook is optional, but a source without a refresh hook never produces
/// data and cannot be refreshed on its own.
pub struct Source {
  pub(crate) title: String,
  pub(crate) context: SourceContext,
  pub(crate) initialize: Option<Hook<SourceContext>>,
  pub(crate) before: Option<Hook<SourceContext>>,
  pub(crate) refresh: Option<Hook<SourceContext, Value>>,
  pub(crate) after: Option<Hook<SourceContext>>,
  pub(crate) helpers: Vec<Source>,
}

impl Source {
  pub fn new(title: impl Into<String>) -> Self {
    let title = title.into();
    Self {
      context: Shared::new(SourceState {
        title: title.clone(),
        fields: Fields::new(),
        store: Store::new(),
        sources: None,
      }),
      title,
      initialize: None,
      before: None,
      refresh: None,
      after: None,
      helpers: Vec::new(),
    }
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn context(&self) -> SourceContext {
    self.context.clone()
  }

  /// The store currently attached to this source.
  pub fn store(&self) -> Store {
    self.context.read().store.clone()
  }

  pub fn has_refresh(&self) -> bool {
    self.refresh.is_some()
  }

  pub fn helpers(&self) -> &[Source] {
    &self.helpers
  }

  pub fn with_field(self, name: impl Into<String>, value: Value) -> Self {
    self.context.write().set_field(name, value);
    self
  }

  pub fn with_helper(mut self, helper: Source) -> Self {
    self.helpers.push(helper);
    self
  }

  pub fn on_initialize<F, Fut, E>(mut self, handler_fn: F) -> Self
  where
    F: Fn(SourceContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    self.initialize = Some(hook(handler_fn));
    self
  }

  pub fn on_before<F, Fut, E>(mut self, handler_fn: F) -> Self
  where
    F: Fn(SourceContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    self.before = Some(hook(handler_fn));
    self
  }

  /// Registers the refresh hook. Only a JSON array is accepted as new store
  /// contents; any other value leaves the store as it was.
  pub fn on_refresh<F, Fut, E>(mut self, handler_fn: F) -> Self
  where
    F: Fn(SourceContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    self.refresh = Some(hook(handler_fn));
    self
  }

  pub fn on_after<F, Fut, E>(mut self, handler_fn: F) -> Self
  where
    F: Fn(SourceContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<SluiceError> + Send + 'static,
  {
    self.after = Some(hook(handler_fn));
    self
  }
}

impl fmt::Debug for Source {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Source")
      .field("title", &self.title)
      .field("initialize_present", &self.initialize.is_some())
      .field("before_present", &self.before.is_some())
      .field("refresh_present", &self.refresh.is_some())
      .field("after_present", &self.after.is_some())
      .field("helpers", &self.helpers)
      .finish()
  }
}
