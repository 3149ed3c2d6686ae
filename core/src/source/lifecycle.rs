// sluice/src/source/lifecycle.rs

//! Initialize and refresh for a single source, including its helper sources.

use crate::core::component::{Component, InitEnv};
use crate::core::hooks::{run_optional, Hook};
use crate::error::{SluiceError, SluiceResult};
use crate::schedule::{each_batch, serial};
use crate::source::definition::{Source, SourceContext, SOURCES_NAMESPACE};
use crate::source::store::{value_kind, Store};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{event, span, Instrument, Level};

impl Source {
  /// Attaches a fresh, empty store to this source and returns a handle to it.
  pub(crate) fn allocate_store(&self) -> Store {
    let store = Store::new();
    self.context.write().attach_store(store.clone());
    store
  }

  // Everything initialize does after the store is attached: helper sources
  // first, then the source's own initialize hook.
  fn prepare<'a>(&'a self, env: &'a InitEnv<'a>) -> BoxFuture<'a, SluiceResult<()>> {
    async move {
      if !self.helpers.is_empty() {
        self.attach_helpers()?;
        each_batch(&self.helpers, env.settings.helper_concurrency, |helper| helper.prepare(env)).await?;
      }

      if self.initialize.is_none() {
        event!(Level::TRACE, "No initialize hook, skipping.");
      }
      run_optional(self.initialize.as_ref(), self.context.clone()).await
    }
    .instrument(span!(Level::DEBUG, "source_initialize", title = %self.title))
    .boxed()
  }

  // Validates the helper set, then exposes a freshly allocated store for each
  // helper under the `sources` namespace. Nothing is mutated on error.
  fn attach_helpers(&self) -> SluiceResult<()> {
    if self.context.read().fields.contains_key(SOURCES_NAMESPACE) {
      event!(Level::ERROR, "Source defines a 'sources' field and declares helpers.");
      return Err(SluiceError::SourcesNamespaceCollision {
        title: self.title.clone(),
      });
    }

    let mut seen = HashSet::new();
    for helper in &self.helpers {
      if !seen.insert(helper.title.as_str()) {
        return Err(SluiceError::DuplicateHelperSource {
          title: self.title.clone(),
          helper: helper.title.clone(),
        });
      }
    }

    let namespace = self
      .helpers
      .iter()
      .map(|helper| (helper.title.clone(), helper.allocate_store()))
      .collect();
    self.context.write().attach_namespace(namespace);
    event!(Level::DEBUG, num_helpers = self.helpers.len(), "Helper sources attached.");
    Ok(())
  }

  /// Refreshes this source: helper sources first (those that can refresh),
  /// then `before`, `refresh` and `after`, stopping at the first failure.
  ///
  /// `after` therefore only runs when the refresh hook itself succeeded.
  pub fn refresh(&self) -> BoxFuture<'_, SluiceResult<()>> {
    async move {
      let refresh_fn = self.refresh.as_ref().ok_or_else(|| {
        event!(Level::ERROR, "Source has no refresh hook.");
        SluiceError::MissingRefresh {
          title: self.title.clone(),
        }
      })?;

      for helper in &self.helpers {
        if helper.has_refresh() {
          helper.refresh().await?;
        }
      }

      let result = serial(vec![
        run_optional(self.before.as_ref(), self.context.clone()).boxed(),
        self.pull(refresh_fn).boxed(),
        run_optional(self.after.as_ref(), self.context.clone()).boxed(),
      ])
      .await;

      if let Err(e) = &result {
        event!(Level::ERROR, error = %e, "Source refresh failed.");
      }
      result
    }
    .instrument(span!(Level::INFO, "source_refresh", title = %self.title))
    .boxed()
  }

  // Runs the refresh hook and, if it produced a list, swaps it into the store.
  async fn pull(&self, refresh_fn: &Hook<SourceContext, Value>) -> SluiceResult<()> {
    let output = refresh_fn(self.context.clone()).await?;
    match output {
      Value::Array(_) => {
        let store = self.store();
        store.assign(output)?;
        event!(Level::DEBUG, num_entries = store.len(), "Store replaced.");
      }
      other => {
        event!(
          Level::DEBUG,
          produced = value_kind(&other),
          "Refresh produced no list of entries; store left untouched."
        );
      }
    }
    Ok(())
  }
}

#[async_trait]
impl Component for Source {
  fn label(&self) -> String {
    format!("source '{}'", self.title)
  }

  async fn initialize(&self, env: &InitEnv<'_>) -> SluiceResult<()> {
    self.allocate_store();
    self.prepare(env).await
  }
}
