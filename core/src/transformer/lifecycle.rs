// sluice/src/transformer/lifecycle.rs

//! Initialize and run for a single transformer.

use crate::core::component::{Component, InitEnv};
use crate::core::hooks::run_optional;
use crate::core::settings::EngineSettings;
use crate::core::shared::{Entry, Shared};
use crate::error::{SluiceError, SluiceResult};
use crate::output::ResultSink;
use crate::schedule::{each_batch, each_serial, parallel};
use crate::source::store::Store;
use crate::transformer::definition::Transformer;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{event, instrument, span, Instrument, Level};

impl Transformer {
  fn compile_queries(&self, env: &InitEnv<'_>) -> SluiceResult<()> {
    let mut queries = self.queries.write();
    for query in queries.iter_mut() {
      if let Some(matcher) = query.matcher.as_mut() {
        matcher.compile(env.compiler)?;
      }
    }
    event!(Level::TRACE, num_queries = queries.len(), "Queries compiled.");
    Ok(())
  }

  // Checks the whole helper set before touching anything, so a bad
  // declaration leaves the context exactly as it was.
  fn validate_helpers(&self) -> SluiceResult<()> {
    let reserved = self.reserved.lock();
    let state = self.context.read();
    let mut seen = HashSet::new();

    for (name, engine) in &self.helpers {
      if !seen.insert(name.as_str()) {
        return Err(SluiceError::DuplicateHelper {
          transformer: self.label(),
          name: name.clone(),
        });
      }
      if state.fields.contains_key(name) && !reserved.contains(name) {
        return Err(SluiceError::HelperFieldCollision {
          transformer: self.label(),
          name: name.clone(),
        });
      }
      if engine.transformers.is_empty() {
        return Err(SluiceError::HelperWithoutTransformer { name: name.clone() });
      }
    }
    Ok(())
  }

  #[instrument(name = "Transformer::wire_helpers", skip_all, fields(transformer = %self.label(), num_helpers = self.helpers.len()), err(Display))]
  async fn wire_helpers(&self, env: &InitEnv<'_>) -> SluiceResult<()> {
    if self.helpers.is_empty() {
      return Ok(());
    }
    self.validate_helpers()?;

    for (name, engine) in &self.helpers {
      if !self.reserved.lock().insert(name.clone()) {
        event!(Level::TRACE, helper = %name, "Helper already wired.");
        continue;
      }
      self.context.write().set_field(name.clone(), Value::Object(Map::new()));
      engine.redirect_result(ResultSink::new(self.context.clone(), name.clone()));
      event!(Level::DEBUG, helper = %name, "Helper result redirected.");
    }

    each_batch(&self.helpers, env.settings.helper_concurrency, |(_, engine)| engine.initialize()).await
  }

  /// Initializes every output of this transformer, at most
  /// `output_init_concurrency` at a time.
  pub(crate) async fn initialize_outputs(&self, env: &InitEnv<'_>) -> SluiceResult<()> {
    let outputs = self.outputs();
    each_batch(outputs.iter(), env.settings.output_init_concurrency, |output| output.initialize(env)).await
  }

  /// Rebuilds the query buckets and the all-entries view from `stores`.
  pub(crate) fn gather(&self, stores: &[(String, Store)]) -> SluiceResult<()> {
    let selected = match &self.sources {
      Some(titles) => titles
        .iter()
        .map(|title| {
          stores
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, store)| store)
            .ok_or_else(|| SluiceError::UnknownSource {
              transformer: self.label(),
              title: title.clone(),
            })
        })
        .collect::<SluiceResult<Vec<&Store>>>()?,
      None => stores.iter().map(|(_, store)| store).collect(),
    };

    let predicates = self
      .queries
      .read()
      .iter()
      .map(|query| Ok((query.name.clone(), query.predicate(|| format!("query '{}' of {}", query.name, self.label()))?)))
      .collect::<SluiceResult<Vec<_>>>()?;

    let buckets = predicates
      .into_iter()
      .map(|(name, predicate)| {
        let found: Vec<Entry> = selected.iter().flat_map(|store| store.find(predicate.as_ref())).collect();
        (name, found)
      })
      .collect::<Vec<_>>();
    let entries: Vec<Entry> = selected.iter().flat_map(|store| store.entries()).collect();

    event!(
      Level::DEBUG,
      num_sources = selected.len(),
      num_entries = entries.len(),
      num_buckets = buckets.len(),
      "Entries gathered."
    );
    self.context.write().set_scratch(buckets, entries);
    Ok(())
  }

  /// One full run: helper engines, gather, preprocessors, execute,
  /// postprocessors, then outputs.
  pub(crate) fn run<'a>(&'a self, stores: &'a [(String, Store)], settings: &'a EngineSettings) -> BoxFuture<'a, SluiceResult<()>> {
    async move {
      each_serial(&self.helpers, |(name, engine)| {
        event!(Level::DEBUG, helper = %name, "Running helper engine.");
        engine.run_transformers()
      })
      .await?;

      self.gather(stores)?;

      each_serial(&self.preprocessors, |preprocess| preprocess(self.context.clone())).await?;

      let produced = Shared::new((self.execute)(self.context.clone()).await?);
      each_serial(&self.postprocessors, |postprocess| postprocess(produced.clone())).await?;

      let outputs = self.outputs();
      if outputs.is_empty() {
        event!(Level::TRACE, "No outputs configured.");
        return Ok(());
      }
      let data = produced.snapshot();
      each_batch(outputs.iter(), settings.output_concurrency, |output| output.execute(data.clone())).await
    }
    .map(|result| {
      if let Err(e) = &result {
        event!(Level::ERROR, error = %e, "Transformer run failed.");
      }
      result
    })
    .instrument(span!(Level::INFO, "transformer_run", transformer = %self.label()))
    .boxed()
  }
}

#[async_trait]
impl Component for Transformer {
  fn label(&self) -> String {
    match &self.name {
      Some(name) => format!("transformer '{}'", name),
      None => format!("transformer #{}", self.position),
    }
  }

  async fn initialize(&self, env: &InitEnv<'_>) -> SluiceResult<()> {
    parallel(vec![
      run_optional(self.initialize.as_ref(), self.context.clone()).boxed(),
      async move { self.compile_queries(env) }.boxed(),
      self.wire_helpers(env).boxed(),
    ])
    .await
  }
}
