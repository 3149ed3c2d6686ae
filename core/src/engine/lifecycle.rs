// sluice/src/engine/lifecycle.rs

//! The two phases of an engine: initialize, then any number of refreshes.
//!
//! Stage methods return boxed futures because helper engines recurse through
//! them.

use crate::core::component::Component;
use crate::core::control::{EngineState, Stage};
use crate::data_handler::dispatch::dispatch;
use crate::engine::definition::Engine;
use crate::error::{SluiceError, SluiceResult};
use crate::schedule::{each_batch, each_parallel, each_serial, parallel, serial};
use crate::source::Source;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use tracing::{event, instrument, span, Instrument, Level};

impl Engine {
  /// Prepares every component: sources, data-handlers, transformers and
  /// outputs are initialized side by side.
  ///
  /// On failure the engine goes back to `Created` and may be initialized again.
  /// Fails with `RefreshInProgress` while a refresh cycle is running; the cycle
  /// initializes everything itself.
  #[instrument(
    name = "Engine::initialize",
    skip_all,
    fields(
      num_sources = self.sources.len(),
      num_data_handlers = self.data_handlers.len(),
      num_transformers = self.transformers.len(),
    ),
    err(Display)
  )]
  pub async fn initialize(&self) -> SluiceResult<()> {
    {
      let mut state = self.state.lock();
      if *state == EngineState::Refreshing {
        event!(Level::WARN, "Initialize requested while a refresh is running.");
        return Err(SluiceError::RefreshInProgress);
      }
      *state = EngineState::Initializing;
    }
    let result = self.initialize_all().await;
    match &result {
      Ok(()) => {
        self.set_state(EngineState::Initialized);
        event!(Level::DEBUG, "Engine initialized.");
      }
      Err(_) => self.set_state(EngineState::Created),
    }
    result
  }

  /// Runs one refresh cycle: initialize, refresh sources, run data-handlers,
  /// run transformers. The first failing stage aborts the cycle.
  ///
  /// Only one cycle may be in flight per engine; a second call made while one
  /// is running fails with `RefreshInProgress`. The engine is back to `Idle`
  /// once the cycle settles or its future is dropped.
  #[instrument(name = "Engine::refresh", skip_all, err(Display))]
  pub async fn refresh(&self) -> SluiceResult<()> {
    {
      let mut state = self.state.lock();
      if *state == EngineState::Refreshing {
        event!(Level::WARN, "Refresh requested while another one is running.");
        return Err(SluiceError::RefreshInProgress);
      }
      *state = EngineState::Refreshing;
    }
    let _idle_on_exit = IdleOnDrop(self);

    let result = serial(Stage::ALL.iter().map(|stage| self.run_stage(*stage)).collect()).await;

    if result.is_ok() {
      event!(Level::INFO, "Refresh cycle complete.");
    }
    result
  }

  fn run_stage(&self, stage: Stage) -> BoxFuture<'_, SluiceResult<()>> {
    let step = match stage {
      Stage::Initialize => self.initialize_all(),
      Stage::RefreshSources => self.refresh_sources(),
      Stage::RunDataHandlers => self.run_data_handlers(),
      Stage::RunTransformers => self.run_transformers(),
    };
    async move {
      event!(Level::DEBUG, "Stage starting.");
      let result = step.await;
      match &result {
        Ok(()) => event!(Level::DEBUG, "Stage finished."),
        Err(e) => event!(Level::ERROR, error = %e, "Stage failed, skipping the rest of the cycle."),
      }
      result
    }
    .instrument(span!(Level::INFO, "engine_stage", stage = %stage))
    .boxed()
  }

  pub(crate) fn initialize_all(&self) -> BoxFuture<'_, SluiceResult<()>> {
    parallel(vec![
      self.initialize_sources(),
      self.initialize_data_handlers(),
      self.initialize_transformers(),
      self.initialize_outputs(),
    ])
    .boxed()
  }

  /// Initializes every source and registers its store under its title.
  ///
  /// Titles must be unique. Stores are registered in configuration order once
  /// all sources have settled, even if one of them failed.
  pub fn initialize_sources(&self) -> BoxFuture<'_, SluiceResult<()>> {
    async move {
      let mut seen = HashSet::new();
      for source in &self.sources {
        if !seen.insert(source.title()) {
          event!(Level::ERROR, title = %source.title(), "Duplicate source title.");
          return Err(SluiceError::DuplicateSource {
            title: source.title().to_string(),
          });
        }
      }

      let env = self.env();
      let result = each_parallel(&self.sources, |source| source.initialize(&env)).await;

      *self.stores.write() = self
        .sources
        .iter()
        .map(|source| (source.title().to_string(), source.store()))
        .collect();
      result
    }
    .instrument(span!(Level::DEBUG, "initialize_sources"))
    .boxed()
  }

  pub fn initialize_data_handlers(&self) -> BoxFuture<'_, SluiceResult<()>> {
    async move {
      let env = self.env();
      each_batch(&self.data_handlers, self.settings.data_handler_init_concurrency, |handler| handler.initialize(&env)).await
    }
    .instrument(span!(Level::DEBUG, "initialize_data_handlers"))
    .boxed()
  }

  pub fn initialize_transformers(&self) -> BoxFuture<'_, SluiceResult<()>> {
    async move {
      let env = self.env();
      each_parallel(&self.transformers, |transformer| transformer.initialize(&env)).await
    }
    .instrument(span!(Level::DEBUG, "initialize_transformers"))
    .boxed()
  }

  /// Initializes outputs: a few transformers at a time, and within each
  /// transformer a few outputs at a time.
  pub fn initialize_outputs(&self) -> BoxFuture<'_, SluiceResult<()>> {
    async move {
      let env = self.env();
      each_batch(&self.transformers, self.settings.output_init_concurrency, |transformer| {
        transformer.initialize_outputs(&env)
      })
      .await
    }
    .instrument(span!(Level::DEBUG, "initialize_outputs"))
    .boxed()
  }

  /// Refreshes every source that has a refresh hook, one after the other, while
  /// helper engines refresh their own sources alongside.
  pub fn refresh_sources(&self) -> BoxFuture<'_, SluiceResult<()>> {
    let refreshable: Vec<&Source> = self.sources.iter().filter(|source| source.has_refresh()).collect();
    let own = each_serial(refreshable, |source| source.refresh());
    let helpers = each_serial(self.helper_engines(), |helper| helper.refresh_sources());
    parallel(vec![own.boxed(), helpers.boxed()])
      .instrument(span!(Level::DEBUG, "refresh_sources"))
      .boxed()
  }

  /// Refreshes the single source called `title`, helpers included.
  pub fn refresh_source<'a>(&'a self, title: &str) -> BoxFuture<'a, SluiceResult<()>> {
    match self.sources.iter().find(|source| source.title() == title) {
      Some(source) => source.refresh(),
      None => {
        event!(Level::ERROR, title = %title, "Refresh requested for an unknown source.");
        let err = SluiceError::NoSuchSource { title: title.to_string() };
        async move { Err(err) }.boxed()
      }
    }
  }

  /// Applies the data-handlers to every stored entry, while helper engines do
  /// the same with theirs.
  pub fn run_data_handlers(&self) -> BoxFuture<'_, SluiceResult<()>> {
    async move {
      let stores = self.stores();
      parallel(vec![
        dispatch(&self.data_handlers, &stores, self.settings.handler_concurrency).boxed(),
        each_serial(self.helper_engines(), |helper| helper.run_data_handlers()).boxed(),
      ])
      .await
    }
    .instrument(span!(Level::DEBUG, "run_data_handlers"))
    .boxed()
  }

  /// Runs every transformer, one after the other, in configuration order.
  pub fn run_transformers(&self) -> BoxFuture<'_, SluiceResult<()>> {
    async move {
      let stores = self.stores();
      each_serial(&self.transformers, |transformer| transformer.run(&stores, &self.settings)).await
    }
    .instrument(span!(Level::DEBUG, "run_transformers"))
    .boxed()
  }
}

// Puts the engine back to `Idle` when a refresh ends, including when the
// refresh future is dropped mid-cycle.
struct IdleOnDrop<'a>(&'a Engine);

impl Drop for IdleOnDrop<'_> {
  fn drop(&mut self) {
    self.0.set_state(EngineState::Idle);
  }
}
