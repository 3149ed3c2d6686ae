// sluice/src/engine/definition.rs

//! Contains the `Engine` struct, its configuration, and read accessors.

use crate::core::component::InitEnv;
use crate::core::control::EngineState;
use crate::core::settings::EngineSettings;
use crate::data_handler::DataHandler;
use crate::matching::{ConstraintCompiler, MatchCompiler};
use crate::output::{Output, ResultSink};
use crate::source::{Source, Store};
use crate::transformer::Transformer;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use tracing::{event, Level};

/// Everything an engine is built from.
#[derive(Default)]
pub struct EngineConfig {
  pub sources: Vec<Source>,
  pub data_handlers: Vec<DataHandler>,
  pub transformers: Vec<Transformer>,
  pub settings: EngineSettings,
  /// Compiler for declarative match specs. Defaults to [`ConstraintCompiler`].
  pub compiler: Option<Arc<dyn MatchCompiler>>,
}

impl EngineConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_source(mut self, source: Source) -> Self {
    self.sources.push(source);
    self
  }

  pub fn with_data_handler(mut self, handler: DataHandler) -> Self {
    self.data_handlers.push(handler);
    self
  }

  pub fn with_transformer(mut self, transformer: Transformer) -> Self {
    self.transformers.push(transformer);
    self
  }

  pub fn with_settings(mut self, settings: EngineSettings) -> Self {
    self.settings = settings;
    self
  }

  pub fn with_compiler(mut self, compiler: Arc<dyn MatchCompiler>) -> Self {
    self.compiler = Some(compiler);
    self
  }
}

/// The top-level orchestrator: owns sources, data-handlers and transformers and
/// drives them through initialize and refresh.
///
/// An engine can also sit inside a transformer as a helper, in which case its
/// first transformer writes into a field of the parent transformer's context.
/// Helpers are owned by their parent, so a helper graph is always a tree.
pub struct Engine {
  pub(crate) sources: Vec<Source>,
  pub(crate) data_handlers: Vec<DataHandler>,
  pub(crate) transformers: Vec<Transformer>,
  pub(crate) stores: RwLock<Vec<(String, Store)>>,
  pub(crate) settings: EngineSettings,
  pub(crate) compiler: Arc<dyn MatchCompiler>,
  pub(crate) state: Mutex<EngineState>,
}

impl Engine {
  pub fn new(config: EngineConfig) -> Self {
    let EngineConfig {
      sources,
      data_handlers,
      mut transformers,
      settings,
      compiler,
    } = config;

    for (position, transformer) in transformers.iter_mut().enumerate() {
      transformer.set_position(position);
    }
    event!(
      Level::DEBUG,
      num_sources = sources.len(),
      num_data_handlers = data_handlers.len(),
      num_transformers = transformers.len(),
      "Engine created."
    );

    Self {
      sources,
      data_handlers,
      transformers,
      stores: RwLock::new(Vec::new()),
      settings,
      compiler: compiler.unwrap_or_else(|| Arc::new(ConstraintCompiler)),
      state: Mutex::new(EngineState::Created),
    }
  }

  pub fn state(&self) -> EngineState {
    *self.state.lock()
  }

  pub fn settings(&self) -> &EngineSettings {
    &self.settings
  }

  /// Store registered under `title`, once sources are initialized.
  pub fn store(&self, title: &str) -> Option<Store> {
    self
      .stores
      .read()
      .iter()
      .find(|(t, _)| t == title)
      .map(|(_, store)| store.clone())
  }

  /// Every registered store, in source configuration order.
  pub fn stores(&self) -> Vec<(String, Store)> {
    self.stores.read().clone()
  }

  pub fn sources(&self) -> &[Source] {
    &self.sources
  }

  pub fn source(&self, index: usize) -> Option<&Source> {
    self.sources.get(index)
  }

  pub fn data_handlers(&self) -> &[DataHandler] {
    &self.data_handlers
  }

  pub fn transformers(&self) -> &[Transformer] {
    &self.transformers
  }

  pub fn transformer(&self, index: usize) -> Option<&Transformer> {
    self.transformers.get(index)
  }

  pub(crate) fn env(&self) -> InitEnv<'_> {
    InitEnv {
      compiler: self.compiler.as_ref(),
      settings: &self.settings,
    }
  }

  pub(crate) fn set_state(&self, state: EngineState) {
    let mut current = self.state.lock();
    event!(Level::TRACE, from = ?*current, to = ?state, "Engine state change.");
    *current = state;
  }

  /// Points the first transformer's result at `sink`, dropping its outputs.
  pub(crate) fn redirect_result(&self, sink: ResultSink) {
    if let Some(first) = self.transformers.first() {
      first.replace_outputs(Output::from(sink));
    }
  }

  // Engines nested under this one's transformers, in transformer order.
  pub(crate) fn helper_engines(&self) -> impl Iterator<Item = &Engine> {
    self
      .transformers
      .iter()
      .flat_map(|transformer| transformer.helpers.iter().map(|(_, engine)| engine))
  }
}

impl fmt::Debug for Engine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Engine")
      .field("state", &*self.state.lock())
      .field("sources", &self.sources)
      .field("data_handlers", &self.data_handlers)
      .field("transformers", &self.transformers)
      .field("settings", &self.settings)
      .finish()
  }
}
