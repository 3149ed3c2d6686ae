// src/lib.rs

//! Sluice: an ASYNC pluggable data-transformation pipeline engine for Rust.
//!
//! An [`Engine`] pulls entries from named [`Source`]s into shared stores,
//! mutates matching entries in place with [`DataHandler`]s, then lets each
//! [`Transformer`] query the stores, build a result and hand it to its
//! [`Output`]s. Features:
//!  - A two-phase lifecycle: initialize once, refresh as often as needed.
//!  - Declarative match specs compiled once by a pluggable [`MatchCompiler`].
//!  - Helper sources nested under a source, and helper engines nested under a
//!    transformer whose result lands in a field of the parent's context.
//!  - Bounded concurrency built from a handful of scheduling primitives
//!    ([`schedule`]) that never spawn tasks.

pub mod core;
pub mod data_handler;
pub mod engine;
pub mod error;
pub mod matching;
pub mod output;
pub mod schedule;
pub mod source;
pub mod transformer;

// --- Re-exports for the Public API ---

pub use crate::core::component::{Component, InitEnv};
pub use crate::core::control::{EngineState, Stage};
pub use crate::core::hooks::Hook;
pub use crate::core::settings::EngineSettings;
pub use crate::core::shared::{Entry, Fields, Shared};

pub use crate::data_handler::DataHandler;
pub use crate::engine::{Engine, EngineConfig};
pub use crate::matching::{ConstraintCompiler, MatchCompiler, Matcher, Predicate};
pub use crate::output::{Output, ResultSink};
pub use crate::source::{Source, SourceContext, SourceState, Store, SOURCES_NAMESPACE};
pub use crate::transformer::{Query, Transformer, TransformerContext, TransformerState};

pub use crate::error::{SluiceError, SluiceResult};
