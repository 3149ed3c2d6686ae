// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::Value;
use sluice::{Output, SluiceError, Source};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Test hook failed: {0}")]
  Hook(String),

  #[error("Test refresh failed: {0}")]
  Refresh(String),
}

impl From<TestError> for SluiceError {
  fn from(err: TestError) -> Self {
    SluiceError::HandlerError {
      source: anyhow::Error::new(err),
    }
  }
}

/// Digs the `TestError` back out of a `HandlerError`.
pub fn test_error(err: &SluiceError) -> Option<&TestError> {
  match err {
    SluiceError::HandlerError { source } => source.downcast_ref::<TestError>(),
    _ => None,
  }
}

// --- Common Component Creators ---

/// A source whose refresh always yields `entries`.
pub fn static_source(title: &str, entries: Value) -> Source {
  Source::new(title).on_refresh(move |_ctx| {
    let entries = entries.clone();
    async move { Ok::<Value, TestError>(entries) }
  })
}

/// A source whose refresh always fails with `message`.
pub fn failing_source(title: &str, message: &'static str) -> Source {
  Source::new(title).on_refresh(move |_ctx| async move { Err::<Value, TestError>(TestError::Refresh(message.to_string())) })
}

/// An output that appends every result it receives to `sink`.
pub fn collecting_output(sink: Arc<Mutex<Vec<Value>>>) -> Output {
  Output::new().on_execute(move |data| {
    let sink = sink.clone();
    async move {
      sink.lock().push(data);
      Ok::<(), TestError>(())
    }
  })
}

pub fn new_sink() -> Arc<Mutex<Vec<Value>>> {
  Arc::new(Mutex::new(Vec::new()))
}

/// Tracks how many calls are running right now and the highest it ever got.
#[derive(Debug, Default)]
pub struct InFlight {
  current: AtomicUsize,
  peak: AtomicUsize,
}

impl InFlight {
  pub fn enter(&self) {
    let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
    self.peak.fetch_max(now, Ordering::SeqCst);
  }

  pub fn leave(&self) {
    self.current.fetch_sub(1, Ordering::SeqCst);
  }

  pub fn peak(&self) -> usize {
    self.peak.load(Ordering::SeqCst)
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counters for checking execution counts ---
pub static HOOK_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));
pub static OUTPUT_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  HOOK_EXEC_COUNTER.store(0, Ordering::SeqCst);
  OUTPUT_EXEC_COUNTER.store(0, Ordering::SeqCst);
}
