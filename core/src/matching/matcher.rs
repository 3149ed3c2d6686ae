// sluice/src/matching/matcher.rs

use crate::core::shared::Entry;
use crate::error::{SluiceError, SluiceResult};
use crate::matching::compiler::{MatchCompiler, Predicate};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A match condition as configured: either already callable, or a declarative
/// spec waiting to be compiled during initialize.
#[derive(Clone)]
pub enum Matcher {
  Predicate(Predicate),
  Spec(Value),
}

impl Matcher {
  pub fn predicate(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
    Matcher::Predicate(Arc::new(f))
  }

  pub fn spec(spec: Value) -> Self {
    Matcher::Spec(spec)
  }

  /// Replaces a spec with its compiled predicate. Already-callable matchers are left alone.
  pub fn compile(&mut self, compiler: &dyn MatchCompiler) -> SluiceResult<()> {
    if let Matcher::Spec(spec) = self {
      let compiled = compiler.compile(spec)?;
      *self = Matcher::Predicate(compiled);
    }
    Ok(())
  }

  pub fn is_compiled(&self) -> bool {
    matches!(self, Matcher::Predicate(_))
  }

  /// The compiled predicate, or `UncompiledMatcher` naming `owner`.
  pub fn compiled(&self, owner: impl FnOnce() -> String) -> SluiceResult<Predicate> {
    match self {
      Matcher::Predicate(p) => Ok(p.clone()),
      Matcher::Spec(_) => Err(SluiceError::UncompiledMatcher { owner: owner() }),
    }
  }
}

impl fmt::Debug for Matcher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Matcher::Predicate(_) => f.write_str("Matcher::Predicate(..)"),
      Matcher::Spec(spec) => f.debug_tuple("Matcher::Spec").field(spec).finish(),
    }
  }
}

impl From<Value> for Matcher {
  fn from(spec: Value) -> Self {
    Matcher::Spec(spec)
  }
}

/// Evaluates `predicate` against an entry under a short read lock.
pub(crate) fn matches(predicate: &Predicate, entry: &Entry) -> bool {
  let guard = entry.read();
  predicate(&*guard)
}
