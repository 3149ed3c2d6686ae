// sluice/src/matching/mod.rs

//! Match conditions shared by data-handlers and transformer queries.
//!
//! A condition is configured either as a callable predicate or as a declarative
//! JSON spec. Specs are compiled exactly once, during initialize, by a
//! [`MatchCompiler`]; the engine never looks inside them.

pub mod compiler;
pub mod matcher;

pub use compiler::{ConstraintCompiler, MatchCompiler, Predicate};
pub use matcher::Matcher;
