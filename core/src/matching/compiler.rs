// sluice/src/matching/compiler.rs

//! The declarative-match compiler contract and the compiler shipped with the crate.

use crate::error::{SluiceError, SluiceResult};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A pure boolean test over one entry. Safe to call repeatedly and concurrently.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Turns a declarative constraint object into a [`Predicate`].
///
/// The engine treats implementations as opaque: it calls `compile` once per
/// matcher during initialize and only ever uses the returned predicate.
pub trait MatchCompiler: Send + Sync {
  fn compile(&self, spec: &Value) -> SluiceResult<Predicate>;
}

/// Default compiler over a small closed set of constraint kinds.
///
/// ```text
/// { "name":  { "equals": "BIGWIG" } }          equality
/// { "name":  { "typeOf": "string" } }          type check
/// { "meta":  { "author": { "equals": "x" } } } nested field
/// ```
///
/// Keys on one level are AND-ed together; `{}` matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintCompiler;

impl MatchCompiler for ConstraintCompiler {
  fn compile(&self, spec: &Value) -> SluiceResult<Predicate> {
    let constraint = Constraint::parse(spec)?;
    Ok(Arc::new(move |entry: &Value| constraint.test(Some(entry))))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
  String,
  Number,
  Boolean,
  Object,
  Array,
  Null,
  Undefined,
}

impl Kind {
  fn parse(name: &str) -> Option<Kind> {
    match name {
      "string" => Some(Kind::String),
      "number" => Some(Kind::Number),
      "boolean" => Some(Kind::Boolean),
      "object" => Some(Kind::Object),
      "array" => Some(Kind::Array),
      "null" => Some(Kind::Null),
      "undefined" => Some(Kind::Undefined),
      _ => None,
    }
  }

  fn of(value: Option<&Value>) -> Kind {
    match value {
      None => Kind::Undefined,
      Some(Value::Null) => Kind::Null,
      Some(Value::Bool(_)) => Kind::Boolean,
      Some(Value::Number(_)) => Kind::Number,
      Some(Value::String(_)) => Kind::String,
      Some(Value::Array(_)) => Kind::Array,
      Some(Value::Object(_)) => Kind::Object,
    }
  }
}

#[derive(Debug, Clone)]
enum Constraint {
  Equals(Value),
  TypeOf(Kind),
  Field(String, Box<Constraint>),
  All(Vec<Constraint>),
}

impl Constraint {
  fn parse(spec: &Value) -> SluiceResult<Constraint> {
    match spec {
      Value::Object(map) => Self::parse_level(map),
      other => Err(invalid(format!("expected an object, got {}", other))),
    }
  }

  fn parse_level(map: &Map<String, Value>) -> SluiceResult<Constraint> {
    let mut parts = Vec::with_capacity(map.len());
    for (key, arg) in map {
      let part = match key.as_str() {
        "equals" => Constraint::Equals(arg.clone()),
        "typeOf" => {
          let name = arg
            .as_str()
            .ok_or_else(|| invalid(format!("typeOf expects a string, got {}", arg)))?;
          let kind = Kind::parse(name).ok_or_else(|| invalid(format!("unknown type '{}'", name)))?;
          Constraint::TypeOf(kind)
        }
        field => Constraint::Field(field.to_string(), Box::new(Self::parse(arg)?)),
      };
      parts.push(part);
    }
    Ok(Constraint::All(parts))
  }

  // `value` is None when the field being tested does not exist.
  fn test(&self, value: Option<&Value>) -> bool {
    match self {
      Constraint::Equals(expected) => value == Some(expected),
      Constraint::TypeOf(kind) => Kind::of(value) == *kind,
      Constraint::Field(name, inner) => match value {
        Some(Value::Object(map)) => inner.test(map.get(name)),
        _ => false,
      },
      Constraint::All(parts) => parts.iter().all(|part| part.test(value)),
    }
  }
}

fn invalid(message: String) -> SluiceError {
  SluiceError::InvalidMatchSpec { message }
}
