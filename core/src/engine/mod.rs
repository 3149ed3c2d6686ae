// sluice/src/engine/mod.rs

//! The engine: owner and driver of every other component.

pub mod definition;
pub mod lifecycle;

pub use definition::{Engine, EngineConfig};
