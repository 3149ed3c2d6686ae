// sluice/src/transformer/mod.rs

//! Transformers: query the stores, build a result, hand it to outputs.

pub mod context;
pub mod definition;
pub mod lifecycle;

pub use context::{TransformerContext, TransformerState};
pub use definition::{Query, Transformer};
