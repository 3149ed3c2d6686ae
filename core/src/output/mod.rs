// sluice/src/output/mod.rs

//! Outputs: consumers of the data a transformer produces.

pub mod definition;
pub mod sink;

pub use definition::Output;
pub use sink::ResultSink;
