// sluice/src/data_handler/mod.rs

//! Data-handlers: match-then-mutate operations over individual entries.

pub mod definition;
pub(crate) mod dispatch;

pub use definition::DataHandler;
