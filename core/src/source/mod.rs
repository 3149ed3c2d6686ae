// sluice/src/source/mod.rs

//! Sources: named providers of entries, each backed by a [`Store`].

pub mod definition;
pub mod lifecycle;
pub mod store;

pub use definition::{Source, SourceContext, SourceState, SOURCES_NAMESPACE};
pub use store::Store;
