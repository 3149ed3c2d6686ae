pub mod component;
pub mod control;
pub mod hooks;
pub mod settings;
pub mod shared;

// Re-export key types for easier access from other sluice modules (and lib.rs)
pub use component::{Component, InitEnv};
pub use control::{EngineState, Stage};
pub use hooks::Hook;
pub use settings::EngineSettings;
pub use shared::{Entry, Fields, Shared};
