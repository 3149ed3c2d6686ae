// sluice/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SluiceError {
  #[error("Source title '{title}' is used by more than one source")]
  DuplicateSource { title: String },

  #[error("Source '{title}' did not have a refresh function")]
  MissingRefresh { title: String },

  #[error("Source '{title}' already defines a 'sources' field; its helper sources have nowhere to go")]
  SourcesNamespaceCollision { title: String },

  #[error("Source '{title}' declares helper source '{helper}' more than once")]
  DuplicateHelperSource { title: String, helper: String },

  #[error("Helper '{name}' is declared more than once on {transformer}")]
  DuplicateHelper { transformer: String, name: String },

  #[error("Helper '{name}' would output data to an already used field on {transformer}")]
  HelperFieldCollision { transformer: String, name: String },

  #[error("Helper engine '{name}' has no transformer whose result could be redirected")]
  HelperWithoutTransformer { name: String },

  #[error("Store input should be an array or an object, got {kind}")]
  InvalidStoreValue { kind: &'static str },

  #[error("Match spec could not be compiled: {message}")]
  InvalidMatchSpec { message: String },

  #[error("Matcher for {owner} has not been compiled; initialize the engine first")]
  UncompiledMatcher { owner: String },

  #[error("{transformer} reads from unknown source '{title}'")]
  UnknownSource { transformer: String, title: String },

  #[error("No source titled '{title}' is configured on this engine")]
  NoSuchSource { title: String },

  #[error("A refresh is already in flight on this engine")]
  RefreshInProgress,

  #[error("Error in user-provided hook or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },
}

impl SluiceError {
  /// True for errors caused by how the engine was put together rather than by
  /// a collaborator failing at runtime.
  pub fn is_configuration(&self) -> bool {
    matches!(
      self,
      SluiceError::DuplicateSource { .. }
        | SluiceError::MissingRefresh { .. }
        | SluiceError::SourcesNamespaceCollision { .. }
        | SluiceError::DuplicateHelperSource { .. }
        | SluiceError::DuplicateHelper { .. }
        | SluiceError::HelperFieldCollision { .. }
        | SluiceError::HelperWithoutTransformer { .. }
        | SluiceError::InvalidStoreValue { .. }
        | SluiceError::InvalidMatchSpec { .. }
        | SluiceError::UncompiledMatcher { .. }
        | SluiceError::UnknownSource { .. }
        | SluiceError::NoSuchSource { .. }
    )
  }
}

// Collaborators usually hand back anyhow errors. If one of them is really a
// SluiceError that travelled through anyhow, give it back unchanged.
impl From<AnyhowError> for SluiceError {
  fn from(err: AnyhowError) -> Self {
    match err.downcast::<SluiceError>() {
      Ok(sluice_err) => sluice_err,
      Err(source) => SluiceError::HandlerError { source },
    }
  }
}

pub type SluiceResult<T, E = SluiceError> = std::result::Result<T, E>;
