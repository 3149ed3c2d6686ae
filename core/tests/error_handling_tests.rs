// tests/error_handling_tests.rs
mod common;
use common::*;
use serde_json::{json, Value};
use sluice::{Engine, EngineConfig, SluiceError, Source, SourceContext, Transformer, TransformerContext};

#[test]
fn test_anyhow_errors_become_handler_errors() {
  let err: SluiceError = anyhow::anyhow!("socket closed").into();
  match &err {
    SluiceError::HandlerError { source } => assert_eq!(source.to_string(), "socket closed"),
    other => panic!("Expected HandlerError, got {:?}", other),
  }
  assert!(!err.is_configuration());
}

#[test]
fn test_sluice_errors_survive_a_trip_through_anyhow() {
  let wrapped = anyhow::Error::new(SluiceError::RefreshInProgress);
  let err: SluiceError = wrapped.into();
  assert!(matches!(err, SluiceError::RefreshInProgress));
}

#[test]
fn test_configuration_errors_are_flagged() {
  assert!(SluiceError::DuplicateSource { title: "a".into() }.is_configuration());
  assert!(SluiceError::InvalidMatchSpec { message: "x".into() }.is_configuration());
  assert!(!SluiceError::RefreshInProgress.is_configuration());
  assert!(!SluiceError::HandlerError { source: anyhow::anyhow!("x") }.is_configuration());
}

#[tokio::test]
async fn test_anyhow_results_from_hooks_propagate() {
  setup_tracing();
  let source = Source::new("remote").on_refresh(|_ctx: SourceContext| async {
    Err::<Value, anyhow::Error>(anyhow::anyhow!("503 from upstream"))
  });
  let engine = Engine::new(EngineConfig::new().with_source(source));
  engine.initialize().await.unwrap();

  match engine.refresh().await {
    Err(SluiceError::HandlerError { source }) => assert!(source.to_string().contains("503")),
    other => panic!("Expected HandlerError, got {:?}", other),
  }
}

#[tokio::test]
async fn test_hooks_may_return_sluice_errors_directly() {
  setup_tracing();
  let transformer = Transformer::new(|_ctx: TransformerContext| async {
    Err::<Value, SluiceError>(SluiceError::NoSuchSource { title: "efrafa".to_string() })
  });
  let engine = Engine::new(EngineConfig::new().with_transformer(transformer));
  engine.initialize().await.unwrap();

  match engine.refresh().await {
    Err(SluiceError::NoSuchSource { title }) => assert_eq!(title, "efrafa"),
    other => panic!("Expected NoSuchSource, got {:?}", other),
  }
}

#[tokio::test]
async fn test_first_initialize_error_wins_and_everything_settles() {
  setup_tracing();
  let engine = Engine::new(
    EngineConfig::new()
      .with_source(Source::new("broken").on_initialize(|_ctx: SourceContext| async {
        Err::<(), TestError>(TestError::Hook("source init".to_string()))
      }))
      .with_transformer(
        Transformer::new(|_ctx: TransformerContext| async { Ok::<Value, TestError>(json!(null)) })
          .with_query("q", json!({ "name": { "equals": "x" } })),
      ),
  );

  let err = engine.initialize().await.unwrap_err();
  assert_eq!(test_error(&err), Some(&TestError::Hook("source init".to_string())));
  // The transformer branch still ran to completion.
  assert!(engine.transformer(0).unwrap().queries()[0].matcher.as_ref().unwrap().is_compiled());
}
