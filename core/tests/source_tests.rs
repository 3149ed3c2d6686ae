// tests/source_tests.rs
mod common;
use common::*;
use parking_lot::Mutex;
use serde_json::{json, Value};
use sluice::{Component, ConstraintCompiler, EngineSettings, InitEnv, SluiceError, Source, SourceContext};
use std::sync::Arc;

async fn init(source: &Source) -> Result<(), SluiceError> {
  let settings = EngineSettings::default();
  let env = InitEnv {
    compiler: &ConstraintCompiler,
    settings: &settings,
  };
  source.initialize(&env).await
}

fn recording_source(title: &str, log: Arc<Mutex<Vec<String>>>, refresh_result: Result<Value, TestError>) -> Source {
  let (l1, l2, l3) = (log.clone(), log.clone(), log);
  Source::new(title)
    .on_before(move |_ctx| {
      let log = l1.clone();
      async move {
        log.lock().push("before".to_string());
        Ok::<(), TestError>(())
      }
    })
    .on_refresh(move |_ctx| {
      let log = l2.clone();
      let result = refresh_result.clone();
      async move {
        log.lock().push("refresh".to_string());
        result
      }
    })
    .on_after(move |_ctx| {
      let log = l3.clone();
      async move {
        log.lock().push("after".to_string());
        Ok::<(), TestError>(())
      }
    })
}

#[tokio::test]
async fn test_refresh_runs_before_refresh_after_and_fills_store() {
  setup_tracing();
  let log = Arc::new(Mutex::new(Vec::new()));
  let source = recording_source("warren", log.clone(), Ok(json!([{ "name": "hazel" }])));

  init(&source).await.unwrap();
  source.refresh().await.unwrap();

  assert_eq!(*log.lock(), vec!["before", "refresh", "after"]);
  assert_eq!(source.store().snapshot(), vec![json!({ "name": "hazel" })]);
}

#[tokio::test]
async fn test_after_is_skipped_when_refresh_fails() {
  setup_tracing();
  let log = Arc::new(Mutex::new(Vec::new()));
  let source = recording_source("warren", log.clone(), Err(TestError::Refresh("offline".to_string())));

  init(&source).await.unwrap();
  let err = source.refresh().await.unwrap_err();

  assert_eq!(test_error(&err), Some(&TestError::Refresh("offline".to_string())));
  assert_eq!(*log.lock(), vec!["before", "refresh"]);
}

#[tokio::test]
async fn test_non_list_refresh_leaves_store_untouched() {
  setup_tracing();
  let calls = Arc::new(Mutex::new(0));
  let calls_in_hook = calls.clone();
  let source = Source::new("warren").on_refresh(move |_ctx| {
    let calls = calls_in_hook.clone();
    async move {
      let mut n = calls.lock();
      *n += 1;
      let out = if *n == 1 { json!([1, 2]) } else { json!({ "not": "a list" }) };
      Ok::<Value, TestError>(out)
    }
  });

  init(&source).await.unwrap();
  source.refresh().await.unwrap();
  source.refresh().await.unwrap();

  assert_eq!(*calls.lock(), 2);
  assert_eq!(source.store().snapshot(), vec![json!(1), json!(2)]);
}

#[tokio::test]
async fn test_refresh_without_hook_is_an_error() {
  setup_tracing();
  let source = Source::new("silent");
  init(&source).await.unwrap();

  match source.refresh().await {
    Err(SluiceError::MissingRefresh { title }) => assert_eq!(title, "silent"),
    other => panic!("Expected MissingRefresh, got {:?}", other),
  }
  assert_eq!(
    SluiceError::MissingRefresh {
      title: "silent".to_string()
    }
    .to_string(),
    "Source 'silent' did not have a refresh function"
  );
}

#[tokio::test]
async fn test_initialize_hook_sees_fields_and_fresh_store() {
  setup_tracing();
  let source = Source::new("warren")
    .with_field("limit", json!(3))
    .on_initialize(|ctx: SourceContext| async move {
      let mut state = ctx.write();
      let limit = state.field("limit").cloned().unwrap_or(Value::Null);
      state.set_field("seen_limit", limit);
      assert!(state.store().is_empty());
      Ok::<(), TestError>(())
    });

  init(&source).await.unwrap();
  assert_eq!(source.context().read().field("seen_limit"), Some(&json!(3)));
}

#[tokio::test]
async fn test_initialize_allocates_a_new_store() {
  setup_tracing();
  let source = static_source("warren", json!([1]));
  init(&source).await.unwrap();
  let first = source.store();
  source.refresh().await.unwrap();

  init(&source).await.unwrap();
  let second = source.store();

  assert!(!first.ptr_eq(&second));
  assert_eq!(first.len(), 1);
  assert!(second.is_empty());
}

#[tokio::test]
async fn test_helper_sources_are_exposed_and_refreshed_first() {
  setup_tracing();
  let parent = Source::new("books")
    .with_helper(static_source("authors", json!([{ "name": "adams" }])))
    .with_helper(Source::new("empty_helper"))
    .on_refresh(|ctx: SourceContext| async move {
      let authors = ctx
        .read()
        .helper("authors")
        .map(|store| store.snapshot())
        .unwrap_or_default();
      let entries: Vec<Value> = authors
        .into_iter()
        .map(|author| json!({ "title": "Watership Down", "author": author["name"] }))
        .collect();
      Ok::<Value, TestError>(Value::Array(entries))
    });

  init(&parent).await.unwrap();
  {
    let ctx = parent.context();
    let state = ctx.read();
    let helpers = state.helpers().unwrap();
    assert_eq!(helpers.len(), 2);
    assert_eq!(helpers[0].0, "authors");
    assert!(helpers[1].1.is_empty());
  }

  parent.refresh().await.unwrap();
  assert_eq!(
    parent.store().snapshot(),
    vec![json!({ "title": "Watership Down", "author": "adams" })]
  );
}

#[tokio::test]
async fn test_helpers_conflict_with_sources_field() {
  setup_tracing();
  let source = Source::new("books")
    .with_field("sources", json!({}))
    .with_helper(static_source("authors", json!([])));

  match init(&source).await {
    Err(SluiceError::SourcesNamespaceCollision { title }) => assert_eq!(title, "books"),
    other => panic!("Expected SourcesNamespaceCollision, got {:?}", other),
  }
  assert!(source.context().read().helpers().is_none());
}

#[tokio::test]
async fn test_duplicate_helper_titles_are_rejected() {
  setup_tracing();
  let source = Source::new("books")
    .with_helper(static_source("authors", json!([])))
    .with_helper(static_source("authors", json!([])));

  match init(&source).await {
    Err(SluiceError::DuplicateHelperSource { title, helper }) => {
      assert_eq!(title, "books");
      assert_eq!(helper, "authors");
    }
    other => panic!("Expected DuplicateHelperSource, got {:?}", other),
  }
}

#[tokio::test]
async fn test_helper_refresh_can_run_on_a_spawned_task() {
  setup_tracing();
  let log = Arc::new(Mutex::new(Vec::new()));
  let parent = Arc::new(
    recording_source("books", log.clone(), Ok(json!([{ "title": "Tales from Watership Down" }])))
      .with_helper(Source::new("no_refresh"))
      .with_helper(failing_source("authors", "offline")),
  );
  init(&parent).await.unwrap();

  let spawned = parent.clone();
  let result = tokio::spawn(async move { spawned.refresh().await }).await.unwrap();

  let err = result.unwrap_err();
  assert_eq!(test_error(&err), Some(&TestError::Refresh("offline".to_string())));
  assert!(log.lock().is_empty());
  assert!(parent.store().is_empty());
}
