// tests/store_tests.rs
mod common;
use common::*;
use serde_json::json;
use sluice::{ConstraintCompiler, Entry, MatchCompiler, SluiceError, Store};

#[test]
fn test_assign_array_keeps_order() {
  setup_tracing();
  let store = Store::new();
  store.assign(json!([{ "name": "hazel" }, { "name": "fiver" }])).unwrap();

  assert_eq!(store.len(), 2);
  assert_eq!(store.snapshot(), vec![json!({ "name": "hazel" }), json!({ "name": "fiver" })]);
}

#[test]
fn test_assign_object_takes_its_values() {
  let store = Store::new();
  store
    .assign(json!({ "a": { "name": "hazel" }, "b": { "name": "fiver" } }))
    .unwrap();

  let mut names: Vec<String> = store
    .snapshot()
    .iter()
    .map(|v| v["name"].as_str().unwrap().to_string())
    .collect();
  names.sort();
  assert_eq!(names, vec!["fiver", "hazel"]);
}

#[test]
fn test_assign_rejects_scalars_and_keeps_contents() {
  let store = Store::new();
  store.assign(json!([1, 2, 3])).unwrap();

  for scalar in [json!(4), json!("text"), json!(null), json!(true)] {
    match store.assign(scalar) {
      Err(SluiceError::InvalidStoreValue { .. }) => {}
      other => panic!("Expected InvalidStoreValue, got {:?}", other),
    }
  }
  assert_eq!(store.snapshot(), vec![json!(1), json!(2), json!(3)]);
}

#[test]
fn test_clones_share_contents() {
  let store = Store::new();
  let alias = store.clone();
  alias.assign(json!([{ "n": 1 }])).unwrap();

  assert!(store.ptr_eq(&alias));
  assert_eq!(store.len(), 1);
  assert!(!store.ptr_eq(&Store::new()));
}

#[test]
fn test_entries_are_shared_handles() {
  let store = Store::new();
  store.assign(json!([{ "name": "bigwig" }])).unwrap();

  let entries = store.entries();
  entries[0].write()["name"] = json!("BIGWIG");

  assert_eq!(store.snapshot(), vec![json!({ "name": "BIGWIG" })]);
}

#[test]
fn test_find_with_and_without_predicate() {
  let store = Store::new();
  store
    .assign(json!([{ "owsla": true, "name": "bigwig" }, { "name": "fiver" }]))
    .unwrap();
  let predicate = ConstraintCompiler.compile(&json!({ "owsla": { "equals": true } })).unwrap();

  let found = store.find(Some(&predicate));
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].read()["name"], json!("bigwig"));
  assert_eq!(store.find(None).len(), 2);
}

#[test]
fn test_replace_swaps_wholesale() {
  let store = Store::new();
  store.assign(json!([1, 2])).unwrap();
  store.replace(vec![Entry::from(json!("only"))]);
  assert_eq!(store.snapshot(), vec![json!("only")]);
  store.replace(Vec::new());
  assert!(store.is_empty());
}
