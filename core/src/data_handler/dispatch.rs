// sluice/src/data_handler/dispatch.rs

//! Applies every data-handler to every entry of every source.

use crate::core::hooks::Hook;
use crate::core::shared::Entry;
use crate::data_handler::definition::DataHandler;
use crate::error::SluiceResult;
use crate::matching::matcher::matches;
use crate::matching::Predicate;
use crate::schedule::{each_batch, each_serial};
use crate::source::store::Store;
use tracing::{event, Level};

/// Walks `stores` in order and, for each entry in store order, runs every
/// handler whose predicate accepts the entry, at most `concurrency` handlers at
/// a time. The first handler error stops the walk.
pub(crate) async fn dispatch(handlers: &[DataHandler], stores: &[(String, Store)], concurrency: usize) -> SluiceResult<()> {
  if handlers.is_empty() {
    event!(Level::TRACE, "No data-handlers configured.");
    return Ok(());
  }

  let compiled = handlers
    .iter()
    .map(|handler| Ok((handler.predicate()?, &handler.execute)))
    .collect::<SluiceResult<Vec<(Predicate, &Hook<Entry>)>>>()?;
  let compiled = &compiled;

  each_serial(stores, |(title, store)| async move {
    let entries = store.entries();
    event!(Level::TRACE, source = %title, num_entries = entries.len(), "Dispatching data-handlers.");

    each_serial(entries, |entry| async move {
      each_batch(compiled.iter(), concurrency, |(predicate, execute)| {
        let entry = entry.clone();
        async move {
          if !matches(predicate, &entry) {
            return Ok(());
          }
          execute(entry).await.map_err(|e| {
            event!(Level::ERROR, source = %title, error = %e, "Data-handler failed.");
            e
          })
        }
      })
      .await
    })
    .await
  })
  .await
}
