// sluice/src/schedule.rs

//! Scheduling primitives every stage of the engine is built from.
//!
//! All of them drive their futures on the caller's task: "parallel" means
//! issued together and interleaved at `.await` points, never spawned onto other
//! threads. Ordering guarantees:
//!
//! - [`serial`] / [`each_serial`]: issuance and completion follow input order;
//!   the first error stops everything not yet started.
//! - [`parallel`] / [`each_parallel`]: everything is issued at once; the call
//!   returns after all of it has settled and reports the first error to occur.
//! - [`each_batch`]: at most `limit` futures in flight; after the first error
//!   nothing new is issued, but in-flight work still runs to completion.
//!
//! Nothing is ever cancelled. Results of work that finishes after an error has
//! been recorded are discarded.

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

/// A unit of work for [`serial`] and [`parallel`].
pub type Step<'a, E> = BoxFuture<'a, Result<(), E>>;

/// Runs `steps` one after the other, stopping at the first failure.
pub async fn serial<E>(steps: Vec<Step<'_, E>>) -> Result<(), E> {
  for step in steps {
    step.await?;
  }
  Ok(())
}

/// Issues every step at once and waits for all of them to settle.
pub async fn parallel<E>(steps: Vec<Step<'_, E>>) -> Result<(), E> {
  drain(steps.into_iter().collect()).await
}

/// Applies `f` to each item in order, stopping at the first failure.
pub async fn each_serial<I, F, Fut, E>(items: I, mut f: F) -> Result<(), E>
where
  I: IntoIterator,
  F: FnMut(I::Item) -> Fut,
  Fut: Future<Output = Result<(), E>>,
{
  for item in items {
    f(item).await?;
  }
  Ok(())
}

/// Applies `f` to every item at once, with no cap on concurrency.
pub async fn each_parallel<I, F, Fut, E>(items: I, f: F) -> Result<(), E>
where
  I: IntoIterator,
  F: FnMut(I::Item) -> Fut,
  Fut: Future<Output = Result<(), E>>,
{
  drain(items.into_iter().map(f).collect()).await
}

/// Applies `f` to the items with at most `limit` invocations in flight.
///
/// Items are issued in input order. Whenever one invocation settles the next
/// pending item is issued, unless an error has already been seen. The call
/// returns once every issued invocation has settled. A `limit` of 0 is treated
/// as 1.
pub async fn each_batch<I, F, Fut, E>(items: I, limit: usize, mut f: F) -> Result<(), E>
where
  I: IntoIterator,
  F: FnMut(I::Item) -> Fut,
  Fut: Future<Output = Result<(), E>>,
{
  let limit = limit.max(1);
  let mut pending = items.into_iter();
  let mut in_flight = FuturesUnordered::new();
  let mut first_error = None;

  for item in pending.by_ref().take(limit) {
    in_flight.push(f(item));
  }

  while let Some(result) = in_flight.next().await {
    if let Err(e) = result {
      first_error.get_or_insert(e);
    }
    if first_error.is_none() {
      if let Some(item) = pending.next() {
        in_flight.push(f(item));
      }
    }
  }

  match first_error {
    Some(e) => Err(e),
    None => Ok(()),
  }
}

// Polls every future to completion and keeps the earliest error.
async fn drain<Fut, E>(mut in_flight: FuturesUnordered<Fut>) -> Result<(), E>
where
  Fut: Future<Output = Result<(), E>>,
{
  let mut first_error = None;
  while let Some(result) = in_flight.next().await {
    if let Err(e) = result {
      first_error.get_or_insert(e);
    }
  }
  match first_error {
    Some(e) => Err(e),
    None => Ok(()),
  }
}
