// sluice/src/core/hooks.rs

//! Hook types for the user-supplied parts of a pipeline.
//!
//! Every collaborator hook is an asynchronous closure taking an explicit context
//! (a source context, a transformer context, an entry, produced data ...) and
//! resolving to `SluiceResult<T>`. A component carries `Option<Hook<..>>` for
//! the hooks it may define; an absent hook is simply skipped.

use crate::error::{SluiceError, SluiceResult};
use futures::future::BoxFuture;
use std::future::Future;

/// Type alias for a boxed hook taking a context `C` and producing `T`.
///
/// Hooks are responsible for:
/// 1. Acquiring locks on any `Shared` handle they receive.
/// 2. **Dropping those guards BEFORE any `.await` suspension point.**
/// 3. Returning `Ok` to let the stage continue, or an error to abort it.
pub type Hook<C, T = ()> = Box<dyn Fn(C) -> BoxFuture<'static, SluiceResult<T>> + Send + Sync>;

/// Wraps a user closure into a `Hook`, converting its error type into `SluiceError`.
pub(crate) fn hook<C, T, F, Fut, E>(handler_fn: F) -> Hook<C, T>
where
  C: 'static,
  T: 'static,
  F: Fn(C) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<T, E>> + Send + 'static,
  E: Into<SluiceError> + Send + 'static,
{
  Box::new(move |ctx| {
    let user_fut = handler_fn(ctx);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}

/// Runs an optional hook; an absent hook succeeds immediately.
pub(crate) async fn run_optional<C: 'static>(hook: Option<&Hook<C>>, ctx: C) -> SluiceResult<()> {
  match hook {
    Some(hook_fn) => hook_fn(ctx).await,
    None => Ok(()),
  }
}
