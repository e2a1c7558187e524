//! Pluggable external text transformation.
//!
//! The dictionary codec may delegate to an external transformer (typically a
//! remote model). The hook is async, bounded by a timeout and cancellable.
//! Any failure is reported to the caller of [`run_transform`] as an error;
//! the engine turns that into an identity fallback.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::{CruxError, Result};

/// Boxed future returned by [`TextTransformer::transform`]
pub type TransformFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// External text transformer.
///
/// Any `Fn(&str) -> Result<String>` closure is a transformer:
///
/// ```
/// use crux::codec::TextTransformer;
///
/// let upper = |s: &str| -> crux::Result<String> { Ok(s.to_uppercase()) };
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// assert_eq!(rt.block_on(upper.transform("abc")).unwrap(), "ABC");
/// ```
pub trait TextTransformer: Send + Sync {
    /// Transform `input`
    fn transform<'a>(&'a self, input: &'a str) -> TransformFuture<'a>;
}

impl<F> TextTransformer for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn transform<'a>(&'a self, input: &'a str) -> TransformFuture<'a> {
        Box::pin(std::future::ready(self(input)))
    }
}

/// Cooperative cancellation signal.
///
/// Clones share state; cancelling one cancels all.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: std::sync::Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Create an uncancelled token
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// Signal cancellation
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Check whether cancellation was signalled
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Sender lives as long as self, so this is unreachable in practice
            std::future::pending::<()>().await;
        }
    }
}

/// Borrowed per-call transformation context
#[derive(Clone, Copy, Default)]
pub struct TransformContext<'a> {
    /// External transformer, if the caller supplied one
    pub transformer: Option<&'a dyn TextTransformer>,
    /// Cancellation signal
    pub cancel: Option<&'a CancelToken>,
}

impl std::fmt::Debug for TransformContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformContext")
            .field("transformer", &self.transformer.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

/// Run a transformer under a timeout and optional cancellation.
pub async fn run_transform(
    transformer: &dyn TextTransformer,
    input: &str,
    timeout: Duration,
    cancel: Option<&CancelToken>,
) -> Result<String> {
    if cancel.is_some_and(CancelToken::is_cancelled) {
        return Err(CruxError::TransformCancelled);
    }

    let bounded = tokio::time::timeout(timeout, transformer.transform(input));

    let outcome = match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(CruxError::TransformCancelled),
                outcome = bounded => outcome,
            }
        },
        None => bounded.await,
    };

    match outcome {
        Ok(result) => result,
        Err(_) => Err(CruxError::TransformTimeout(timeout.as_millis() as u64)),
    }
}
