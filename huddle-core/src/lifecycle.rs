//! Request lifecycle management.
//!
//! A [`RequestHandle`] pairs a spawned request with a cancellation token so a
//! caller can abandon it cleanly. [`Inflight`] tracks the single outstanding
//! request per call site: starting a new one cancels whatever was still
//! running, so a stale response can never land after a fresh one.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A cancellable in-flight request.
///
/// The wrapped future runs on its own task; cancelling races it against the
/// token, and the loser's output is dropped.
#[derive(Debug)]
pub struct RequestHandle<T> {
    token: CancellationToken,
    task: JoinHandle<Option<T>>,
}

impl<T: Send + 'static> RequestHandle<T> {
    /// Spawn `future` as a cancellable request.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                result = future => Some(result),
                _ = task_token.cancelled() => None,
            }
        });
        Self { token, task }
    }

    /// Ask the request to stop. The task unwinds on its own; callers that
    /// need to observe completion should still [`join`](Self::join).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the request. `None` means it was cancelled before finishing.
    pub async fn join(mut self) -> Option<T> {
        (&mut self.task).await.ok().flatten()
    }
}

impl<T> Drop for RequestHandle<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// At most one outstanding request for a call site.
#[derive(Debug)]
pub struct Inflight<T> {
    current: Option<RequestHandle<T>>,
}

impl<T> Default for Inflight<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T: Send + 'static> Inflight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, cancelling the previous one first.
    pub fn replace<F>(&mut self, future: F) -> &RequestHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.cancel();
        self.current.insert(RequestHandle::spawn(future))
    }

    /// Cancel the outstanding request, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }

    /// Wait for the outstanding request and clear the slot. `None` when there
    /// was no request or it was cancelled.
    pub async fn finish(&mut self) -> Option<T> {
        match self.current.take() {
            Some(handle) => handle.join().await,
            None => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // TEST 1: an unhindered request completes with its value
    #[tokio::test]
    async fn test_handle_completes() {
        let handle = RequestHandle::spawn(async { 7 });
        assert_eq!(handle.join().await, Some(7));
    }

    // TEST 2: cancelling before completion yields None
    #[tokio::test]
    async fn test_cancelled_handle_yields_none() {
        let handle = RequestHandle::spawn(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            7
        });
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(handle.join().await, None);
    }

    // TEST 3: replacing an in-flight request cancels the old one
    #[tokio::test]
    async fn test_replace_cancels_previous() {
        let mut inflight = Inflight::new();
        inflight.replace(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "slow"
        });
        inflight.replace(async { "fast" });
        assert_eq!(inflight.finish().await, Some("fast"));
        assert!(inflight.is_idle());
    }

    // TEST 4: finishing an idle slot is None, not an error
    #[tokio::test]
    async fn test_finish_when_idle() {
        let mut inflight: Inflight<u8> = Inflight::new();
        assert_eq!(inflight.finish().await, None);
    }

    // TEST 5: a cancelled slot stays idle afterwards
    #[tokio::test]
    async fn test_cancel_clears_slot() {
        let mut inflight = Inflight::new();
        inflight.replace(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            1u8
        });
        assert!(!inflight.is_idle());
        inflight.cancel();
        assert!(inflight.is_idle());
        assert_eq!(inflight.finish().await, None);
    }
}
