//! # Operation Lifecycle
//!
//! The three-phase pattern every asynchronous store operation follows.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Operation Lifecycle                                │
//! │                                                                         │
//! │  caller ──► dispatch()                                                  │
//! │               │  1. state.loading = true          (synchronous)         │
//! │               │  2. spawn work                                          │
//! │               │  3. return Operation handle       (Pending)             │
//! │               ▼                                                         │
//! │         ┌──────────────┐                                                │
//! │         │ work.await   │  one request, toasts, follow-up operations     │
//! │         └──────┬───────┘                                                │
//! │        Ok(T)   │   Err(e)                                               │
//! │     ┌──────────┴──────────┐                                             │
//! │     ▼                     ▼                                             │
//! │  loading = false       loading = false                                  │
//! │  on_fulfilled(&T)      on_rejected(reason)                              │
//! │  Fulfilled(T)          Rejected(e.to_string())                          │
//! │                                                                         │
//! │  The state lock is held only while a phase is applied, never across     │
//! │  the network await. Completions apply in the order they finish.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Async State
// =============================================================================

/// Where an operation is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncState<T> {
    Pending,
    Fulfilled(T),
    Rejected(String),
}

impl<T> AsyncState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncState::Pending)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    pub fn fulfilled(&self) -> Option<&T> {
        match self {
            AsyncState::Fulfilled(value) => Some(value),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&str> {
        match self {
            AsyncState::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

// =============================================================================
// Operation Handle
// =============================================================================

/// Handle to an in-flight store operation.
///
/// Dropping the handle does not cancel the operation.
#[derive(Debug, Clone)]
pub struct Operation<T> {
    name: &'static str,
    rx: watch::Receiver<AsyncState<T>>,
}

impl<T: Clone> Operation<T> {
    /// Operation name, e.g. `cart/addToCart`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current phase, without waiting.
    pub fn state(&self) -> AsyncState<T> {
        self.rx.borrow().clone()
    }

    /// Waits until the operation settles.
    pub async fn settled(&mut self) -> AsyncState<T> {
        if let Ok(state) = self.rx.wait_for(AsyncState::is_settled).await {
            return state.clone();
        }
        // The worker is gone; report whatever it last published.
        self.rx.borrow().clone()
    }

    /// Waits until the operation settles and converts it to a `Result`.
    pub async fn into_result(mut self) -> StoreResult<T> {
        match self.settled().await {
            AsyncState::Fulfilled(value) => Ok(value),
            AsyncState::Rejected(reason) => Err(StoreError::Rejected(reason)),
            AsyncState::Pending => Err(StoreError::Rejected(format!(
                "{} was abandoned before settling",
                self.name
            ))),
        }
    }
}

// =============================================================================
// Shared State Slice
// =============================================================================

/// A store's state record behind a short-lived lock.
#[derive(Debug)]
pub struct Slice<S> {
    inner: Arc<RwLock<S>>,
}

impl<S> Clone for Slice<S> {
    fn clone(&self) -> Self {
        Slice {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Slice<S> {
    pub fn new(state: S) -> Self {
        Slice {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Reads through the lock.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Mutates through the lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<S: Clone> Slice<S> {
    /// Copy of the whole state record.
    pub fn snapshot(&self) -> S {
        self.read(S::clone)
    }
}

/// State records that track an in-flight flag.
pub trait Loadable {
    fn set_loading(&mut self, loading: bool);
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs `work` as a store operation against `slice`.
///
/// Must be called from inside a tokio runtime.
pub(crate) fn dispatch<S, T, W, F, R>(
    slice: &Slice<S>,
    name: &'static str,
    work: W,
    on_fulfilled: F,
    on_rejected: R,
) -> Operation<T>
where
    S: Loadable + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    W: Future<Output = StoreResult<T>> + Send + 'static,
    F: FnOnce(&mut S, &T) + Send + 'static,
    R: FnOnce(&mut S, &str) + Send + 'static,
{
    slice.update(|state| state.set_loading(true));
    debug!(operation = name, "Operation pending");

    let (tx, rx) = watch::channel(AsyncState::Pending);
    let slice = slice.clone();

    tokio::spawn(async move {
        let result = work.await;

        let settled = slice.update(|state| {
            state.set_loading(false);
            match result {
                Ok(value) => {
                    on_fulfilled(state, &value);
                    AsyncState::Fulfilled(value)
                }
                Err(err) => {
                    let reason = err.to_string();
                    on_rejected(state, &reason);
                    AsyncState::Rejected(reason)
                }
            }
        });

        match &settled {
            AsyncState::Rejected(reason) => warn!(operation = name, %reason, "Operation rejected"),
            _ => debug!(operation = name, "Operation fulfilled"),
        }

        tx.send_replace(settled);
    });

    Operation { name, rx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone, Default)]
    struct Counter {
        loading: bool,
        value: u32,
        error: String,
    }

    impl Loadable for Counter {
        fn set_loading(&mut self, loading: bool) {
            self.loading = loading;
        }
    }

    #[tokio::test]
    async fn test_loading_is_set_before_work_runs() {
        let slice = Slice::new(Counter::default());
        let (release, gate) = tokio::sync::oneshot::channel::<()>();

        let mut op = dispatch(
            &slice,
            "test/gated",
            async move {
                let _ = gate.await;
                Ok(7u32)
            },
            |s: &mut Counter, v: &u32| s.value = *v,
            |s: &mut Counter, r: &str| s.error = r.to_string(),
        );

        assert!(slice.read(|s| s.loading));
        assert!(op.state().is_pending());
        assert_eq!(op.name(), "test/gated");

        release.send(()).unwrap();
        assert_eq!(op.settled().await, AsyncState::Fulfilled(7));

        let state = slice.snapshot();
        assert!(!state.loading);
        assert_eq!(state.value, 7);
    }

    #[tokio::test]
    async fn test_rejection_carries_reason() {
        let slice = Slice::new(Counter::default());
        let op = dispatch(
            &slice,
            "test/fails",
            async { Err::<u32, _>(StoreError::Rejected("boom".into())) },
            |s: &mut Counter, v: &u32| s.value = *v,
            |s: &mut Counter, r: &str| s.error = r.to_string(),
        );

        let err = op.into_result().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");

        let state = slice.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error, "boom");
        assert_eq!(state.value, 0);
    }

    #[tokio::test]
    async fn test_last_completion_wins() {
        let slice = Slice::new(Counter::default());
        let apply = |s: &mut Counter, v: &u32| s.value = *v;
        let reject = |_: &mut Counter, _: &str| {};

        let slow = dispatch(
            &slice,
            "test/slow",
            async {
                tokio::time::sleep(Duration::from_millis(40)).await;
                Ok(1u32)
            },
            apply,
            reject,
        );
        let fast = dispatch(&slice, "test/fast", async { Ok(2u32) }, apply, reject);

        fast.into_result().await.unwrap();
        assert_eq!(slice.read(|s| s.value), 2);

        slow.into_result().await.unwrap();
        assert_eq!(slice.read(|s| s.value), 1);
    }

    #[test]
    fn test_async_state_accessors() {
        let done: AsyncState<u32> = AsyncState::Fulfilled(3);
        assert!(done.is_settled());
        assert_eq!(done.fulfilled(), Some(&3));
        assert_eq!(done.rejection(), None);

        let failed: AsyncState<u32> = AsyncState::Rejected("nope".into());
        assert_eq!(failed.rejection(), Some("nope"));
        assert!(AsyncState::<u32>::Pending.is_pending());
    }
}
