//! Single-flight holder for a client's capabilities.
//!
//! The state moves `Uninitialized -> Fetching -> Ready | Failed` and is only
//! changed under one lock. Callers arriving while a fetch is running await
//! the same shared future, so one client never issues a second capabilities
//! request. Both terminal states are kept for the holder's lifetime.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use ogc_common::{OgcError, OgcResult};

type SharedFetch<T> = Shared<BoxFuture<'static, OgcResult<Arc<T>>>>;

enum FetchState<T> {
    Uninitialized,
    Fetching(SharedFetch<T>),
    Ready(Arc<T>),
    Failed(OgcError),
}

pub struct SingleFlight<T> {
    state: Mutex<FetchState<T>>,
}

impl<T: Send + Sync + 'static> SingleFlight<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FetchState::Uninitialized),
        }
    }

    /// A holder that starts out `Ready`.
    pub fn ready(value: T) -> Self {
        Self {
            state: Mutex::new(FetchState::Ready(Arc::new(value))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FetchState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The value, running `fetch` only if nobody has started it yet.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> OgcResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = OgcResult<T>> + Send + 'static,
    {
        let shared = match self.begin(fetch) {
            Ok(shared) => shared,
            Err(settled) => return settled,
        };
        let result = shared.await;
        self.settle(&result);
        result
    }

    /// The in-flight future, or the settled result.
    fn begin<F, Fut>(&self, fetch: F) -> Result<SharedFetch<T>, OgcResult<Arc<T>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = OgcResult<T>> + Send + 'static,
    {
        let mut state = self.lock();
        match &*state {
            FetchState::Ready(value) => Err(Ok(Arc::clone(value))),
            FetchState::Failed(err) => Err(Err(err.clone())),
            FetchState::Fetching(shared) => {
                debug!("Joining in-flight capabilities fetch");
                Ok(shared.clone())
            }
            FetchState::Uninitialized => {
                let shared = fetch().map(|result| result.map(Arc::new)).boxed().shared();
                *state = FetchState::Fetching(shared.clone());
                Ok(shared)
            }
        }
    }

    fn settle(&self, result: &OgcResult<Arc<T>>) {
        let mut state = self.lock();
        if matches!(*state, FetchState::Fetching(_)) {
            *state = match result {
                Ok(value) => FetchState::Ready(Arc::clone(value)),
                Err(err) => FetchState::Failed(err.clone()),
            };
        }
    }

    /// The value if it is already available.
    pub fn peek(&self) -> Option<Arc<T>> {
        match &*self.lock() {
            FetchState::Ready(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(*self.lock(), FetchState::Ready(_) | FetchState::Failed(_))
    }
}

impl<T: Send + Sync + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_ready_never_fetches() {
        let holder = SingleFlight::ready(7u32);
        let value = tokio_test::block_on(
            holder.get_or_fetch(|| async { Err(OgcError::OperationNotFound("unused".into())) }),
        )
        .unwrap();
        assert_eq!(*value, 7);
        assert!(holder.is_settled());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let holder = Arc::new(SingleFlight::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|_| {
            let holder = Arc::clone(&holder);
            let calls = Arc::clone(&calls);
            async move {
                holder
                    .get_or_fetch(move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(42)
                    })
                    .await
            }
        });
        let results = futures::future::join_all(tasks).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.as_deref() == Ok(&42)));
        assert!(holder.is_settled());
    }

    #[tokio::test]
    async fn test_failure_is_kept() {
        let holder = SingleFlight::<u32>::new();
        let err = OgcError::Network {
            url: "https://a.org".into(),
            message: "refused".into(),
        };
        let failing = err.clone();
        let first = holder.get_or_fetch(move || async move { Err(failing) }).await;
        assert_eq!(first, Err(err.clone()));

        let second = holder.get_or_fetch(|| async { Ok(1) }).await;
        assert_eq!(second, Err(err));
        assert!(holder.peek().is_none());
    }
}
