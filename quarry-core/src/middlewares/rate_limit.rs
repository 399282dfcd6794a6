use crate::{Error, Handler, Middleware, QueryContext, QueryResult};
use futures::{FutureExt, future::BoxFuture};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Caps the number of statements in flight.
///
/// Statements beyond the limit fail with [`Error::Policy`] unless [`wait`](Self::wait) is set,
/// in which case they queue for a permit.
#[derive(Debug, Clone)]
pub struct MiddlewareBuilder {
    limit: usize,
    wait: bool,
}

impl MiddlewareBuilder {
    pub fn new(limit: usize) -> Self {
        Self { limit, wait: false }
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    pub fn build(self) -> Middleware {
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let wait = self.wait;
        Arc::new(move |next: Handler| -> Handler {
            let semaphore = semaphore.clone();
            Arc::new(move |context: QueryContext| -> BoxFuture<'static, QueryResult> {
                let semaphore = semaphore.clone();
                let next = next.clone();
                async move {
                    let _permit = if wait {
                        semaphore
                            .acquire_owned()
                            .await
                            .map_err(|e| Error::msg(format!("Rate limiter closed: {e}")))?
                    } else {
                        semaphore.try_acquire_owned().map_err(|_| {
                            log::warn!("Rejected {} statement, too many in flight", context.kind);
                            Error::Policy("Too many statements in flight".into())
                        })?
                    };
                    next(context).await
                }
                .boxed()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        QueryKind, QueryOutput, RowsAffected,
        middlewares::tests::{context, counting},
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Terminal handler signaling `started`, then parked until `release` is notified.
    fn parked(started: Arc<Notify>, release: Arc<Notify>) -> Handler {
        Arc::new(move |_: QueryContext| -> BoxFuture<'static, QueryResult> {
            let release = release.clone();
            started.notify_one();
            async move {
                release.notified().await;
                Ok(QueryOutput::Affected(RowsAffected::default()))
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn rejects_beyond_limit() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let handler =
            MiddlewareBuilder::new(1).build()(parked(started.clone(), release.clone()));
        let first = tokio::spawn(handler(context(QueryKind::Select, "SELECT 1;")));
        started.notified().await;
        let result = handler(context(QueryKind::Select, "SELECT 1;")).await;
        assert!(matches!(result, Err(Error::Policy(..))));
        release.notify_one();
        first.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn permits_are_returned() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = MiddlewareBuilder::new(1).build()(counting(calls.clone()));
        for _ in 0..3 {
            handler(context(QueryKind::Select, "SELECT 1;")).await.unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
