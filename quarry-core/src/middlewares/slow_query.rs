use crate::{Handler, Middleware, Query, QueryContext, QueryResult};
use futures::{FutureExt, future::BoxFuture};
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;

pub type LogFunc = Arc<dyn Fn(&Query, Duration) + Send + Sync>;

/// Reports the statements taking longer than a threshold.
///
/// The statement is built again only after a slow call, fast calls pay for the timing alone.
#[derive(Clone)]
pub struct MiddlewareBuilder {
    threshold: Duration,
    log_func: LogFunc,
}

impl MiddlewareBuilder {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            log_func: Arc::new(|query: &Query, elapsed: Duration| {
                log::warn!("Slow query ({elapsed:?}): {query}");
            }),
        }
    }

    pub fn log_func(mut self, log_func: impl Fn(&Query, Duration) + Send + Sync + 'static) -> Self {
        self.log_func = Arc::new(log_func);
        self
    }

    pub fn build(self) -> Middleware {
        let Self {
            threshold,
            log_func,
        } = self;
        Arc::new(move |next: Handler| -> Handler {
            let log_func = log_func.clone();
            Arc::new(move |context: QueryContext| -> BoxFuture<'static, QueryResult> {
                let log_func = log_func.clone();
                let next = next.clone();
                async move {
                    let start = Instant::now();
                    let result = next(context.clone()).await;
                    let elapsed = start.elapsed();
                    if elapsed > threshold
                        && let Ok(query) = context.builder.build()
                    {
                        log_func(&query, elapsed);
                    }
                    result
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
    use std::sync::{Mutex, atomic::AtomicUsize};

    fn sleeping(duration: Duration) -> Handler {
        Arc::new(move |_: QueryContext| -> BoxFuture<'static, QueryResult> {
            async move {
                tokio::time::sleep(duration).await;
                Ok(QueryOutput::Affected(RowsAffected::default()))
            }
            .boxed()
        })
    }

    fn recorder(logged: Arc<Mutex<Vec<String>>>) -> impl Fn(&Query, Duration) + Send + Sync {
        move |query, _| logged.lock().unwrap().push(query.sql.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn reports_slow_statements() {
        let logged = Arc::new(Mutex::new(Vec::new()));
        let middleware = MiddlewareBuilder::new(Duration::from_millis(100))
            .log_func(recorder(logged.clone()))
            .build();
        middleware(sleeping(Duration::from_millis(250)))(context(
            QueryKind::Select,
            "SELECT * FROM `t`;",
        ))
        .await
        .unwrap();
        assert_eq!(*logged.lock().unwrap(), ["SELECT * FROM `t`;"]);
    }

    #[tokio::test(start_paused = true)]
    async fn ignores_fast_statements() {
        let logged = Arc::new(Mutex::new(Vec::new()));
        let middleware = MiddlewareBuilder::new(Duration::from_millis(100))
            .log_func(recorder(logged.clone()))
            .build();
        middleware(counting(Arc::new(AtomicUsize::new(0))))(context(
            QueryKind::Select,
            "SELECT * FROM `t`;",
        ))
        .await
        .unwrap();
        assert!(logged.lock().unwrap().is_empty());
    }
}
