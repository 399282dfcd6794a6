use crate::{Handler, Middleware, Query, QueryContext, QueryResult};
use futures::{FutureExt, future::BoxFuture};
use std::sync::Arc;

pub type LogFunc = Arc<dyn Fn(&Query) + Send + Sync>;

/// Logs every statement before running it.
///
/// A statement that fails to build is not run, the build error is returned instead.
#[derive(Clone)]
pub struct MiddlewareBuilder {
    log_func: LogFunc,
}

impl Default for MiddlewareBuilder {
    fn default() -> Self {
        Self {
            log_func: Arc::new(|query: &Query| log::debug!("{query}")),
        }
    }
}

impl MiddlewareBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_func(mut self, log_func: impl Fn(&Query) + Send + Sync + 'static) -> Self {
        self.log_func = Arc::new(log_func);
        self
    }

    pub fn build(self) -> Middleware {
        let log_func = self.log_func;
        Arc::new(move |next: Handler| -> Handler {
            let log_func = log_func.clone();
            Arc::new(move |context: QueryContext| -> BoxFuture<'static, QueryResult> {
                match context.builder.build() {
                    Ok(query) => {
                        log_func(&query);
                        next(context)
                    }
                    Err(error) => async move { Err(error) }.boxed(),
                }
            })
        })
    }
}
