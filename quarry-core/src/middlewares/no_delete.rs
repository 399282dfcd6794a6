use super::statement_kind;
use crate::{Error, Handler, Middleware, QueryContext, QueryKind, QueryResult};
use futures::{FutureExt, future::BoxFuture};
use std::sync::Arc;

/// Forbids `DELETE` statements, raw ones included.
#[derive(Debug, Default, Clone)]
pub struct MiddlewareBuilder;

impl MiddlewareBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(self) -> Middleware {
        Arc::new(|next: Handler| -> Handler {
            Arc::new(move |context: QueryContext| -> BoxFuture<'static, QueryResult> {
                let kind = match context.kind {
                    QueryKind::Raw => match context.builder.build() {
                        Ok(query) => statement_kind(&context, &query),
                        Err(error) => return async move { Err(error) }.boxed(),
                    },
                    kind => kind,
                };
                if kind == QueryKind::Delete {
                    log::warn!("Rejected DELETE on `{}`", context.model.table_name);
                    return async { Err(Error::Policy("DELETE statements are forbidden".into())) }
                        .boxed();
                }
                next(context)
            })
        })
    }
}
