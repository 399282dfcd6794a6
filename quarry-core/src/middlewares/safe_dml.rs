use super::{sql_words, statement_kind};
use crate::{Error, Handler, Middleware, QueryContext, QueryKind, QueryResult};
use futures::{FutureExt, future::BoxFuture};
use std::sync::Arc;

/// Rejects `UPDATE` and `DELETE` statements lacking a `WHERE` clause, before they reach the
/// session.
#[derive(Debug, Default, Clone)]
pub struct MiddlewareBuilder;

impl MiddlewareBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(self) -> Middleware {
        Arc::new(|next: Handler| -> Handler {
            Arc::new(move |context: QueryContext| -> BoxFuture<'static, QueryResult> {
                if matches!(context.kind, QueryKind::Select | QueryKind::Insert) {
                    return next(context);
                }
                let query = match context.builder.build() {
                    Ok(query) => query,
                    Err(error) => return async move { Err(error) }.boxed(),
                };
                let kind = statement_kind(&context, &query);
                if matches!(kind, QueryKind::Update | QueryKind::Delete)
                    && !has_where(&query.sql)
                {
                    log::warn!("Rejected {kind} without WHERE: {}", query.sql);
                    return async move {
                        Err(Error::Policy(format!("{kind} statements must have a WHERE clause")))
                    }
                    .boxed();
                }
                next(context)
            })
        })
    }
}

/// Whether the outermost statement has a `WHERE`, quoted text and subqueries do not count.
fn has_where(sql: &str) -> bool {
    sql_words(sql)
        .iter()
        .any(|(word, depth)| *depth == 0 && word.eq_ignore_ascii_case("WHERE"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::tests::{context, counting};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn rejects_unfiltered_changes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = MiddlewareBuilder::new().build()(counting(calls.clone()));
        for (kind, sql) in [
            (QueryKind::Delete, "DELETE FROM `t`;"),
            (QueryKind::Raw, "update `t` SET `somewhere`=?;"),
            (QueryKind::Raw, "UPDATE `t` SET `note` = 'where';"),
            (QueryKind::Raw, "UPDATE `t` SET `a` = (SELECT MAX(`b`) FROM `u` WHERE `u`.`id` = 1);"),
            (QueryKind::Raw, "WITH `o` AS (SELECT `id` FROM `t` WHERE `age` > 90) DELETE FROM `t`;"),
        ] {
            let result = handler(context(kind, sql)).await;
            assert!(matches!(result, Err(Error::Policy(..))), "{sql}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lets_filtered_and_reads_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = MiddlewareBuilder::new().build()(counting(calls.clone()));
        for (kind, sql) in [
            (QueryKind::Delete, "DELETE FROM `t` WHERE `id` = ?;"),
            (QueryKind::Raw, "UPDATE `t` SET `a`=? where `id`=?;"),
            (QueryKind::Select, "SELECT * FROM `t`;"),
            (QueryKind::Raw, "SELECT * FROM `t`;"),
            (QueryKind::Raw, "UPDATE `t` SET `note` = 'x' WHERE `note` = 'where';"),
        ] {
            handler(context(kind, sql)).await.unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }
}
