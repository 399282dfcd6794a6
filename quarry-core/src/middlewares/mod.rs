//! Ready made middlewares, each one configured through its own `MiddlewareBuilder`.

pub mod no_delete;
pub mod query_log;
pub mod rate_limit;
pub mod safe_dml;
pub mod slow_query;

use crate::{Query, QueryContext, QueryKind};

const KINDS: [QueryKind; 4] = [
    QueryKind::Select,
    QueryKind::Insert,
    QueryKind::Update,
    QueryKind::Delete,
];

fn keyword_kind(word: &str) -> Option<QueryKind> {
    KINDS
        .into_iter()
        .find(|kind| word.eq_ignore_ascii_case(kind.as_str()))
}

/// Kind of the statement, raw statements are classified by their leading keyword.
///
/// After a leading `WITH` the kind is the one of the statement following the common table
/// expressions, unless one of them deletes or updates rows.
pub(crate) fn statement_kind(context: &QueryContext, query: &Query) -> QueryKind {
    if context.kind != QueryKind::Raw {
        return context.kind;
    }
    let words = sql_words(&query.sql);
    match words.first() {
        Some((word, _)) if word.eq_ignore_ascii_case("WITH") => {
            let nested = words
                .iter()
                .filter(|(_, depth)| *depth > 0)
                .filter_map(|(word, _)| keyword_kind(word))
                .collect::<Vec<_>>();
            if nested.contains(&QueryKind::Delete) {
                QueryKind::Delete
            } else if nested.contains(&QueryKind::Update) {
                QueryKind::Update
            } else {
                words
                    .iter()
                    .filter(|(_, depth)| *depth == 0)
                    .find_map(|(word, _)| keyword_kind(word))
                    .unwrap_or(QueryKind::Raw)
            }
        }
        Some((word, _)) => keyword_kind(word).unwrap_or(QueryKind::Raw),
        None => QueryKind::Raw,
    }
}

/// Words of `sql` paired with their parenthesis depth. Quoted spans and comments are skipped.
pub(crate) fn sql_words(sql: &str) -> Vec<(&str, usize)> {
    let bytes = sql.as_bytes();
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == b'\\' && quote != b'`' {
                        i += 2;
                        continue;
                    }
                    if bytes[i] == quote {
                        // Doubled quotes stand for the quote itself
                        if bytes.get(i + 1) != Some(&quote) {
                            break;
                        }
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 2;
            }
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            c if c.is_ascii_alphanumeric() || c == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                words.push((&sql[start..i], depth));
            }
            _ => i += 1,
        }
    }
    words
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        Handler, Model, QueryBuilder, QueryOutput, QueryResult, Result, RowsAffected, Value,
    };
    use futures::{FutureExt, future::BoxFuture};
    use std::{
        any::TypeId,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    pub(crate) struct Fixed(pub &'static str);

    impl QueryBuilder for Fixed {
        fn build(&self) -> Result<Query> {
            Ok(Query::new(self.0, vec![Value::Int32(Some(1))]))
        }
    }

    pub(crate) fn context(kind: QueryKind, sql: &'static str) -> QueryContext {
        QueryContext {
            kind,
            builder: Arc::new(Fixed(sql)),
            model: Arc::new(Model::new("t".into(), TypeId::of::<()>(), Vec::new())),
        }
    }

    /// Terminal handler counting its calls.
    pub(crate) fn counting(calls: Arc<AtomicUsize>) -> Handler {
        Arc::new(move |_: QueryContext| -> BoxFuture<'static, QueryResult> {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(QueryOutput::Affected(RowsAffected::default())) }.boxed()
        })
    }

    #[test]
    fn raw_statements_classified_by_keyword() {
        let check = |sql: &'static str| {
            let context = context(QueryKind::Raw, sql);
            let query = context.builder.build().unwrap();
            statement_kind(&context, &query)
        };
        assert_eq!(check("  delete FROM `t`;"), QueryKind::Delete);
        assert_eq!(check("UPDATE `t` SET `a`=1;"), QueryKind::Update);
        assert_eq!(check("SELECT * FROM `t`;"), QueryKind::Select);
        assert_eq!(check("PRAGMA foreign_keys = ON;"), QueryKind::Raw);
        assert_eq!(check(""), QueryKind::Raw);
        let context = context(QueryKind::Insert, "DELETE FROM `t`;");
        let query = context.builder.build().unwrap();
        assert_eq!(statement_kind(&context, &query), QueryKind::Insert);
    }

    #[test]
    fn common_table_expressions() {
        let check = |sql: &'static str| {
            let context = context(QueryKind::Raw, sql);
            let query = context.builder.build().unwrap();
            statement_kind(&context, &query)
        };
        assert_eq!(
            check("WITH `old` AS (SELECT `id` FROM `t` WHERE `age` > 90) DELETE FROM `t`;"),
            QueryKind::Delete
        );
        assert_eq!(
            check("with recursive `c`(`x`) as (select 1 union all select `x` + 1 from `c`) select * from `c`;"),
            QueryKind::Select
        );
        assert_eq!(
            check("WITH `gone` AS (DELETE FROM `t` RETURNING `id`) SELECT COUNT(*) FROM `gone`;"),
            QueryKind::Delete
        );
        assert_eq!(
            check("WITH `x` AS (SELECT 1) UPDATE `t` SET `a` = 1;"),
            QueryKind::Update
        );
    }

    #[test]
    fn words_skip_quotes_and_comments() {
        let words = sql_words(
            "UPDATE `where` SET note = 'it''s where', other = \"WHERE\" -- where\n/* where */ (x)",
        );
        assert_eq!(
            words,
            [("UPDATE", 0), ("SET", 0), ("note", 0), ("other", 0), ("x", 1)]
        );
        assert_eq!(sql_words("SELECT 'a\\'where'"), [("SELECT", 0)]);
    }
}
