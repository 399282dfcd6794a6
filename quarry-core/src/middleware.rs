use crate::{Error, Model, QueryBuilder, Result, RowsAffected};
use futures::future::BoxFuture;
use std::{
    any::{Any, type_name},
    fmt::{self, Display},
    sync::Arc,
};

/// Kind of statement flowing through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    Raw,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
            QueryKind::Raw => "RAW",
        }
    }
}

impl Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of work handed to every middleware.
#[derive(Clone)]
pub struct QueryContext {
    pub kind: QueryKind,
    pub builder: Arc<dyn QueryBuilder>,
    pub model: Arc<Model>,
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("kind", &self.kind)
            .field("table", &self.model.table_name)
            .finish_non_exhaustive()
    }
}

/// Successful result of a pipeline call.
pub enum QueryOutput {
    /// Mapped entity (or entities) produced by a read, boxed to stay independent of the type.
    Entity(Box<dyn Any + Send>),
    Affected(RowsAffected),
}

impl fmt::Debug for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutput::Entity(..) => f.write_str("Entity(..)"),
            QueryOutput::Affected(v) => f.debug_tuple("Affected").field(v).finish(),
        }
    }
}

impl QueryOutput {
    pub fn into_entity<T: 'static>(self) -> Result<T> {
        match self {
            QueryOutput::Entity(entity) => entity.downcast::<T>().map(|v| *v).map_err(|_| {
                Error::msg(format!("The query did not produce a {}", type_name::<T>()))
            }),
            QueryOutput::Affected(..) => Err(Error::msg(format!(
                "The query produced an execution result instead of a {}",
                type_name::<T>()
            ))),
        }
    }

    pub fn into_affected(self) -> Result<RowsAffected> {
        match self {
            QueryOutput::Affected(result) => Ok(result),
            QueryOutput::Entity(..) => Err(Error::msg(
                "The query produced entities instead of an execution result",
            )),
        }
    }
}

pub type QueryResult = Result<QueryOutput>;

pub type Handler = Arc<dyn Fn(QueryContext) -> BoxFuture<'static, QueryResult> + Send + Sync>;

/// Transforms a handler into another one, usually by wrapping it.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Wraps `terminal` with `middlewares`, the first one ends up outermost.
pub fn chain(middlewares: &[Middleware], terminal: Handler) -> Handler {
    middlewares
        .iter()
        .rev()
        .fold(terminal, |next, middleware| middleware(next))
}
