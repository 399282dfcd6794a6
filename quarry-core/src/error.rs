use thiserror::Error;

/// Failures surfaced by the registry, the statement builders, the middleware pipeline and the
/// value mappers.
///
/// Callers match on the variant, the message is only meant for humans.
#[derive(Debug, Error)]
pub enum Error {
    /// Metadata can only be derived from structs with named fields.
    #[error("quarry: only structs with named fields can be mapped, `{0}` is not one")]
    StructOnly(&'static str),
    #[error("quarry: invalid tag content `{0}`")]
    InvalidTagContent(String),
    #[error("quarry: unknown field `{0}`")]
    UnknownField(String),
    /// A result set column has no matching field in the model.
    #[error("quarry: unknown column `{0}`")]
    UnknownColumn(String),
    #[error("quarry: unsupported expression {0}")]
    UnsupportedExpression(String),
    #[error("quarry: unsupported assignable {0}")]
    UnsupportedAssignable(String),
    #[error("quarry: unsupported table reference {0}")]
    UnsupportedTable(String),
    #[error("quarry: cannot insert zero rows")]
    InsertZeroRow,
    /// A single row lookup matched nothing.
    #[error("quarry: no rows in result set")]
    NoRows,
    /// Rejection produced by a middleware policy before the statement reached the session.
    #[error("quarry: {0}")]
    Policy(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn msg<M: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static>(message: M) -> Self {
        Error::Other(anyhow::Error::msg(message))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
