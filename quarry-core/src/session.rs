use crate::{Result, RowsAffected, Value};
use std::future::Future;

/// Database access the statements are executed through.
///
/// Implementations own connections, pooling and driver selection. Cancellation follows the
/// returned future: dropping it abandons the call.
pub trait Session: Send + Sync + 'static {
    type Rows: Rows;

    fn query_context(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = Result<Self::Rows>> + Send;

    fn exec_context(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = Result<RowsAffected>> + Send;
}

/// Cursor over a result set.
pub trait Rows: Send {
    /// Labels of the result columns, in order.
    fn columns(&self) -> &[String];

    /// Advances to the next row, returning `false` once exhausted.
    fn next(&mut self) -> Result<bool>;

    /// Stores the cells of the current row into `targets`, one per column.
    fn scan(&mut self, targets: &mut [&mut dyn ScanTarget]) -> Result<()>;
}

/// Destination of a scanned cell.
pub trait ScanTarget {
    /// Expected type, as a NULL prototype.
    fn prototype(&self) -> Value;

    fn assign(&mut self, value: Value) -> Result<()>;
}

impl ScanTarget for Value {
    fn prototype(&self) -> Value {
        self.as_null()
    }

    fn assign(&mut self, value: Value) -> Result<()> {
        *self = value;
        Ok(())
    }
}
