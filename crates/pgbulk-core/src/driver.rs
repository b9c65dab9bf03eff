mod rows;
pub use rows::Rows;

use crate::{
    async_trait,
    stmt::{Type, Value, ValueRecord},
    Result,
};

/// One column of a binary copy: the SQL type it is declared with and the host
/// type of the values written to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyColumn {
    pub sql_type: String,
    pub ty: Type,
}

/// Rows streamed into a binary copy, one [`ValueRecord`] per row.
pub type CopyRows<'a> = dyn Iterator<Item = Result<ValueRecord>> + Send + 'a;

/// Runs statements against one database session.
///
/// The engine borrows an executor for the duration of one operation. It never
/// begins or commits transactions; an executor backed by a transaction runs
/// every statement inside it.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Opens the underlying connection if it is not open yet.
    async fn ensure_open(&self) -> Result<()> {
        Ok(())
    }

    /// Runs a statement and returns the number of affected rows.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Runs a statement and returns its rows.
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Rows>;

    /// Runs a `COPY ... FROM STDIN (FORMAT BINARY)` statement, streaming `rows`.
    ///
    /// Either every row is written or the copy fails as a whole.
    async fn copy_in(
        &self,
        sql: &str,
        columns: &[CopyColumn],
        rows: &mut CopyRows<'_>,
    ) -> Result<u64>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for &E {
    async fn ensure_open(&self) -> Result<()> {
        (**self).ensure_open().await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        (**self).execute(sql, params).await
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<Rows> {
        (**self).query(sql, params).await
    }

    async fn copy_in(
        &self,
        sql: &str,
        columns: &[CopyColumn],
        rows: &mut CopyRows<'_>,
    ) -> Result<u64> {
        (**self).copy_in(sql, columns, rows).await
    }
}
