use crate::BulkOptions;

use pgbulk_core::{
    driver::{CopyColumn, CopyRows, Rows},
    stmt::Value,
    err, Error, Executor, Result,
};
use pgbulk_sql::{Serializer, Statement};

use std::future::Future;

/// Runs the statements of one operation against an executor, applying the
/// operation's timeout and log sink.
pub(crate) struct Command<'a> {
    executor: &'a dyn Executor,
    options: &'a BulkOptions,
    operation: &'static str,
}

impl<'a> Command<'a> {
    pub(crate) fn new(
        executor: &'a dyn Executor,
        options: &'a BulkOptions,
        operation: &'static str,
    ) -> Self {
        Self {
            executor,
            options,
            operation,
        }
    }

    pub(crate) fn options(&self) -> &BulkOptions {
        self.options
    }

    pub(crate) fn log(&self, message: &str) {
        log::debug!("[{}]: {}", self.operation, message);

        if let Some(sink) = &self.options.log_to {
            sink.write(self.operation, message);
        }
    }

    pub(crate) fn serialize(&self, stmt: &Statement) -> (String, Vec<Value>) {
        let mut params = vec![];
        let sql = Serializer::postgresql().serialize(stmt, &mut params);
        (sql, params)
    }

    pub(crate) async fn ensure_open(&self) -> Result<()> {
        self.timed("opening connection", self.executor.ensure_open()).await
    }

    pub(crate) async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.timed("executing statement", self.executor.execute(sql, params))
            .await
    }

    pub(crate) async fn query(&self, sql: &str, params: &[Value]) -> Result<Rows> {
        self.timed("running query", self.executor.query(sql, params)).await
    }

    pub(crate) async fn copy_in(
        &self,
        sql: &str,
        columns: &[CopyColumn],
        rows: &mut CopyRows<'_>,
    ) -> Result<u64> {
        self.timed("copying staged rows", self.executor.copy_in(sql, columns, rows))
            .await
    }

    /// Awaits `fut` under the operation's timeout. Failures are wrapped with
    /// the operation name and `step`.
    async fn timed<T>(
        &self,
        step: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let res = match self.options.timeout {
            Some(limit) if !limit.is_zero() => tokio::time::timeout(limit, fut)
                .await
                .unwrap_or_else(|_| Err(Error::timeout(limit))),
            _ => fut.await,
        };

        res.map_err(|err| err.context(err!("{}: {}", self.operation, step)))
    }
}
