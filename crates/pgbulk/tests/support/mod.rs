#![allow(dead_code)]

use pgbulk::{
    driver::{CopyColumn, CopyRows, Rows},
    record, OutputIdMode, Result, TableDescriptor, Value,
};
use pgbulk_core::{async_trait, stmt::ValueRecord};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub balance: i32,
    pub code: Option<String>,
}

record!(Customer {
    id as "Id",
    name as "Name",
    balance as "Balance",
    code as "Code",
});

impl Customer {
    pub fn new(name: &str, balance: i32) -> Self {
        Self {
            name: name.to_string(),
            balance,
            ..Default::default()
        }
    }
}

/// `customers` with a serial `Id` and `Balance` stored as `balance`.
pub fn customers() -> TableDescriptor {
    TableDescriptor::builder("customers")
        .primary_key("Id")
        .output_id("Id", OutputIdMode::ServerGenerated)
        .column_name("Balance", "balance")
        .build()
}

/// `customers` without an output id.
pub fn untracked_customers() -> TableDescriptor {
    TableDescriptor::builder("customers")
        .primary_key("Id")
        .column_name("Balance", "balance")
        .build()
}

/// A statement seen by [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    EnsureOpen,
    Execute {
        sql: String,
        params: Vec<Value>,
    },
    Query {
        sql: String,
        params: Vec<Value>,
    },
    CopyIn {
        sql: String,
        columns: Vec<CopyColumn>,
        rows: Vec<ValueRecord>,
    },
}

impl Op {
    pub fn sql(&self) -> &str {
        match self {
            Op::EnsureOpen => "",
            Op::Execute { sql, .. } | Op::Query { sql, .. } | Op::CopyIn { sql, .. } => sql,
        }
    }

    pub fn params(&self) -> &[Value] {
        match self {
            Op::Execute { params, .. } | Op::Query { params, .. } => params,
            _ => &[],
        }
    }

    pub fn copied(&self) -> &[ValueRecord] {
        match self {
            Op::CopyIn { rows, .. } => rows,
            _ => &[],
        }
    }
}

/// Executor that records every call and answers from a script.
///
/// `execute` answers with the next queued count (default 0), `query` with the
/// next queued rows (default empty), and `copy_in` with the number of rows it
/// drained.
#[derive(Debug, Default)]
pub struct Recorder {
    ops: Arc<Mutex<Vec<Op>>>,
    counts: Mutex<VecDeque<u64>>,
    rows: Mutex<VecDeque<Rows>>,
    delay: Option<Duration>,
    broken_copy: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps `delay` before answering `execute` and `query`.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Fails every `copy_in` with a connection reset.
    pub fn broken_copy() -> Self {
        Self {
            broken_copy: true,
            ..Self::default()
        }
    }

    pub fn push_count(&self, count: u64) -> &Self {
        self.counts.lock().unwrap().push_back(count);
        self
    }

    pub fn push_rows(&self, columns: &[&str], rows: Vec<Vec<Value>>) -> &Self {
        self.rows.lock().unwrap().push_back(Rows::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.into_iter().map(ValueRecord::from_vec).collect(),
        ));
        self
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    /// Recorded statements, without the `EnsureOpen` markers.
    pub fn statements(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| *op != Op::EnsureOpen)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    fn push(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl pgbulk::Executor for Recorder {
    async fn ensure_open(&self) -> Result<()> {
        self.push(Op::EnsureOpen);
        Ok(())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.push(Op::Execute {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.wait().await;
        Ok(self.counts.lock().unwrap().pop_front().unwrap_or(0))
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<Rows> {
        self.push(Op::Query {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.wait().await;
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn copy_in(
        &self,
        sql: &str,
        columns: &[CopyColumn],
        rows: &mut CopyRows<'_>,
    ) -> Result<u64> {
        if self.broken_copy {
            return Err(pgbulk::Error::driver(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )));
        }

        let rows = rows.collect::<Result<Vec<_>>>()?;
        let copied = rows.len() as u64;

        self.push(Op::CopyIn {
            sql: sql.to_string(),
            columns: columns.to_vec(),
            rows,
        });
        Ok(copied)
    }
}

/// The relation name of a `CREATE TEMP TABLE "<name>" (...)` statement.
pub fn staging_name(create: &str) -> String {
    let rest = create
        .strip_prefix("CREATE TEMP TABLE \"")
        .unwrap_or_else(|| panic!("not a temp table: {create}"));
    rest[..rest.find('"').unwrap()].to_string()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn row(values: impl IntoIterator<Item = Value>) -> Vec<Value> {
    values.into_iter().collect()
}
