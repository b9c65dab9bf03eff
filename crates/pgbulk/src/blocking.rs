//! A synchronous mirror of the async API.
//!
//! [`Connection`] owns an executor together with a current-thread runtime and
//! drives the async builders to completion on it.
//!
//! ```no_run
//! # fn run() -> pgbulk::Result<()> {
//! # #[derive(Default)] struct Customer { id: i64 }
//! # pgbulk::record!(Customer { id as "Id" });
//! let conn = pgbulk::blocking::Connection::connect("postgresql://localhost/app")?;
//! let probes = vec![Customer { id: 1 }];
//! let found = conn
//!     .bulk_match::<Customer>()
//!     .configure(|builder| builder.with_match_column("Id"))
//!     .execute(&probes)?;
//! # Ok(())
//! # }
//! ```

use crate::{
    BulkDelete, BulkExt, BulkInsert, BulkMatch, BulkMerge, BulkUpdate, DeleteResult,
    InsertResult, MergeResult, Record, StagingTable, UpdateResult,
};

use pgbulk_core::{Error, Executor, Result};
use tokio::runtime::{self, Runtime};

use std::future::Future;

/// An executor paired with the runtime that drives it.
#[derive(Debug)]
pub struct Connection<E> {
    runtime: Runtime,
    executor: E,
}

/// A builder bound to a [`Connection`]'s runtime.
pub struct Blocking<'a, B> {
    runtime: &'a Runtime,
    builder: B,
}

impl<E: Executor> Connection<E> {
    pub fn new(executor: E) -> Result<Self> {
        Ok(Self {
            runtime: new_runtime()?,
            executor,
        })
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs `future` to completion on this connection's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn bulk_insert<T: Record>(&self) -> Blocking<'_, BulkInsert<'_, T>> {
        self.bind(self.executor.bulk_insert())
    }

    pub fn bulk_update<T: Record>(&self) -> Blocking<'_, BulkUpdate<'_, T>> {
        self.bind(self.executor.bulk_update())
    }

    pub fn bulk_delete<T: Record>(&self) -> Blocking<'_, BulkDelete<'_, T>> {
        self.bind(self.executor.bulk_delete())
    }

    pub fn bulk_merge<T: Record>(&self) -> Blocking<'_, BulkMerge<'_, T>> {
        self.bind(self.executor.bulk_merge())
    }

    pub fn bulk_match<T: Record + Default>(&self) -> Blocking<'_, BulkMatch<'_, T>> {
        self.bind(self.executor.bulk_match())
    }

    pub fn staging_table<T: Record>(&self) -> Blocking<'_, StagingTable<'_, T>> {
        self.bind(self.executor.staging_table())
    }

    fn bind<'a, B>(&'a self, builder: B) -> Blocking<'a, B> {
        Blocking {
            runtime: &self.runtime,
            builder,
        }
    }
}

#[cfg(feature = "postgresql")]
impl Connection<crate::PostgreSQL> {
    /// Connects to a PostgreSQL database using a connection string.
    pub fn connect(url: &str) -> Result<Self> {
        let runtime = new_runtime()?;
        let executor = runtime.block_on(crate::PostgreSQL::connect(url))?;
        Ok(Self { runtime, executor })
    }
}

impl<'a, B> Blocking<'a, B> {
    /// Applies builder methods, e.g. `.configure(|b| b.with_id("Id"))`.
    pub fn configure(self, f: impl FnOnce(B) -> B) -> Self {
        Self {
            runtime: self.runtime,
            builder: f(self.builder),
        }
    }
}

impl<T: Record> Blocking<'_, BulkInsert<'_, T>> {
    pub fn execute(self, records: &mut [T]) -> Result<InsertResult> {
        self.runtime.block_on(self.builder.execute(records))
    }

    pub fn execute_one(self, record: &mut T) -> Result<InsertResult> {
        self.runtime.block_on(self.builder.execute_one(record))
    }
}

impl<T: Record> Blocking<'_, BulkUpdate<'_, T>> {
    pub fn execute(self, records: &[T]) -> Result<UpdateResult> {
        self.runtime.block_on(self.builder.execute(records))
    }

    pub fn execute_one(self, record: &T) -> Result<UpdateResult> {
        self.runtime.block_on(self.builder.execute_one(record))
    }
}

impl<T: Record> Blocking<'_, BulkDelete<'_, T>> {
    pub fn execute(self, records: &[T]) -> Result<DeleteResult> {
        self.runtime.block_on(self.builder.execute(records))
    }

    pub fn execute_one(self, record: &T) -> Result<DeleteResult> {
        self.runtime.block_on(self.builder.execute_one(record))
    }
}

impl<T: Record> Blocking<'_, BulkMerge<'_, T>> {
    pub fn execute(self, records: &mut [T]) -> Result<MergeResult> {
        self.runtime.block_on(self.builder.execute(records))
    }

    pub fn execute_one(self, record: &mut T) -> Result<MergeResult> {
        self.runtime.block_on(self.builder.execute_one(record))
    }
}

impl<T: Record + Default> Blocking<'_, BulkMatch<'_, T>> {
    pub fn execute(self, probes: &[T]) -> Result<Vec<T>> {
        self.runtime.block_on(self.builder.execute(probes))
    }
}

impl<T: Record> Blocking<'_, StagingTable<'_, T>> {
    pub fn execute(self, records: &[T]) -> Result<String> {
        self.runtime.block_on(self.builder.execute(records))
    }
}

fn new_runtime() -> Result<Runtime> {
    runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::driver)
}
