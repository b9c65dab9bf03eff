//! Bulk insert, update, delete, merge and match for PostgreSQL.
//!
//! Records are streamed into a session-scoped staging table with a binary
//! `COPY`, then reconciled against the destination table with a single
//! set-based statement. Server-generated ids are correlated back to the
//! records by their position in the input.
//!
//! ```no_run
//! # async fn run() -> pgbulk::Result<()> {
//! use pgbulk::{record, BulkExt, PostgreSQL, TableDescriptor};
//!
//! #[derive(Default)]
//! struct Customer {
//!     id: i64,
//!     name: String,
//! }
//!
//! record!(Customer { id as "Id", name as "Name" });
//!
//! pgbulk::registry::register::<Customer>(
//!     TableDescriptor::builder("customers").primary_key("Id").build(),
//! );
//!
//! let db = PostgreSQL::connect("postgresql://localhost/app").await?;
//! let mut customers = vec![
//!     Customer { id: 1, name: "Ada".into() },
//!     Customer { id: 2, name: "Grace".into() },
//! ];
//!
//! db.bulk_insert::<Customer>()
//!     .options(pgbulk::InsertOptions {
//!         keep_identity: true,
//!         ..Default::default()
//!     })
//!     .execute(&mut customers)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod blocking;

mod bulk_match;
pub use bulk_match::BulkMatch;

mod command;

mod delete;
pub use delete::BulkDelete;

mod identity;

mod insert;
pub use insert::BulkInsert;

mod keys;

mod merge;
pub use merge::BulkMerge;

mod options;
pub use options::{
    BulkOptions, DeleteOptions, InsertOptions, LogSink, MatchOptions, MergeOptions,
    NotMatchedBySourceContext, NotMatchedBySourceHook, SetClauseHook, StagingTableOptions,
    UpdateOptions,
};

mod result;
pub use result::{DeleteResult, InsertResult, MergeResult, UpdateResult};

mod staging;

mod staging_table;
pub use staging_table::StagingTable;

mod update;
pub use update::BulkUpdate;

pub use pgbulk_core::{
    driver, record, value_enum,
    schema::{
        self, registry, sequential_id, OutputIdMode, Property, Record, TableDescriptor,
        ValueConverter,
    },
    stmt::{Type, Value, ValueType},
    Error, Executor, Result,
};
pub use pgbulk_sql::stmt::SetClauseContext;

#[cfg(feature = "postgresql")]
pub use pgbulk_driver_postgresql::{PostgreSQL, Session};

use std::sync::Arc;

/// Entry points for every bulk operation, available on any [`Executor`].
pub trait BulkExt: Executor + Sized {
    fn bulk_insert<T: Record>(&self) -> BulkInsert<'_, T> {
        BulkInsert::new(self)
    }

    fn bulk_update<T: Record>(&self) -> BulkUpdate<'_, T> {
        BulkUpdate::new(self)
    }

    fn bulk_delete<T: Record>(&self) -> BulkDelete<'_, T> {
        BulkDelete::new(self)
    }

    fn bulk_merge<T: Record>(&self) -> BulkMerge<'_, T> {
        BulkMerge::new(self)
    }

    fn bulk_match<T: Record + Default>(&self) -> BulkMatch<'_, T> {
        BulkMatch::new(self)
    }

    fn staging_table<T: Record>(&self) -> StagingTable<'_, T> {
        StagingTable::new(self)
    }
}

impl<E: Executor> BulkExt for E {}

/// The builder's explicit descriptor, or the one registered for `T`.
fn resolve<T: Record>(explicit: &Option<Arc<TableDescriptor>>) -> Result<Arc<TableDescriptor>> {
    match explicit {
        Some(descriptor) => Ok(descriptor.clone()),
        None => registry::resolve::<T>(),
    }
}
