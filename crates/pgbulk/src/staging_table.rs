use crate::{
    command::Command,
    staging::{qualified, ColumnNaming, StagingColumns},
    StagingTableOptions,
};

use pgbulk_core::{
    schema::{properties, registry, Record, TableDescriptor},
    Executor, Result,
};
use pgbulk_sql::stmt::Name;

use std::marker::PhantomData;
use std::sync::Arc;

const OPERATION: &str = "StagingTable";

/// Loads records into a session-scoped temp table for use in the caller's
/// own SQL.
///
/// Column names and types follow the descriptor's mappings. The table is
/// dropped when the session ends.
pub struct StagingTable<'a, T> {
    executor: &'a dyn Executor,
    descriptor: Option<Arc<TableDescriptor>>,
    columns: Option<Vec<String>>,
    options: StagingTableOptions,
    _p: PhantomData<fn() -> T>,
}

impl<'a, T: Record> StagingTable<'a, T> {
    pub fn new(executor: &'a dyn Executor) -> Self {
        Self {
            executor,
            descriptor: None,
            columns: None,
            options: StagingTableOptions::default(),
            _p: PhantomData,
        }
    }

    /// Takes column names, types and converters from `descriptor`.
    pub fn with_mapping(mut self, descriptor: impl Into<Arc<TableDescriptor>>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn options(mut self, options: StagingTableOptions) -> Self {
        self.options = options;
        self
    }

    /// Creates and fills the table, returning its quoted name.
    pub async fn execute(self, records: &[T]) -> Result<String> {
        let name = self.table_name();

        // Without a mapping, columns are named after the properties.
        let descriptor = match &self.descriptor {
            Some(descriptor) => descriptor.clone(),
            None if registry::is_registered::<T>() || T::describe().is_some() => {
                registry::resolve::<T>()?
            }
            None => Arc::new(TableDescriptor::builder(&name.name).build()),
        };
        let properties = properties::<T>();

        let names = match &self.columns {
            Some(columns) => columns.clone(),
            None => descriptor
                .property_names()
                .map(<[String]>::to_vec)
                .unwrap_or_else(|| properties.iter().map(|p| p.name.clone()).collect()),
        };
        let columns =
            StagingColumns::new(&descriptor, &properties, &names, ColumnNaming::Mapped, false)?;

        let command = Command::new(self.executor, &self.options.bulk, OPERATION);
        command.ensure_open().await?;
        columns.stage(&command, &name, records).await?;

        Ok(qualified(&name))
    }

    fn table_name(&self) -> Name {
        match (&self.options.table_name, &self.options.prefix) {
            (Some(name), _) if !name.trim().is_empty() => Name::new(name),
            (_, Some(prefix)) if !prefix.trim().is_empty() => Name::staging_with_prefix(prefix),
            _ => Name::staging(),
        }
    }
}
