use crate::{
    command::Command,
    keys,
    staging::{find_property, ColumnNaming, StagingColumns},
    MatchOptions,
};

use pgbulk_core::{
    schema::{properties, Record, TableDescriptor},
    Executor, Result,
};
use pgbulk_sql::{
    stmt::{Expr, Name, Select},
    SOURCE_ALIAS, TARGET_ALIAS,
};

use std::marker::PhantomData;
use std::sync::Arc;

const OPERATION: &str = "BulkMatch";

/// Looks up the rows matching a set of probe records.
///
/// Only the match columns of the probes are sent. Each matching row comes back
/// as a fresh `T::default()` with the returned columns filled in; null values
/// leave the default in place.
pub struct BulkMatch<'a, T> {
    executor: &'a dyn Executor,
    descriptor: Option<Arc<TableDescriptor>>,
    match_columns: Option<Vec<String>>,
    returned_columns: Option<Vec<String>>,
    options: MatchOptions,
    _p: PhantomData<fn() -> T>,
}

impl<'a, T: Record + Default> BulkMatch<'a, T> {
    pub fn new(executor: &'a dyn Executor) -> Self {
        Self {
            executor,
            descriptor: None,
            match_columns: None,
            returned_columns: None,
            options: MatchOptions::default(),
            _p: PhantomData,
        }
    }

    /// Uses `descriptor` instead of the one registered for `T`.
    pub fn to_table(mut self, descriptor: impl Into<Arc<TableDescriptor>>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }

    pub fn with_match_column(self, column: impl Into<String>) -> Self {
        self.with_match_columns([column.into()])
    }

    /// Columns compared between probes and rows. Defaults to the primary key.
    pub fn with_match_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.match_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Columns read back from matching rows. Defaults to every property.
    pub fn with_returned_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returned_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn execute(self, probes: &[T]) -> Result<Vec<T>> {
        let descriptor = crate::resolve::<T>(&self.descriptor)?;
        let properties = properties::<T>();
        let match_keys = keys::resolve_ids(self.match_columns.as_deref(), &descriptor)?;

        let returned = match &self.returned_columns {
            Some(columns) => columns.clone(),
            None => descriptor
                .property_names()
                .map(<[String]>::to_vec)
                .unwrap_or_else(|| properties.iter().map(|p| p.name.clone()).collect()),
        };
        for name in &returned {
            find_property(&properties, name)?;
        }

        let columns = StagingColumns::new(
            &descriptor,
            &properties,
            &match_keys,
            ColumnNaming::Property,
            false,
        )?;
        let on = keys::join_on(
            &descriptor,
            &properties,
            &match_keys,
            self.options.collation.as_deref(),
        )?;

        if probes.is_empty() {
            return Ok(vec![]);
        }

        let command = Command::new(self.executor, &self.options.bulk, OPERATION);
        command.ensure_open().await?;

        let staging = Name::staging();
        columns.stage(&command, &staging, probes).await?;

        let select = Select::new(
            returned
                .iter()
                .map(|name| {
                    Expr::qualified(TARGET_ALIAS, descriptor.column_name(name)).alias(name)
                })
                .collect(),
            Name::from(&*descriptor).alias(TARGET_ALIAS),
        )
        .join(staging.alias(SOURCE_ALIAS), on);
        let (sql, params) = command.serialize(&select.into());

        command.log(&format!("Begin matching:\n{sql}"));
        let rows = command.query(&sql, &params).await?;

        let mut matched = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            let mut record = T::default();

            for (name, value) in returned.iter().zip(row.iter()) {
                if value.is_null() {
                    continue;
                }

                let value = match descriptor.converter(name) {
                    Some(converter) => converter.from_provider(value.clone())?,
                    None => value.clone(),
                };
                record.set(name, value)?;
            }

            matched.push(record);
        }
        command.log("End matching.");

        Ok(matched)
    }
}
