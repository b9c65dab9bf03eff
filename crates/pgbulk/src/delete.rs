use crate::{
    command::Command,
    keys,
    staging::{ColumnNaming, StagingColumns},
    DeleteOptions, DeleteResult,
};

use pgbulk_core::{
    schema::{properties, Property, Record, TableDescriptor},
    Executor, Result,
};
use pgbulk_sql::{stmt::Name, Statement, SOURCE_ALIAS, TARGET_ALIAS};

use std::marker::PhantomData;
use std::sync::Arc;

const OPERATION: &str = "BulkDelete";

/// Deletes the rows matching each record's id.
pub struct BulkDelete<'a, T> {
    executor: &'a dyn Executor,
    descriptor: Option<Arc<TableDescriptor>>,
    ids: Option<Vec<String>>,
    options: DeleteOptions,
    _p: PhantomData<fn() -> T>,
}

struct Plan {
    descriptor: Arc<TableDescriptor>,
    properties: Arc<[Property]>,
    columns: StagingColumns,
}

impl<'a, T: Record> BulkDelete<'a, T> {
    pub fn new(executor: &'a dyn Executor) -> Self {
        Self {
            executor,
            descriptor: None,
            ids: None,
            options: DeleteOptions::default(),
            _p: PhantomData,
        }
    }

    /// Uses `descriptor` instead of the one registered for `T`.
    pub fn to_table(mut self, descriptor: impl Into<Arc<TableDescriptor>>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }

    /// Matches rows on `id` instead of the primary key.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_ids([id.into()])
    }

    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn options(mut self, options: DeleteOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn execute(self, records: &[T]) -> Result<DeleteResult> {
        let plan = self.plan()?;
        let command = Command::new(self.executor, &self.options.bulk, OPERATION);

        if records.is_empty() {
            return Ok(DeleteResult::default());
        }

        if records.len() == 1 && self.options.bulk.single_row_fast_path {
            return self.delete_one(&command, &plan, &records[0]).await;
        }

        command.ensure_open().await?;

        let staging = Name::staging();
        plan.columns.stage(&command, &staging, records).await?;

        let ids: Vec<_> = plan.columns.iter().map(|c| c.property.clone()).collect();
        let stmt = Statement::delete_using(
            Name::from(&*plan.descriptor).alias(TARGET_ALIAS),
            staging.alias(SOURCE_ALIAS),
            keys::join_on(
                &plan.descriptor,
                &plan.properties,
                &ids,
                self.options.collation.as_deref(),
            )?,
        );
        let (sql, params) = command.serialize(&stmt);

        command.log(&format!("Begin deleting:\n{sql}"));
        let affected = command.execute(&sql, &params).await?;
        command.log("End deleting.");

        Ok(DeleteResult { affected })
    }

    /// Deletes one record with a single parameterized statement.
    pub async fn execute_one(self, record: &T) -> Result<DeleteResult> {
        let plan = self.plan()?;
        let command = Command::new(self.executor, &self.options.bulk, OPERATION);
        self.delete_one(&command, &plan, record).await
    }

    async fn delete_one(
        &self,
        command: &Command<'_>,
        plan: &Plan,
        record: &T,
    ) -> Result<DeleteResult> {
        let key_values: Vec<_> = plan
            .columns
            .iter()
            .map(|c| c.property.clone())
            .zip(plan.columns.values(record)?)
            .collect();

        let stmt = Statement::delete(
            Name::from(&*plan.descriptor).into(),
            keys::filter_on(
                &plan.descriptor,
                &plan.properties,
                &key_values,
                self.options.collation.as_deref(),
            )?,
        );
        let (sql, params) = command.serialize(&stmt);

        command.log(&format!("Begin deleting:\n{sql}"));
        command.ensure_open().await?;
        let affected = command.execute(&sql, &params).await?;
        command.log("End deleting.");

        Ok(DeleteResult { affected })
    }

    fn plan(&self) -> Result<Plan> {
        let descriptor = crate::resolve::<T>(&self.descriptor)?;
        let properties = properties::<T>();
        let ids = keys::resolve_ids(self.ids.as_deref(), &descriptor)?;
        let columns = StagingColumns::new(
            &descriptor,
            &properties,
            &ids,
            ColumnNaming::Property,
            false,
        )?;

        Ok(Plan {
            descriptor,
            properties,
            columns,
        })
    }
}
