use crate::{
    command::Command,
    identity::GeneratedIds,
    staging::{ColumnNaming, StagingColumns},
    InsertOptions, InsertResult,
};

use pgbulk_core::{
    schema::{properties, sequential_id, OutputId, OutputIdMode, Property, Record, TableDescriptor},
    stmt::Value,
    Error, Executor, Result,
};
use pgbulk_sql::{
    stmt::{Expr, Merge, MergeSource, Name, Select},
    Statement, ORDINAL_COLUMN, SOURCE_ALIAS, TARGET_ALIAS,
};

use std::marker::PhantomData;
use std::sync::Arc;

const OPERATION: &str = "BulkInsert";

/// Inserts records into a table.
///
/// Columns default to the descriptor's insertable properties, leaving out a
/// server-generated output id. When the table has an output id, the ids of
/// the new rows are written back onto the records:
///
/// * server-generated ids are read back through a `MERGE ... RETURNING` and
///   matched to records by position;
/// * client-generated ids are assigned before the records are sent;
/// * with [`InsertOptions::keep_identity`] the records' own ids are inserted.
pub struct BulkInsert<'a, T> {
    executor: &'a dyn Executor,
    descriptor: Option<Arc<TableDescriptor>>,
    columns: Option<Vec<String>>,
    options: InsertOptions,
    _p: PhantomData<fn() -> T>,
}

/// How ids reach the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Identity {
    /// Not read back
    Untracked,
    KeepIdentity,
    ClientGenerated,
    ServerGenerated,
}

struct Plan {
    descriptor: Arc<TableDescriptor>,
    properties: Arc<[Property]>,
    columns: Vec<String>,
    identity: Identity,
    output_id: Option<OutputId>,
}

impl<'a, T: Record> BulkInsert<'a, T> {
    pub fn new(executor: &'a dyn Executor) -> Self {
        Self {
            executor,
            descriptor: None,
            columns: None,
            options: InsertOptions::default(),
            _p: PhantomData,
        }
    }

    /// Uses `descriptor` instead of the one registered for `T`.
    pub fn to_table(mut self, descriptor: impl Into<Arc<TableDescriptor>>) -> Self {
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

    pub fn options(mut self, options: InsertOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn execute(self, records: &mut [T]) -> Result<InsertResult> {
        let plan = self.plan()?;
        let command = Command::new(self.executor, &self.options.bulk, OPERATION);

        if records.is_empty() {
            return Ok(InsertResult::default());
        }

        if records.len() == 1 && self.options.bulk.single_row_fast_path {
            return self.insert_one(&command, &plan, &mut records[0]).await;
        }

        command.ensure_open().await?;

        if plan.identity == Identity::ClientGenerated {
            assign_client_ids(&plan, records)?;
        }

        if plan.identity == Identity::ServerGenerated {
            return insert_returning_ids(&command, &plan, records).await;
        }

        if self.options.direct_copy {
            let columns = StagingColumns::new(
                &plan.descriptor,
                &plan.properties,
                &plan.columns,
                ColumnNaming::Mapped,
                false,
            )?;
            let affected = columns
                .load(&command, &Name::from(&*plan.descriptor), records)
                .await?;
            return Ok(InsertResult { affected });
        }

        insert_from_staging(&command, &plan, records).await
    }

    /// Inserts one record with a single parameterized statement.
    pub async fn execute_one(self, record: &mut T) -> Result<InsertResult> {
        let plan = self.plan()?;
        let command = Command::new(self.executor, &self.options.bulk, OPERATION);
        self.insert_one(&command, &plan, record).await
    }

    async fn insert_one(
        &self,
        command: &Command<'_>,
        plan: &Plan,
        record: &mut T,
    ) -> Result<InsertResult> {
        if plan.identity == Identity::ClientGenerated {
            assign_client_ids(plan, std::slice::from_mut(record))?;
        }

        let columns = StagingColumns::new(
            &plan.descriptor,
            &plan.properties,
            &plan.columns,
            ColumnNaming::Mapped,
            false,
        )?;
        let values = columns
            .values(record)?
            .into_iter()
            .map(Expr::Value)
            .collect();

        let returning = match (&plan.output_id, plan.identity) {
            (Some(id), Identity::ServerGenerated) => {
                vec![Expr::column(plan.descriptor.column_name(&id.name)).into()]
            }
            _ => vec![],
        };

        let stmt = Statement::insert_values(
            Name::from(&*plan.descriptor),
            columns.iter().map(|column| column.name.clone()).collect(),
            values,
            returning,
        );
        let (sql, params) = command.serialize(&stmt);

        command.log(&format!("Begin inserting:\n{sql}"));
        command.ensure_open().await?;

        let affected = match (&plan.output_id, plan.identity) {
            (Some(id), Identity::ServerGenerated) => {
                let rows = command.query(&sql, &params).await?;
                if let Some(value) = rows.iter().next().map(|row| row[0].clone()) {
                    let value = match plan.descriptor.converter(&id.name) {
                        Some(converter) => converter.from_provider(value)?,
                        None => value,
                    };
                    record.set(&id.name, value)?;
                }
                rows.len() as u64
            }
            _ => command.execute(&sql, &params).await?,
        };

        command.log("End inserting.");
        Ok(InsertResult { affected })
    }

    fn plan(&self) -> Result<Plan> {
        let descriptor = crate::resolve::<T>(&self.descriptor)?;
        let properties = properties::<T>();

        let output_id = descriptor.output_id().cloned();
        let identity = match &output_id {
            None => Identity::Untracked,
            Some(_) if self.options.keep_identity => Identity::KeepIdentity,
            Some(_) if !self.options.return_generated_id => Identity::Untracked,
            Some(id) if id.mode == OutputIdMode::ClientGenerated => Identity::ClientGenerated,
            Some(_) => Identity::ServerGenerated,
        };

        let mut columns = match &self.columns {
            Some(columns) => columns.clone(),
            None => default_columns(&descriptor, &properties),
        };

        if let (Some(id), Identity::KeepIdentity | Identity::ClientGenerated) =
            (&output_id, identity)
        {
            if !columns.contains(&id.name) {
                columns.push(id.name.clone());
            }
        }

        if columns.is_empty() {
            return Err(Error::configuration(format!(
                "no columns to insert into `{}`",
                descriptor.name()
            )));
        }

        for column in &columns {
            crate::staging::find_property(&properties, column)?;
        }

        if let Some(id) = &output_id {
            crate::staging::find_property(&properties, &id.name)?;
        }

        Ok(Plan {
            descriptor,
            properties,
            columns,
            identity,
            output_id,
        })
    }
}

/// Insertable properties, without a server-generated id.
pub(crate) fn default_columns(descriptor: &TableDescriptor, properties: &[Property]) -> Vec<String> {
    let names: Vec<String> = match descriptor
        .insertable_property_names()
        .or(descriptor.property_names())
    {
        Some(names) => names.to_vec(),
        None => properties.iter().map(|p| p.name.clone()).collect(),
    };

    match descriptor.output_id() {
        Some(id) if id.mode == OutputIdMode::ServerGenerated => {
            names.into_iter().filter(|name| *name != id.name).collect()
        }
        _ => names,
    }
}

fn assign_client_ids<T: Record>(plan: &Plan, records: &mut [T]) -> Result<()> {
    let Some(id) = &plan.output_id else {
        return Ok(());
    };

    for record in records {
        record.set(&id.name, Value::Uuid(sequential_id()))?;
    }

    Ok(())
}

async fn insert_from_staging<T: Record>(
    command: &Command<'_>,
    plan: &Plan,
    records: &[T],
) -> Result<InsertResult> {
    let staging = Name::staging();
    let columns = StagingColumns::new(
        &plan.descriptor,
        &plan.properties,
        &plan.columns,
        ColumnNaming::Property,
        false,
    )?;
    columns.stage(command, &staging, records).await?;

    let select = Select::new(
        columns.iter().map(|c| Expr::column(&c.name).into()).collect(),
        staging,
    );
    let stmt = Statement::insert_select(
        Name::from(&*plan.descriptor),
        columns
            .iter()
            .map(|c| plan.descriptor.column_name(&c.property).into_owned())
            .collect(),
        select,
    );
    let (sql, params) = command.serialize(&stmt);

    command.log(&format!("Begin inserting:\n{sql}"));
    let affected = command.execute(&sql, &params).await?;
    command.log("End inserting.");

    Ok(InsertResult { affected })
}

async fn insert_returning_ids<T: Record>(
    command: &Command<'_>,
    plan: &Plan,
    records: &mut [T],
) -> Result<InsertResult> {
    let Some(id) = &plan.output_id else {
        return insert_from_staging(command, plan, records).await;
    };

    let staging = Name::staging();
    let columns = StagingColumns::new(
        &plan.descriptor,
        &plan.properties,
        &plan.columns,
        ColumnNaming::Property,
        true,
    )?;
    columns.stage(command, &staging, records).await?;

    let id_column = plan.descriptor.column_name(&id.name).into_owned();
    let ordered = Select::new(vec![Expr::Wildcard.into()], staging)
        .order_by(Expr::column(ORDINAL_COLUMN));

    let merge = Merge::new(
        Name::from(&*plan.descriptor).alias(TARGET_ALIAS),
        MergeSource::Query(Box::new(ordered), SOURCE_ALIAS.to_string()),
        Expr::False,
    )
    .when_not_matched(
        columns
            .iter()
            .map(|c| plan.descriptor.column_name(&c.property).into_owned())
            .collect(),
        columns
            .iter()
            .map(|c| Expr::qualified(SOURCE_ALIAS, &c.name))
            .collect(),
    )
    .returning(vec![
        Expr::qualified(TARGET_ALIAS, &id_column).into(),
        Expr::qualified(SOURCE_ALIAS, ORDINAL_COLUMN).into(),
    ]);
    let (sql, params) = command.serialize(&merge.into());

    command.log(&format!("Begin merging temp table:\n{sql}"));
    let rows = command.query(&sql, &params).await?;
    command.log("End merging temp table.");

    let affected = rows.len() as u64;
    let ids = GeneratedIds::from_rows(&rows, &id_column, ORDINAL_COLUMN)?;
    log::trace!("correlating generated ids; count={}", ids.len());
    ids.assign(records, &id.name, plan.descriptor.converter(&id.name))?;

    Ok(InsertResult { affected })
}
