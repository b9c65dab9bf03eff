use crate::{
    command::Command,
    identity::GeneratedIds,
    insert,
    keys,
    options::NotMatchedBySourceContext,
    staging::{find_property, ColumnNaming, StagingColumns},
    update::{set_columns, SetColumn},
    MergeOptions, MergeResult,
};

use pgbulk_core::{
    driver::Rows,
    schema::{properties, OutputId, OutputIdMode, Property, Record, TableDescriptor},
    stmt::Value,
    Error, Executor, Result,
};
use pgbulk_sql::{
    stmt::{
        Assignment, Assignments, ConfigureSetClause, Expr, Merge, MergeSource, Name, Select,
    },
    ORDINAL_COLUMN, SOURCE_ALIAS, TARGET_ALIAS,
};

use std::marker::PhantomData;
use std::sync::Arc;

const OPERATION: &str = "BulkMerge";

/// Output name of `merge_action()` in the `RETURNING` list.
const MERGE_ACTION: &str = "merge_action";

/// Inserts records that have no matching row and updates those that do.
///
/// Every touched row is classified by `merge_action()`. When the table has a
/// server-generated output id, ids of inserted rows are written back onto
/// their records; matched records keep theirs.
pub struct BulkMerge<'a, T> {
    executor: &'a dyn Executor,
    descriptor: Option<Arc<TableDescriptor>>,
    ids: Option<Vec<String>>,
    update_columns: Option<Vec<String>>,
    insert_columns: Option<Vec<String>>,
    options: MergeOptions,
    _p: PhantomData<fn() -> T>,
}

struct Plan {
    descriptor: Arc<TableDescriptor>,
    properties: Arc<[Property]>,
    ids: Vec<String>,
    update: Vec<SetColumn>,
    insert: Vec<String>,

    /// Set when generated ids are read back
    output_id: Option<OutputId>,
}

impl<'a, T: Record> BulkMerge<'a, T> {
    pub fn new(executor: &'a dyn Executor) -> Self {
        Self {
            executor,
            descriptor: None,
            ids: None,
            update_columns: None,
            insert_columns: None,
            options: MergeOptions::default(),
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

    /// Columns written when a row matches. Accepts the `+=` suffix.
    pub fn with_update_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Columns written when no row matches.
    pub fn with_insert_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn execute(self, records: &mut [T]) -> Result<MergeResult> {
        let plan = self.plan()?;
        let command = Command::new(self.executor, &self.options.bulk, OPERATION);

        if records.is_empty() {
            return Ok(MergeResult::default());
        }

        // A "not matched by source" branch needs the whole input staged.
        if records.len() == 1
            && self.options.bulk.single_row_fast_path
            && self.options.configure_when_not_matched_by_source.is_none()
        {
            return self.merge_one(&command, &plan, &mut records[0]).await;
        }

        command.ensure_open().await?;

        let columns = plan.staging_columns(ColumnNaming::Property, plan.output_id.is_some())?;
        let staging = Name::staging();
        columns.stage(&command, &staging, records).await?;

        let mut merge = self
            .merge_statement(&plan, MergeSource::Table(staging.alias(SOURCE_ALIAS)))?;

        if let Some(hook) = &self.options.configure_when_not_matched_by_source {
            merge = merge.when_not_matched_by_source(Some((hook.0)(
                &NotMatchedBySourceContext {
                    descriptor: &plan.descriptor,
                    target_alias: TARGET_ALIAS,
                    source_alias: SOURCE_ALIAS,
                },
            )));
        }

        let (sql, params) = command.serialize(&merge.into());

        command.log(&format!("Begin merging temp table:\n{sql}"));
        let rows = command.query(&sql, &params).await?;
        command.log("End merging temp table.");

        plan.apply(&rows, records)
    }

    /// Upserts one record with a single parameterized statement.
    ///
    /// A "not matched by source" hook would delete or rewrite every other row
    /// of the table, so it is rejected here.
    pub async fn execute_one(self, record: &mut T) -> Result<MergeResult> {
        let plan = self.plan()?;
        self.check_upsert()?;
        let command = Command::new(self.executor, &self.options.bulk, OPERATION);
        self.merge_one(&command, &plan, record).await
    }

    async fn merge_one(
        &self,
        command: &Command<'_>,
        plan: &Plan,
        record: &mut T,
    ) -> Result<MergeResult> {
        let columns = plan.staging_columns(ColumnNaming::Property, false)?;
        let values = columns.values(record)?;

        let source = Select::values(
            columns
                .iter()
                .zip(values)
                .map(|(column, value)| {
                    Expr::Value(value)
                        .cast(&column.sql_type)
                        .alias(&column.name)
                })
                .collect(),
        );

        let merge = self.merge_statement(
            plan,
            MergeSource::Query(Box::new(source), SOURCE_ALIAS.to_string()),
        )?;
        let (sql, params) = command.serialize(&merge.into());

        command.log(&format!("Begin merging:\n{sql}"));
        command.ensure_open().await?;
        let rows = command.query(&sql, &params).await?;
        command.log("End merging.");

        let result = classify(&rows)?;

        if let (Some(id), 1) = (&plan.output_id, result.inserted) {
            let index = rows.column_index(&plan.descriptor.column_name(&id.name))?;
            if let Some(value) = rows.iter().next().map(|row| row[index].clone()) {
                let value = match plan.descriptor.converter(&id.name) {
                    Some(converter) => converter.from_provider(value)?,
                    None => value,
                };
                record.set(&id.name, value)?;
            }
        }

        Ok(result)
    }

    fn check_upsert(&self) -> Result<()> {
        if self.options.configure_when_not_matched_by_source.is_some() {
            return Err(Error::configuration(
                "a \"not matched by source\" action cannot be used with a single-row upsert",
            ));
        }
        Ok(())
    }

    fn merge_statement(&self, plan: &Plan, source: MergeSource) -> Result<Merge> {
        let descriptor = &plan.descriptor;
        let on = keys::join_on(
            descriptor,
            &plan.properties,
            &plan.ids,
            self.options.collation.as_deref(),
        )?;

        let mut merge = Merge::new(
            Name::from(&**descriptor).alias(TARGET_ALIAS),
            source,
            on.nested(),
        );

        if !plan.update.is_empty() {
            let assignments = Assignments::new(
                plan.update
                    .iter()
                    .map(|column| {
                        let target = descriptor.column_name(&column.property).into_owned();
                        let source =
                            Expr::qualified(SOURCE_ALIAS, column.property.replace('.', "_"));
                        let value = if column.additive {
                            Expr::add(Expr::qualified(TARGET_ALIAS, &target), source)
                        } else {
                            source
                        };
                        Assignment::new(&column.property, target, value)
                    })
                    .collect(),
            )
            .aliases(TARGET_ALIAS, SOURCE_ALIAS)
            .configure(
                self.options
                    .configure_set_clause
                    .as_ref()
                    .map(|hook| ConfigureSetClause::new(descriptor.clone(), hook.0.clone())),
            );

            merge = merge.when_matched(assignments);
        }

        if !plan.insert.is_empty() {
            merge = merge.when_not_matched(
                plan.insert
                    .iter()
                    .map(|name| descriptor.column_name(name).into_owned())
                    .collect(),
                plan.insert
                    .iter()
                    .map(|name| Expr::qualified(SOURCE_ALIAS, name.replace('.', "_")))
                    .collect(),
            );
        }

        let mut returning = vec![Expr::MergeAction.alias(MERGE_ACTION)];
        if let Some(id) = &plan.output_id {
            let id_column = descriptor.column_name(&id.name);
            returning.push(Expr::qualified(TARGET_ALIAS, id_column).into());
            if let MergeSource::Table(_) = merge.source {
                returning.push(Expr::qualified(SOURCE_ALIAS, ORDINAL_COLUMN).into());
            }
        }

        Ok(merge.returning(returning))
    }

    fn plan(&self) -> Result<Plan> {
        let descriptor = crate::resolve::<T>(&self.descriptor)?;
        let properties = properties::<T>();
        let ids = keys::resolve_ids(self.ids.as_deref(), &descriptor)?;

        let update = match &self.update_columns {
            Some(columns) => set_columns(columns, &properties)?,
            None => set_columns(
                &descriptor
                    .property_names()
                    .map(<[String]>::to_vec)
                    .unwrap_or_else(|| properties.iter().map(|p| p.name.clone()).collect())
                    .into_iter()
                    .filter(|name| !ids.contains(name))
                    .filter(|name| !is_server_generated(&descriptor, name))
                    .collect::<Vec<_>>(),
                &properties,
            )?,
        };

        let insert = match &self.insert_columns {
            Some(columns) => columns.clone(),
            None => insert::default_columns(&descriptor, &properties),
        };

        if update.is_empty() && insert.is_empty() {
            return Err(Error::configuration(format!(
                "merge into `{}` has neither update nor insert columns",
                descriptor.name()
            )));
        }

        for name in ids.iter().chain(&insert) {
            find_property(&properties, name)?;
        }

        let output_id = match descriptor.output_id() {
            Some(id)
                if self.options.return_generated_id
                    && id.mode == OutputIdMode::ServerGenerated
                    && !insert.is_empty() =>
            {
                find_property(&properties, &id.name)?;
                Some(id.clone())
            }
            _ => None,
        };

        Ok(Plan {
            descriptor,
            properties,
            ids,
            update,
            insert,
            output_id,
        })
    }
}

impl Plan {
    /// Update columns, then ids, then insert columns, each staged once.
    fn staging_columns(&self, naming: ColumnNaming, ordinal: bool) -> Result<StagingColumns> {
        let update: Vec<_> = self.update.iter().map(|c| c.property.clone()).collect();
        let staged = keys::distinct([&update[..], &self.ids[..], &self.insert[..]]);

        StagingColumns::new(&self.descriptor, &self.properties, &staged, naming, ordinal)
    }

    fn apply<T: Record>(&self, rows: &Rows, records: &mut [T]) -> Result<MergeResult> {
        let result = classify(rows)?;

        let Some(id) = &self.output_id else {
            return Ok(result);
        };

        if rows.is_empty() {
            return Ok(result);
        }

        let id_column = self.descriptor.column_name(&id.name);
        let action = rows.column_index(MERGE_ACTION)?;
        let id_index = rows.column_index(&id_column)?;
        let ordinal = rows.column_index(ORDINAL_COLUMN)?;

        let mut ids = GeneratedIds::new();
        for row in rows.iter() {
            if row[action].as_str() == Some("INSERT") {
                ids.insert(row[ordinal].clone(), row[id_index].clone())?;
            }
        }

        ids.assign(records, &id.name, self.descriptor.converter(&id.name))?;
        Ok(result)
    }
}

/// Counts `merge_action()` values.
fn classify(rows: &Rows) -> Result<MergeResult> {
    let mut result = MergeResult::default();

    // An empty result carries no column names.
    if rows.is_empty() {
        return Ok(result);
    }

    for action in rows.column(MERGE_ACTION)? {
        match action {
            Value::String(action) if action == "INSERT" => result.inserted += 1,
            Value::String(action) if action == "UPDATE" => result.updated += 1,
            Value::String(action) if action == "DELETE" => {}
            action => {
                return Err(Error::invalid_result(format!(
                    "unexpected merge action {action:?}"
                )))
            }
        }
        result.affected += 1;
    }

    Ok(result)
}

fn is_server_generated(descriptor: &TableDescriptor, property: &str) -> bool {
    matches!(
        descriptor.output_id(),
        Some(id) if id.name == property && id.mode == OutputIdMode::ServerGenerated
    )
}
