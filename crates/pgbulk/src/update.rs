use crate::{
    command::Command,
    keys,
    staging::{find_property, parse_additive, ColumnNaming, StagingColumns},
    UpdateOptions, UpdateResult,
};

use pgbulk_core::{
    schema::{properties, Property, Record, TableDescriptor},
    Error, Executor, Result,
};
use pgbulk_sql::{
    stmt::{Assignment, Assignments, ConfigureSetClause, Expr, Name},
    Statement, SOURCE_ALIAS, TARGET_ALIAS,
};

use std::marker::PhantomData;
use std::sync::Arc;

const OPERATION: &str = "BulkUpdate";

/// Updates the rows matching each record's id.
///
/// A column written as `"Balance+="` adds the staged value to the current
/// one instead of replacing it.
pub struct BulkUpdate<'a, T> {
    executor: &'a dyn Executor,
    descriptor: Option<Arc<TableDescriptor>>,
    ids: Option<Vec<String>>,
    columns: Option<Vec<String>>,
    options: UpdateOptions,
    _p: PhantomData<fn() -> T>,
}

/// An update column with its `+=` suffix resolved.
#[derive(Debug, Clone)]
pub(crate) struct SetColumn {
    pub(crate) property: String,
    pub(crate) additive: bool,
}

struct Plan {
    descriptor: Arc<TableDescriptor>,
    properties: Arc<[Property]>,
    ids: Vec<String>,
    columns: Vec<SetColumn>,
}

impl<'a, T: Record> BulkUpdate<'a, T> {
    pub fn new(executor: &'a dyn Executor) -> Self {
        Self {
            executor,
            descriptor: None,
            ids: None,
            columns: None,
            options: UpdateOptions::default(),
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

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn options(mut self, options: UpdateOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn execute(self, records: &[T]) -> Result<UpdateResult> {
        let plan = self.plan()?;
        let command = Command::new(self.executor, &self.options.bulk, OPERATION);

        if records.is_empty() {
            return Ok(UpdateResult::default());
        }

        if records.len() == 1 && self.options.bulk.single_row_fast_path {
            return self.update_one(&command, &plan, &records[0]).await;
        }

        command.ensure_open().await?;

        let staged = keys::distinct([&plan.set_properties()[..], &plan.ids[..]]);
        let columns = StagingColumns::new(
            &plan.descriptor,
            &plan.properties,
            &staged,
            ColumnNaming::Property,
            false,
        )?;
        let staging = Name::staging();
        columns.stage(&command, &staging, records).await?;

        let assignments = Assignments::new(
            plan.columns
                .iter()
                .map(|column| {
                    let target = plan.descriptor.column_name(&column.property).into_owned();
                    let source = Expr::qualified(SOURCE_ALIAS, column.property.replace('.', "_"));
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
        .configure(self.configure_set_clause(&plan));

        let stmt = Statement::update_from(
            Name::from(&*plan.descriptor).alias(TARGET_ALIAS),
            assignments,
            staging.alias(SOURCE_ALIAS),
            keys::join_on(
                &plan.descriptor,
                &plan.properties,
                &plan.ids,
                self.options.collation.as_deref(),
            )?,
        );
        let (sql, params) = command.serialize(&stmt);

        command.log(&format!("Begin updating:\n{sql}"));
        let affected = command.execute(&sql, &params).await?;
        command.log("End updating.");

        Ok(UpdateResult { affected })
    }

    /// Updates one record with a single parameterized statement.
    pub async fn execute_one(self, record: &T) -> Result<UpdateResult> {
        let plan = self.plan()?;
        let command = Command::new(self.executor, &self.options.bulk, OPERATION);
        self.update_one(&command, &plan, record).await
    }

    async fn update_one(
        &self,
        command: &Command<'_>,
        plan: &Plan,
        record: &T,
    ) -> Result<UpdateResult> {
        let staged = keys::distinct([&plan.set_properties()[..], &plan.ids[..]]);
        let columns = StagingColumns::new(
            &plan.descriptor,
            &plan.properties,
            &staged,
            ColumnNaming::Mapped,
            false,
        )?;
        let values: Vec<_> = columns
            .iter()
            .map(|column| column.property.clone())
            .zip(columns.values(record)?)
            .collect();
        let value_of = |property: &str| {
            values
                .iter()
                .find(|(name, _)| name == property)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };

        let assignments = Assignments::new(
            plan.columns
                .iter()
                .map(|column| {
                    let target = plan.descriptor.column_name(&column.property).into_owned();
                    let source = Expr::Value(value_of(&column.property));
                    let value = if column.additive {
                        Expr::add(Expr::column(&target), source)
                    } else {
                        source
                    };
                    Assignment::new(&column.property, target, value)
                })
                .collect(),
        )
        .configure(self.configure_set_clause(plan));

        let key_values: Vec<_> = plan
            .ids
            .iter()
            .map(|id| (id.clone(), value_of(id)))
            .collect();
        let filter = keys::filter_on(
            &plan.descriptor,
            &plan.properties,
            &key_values,
            self.options.collation.as_deref(),
        )?;

        let stmt = Statement::update(Name::from(&*plan.descriptor).into(), assignments, filter);
        let (sql, params) = command.serialize(&stmt);

        command.log(&format!("Begin updating:\n{sql}"));
        command.ensure_open().await?;
        let affected = command.execute(&sql, &params).await?;
        command.log("End updating.");

        Ok(UpdateResult { affected })
    }

    fn configure_set_clause(&self, plan: &Plan) -> Option<ConfigureSetClause> {
        self.options
            .configure_set_clause
            .as_ref()
            .map(|hook| ConfigureSetClause::new(plan.descriptor.clone(), hook.0.clone()))
    }

    fn plan(&self) -> Result<Plan> {
        let descriptor = crate::resolve::<T>(&self.descriptor)?;
        let properties = properties::<T>();
        let ids = keys::resolve_ids(self.ids.as_deref(), &descriptor)?;

        let columns = match &self.columns {
            Some(columns) => columns.clone(),
            None => descriptor
                .property_names()
                .map(<[String]>::to_vec)
                .unwrap_or_else(|| properties.iter().map(|p| p.name.clone()).collect())
                .into_iter()
                .filter(|name| !ids.contains(name))
                .collect(),
        };

        let columns = set_columns(&columns, &properties)?;

        if columns.is_empty() {
            return Err(Error::configuration(format!(
                "no columns to update in `{}`",
                descriptor.name()
            )));
        }

        for id in &ids {
            find_property(&properties, id)?;
        }

        Ok(Plan {
            descriptor,
            properties,
            ids,
            columns,
        })
    }
}

impl Plan {
    fn set_properties(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.property.clone()).collect()
    }
}

/// Resolves `+=` suffixes and checks every property exists.
pub(crate) fn set_columns(columns: &[String], properties: &[Property]) -> Result<Vec<SetColumn>> {
    columns
        .iter()
        .map(|column| {
            let (property, additive) = parse_additive(column);
            find_property(properties, property)?;
            Ok(SetColumn {
                property: property.to_string(),
                additive,
            })
        })
        .collect()
}
