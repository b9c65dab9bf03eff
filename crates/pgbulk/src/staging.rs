use crate::command::Command;

use pgbulk_core::{
    driver::CopyColumn,
    schema::{Property, Record, TableDescriptor, ValueConverter},
    stmt::{Type, Value, ValueRecord},
    Error, Result,
};
use pgbulk_sql::{
    stmt::{ColumnDef, Name},
    Statement, ORDINAL_COLUMN,
};

/// How staged columns are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnNaming {
    /// The property name with `.` flattened to `_`
    Property,

    /// The descriptor's column name for the property
    Mapped,
}

#[derive(Debug, Clone)]
pub(crate) struct StagingColumn {
    pub(crate) property: String,
    pub(crate) name: String,
    pub(crate) sql_type: String,
    pub(crate) ty: Type,
    converter: Option<ValueConverter>,
}

/// The ordered column list of a staging relation.
///
/// The same list drives the `CREATE TEMP TABLE` statement and the binary
/// load, so the two always agree on column order and types.
#[derive(Debug, Clone)]
pub(crate) struct StagingColumns {
    columns: Vec<StagingColumn>,
    ordinal: bool,
}

impl StagingColumns {
    pub(crate) fn new(
        descriptor: &TableDescriptor,
        properties: &[Property],
        names: &[String],
        naming: ColumnNaming,
        ordinal: bool,
    ) -> Result<Self> {
        let columns = names
            .iter()
            .map(|name| {
                let property = find_property(properties, name)?;
                let converter = descriptor.converter(name).cloned();
                let ty = converter
                    .as_ref()
                    .map(ValueConverter::provider_ty)
                    .unwrap_or(property.ty);
                let sql_type = descriptor
                    .column_type(name)
                    .map(str::to_string)
                    .unwrap_or_else(|| ty.sql_type_name().to_string());
                let column = match naming {
                    ColumnNaming::Property => name.replace('.', "_"),
                    ColumnNaming::Mapped => descriptor.column_name(name).into_owned(),
                };

                Ok(StagingColumn {
                    property: name.clone(),
                    name: column,
                    sql_type,
                    ty,
                    converter,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns, ordinal })
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, StagingColumn> {
        self.columns.iter()
    }

    pub(crate) fn has_ordinal(&self) -> bool {
        self.ordinal
    }

    pub(crate) fn create_table(&self, table: &Name) -> Statement {
        let mut defs: Vec<_> = self
            .columns
            .iter()
            .map(|column| ColumnDef::new(&column.name, &column.sql_type))
            .collect();

        if self.ordinal {
            defs.push(ColumnDef::new(ORDINAL_COLUMN, "bigint"));
        }

        Statement::create_temp_table(table.clone(), defs)
    }

    pub(crate) fn copy_in(&self, table: &Name) -> Statement {
        let mut names: Vec<_> = self.columns.iter().map(|c| c.name.clone()).collect();

        if self.ordinal {
            names.push(ORDINAL_COLUMN.to_string());
        }

        Statement::copy_in(table.clone(), names)
    }

    pub(crate) fn copy_columns(&self) -> Vec<CopyColumn> {
        let mut columns: Vec<_> = self
            .columns
            .iter()
            .map(|column| CopyColumn {
                sql_type: column.sql_type.clone(),
                ty: column.ty,
            })
            .collect();

        if self.ordinal {
            columns.push(CopyColumn {
                sql_type: "bigint".to_string(),
                ty: Type::I64,
            });
        }

        columns
    }

    /// Reads the staged values of one record, converted to provider values.
    pub(crate) fn values<T: Record>(&self, record: &T) -> Result<Vec<Value>> {
        self.columns
            .iter()
            .map(|column| {
                let value = record.get(&column.property).ok_or_else(|| {
                    Error::configuration(format!(
                        "type `{}` has no property `{}`",
                        std::any::type_name::<T>(),
                        column.property
                    ))
                })?;

                match &column.converter {
                    Some(converter) => converter.to_provider(value),
                    None => Ok(value),
                }
            })
            .collect()
    }

    /// Creates `table` and streams `records` into it.
    pub(crate) async fn stage<T: Record>(
        &self,
        command: &Command<'_>,
        table: &Name,
        records: &[T],
    ) -> Result<u64> {
        let (sql, _) = command.serialize(&self.create_table(table));
        command.log(&format!("Begin creating temp table:\n{sql}"));
        command.execute(&sql, &[]).await?;
        command.log("End creating temp table.");

        self.load(command, table, records).await
    }

    /// Streams `records` into an existing relation with a binary copy.
    pub(crate) async fn load<T: Record>(
        &self,
        command: &Command<'_>,
        table: &Name,
        records: &[T],
    ) -> Result<u64> {
        let (sql, _) = command.serialize(&self.copy_in(table));
        let columns = self.copy_columns();
        let mut rows = StagedRows::new(self, records, command.options().batch_size);

        command.log(&format!(
            "Begin executing SqlBulkCopy. TableName: {}",
            qualified(table)
        ));
        let copied = command.copy_in(&sql, &columns, &mut rows).await?;
        command.log("End executing SqlBulkCopy.");

        log::trace!("staged {copied} rows into {}", qualified(table));
        Ok(copied)
    }
}

/// Record → staged row iterator fed to the binary copy.
pub(crate) struct StagedRows<'a, T> {
    columns: &'a StagingColumns,
    records: std::iter::Enumerate<std::slice::Iter<'a, T>>,
    batch_size: usize,
}

impl<'a, T: Record> StagedRows<'a, T> {
    pub(crate) fn new(columns: &'a StagingColumns, records: &'a [T], batch_size: usize) -> Self {
        Self {
            columns,
            records: records.iter().enumerate(),
            batch_size,
        }
    }
}

impl<T: Record> Iterator for StagedRows<'_, T> {
    type Item = Result<ValueRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let (ordinal, record) = self.records.next()?;

        if self.batch_size > 0 && ordinal > 0 && ordinal % self.batch_size == 0 {
            log::trace!("staged batch; rows={ordinal}");
        }

        let row = self.columns.values(record).map(|mut values| {
            if self.columns.has_ordinal() {
                values.push(Value::I64(ordinal as i64));
            }
            ValueRecord::from_vec(values)
        });

        Some(row)
    }
}

pub(crate) fn find_property<'a>(properties: &'a [Property], name: &str) -> Result<&'a Property> {
    properties
        .iter()
        .find(|property| property.name == name)
        .ok_or_else(|| Error::configuration(format!("unknown property `{name}`")))
}

/// Splits the `+=` suffix off an update column, e.g. `Balance+=`.
pub(crate) fn parse_additive(column: &str) -> (&str, bool) {
    match column.strip_suffix("+=") {
        Some(property) => (property.trim_end(), true),
        None => (column, false),
    }
}

/// `"schema"."name"` for log lines.
pub(crate) fn qualified(name: &Name) -> String {
    let quote = |s: &str| format!("\"{}\"", s.replace('"', "\"\""));

    match &name.schema {
        Some(schema) => format!("{}.{}", quote(schema), quote(&name.name)),
        None => quote(&name.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgbulk_core::schema::ValueConverter;

    struct Order {
        id: i64,
        customer: String,
        status: i32,
        street: Option<String>,
    }

    impl Record for Order {
        fn properties() -> Vec<Property> {
            vec![
                Property::new("Id", Type::I64, false),
                Property::new("Customer", Type::String, false),
                Property::new("Status", Type::Enum, false),
                Property::new("Address.Street", Type::String, true),
            ]
        }

        fn get(&self, name: &str) -> Option<Value> {
            match name {
                "Id" => Some(Value::I64(self.id)),
                "Customer" => Some(Value::from(self.customer.as_str())),
                "Status" => Some(Value::I32(self.status)),
                "Address.Street" => Some(Value::from(self.street.clone())),
                _ => None,
            }
        }

        fn set(&mut self, _: &str, _: Value) -> Result<()> {
            Ok(())
        }
    }

    fn descriptor() -> TableDescriptor {
        TableDescriptor::builder("orders")
            .column_name("Customer", "customer_name")
            .column_type("Customer", "varchar(100)")
            .converter(
                "Status",
                ValueConverter::new(
                    Type::String,
                    |value| Ok(Value::String(format!("s{}", value.to_i64().unwrap_or(0)))),
                    Ok,
                ),
            )
            .build()
    }

    fn names() -> Vec<String> {
        ["Id", "Customer", "Status", "Address.Street"]
            .map(String::from)
            .to_vec()
    }

    #[test]
    fn column_types_resolve_in_order() {
        let columns = StagingColumns::new(
            &descriptor(),
            &Order::properties(),
            &names(),
            ColumnNaming::Property,
            true,
        )
        .unwrap();

        let defs: Vec<_> = columns
            .iter()
            .map(|c| (c.name.as_str(), c.sql_type.as_str()))
            .collect();
        assert_eq!(
            defs,
            [
                ("Id", "bigint"),
                ("Customer", "varchar(100)"),
                ("Status", "text"),
                ("Address_Street", "text"),
            ]
        );

        let copy = columns.copy_columns();
        assert_eq!(copy.len(), 5);
        assert_eq!(copy[4].ty, Type::I64);
    }

    #[test]
    fn mapped_naming_uses_descriptor_columns() {
        let columns = StagingColumns::new(
            &descriptor(),
            &Order::properties(),
            &names(),
            ColumnNaming::Mapped,
            false,
        )
        .unwrap();

        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Id", "customer_name", "Status", "Address_Street"]);
    }

    #[test]
    fn unknown_property_is_configuration_error() {
        let err = StagingColumns::new(
            &descriptor(),
            &Order::properties(),
            &["Missing".to_string()],
            ColumnNaming::Property,
            false,
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn rows_carry_converted_values_and_ordinals() {
        let columns = StagingColumns::new(
            &descriptor(),
            &Order::properties(),
            &names(),
            ColumnNaming::Property,
            true,
        )
        .unwrap();

        let records = [
            Order {
                id: 1,
                customer: "a".into(),
                status: 2,
                street: None,
            },
            Order {
                id: 2,
                customer: "b".into(),
                status: 0,
                street: Some("Main".into()),
            },
        ];

        let rows: Vec<_> = StagedRows::new(&columns, &records, 1)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], Value::from("s2"));
        assert_eq!(rows[0][3], Value::Null);
        assert_eq!(rows[0][4], Value::I64(0));
        assert_eq!(rows[1][4], Value::I64(1));
    }

    #[test]
    fn additive_suffix() {
        assert_eq!(parse_additive("Balance+="), ("Balance", true));
        assert_eq!(parse_additive("Balance +="), ("Balance", true));
        assert_eq!(parse_additive("Balance"), ("Balance", false));
    }

    #[test]
    fn qualified_names() {
        assert_eq!(qualified(&Name::qualified("sales", "orders")), r#""sales"."orders""#);
        assert_eq!(qualified(&Name::new("a\"b")), r#""a""b""#);
    }
}
