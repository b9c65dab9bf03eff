use pgbulk_sql::{
    stmt::{ColumnDef, Name, Value},
    Serializer, Statement, ORDINAL_COLUMN,
};
use pretty_assertions::assert_eq;

fn serialize(stmt: &Statement) -> String {
    let mut params: Vec<Value> = vec![];
    let sql = Serializer::postgresql().serialize(stmt, &mut params);
    assert!(params.is_empty(), "staging statements bind no parameters");
    sql
}

#[test]
fn create_temp_table() {
    let stmt = Statement::create_temp_table(
        "5b1c0d3e",
        vec![
            ColumnDef::new("Id", "integer"),
            ColumnDef::new("Name", "text"),
            ColumnDef::new("Address_Street", "varchar(200)"),
        ],
    );

    assert_eq!(
        serialize(&stmt),
        r#"CREATE TEMP TABLE "5b1c0d3e" ("Id" integer, "Name" text, "Address_Street" varchar(200))"#
    );
}

#[test]
fn create_temp_table_with_ordinal() {
    let stmt = Statement::create_temp_table(
        "stage",
        vec![
            ColumnDef::new("Name", "text"),
            ColumnDef::new(ORDINAL_COLUMN, "bigint"),
        ],
    );

    assert_eq!(
        serialize(&stmt),
        r#"CREATE TEMP TABLE "stage" ("Name" text, "__pgbulk_ordinal" bigint)"#
    );
}

#[test]
fn copy_in_binary() {
    let stmt = Statement::copy_in(
        Name::qualified("sales", "orders"),
        vec!["Id".to_string(), "Total".to_string()],
    );

    assert_eq!(
        serialize(&stmt),
        r#"COPY "sales"."orders" ("Id", "Total") FROM STDIN (FORMAT BINARY)"#
    );
}

#[test]
fn identifiers_escape_quotes() {
    let stmt = Statement::copy_in("we\"ird", vec!["col\"umn".to_string()]);

    assert_eq!(
        serialize(&stmt),
        r#"COPY "we""ird" ("col""umn") FROM STDIN (FORMAT BINARY)"#
    );
}

#[test]
fn staging_names_are_unique() {
    let a = Name::staging();
    let b = Name::staging();
    assert_ne!(a, b);

    let prefixed = Name::staging_with_prefix("orders");
    assert!(prefixed.name.starts_with("orders-"));
    assert_eq!(prefixed.name.len(), "orders-".len() + 36);
}
