mod support;

use support::{customers, row, staging_name, Customer, Op, Recorder};

use pgbulk::{BulkExt, BulkOptions, DeleteOptions, SetClauseHook, UpdateOptions, Value};
use pretty_assertions::assert_eq;

fn accounts() -> Vec<Customer> {
    vec![
        Customer {
            id: 1,
            code: Some("a-1".into()),
            ..Customer::new("Ada", 5)
        },
        Customer {
            id: 2,
            code: Some("g-2".into()),
            ..Customer::new("Grace", 7)
        },
    ]
}

#[tokio::test]
async fn update_from_staging_with_additive_column() {
    let db = Recorder::new();
    db.push_count(0).push_count(2);

    let result = db
        .bulk_update::<Customer>()
        .to_table(customers())
        .with_columns(["Name", "Balance+="])
        .execute(&accounts())
        .await
        .unwrap();

    assert_eq!(result.affected, 2);

    let ops = db.statements();
    let staging = staging_name(ops[0].sql());
    assert_eq!(
        ops[0].sql(),
        format!(r#"CREATE TEMP TABLE "{staging}" ("Name" text, "Balance" integer, "Id" bigint)"#)
    );
    assert_eq!(
        ops[1].copied()[0].fields,
        row([Value::from("Ada"), Value::I32(5), Value::I64(1)])
    );
    assert_eq!(
        ops[2].sql(),
        format!(
            r#"UPDATE "customers" AS t SET "Name" = s."Name", "balance" = t."balance" + s."Balance" FROM "{staging}" AS s WHERE s."Id" = t."Id""#
        )
    );
}

#[tokio::test]
async fn update_on_composite_key_with_collation() {
    let db = Recorder::new();

    db.bulk_update::<Customer>()
        .to_table(customers())
        .with_ids(["Code", "Id"])
        .with_columns(["Balance"])
        .options(UpdateOptions {
            collation: Some("C".into()),
            ..Default::default()
        })
        .execute(&accounts())
        .await
        .unwrap();

    let ops = db.statements();
    let staging = staging_name(ops[0].sql());
    assert_eq!(
        ops[0].sql(),
        format!(r#"CREATE TEMP TABLE "{staging}" ("Balance" integer, "Code" text, "Id" bigint)"#)
    );
    assert_eq!(
        ops[2].sql(),
        format!(
            r#"UPDATE "customers" AS t SET "balance" = s."Balance" FROM "{staging}" AS s WHERE s."Code" COLLATE "C" = t."Code" COLLATE "C" AND s."Id" = t."Id""#
        )
    );
}

#[tokio::test]
async fn update_defaults_to_every_non_key_property() {
    let db = Recorder::new();

    db.bulk_update::<Customer>()
        .to_table(customers())
        .execute(&accounts())
        .await
        .unwrap();

    let ops = db.statements();
    let staging = staging_name(ops[0].sql());
    assert_eq!(
        ops[2].sql(),
        format!(
            r#"UPDATE "customers" AS t SET "Name" = s."Name", "balance" = s."Balance", "Code" = s."Code" FROM "{staging}" AS s WHERE s."Id" = t."Id""#
        )
    );
}

#[tokio::test]
async fn set_clause_hook_rewrites_columns() {
    let db = Recorder::new();

    db.bulk_update::<Customer>()
        .to_table(customers())
        .with_columns(["Name", "Code"])
        .options(UpdateOptions {
            configure_set_clause: Some(SetClauseHook::new(|cx| {
                (cx.property == "Code").then(|| {
                    format!(
                        "{} = COALESCE({}, {}.{})",
                        cx.left,
                        cx.right,
                        cx.target_alias.unwrap_or_default(),
                        cx.left
                    )
                })
            })),
            ..Default::default()
        })
        .execute(&accounts())
        .await
        .unwrap();

    let ops = db.statements();
    let staging = staging_name(ops[0].sql());
    assert_eq!(
        ops[2].sql(),
        format!(
            r#"UPDATE "customers" AS t SET "Name" = s."Name", "Code" = COALESCE(s."Code", t."Code") FROM "{staging}" AS s WHERE s."Id" = t."Id""#
        )
    );
}

#[tokio::test]
async fn single_record_update_is_parameterized() {
    let db = Recorder::new();
    db.push_count(1);

    let result = db
        .bulk_update::<Customer>()
        .to_table(customers())
        .with_columns(["Name", "Balance+="])
        .execute(&accounts()[..1])
        .await
        .unwrap();

    assert_eq!(result.affected, 1);
    assert_eq!(
        db.ops(),
        [
            Op::EnsureOpen,
            Op::Execute {
                sql: r#"UPDATE "customers" SET "Name" = $1, "balance" = "balance" + $2 WHERE "Id" = $3"#
                    .into(),
                params: vec![Value::from("Ada"), Value::I32(5), Value::I64(1)],
            },
        ]
    );
}

#[tokio::test]
async fn single_record_hook_without_value_binds_nothing_for_it() {
    let db = Recorder::new();

    db.bulk_update::<Customer>()
        .to_table(customers())
        .with_columns(["Code", "Name"])
        .options(UpdateOptions {
            configure_set_clause: Some(SetClauseHook::new(|cx| {
                (cx.property == "Code").then(|| format!("{0} = UPPER({0})", cx.left))
            })),
            ..Default::default()
        })
        .execute_one(&accounts()[0])
        .await
        .unwrap();

    assert_eq!(
        db.statements(),
        [Op::Execute {
            sql: r#"UPDATE "customers" SET "Code" = UPPER("Code"), "Name" = $1 WHERE "Id" = $2"#
                .into(),
            params: vec![Value::from("Ada"), Value::I64(1)],
        }]
    );
}

#[tokio::test]
async fn update_without_columns_is_a_configuration_error() {
    let db = Recorder::new();

    let err = db
        .bulk_update::<Customer>()
        .to_table(customers())
        .with_columns(Vec::<String>::new())
        .execute(&accounts())
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(db.is_empty());
}

#[tokio::test]
async fn update_with_unknown_id_is_a_configuration_error() {
    let db = Recorder::new();

    let err = db
        .bulk_update::<Customer>()
        .to_table(customers())
        .with_id("Email")
        .execute(&accounts())
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(db.is_empty());
}

#[tokio::test]
async fn delete_using_staging() {
    let db = Recorder::new();
    db.push_count(0).push_count(2);

    let result = db
        .bulk_delete::<Customer>()
        .to_table(customers())
        .execute(&accounts())
        .await
        .unwrap();

    assert_eq!(result.affected, 2);

    let ops = db.statements();
    let staging = staging_name(ops[0].sql());
    assert_eq!(
        ops[0].sql(),
        format!(r#"CREATE TEMP TABLE "{staging}" ("Id" bigint)"#)
    );
    assert_eq!(ops[1].copied().len(), 2);
    assert_eq!(
        ops[2].sql(),
        format!(
            r#"DELETE FROM "customers" AS t USING "{staging}" AS s WHERE s."Id" = t."Id""#
        )
    );
}

#[tokio::test]
async fn single_record_delete_with_collation() {
    let db = Recorder::new();

    db.bulk_delete::<Customer>()
        .to_table(customers())
        .with_ids(["Code", "Id"])
        .options(DeleteOptions {
            collation: Some("C".into()),
            ..Default::default()
        })
        .execute_one(&accounts()[1])
        .await
        .unwrap();

    assert_eq!(
        db.statements(),
        [Op::Execute {
            sql: r#"DELETE FROM "customers" WHERE "Code" COLLATE "C" = $1 COLLATE "C" AND "Id" = $2"#
                .into(),
            params: vec![Value::from("g-2"), Value::I64(2)],
        }]
    );
}

#[tokio::test]
async fn delete_without_key_is_a_configuration_error() {
    let db = Recorder::new();
    let descriptor = pgbulk::TableDescriptor::builder("customers").build();

    let err = db
        .bulk_delete::<Customer>()
        .to_table(descriptor)
        .execute(&accounts())
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(db.is_empty());
}

#[tokio::test]
async fn delete_staged_when_fast_path_is_off() {
    let db = Recorder::new();

    db.bulk_delete::<Customer>()
        .to_table(customers())
        .options(DeleteOptions {
            bulk: BulkOptions {
                single_row_fast_path: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .execute(&accounts()[..1])
        .await
        .unwrap();

    let ops = db.statements();
    assert_eq!(ops.len(), 3);
    assert!(ops[2].sql().starts_with(r#"DELETE FROM "customers" AS t USING"#));
}
