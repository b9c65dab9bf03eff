use std::sync::Arc;

use pgbulk_core::TableDescriptor;
use pgbulk_sql::{
    stmt::{
        Assignment, Assignments, ConfigureSetClause, Expr, JoinCondition, Merge, MergeSource,
        Name, Select, SetClauseContext, Value,
    },
    Serializer, Statement, ORDINAL_COLUMN, SOURCE_ALIAS, TARGET_ALIAS,
};
use pretty_assertions::assert_eq;

fn serialize(stmt: impl Into<Statement>) -> (String, Vec<Value>) {
    let mut params: Vec<Value> = vec![];
    let sql = Serializer::postgresql().serialize(&stmt.into(), &mut params);
    (sql, params)
}

fn target() -> Name {
    Name::new("Customers")
}

fn staging() -> Name {
    Name::new("stage")
}

fn staged(column: &str) -> Expr {
    Expr::qualified(SOURCE_ALIAS, column)
}

#[test]
fn join_condition_single_key() {
    let on = JoinCondition::new().column("Id", "Id", false).build();
    let select = Select::new(vec![Expr::Raw("1".into()).into()], staging()).join(target(), on);

    let (sql, _) = serialize(select);
    assert_eq!(sql, r#"SELECT 1 FROM "stage" JOIN "Customers" ON s."Id" = t."Id""#);
}

#[test]
fn join_condition_composite_key_with_collation() {
    let on = JoinCondition::new()
        .collation(Some("C"))
        .column("Code", "code", true)
        .column("Region", "Region", false)
        .build();

    let (sql, _) = serialize(Statement::delete_using(
        target().alias(TARGET_ALIAS),
        staging().alias(SOURCE_ALIAS),
        on,
    ));

    assert_eq!(
        sql,
        r#"DELETE FROM "Customers" AS t USING "stage" AS s WHERE s."Code" COLLATE "C" = t."code" COLLATE "C" AND s."Region" = t."Region""#
    );
}

#[test]
fn collation_skipped_for_non_textual_keys() {
    let on = JoinCondition::new()
        .collation(Some("C"))
        .column("Id", "Id", false)
        .build();

    assert_eq!(
        on,
        Expr::eq(Expr::qualified("s", "Id"), Expr::qualified("t", "Id"))
    );
}

#[test]
fn insert_select_from_staging() {
    let columns = vec!["Name".to_string(), "Address_Street".to_string()];
    let select = Select::new(
        vec![
            Expr::column("Name").into(),
            Expr::column("Address_Street").into(),
        ],
        staging(),
    );

    let (sql, _) = serialize(Statement::insert_select(target(), columns, select));
    assert_eq!(
        sql,
        r#"INSERT INTO "Customers" ("Name", "Address_Street") SELECT "Name", "Address_Street" FROM "stage""#
    );
}

#[test]
fn insert_values_returning() {
    let (sql, params) = serialize(Statement::insert_values(
        target(),
        vec!["Name".to_string(), "Age".to_string()],
        vec![Expr::value("Ada"), Expr::value(36)],
        vec![Expr::column("Id").into()],
    ));

    assert_eq!(
        sql,
        r#"INSERT INTO "Customers" ("Name", "Age") VALUES ($1, $2) RETURNING "Id""#
    );
    assert_eq!(params, vec![Value::from("Ada"), Value::I32(36)]);
}

#[test]
fn merge_insert_with_generated_ids() {
    let ordered = Select::new(vec![Expr::Wildcard.into()], staging())
        .order_by(Expr::column(ORDINAL_COLUMN));

    let merge = Merge::new(
        target().alias(TARGET_ALIAS),
        MergeSource::Query(Box::new(ordered), SOURCE_ALIAS.into()),
        Expr::False,
    )
    .when_not_matched(
        vec!["Name".to_string()],
        vec![staged("Name")],
    )
    .returning(vec![
        Expr::qualified(TARGET_ALIAS, "Id").into(),
        staged(ORDINAL_COLUMN).into(),
    ]);

    let (sql, _) = serialize(merge);
    assert_eq!(
        sql,
        r#"MERGE INTO "Customers" AS t USING (SELECT * FROM "stage" ORDER BY "__pgbulk_ordinal") AS s ON 1 = 0 WHEN NOT MATCHED THEN INSERT ("Name") VALUES (s."Name") RETURNING t."Id", s."__pgbulk_ordinal""#
    );
}

#[test]
fn update_from_with_additive_set_clause() {
    let assignments = Assignments::new(vec![
        Assignment::new("Name", "Name", staged("Name")),
        Assignment::new(
            "Balance",
            "balance",
            Expr::add(Expr::qualified(TARGET_ALIAS, "balance"), staged("Balance")),
        ),
    ])
    .aliases(TARGET_ALIAS, SOURCE_ALIAS);

    let (sql, _) = serialize(Statement::update_from(
        target().alias(TARGET_ALIAS),
        assignments,
        staging().alias(SOURCE_ALIAS),
        JoinCondition::new().column("Id", "Id", false).build(),
    ));

    assert_eq!(
        sql,
        r#"UPDATE "Customers" AS t SET "Name" = s."Name", "balance" = t."balance" + s."Balance" FROM "stage" AS s WHERE s."Id" = t."Id""#
    );
}

#[test]
fn single_row_update_and_delete() {
    let assignments = Assignments::new(vec![Assignment::new(
        "Name",
        "Name",
        Expr::value("Grace"),
    )]);

    let (sql, params) = serialize(Statement::update(
        target().into(),
        assignments,
        Expr::eq(Expr::column("Id"), Expr::value(7_i64)),
    ));
    assert_eq!(sql, r#"UPDATE "Customers" SET "Name" = $1 WHERE "Id" = $2"#);
    assert_eq!(params, vec![Value::from("Grace"), Value::I64(7)]);

    let (sql, params) = serialize(Statement::delete(
        target().into(),
        Expr::and_from_vec(vec![
            Expr::eq(Expr::column("Id"), Expr::value(7_i64)),
            Expr::eq(Expr::column("Region"), Expr::value("eu")),
        ]),
    ));
    assert_eq!(
        sql,
        r#"DELETE FROM "Customers" WHERE "Id" = $1 AND "Region" = $2"#
    );
    assert_eq!(params.len(), 2);
}

#[test]
fn set_clause_callback_sees_default_fragments() {
    let descriptor = Arc::new(TableDescriptor::builder("Customers").build());
    let seen = Arc::new(std::sync::Mutex::new(vec![]));

    let captured = seen.clone();
    let configure = ConfigureSetClause::new(
        descriptor,
        Arc::new(move |cx: &SetClauseContext<'_>| {
            captured.lock().unwrap().push((
                cx.property.to_string(),
                cx.left.to_string(),
                cx.right.to_string(),
                cx.target_alias.map(str::to_string),
            ));

            (cx.property == "Name").then(|| {
                format!(
                    "{} = COALESCE({}, {}.{})",
                    cx.left,
                    cx.right,
                    cx.target_alias.unwrap_or_default(),
                    cx.left
                )
            })
        }),
    );

    let assignments = Assignments::new(vec![
        Assignment::new("Name", "Name", staged("Name")),
        Assignment::new("Age", "Age", staged("Age")),
    ])
    .aliases(TARGET_ALIAS, SOURCE_ALIAS)
    .configure(Some(configure));

    let (sql, _) = serialize(Statement::update_from(
        target().alias(TARGET_ALIAS),
        assignments,
        staging().alias(SOURCE_ALIAS),
        JoinCondition::new().column("Id", "Id", false).build(),
    ));

    assert_eq!(
        sql,
        r#"UPDATE "Customers" AS t SET "Name" = COALESCE(s."Name", t."Name"), "Age" = s."Age" FROM "stage" AS s WHERE s."Id" = t."Id""#
    );

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[1],
        (
            "Age".to_string(),
            r#""Age""#.to_string(),
            r#"s."Age""#.to_string(),
            Some("t".to_string())
        )
    );
}

#[test]
fn set_clause_callback_sees_placeholders() {
    let descriptor = Arc::new(TableDescriptor::builder("Customers").build());
    let configure = ConfigureSetClause::new(
        descriptor,
        Arc::new(|cx: &SetClauseContext<'_>| {
            assert_eq!(cx.target_alias, None);
            Some(format!("{} = COALESCE({}, 'n/a')", cx.left, cx.right))
        }),
    );

    let assignments = Assignments::new(vec![Assignment::new(
        "Name",
        "Name",
        Expr::value("Grace"),
    )])
    .configure(Some(configure));

    let (sql, _) = serialize(Statement::update(
        target().into(),
        assignments,
        Expr::eq(Expr::column("Id"), Expr::value(1_i64)),
    ));
    assert_eq!(
        sql,
        r#"UPDATE "Customers" SET "Name" = COALESCE($1, 'n/a') WHERE "Id" = $2"#
    );
}

#[test]
fn merge_matched_and_not_matched() {
    let on = JoinCondition::new().column("Id", "Id", false).build().nested();
    let merge = Merge::new(
        target().alias(TARGET_ALIAS),
        MergeSource::Table(staging().alias(SOURCE_ALIAS)),
        on,
    )
    .when_matched(
        Assignments::new(vec![Assignment::new("Name", "Name", staged("Name"))])
            .aliases(TARGET_ALIAS, SOURCE_ALIAS),
    )
    .when_not_matched(
        vec!["Id".to_string(), "Name".to_string()],
        vec![staged("Id"), staged("Name")],
    )
    .when_not_matched_by_source(Some("DELETE".to_string()))
    .returning(vec![Expr::MergeAction.alias("merge_action")]);

    let (sql, _) = serialize(merge);
    assert_eq!(
        sql,
        r#"MERGE INTO "Customers" AS t USING "stage" AS s ON (s."Id" = t."Id") WHEN MATCHED THEN UPDATE SET "Name" = s."Name" WHEN NOT MATCHED THEN INSERT ("Id", "Name") VALUES (s."Id", s."Name") WHEN NOT MATCHED BY SOURCE THEN DELETE RETURNING merge_action() AS "merge_action""#
    );
}

#[test]
fn single_row_merge_casts_parameters() {
    let source = Select::values(vec![
        Expr::value(3_i64).cast("bigint").alias("Id"),
        Expr::value("Ada").cast("text").alias("Name"),
    ]);

    let merge = Merge::new(
        target().alias(TARGET_ALIAS),
        MergeSource::Query(Box::new(source), SOURCE_ALIAS.into()),
        JoinCondition::new().column("Id", "Id", false).build().nested(),
    )
    .when_matched(
        Assignments::new(vec![Assignment::new("Name", "Name", staged("Name"))])
            .aliases(TARGET_ALIAS, SOURCE_ALIAS),
    )
    .when_not_matched(
        vec!["Id".to_string(), "Name".to_string()],
        vec![staged("Id"), staged("Name")],
    )
    .returning(vec![Expr::MergeAction.alias("merge_action")]);

    let (sql, params) = serialize(merge);
    assert_eq!(
        sql,
        r#"MERGE INTO "Customers" AS t USING (SELECT CAST($1 AS bigint) AS "Id", CAST($2 AS text) AS "Name") AS s ON (s."Id" = t."Id") WHEN MATCHED THEN UPDATE SET "Name" = s."Name" WHEN NOT MATCHED THEN INSERT ("Id", "Name") VALUES (s."Id", s."Name") RETURNING merge_action() AS "merge_action""#
    );
    assert_eq!(params, vec![Value::I64(3), Value::from("Ada")]);
}

#[test]
fn match_select_projects_target_columns() {
    let select = Select::new(
        vec![
            Expr::qualified(TARGET_ALIAS, "Id").alias("Id"),
            Expr::qualified(TARGET_ALIAS, "customer_name").alias("Name"),
        ],
        target().alias(TARGET_ALIAS),
    )
    .join(
        staging().alias(SOURCE_ALIAS),
        JoinCondition::new()
            .column("Name", "customer_name", true)
            .build(),
    );

    let (sql, _) = serialize(select);
    assert_eq!(
        sql,
        r#"SELECT t."Id" AS "Id", t."customer_name" AS "Name" FROM "Customers" AS t JOIN "stage" AS s ON s."Name" = t."customer_name""#
    );
}
