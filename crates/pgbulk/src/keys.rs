use crate::staging::find_property;

use pgbulk_core::{
    schema::{Property, TableDescriptor},
    stmt::Value,
    Error, Result,
};
use pgbulk_sql::stmt::{Expr, JoinCondition};

/// The explicit id properties, or the table's primary key.
pub(crate) fn resolve_ids(
    explicit: Option<&[String]>,
    descriptor: &TableDescriptor,
) -> Result<Vec<String>> {
    let ids = explicit.unwrap_or(descriptor.primary_keys()).to_vec();

    if ids.is_empty() {
        return Err(Error::configuration(format!(
            "no id columns configured for `{}`",
            descriptor.name()
        )));
    }

    Ok(ids)
}

/// `s."key" = t."column"` for every key, ANDed.
pub(crate) fn join_on(
    descriptor: &TableDescriptor,
    properties: &[Property],
    keys: &[String],
    collation: Option<&str>,
) -> Result<Expr> {
    let mut join = JoinCondition::new().collation(collation);

    for key in keys {
        let property = find_property(properties, key)?;
        join = join.column(
            &key.replace('.', "_"),
            &descriptor.column_name(key),
            property.ty.is_textual(),
        );
    }

    Ok(join.build())
}

/// `"column" = $n` for every key, ANDed. Used by single-row statements.
pub(crate) fn filter_on(
    descriptor: &TableDescriptor,
    properties: &[Property],
    keys: &[(String, Value)],
    collation: Option<&str>,
) -> Result<Expr> {
    let mut terms = vec![];

    for (key, value) in keys {
        let property = find_property(properties, key)?;
        let mut lhs = Expr::column(descriptor.column_name(key));
        let mut rhs = Expr::Value(value.clone());

        if let (Some(collation), true) = (collation, property.ty.is_textual()) {
            lhs = lhs.collate(collation);
            rhs = rhs.collate(collation);
        }

        terms.push(Expr::eq(lhs, rhs));
    }

    Ok(Expr::and_from_vec(terms))
}

/// Concatenates column lists, keeping the first occurrence of each name.
pub(crate) fn distinct<'a>(lists: impl IntoIterator<Item = &'a [String]>) -> Vec<String> {
    let mut out: Vec<String> = vec![];

    for name in lists.into_iter().flatten() {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }

    out
}
