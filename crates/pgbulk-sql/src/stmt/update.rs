use super::*;

#[derive(Debug, Clone)]
pub struct Update {
    pub target: TableRef,

    pub assignments: Assignments,

    /// Relation joined in with `FROM`
    pub from: Option<TableRef>,

    pub filter: Expr,

    pub returning: Vec<SelectItem>,
}

impl Statement {
    /// `UPDATE target SET ... FROM source WHERE filter`
    pub fn update_from(
        target: TableRef,
        assignments: Assignments,
        from: TableRef,
        filter: Expr,
    ) -> Self {
        Update {
            target,
            assignments,
            from: Some(from),
            filter,
            returning: vec![],
        }
        .into()
    }

    /// `UPDATE target SET ... WHERE filter`, for a single row.
    pub fn update(target: TableRef, assignments: Assignments, filter: Expr) -> Self {
        Update {
            target,
            assignments,
            from: None,
            filter,
            returning: vec![],
        }
        .into()
    }
}
