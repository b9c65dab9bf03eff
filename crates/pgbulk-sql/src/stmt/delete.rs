use super::*;

#[derive(Debug, Clone)]
pub struct Delete {
    pub target: TableRef,

    /// Relation joined in with `USING`
    pub using: Option<TableRef>,

    pub filter: Expr,
}

impl Statement {
    /// `DELETE FROM target USING source WHERE filter`
    pub fn delete_using(target: TableRef, using: TableRef, filter: Expr) -> Self {
        Delete {
            target,
            using: Some(using),
            filter,
        }
        .into()
    }

    /// `DELETE FROM target WHERE filter`
    pub fn delete(target: TableRef, filter: Expr) -> Self {
        Delete {
            target,
            using: None,
            filter,
        }
        .into()
    }
}
