use super::*;

#[derive(Debug, Clone)]
pub struct Select {
    pub items: Vec<SelectItem>,

    /// `None` for a FROM-less select of literal values
    pub from: Option<TableRef>,

    pub joins: Vec<Join>,

    pub order_by: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct Join {
    pub table: TableRef,
    pub on: Expr,
}

impl Select {
    pub fn new(items: Vec<SelectItem>, from: impl Into<TableRef>) -> Self {
        Self {
            items,
            from: Some(from.into()),
            joins: vec![],
            order_by: None,
        }
    }

    /// A single row of values with no FROM clause.
    pub fn values(items: Vec<SelectItem>) -> Self {
        Self {
            items,
            from: None,
            joins: vec![],
            order_by: None,
        }
    }

    pub fn join(mut self, table: impl Into<TableRef>, on: Expr) -> Self {
        self.joins.push(Join {
            table: table.into(),
            on,
        });
        self
    }

    pub fn order_by(mut self, expr: Expr) -> Self {
        self.order_by = Some(expr);
        self
    }
}
