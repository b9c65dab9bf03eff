use super::*;

#[derive(Debug, Clone)]
pub struct Insert {
    pub target: Name,

    /// Target columns
    pub columns: Vec<String>,

    pub source: InsertSource,

    pub returning: Vec<SelectItem>,
}

#[derive(Debug, Clone)]
pub enum InsertSource {
    /// `INSERT ... SELECT`
    Select(Box<Select>),

    /// `INSERT ... VALUES (...)`, one row
    Values(Vec<Expr>),
}

impl Statement {
    /// Copies staged rows into `target`.
    pub fn insert_select(target: Name, columns: Vec<String>, source: Select) -> Self {
        Insert {
            target,
            columns,
            source: InsertSource::Select(Box::new(source)),
            returning: vec![],
        }
        .into()
    }

    /// Inserts a single row of bound values.
    pub fn insert_values(
        target: Name,
        columns: Vec<String>,
        values: Vec<Expr>,
        returning: Vec<SelectItem>,
    ) -> Self {
        Insert {
            target,
            columns,
            source: InsertSource::Values(values),
            returning,
        }
        .into()
    }
}
