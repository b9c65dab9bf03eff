use super::*;

/// `COPY ... FROM STDIN` in binary format.
#[derive(Debug, Clone)]
pub struct CopyIn {
    pub table: Name,

    /// Columns in the order rows are written
    pub columns: Vec<String>,
}

impl Statement {
    pub fn copy_in(table: impl Into<Name>, columns: Vec<String>) -> Self {
        CopyIn {
            table: table.into(),
            columns,
        }
        .into()
    }
}
