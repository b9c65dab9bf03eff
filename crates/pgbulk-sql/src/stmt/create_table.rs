use super::*;

#[derive(Debug, Clone)]
pub struct CreateTable {
    /// Name of the table
    pub name: Name,

    /// Column definitions
    pub columns: Vec<ColumnDef>,

    /// Session-scoped table, dropped when the connection closes
    pub temporary: bool,
}

impl Statement {
    /// A session-scoped table holding staged records.
    pub fn create_temp_table(name: impl Into<Name>, columns: Vec<ColumnDef>) -> Self {
        CreateTable {
            name: name.into(),
            columns,
            temporary: true,
        }
        .into()
    }
}
