mod assignments;
pub use assignments::{Assignment, Assignments, ConfigureSetClause, SetClauseContext, SetClauseFn};

mod column_def;
pub use column_def::ColumnDef;

mod copy_in;
pub use copy_in::CopyIn;

mod create_table;
pub use create_table::CreateTable;

mod delete;
pub use delete::Delete;

mod expr;
pub use expr::{BinaryOp, Expr, ExprColumn, SelectItem};

mod insert;
pub use insert::{Insert, InsertSource};

mod join;
pub use join::JoinCondition;

mod merge;
pub use merge::{Merge, MergeInsert, MergeSource};

mod name;
pub use name::{Name, TableRef};

mod select;
pub use select::{Join, Select};

mod update;
pub use update::Update;

pub use pgbulk_core::stmt::*;

#[derive(Debug, Clone)]
pub enum Statement {
    CopyIn(CopyIn),
    CreateTable(CreateTable),
    Delete(Delete),
    Insert(Insert),
    Merge(Merge),
    Select(Select),
    Update(Update),
}

macro_rules! impl_from {
    ( $( $variant:ident, )* ) => {
        $(
            impl From<$variant> for Statement {
                fn from(value: $variant) -> Self {
                    Statement::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    CopyIn,
    CreateTable,
    Delete,
    Insert,
    Merge,
    Select,
    Update,
}
