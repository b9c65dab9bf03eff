use super::*;

#[derive(Debug, Clone)]
pub struct Merge {
    pub target: TableRef,

    pub source: MergeSource,

    pub on: Expr,

    /// `WHEN MATCHED THEN UPDATE SET ...`
    pub when_matched: Option<Assignments>,

    /// `WHEN NOT MATCHED THEN INSERT ...`
    pub when_not_matched: Option<MergeInsert>,

    /// `WHEN NOT MATCHED BY SOURCE THEN <action>`, emitted verbatim
    pub when_not_matched_by_source: Option<String>,

    pub returning: Vec<SelectItem>,
}

#[derive(Debug, Clone)]
pub enum MergeSource {
    Table(TableRef),

    /// A subquery, always aliased
    Query(Box<Select>, String),
}

#[derive(Debug, Clone)]
pub struct MergeInsert {
    pub columns: Vec<String>,
    pub values: Vec<Expr>,
}

impl Merge {
    pub fn new(target: TableRef, source: MergeSource, on: Expr) -> Self {
        Self {
            target,
            source,
            on,
            when_matched: None,
            when_not_matched: None,
            when_not_matched_by_source: None,
            returning: vec![],
        }
    }

    pub fn when_matched(mut self, assignments: Assignments) -> Self {
        self.when_matched = Some(assignments);
        self
    }

    pub fn when_not_matched(mut self, columns: Vec<String>, values: Vec<Expr>) -> Self {
        self.when_not_matched = Some(MergeInsert { columns, values });
        self
    }

    pub fn when_not_matched_by_source(mut self, action: Option<String>) -> Self {
        self.when_not_matched_by_source = action;
        self
    }

    pub fn returning(mut self, returning: Vec<SelectItem>) -> Self {
        self.returning = returning;
        self
    }
}
