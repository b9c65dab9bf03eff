use super::Expr;

use crate::{SOURCE_ALIAS, TARGET_ALIAS};

/// Builds the condition that matches staged rows to target rows.
///
/// Each key column contributes `s."col" = t."mapped"`; the terms are ANDed.
/// When a collation is set, it is applied to both sides of textual keys only.
#[derive(Debug, Clone)]
pub struct JoinCondition {
    source_alias: String,
    target_alias: String,
    collation: Option<String>,
    terms: Vec<Expr>,
}

impl JoinCondition {
    pub fn new() -> Self {
        Self {
            source_alias: SOURCE_ALIAS.to_string(),
            target_alias: TARGET_ALIAS.to_string(),
            collation: None,
            terms: vec![],
        }
    }

    pub fn collation(mut self, collation: Option<&str>) -> Self {
        self.collation = collation.map(str::to_string);
        self
    }

    /// Adds a key column.
    ///
    /// `staging` is the column in the staging relation, `target` the mapped
    /// column in the destination table.
    pub fn column(mut self, staging: &str, target: &str, textual: bool) -> Self {
        let mut lhs = Expr::qualified(&self.source_alias, staging);
        let mut rhs = Expr::qualified(&self.target_alias, target);

        if let (Some(collation), true) = (&self.collation, textual) {
            lhs = lhs.collate(collation);
            rhs = rhs.collate(collation);
        }

        self.terms.push(Expr::eq(lhs, rhs));
        self
    }

    pub fn build(self) -> Expr {
        Expr::and_from_vec(self.terms)
    }
}

impl Default for JoinCondition {
    fn default() -> Self {
        Self::new()
    }
}
