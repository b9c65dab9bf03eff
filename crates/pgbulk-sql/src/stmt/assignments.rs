use super::Expr;

use pgbulk_core::TableDescriptor;

use std::fmt;
use std::sync::Arc;

/// The `SET` list of an update or merge.
#[derive(Debug, Clone, Default)]
pub struct Assignments {
    pub items: Vec<Assignment>,

    /// Alias of the updated table, passed to the set-clause callback
    pub target_alias: Option<String>,

    /// Alias of the source relation, passed to the set-clause callback
    pub source_alias: Option<String>,

    /// Optional per-column override of the rendered fragment
    pub configure: Option<ConfigureSetClause>,
}

/// `"column" = value`
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Record property being assigned
    pub property: String,

    /// Target column
    pub column: String,

    pub value: Expr,
}

/// What a set-clause callback sees for one assignment.
#[derive(Debug)]
pub struct SetClauseContext<'a> {
    pub descriptor: &'a TableDescriptor,

    pub property: &'a str,

    /// Rendered left-hand side, e.g. `"Value"`
    pub left: &'a str,

    /// Rendered right-hand side, e.g. `s."Value"` or `$2`
    pub right: &'a str,

    pub target_alias: Option<&'a str>,

    pub source_alias: Option<&'a str>,
}

/// Callback deciding the full `SET` fragment of a column. Returning `None`
/// keeps the default `left = right`.
pub type SetClauseFn = dyn Fn(&SetClauseContext<'_>) -> Option<String> + Send + Sync;

#[derive(Clone)]
pub struct ConfigureSetClause {
    descriptor: Arc<TableDescriptor>,
    callback: Arc<SetClauseFn>,
}

impl Assignments {
    pub fn new(items: Vec<Assignment>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn aliases(mut self, target: &str, source: &str) -> Self {
        self.target_alias = Some(target.to_string());
        self.source_alias = Some(source.to_string());
        self
    }

    pub fn configure(mut self, configure: Option<ConfigureSetClause>) -> Self {
        self.configure = configure;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Assignment {
    pub fn new(property: impl Into<String>, column: impl Into<String>, value: Expr) -> Self {
        Self {
            property: property.into(),
            column: column.into(),
            value,
        }
    }
}

impl ConfigureSetClause {
    pub fn new(descriptor: Arc<TableDescriptor>, callback: Arc<SetClauseFn>) -> Self {
        Self {
            descriptor,
            callback,
        }
    }

    pub(crate) fn apply(
        &self,
        property: &str,
        left: &str,
        right: &str,
        target_alias: Option<&str>,
        source_alias: Option<&str>,
    ) -> Option<String> {
        (self.callback)(&SetClauseContext {
            descriptor: &self.descriptor,
            property,
            left,
            right,
            target_alias,
            source_alias,
        })
    }
}

impl fmt::Debug for ConfigureSetClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigureSetClause")
            .field("table", &self.descriptor.name())
            .finish_non_exhaustive()
    }
}
