use super::{Formatter, ToSql};

use pgbulk_core::stmt::Value;

/// Collects bound values while a statement is serialized.
pub trait Params {
    fn push(&mut self, param: &Value) -> Placeholder;

    /// Number of values bound so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A 1-based PostgreSQL positional parameter, rendered `$n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        Vec::push(self, value.clone());
        Placeholder(Vec::len(self))
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// Values bound by a fragment that may still be dropped. Placeholders are
/// numbered as if the values were already bound, so committing them right
/// after rendering keeps the numbering intact.
#[derive(Debug)]
pub(super) struct Pending {
    offset: usize,
    values: Vec<Value>,
}

impl Pending {
    pub(super) fn after(params: &impl Params) -> Self {
        Self {
            offset: params.len(),
            values: vec![],
        }
    }

    pub(super) fn commit(self, params: &mut impl Params) {
        debug_assert_eq!(params.len(), self.offset);

        for value in &self.values {
            params.push(value);
        }
    }
}

impl Params for Pending {
    fn push(&mut self, value: &Value) -> Placeholder {
        self.values.push(value.clone());
        Placeholder(self.offset + self.values.len())
    }

    fn len(&self) -> usize {
        self.offset + self.values.len()
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: super::Params>(self, f: &mut Formatter<'_, P>) {
        f.dst.push('$');
        f.dst.push_str(&self.0.to_string());
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.0)
    }
}
