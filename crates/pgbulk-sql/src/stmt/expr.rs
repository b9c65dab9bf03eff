use super::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Conjunction; renders `1 = 1` when empty
    And(Vec<Expr>),

    /// Binary operation
    BinaryOp(Box<Expr>, BinaryOp, Box<Expr>),

    /// `CAST(expr AS ty)`
    Cast(Box<Expr>, String),

    /// `expr COLLATE "collation"`
    Collate(Box<Expr>, String),

    /// A column reference, optionally qualified by a table alias
    Column(ExprColumn),

    /// Always false, used to force every merge row into the insert branch
    False,

    /// `merge_action()`
    MergeAction,

    /// Parenthesized expression
    Nested(Box<Expr>),

    /// SQL text emitted verbatim
    Raw(String),

    /// A bound parameter
    Value(Value),

    /// `*`
    Wildcard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Eq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprColumn {
    /// Table alias, emitted unquoted
    pub table: Option<String>,

    pub name: String,
}

/// One projected expression, with an optional output name.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(ExprColumn {
            table: None,
            name: name.into(),
        })
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column(ExprColumn {
            table: Some(table.into()),
            name: name.into(),
        })
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self::BinaryOp(Box::new(lhs), BinaryOp::Eq, Box::new(rhs))
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::BinaryOp(Box::new(lhs), BinaryOp::Add, Box::new(rhs))
    }

    pub fn cast(self, ty: impl Into<String>) -> Self {
        Self::Cast(Box::new(self), ty.into())
    }

    pub fn collate(self, collation: impl Into<String>) -> Self {
        Self::Collate(Box::new(self), collation.into())
    }

    pub fn nested(self) -> Self {
        Self::Nested(Box::new(self))
    }

    /// Combines conditions with `AND`, unwrapping a single condition.
    pub fn and_from_vec(mut operands: Vec<Expr>) -> Self {
        if operands.len() == 1 {
            operands.remove(0)
        } else {
            Self::And(operands)
        }
    }

    pub fn alias(self, alias: impl Into<String>) -> SelectItem {
        SelectItem {
            expr: self,
            alias: Some(alias.into()),
        }
    }
}

impl From<Expr> for SelectItem {
    fn from(expr: Expr) -> Self {
        Self { expr, alias: None }
    }
}
