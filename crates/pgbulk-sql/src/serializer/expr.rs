use super::{Comma, Ident, Params, ToSql};

use crate::stmt::{self, BinaryOp, Expr};

impl ToSql for &Expr {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self {
            Expr::And(operands) if operands.is_empty() => fmt!(f, "1 = 1"),
            Expr::And(operands) => {
                let mut s = "";
                for operand in operands {
                    fmt!(f, s operand);
                    s = " AND ";
                }
            }
            Expr::BinaryOp(lhs, op, rhs) => {
                let op = match op {
                    BinaryOp::Add => " + ",
                    BinaryOp::Eq => " = ",
                };
                let rhs = &**rhs;
                fmt!(f, &**lhs op rhs);
            }
            Expr::Cast(expr, ty) => {
                let expr = &**expr;
                fmt!(f, "CAST(" expr " AS " ty ")")
            }
            Expr::Collate(expr, collation) => fmt!(f, &**expr " COLLATE " Ident(collation)),
            Expr::Column(column) => fmt!(f, column),
            Expr::False => fmt!(f, "1 = 0"),
            Expr::MergeAction => fmt!(f, "merge_action()"),
            Expr::Nested(expr) => {
                let expr = &**expr;
                fmt!(f, "(" expr ")")
            }
            Expr::Raw(sql) => fmt!(f, sql),
            Expr::Value(value) => {
                let placeholder = f.params.push(value);
                fmt!(f, placeholder);
            }
            Expr::Wildcard => fmt!(f, "*"),
        }
    }
}

impl ToSql for &stmt::ExprColumn {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        if let Some(table) = &self.table {
            fmt!(f, table ".");
        }
        fmt!(f, Ident(&self.name));
    }
}

impl ToSql for &stmt::SelectItem {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        fmt!(f, &self.expr);

        if let Some(alias) = &self.alias {
            fmt!(f, " AS " Ident(alias));
        }
    }
}

/// `RETURNING a, b`, or nothing when the list is empty.
pub(super) struct Returning<'a>(pub(super) &'a [stmt::SelectItem]);

impl ToSql for Returning<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        if !self.0.is_empty() {
            fmt!(f, " RETURNING " Comma(self.0));
        }
    }
}
