use super::{Comma, Ident, Params, ToSql};

use crate::stmt;

impl ToSql for &stmt::Assignments {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let mut s = "";

        for assignment in &self.items {
            let left = f.render(Ident(&assignment.column));
            let (right, pending) = f.render_pending(&assignment.value);

            let custom = self.configure.as_ref().and_then(|configure| {
                configure.apply(
                    &assignment.property,
                    &left,
                    &right,
                    self.target_alias.as_deref(),
                    self.source_alias.as_deref(),
                )
            });

            // A custom fragment that drops the value must not leave its
            // parameter bound.
            let fragment = &match custom {
                Some(fragment) => {
                    if fragment.contains(&right) {
                        pending.commit(&mut *f.params);
                    }
                    fragment
                }
                None => {
                    pending.commit(&mut *f.params);
                    format!("{left} = {right}")
                }
            };

            fmt!(f, s fragment);
            s = ", ";
        }
    }
}

/// `("a", "b")`
pub(super) struct ColumnList<'a>(pub(super) &'a [String]);

impl ToSql for ColumnList<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let columns = Comma(self.0.iter().map(Ident));

        fmt!(f, "(" columns ")");
    }
}
