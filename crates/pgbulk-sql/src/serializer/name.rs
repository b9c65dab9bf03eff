use super::{Ident, Params, ToSql};

use crate::stmt;

impl ToSql for &stmt::Name {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        if let Some(schema) = &self.schema {
            fmt!(f, Ident(schema) ".");
        }
        fmt!(f, Ident(&self.name));
    }
}

impl ToSql for &stmt::TableRef {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        fmt!(f, &self.name);

        if let Some(alias) = &self.alias {
            fmt!(f, " AS " alias);
        }
    }
}
