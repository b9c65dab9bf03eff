#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::Comma;

mod ident;
use ident::Ident;

mod params;
pub use params::{Params, Placeholder};
use params::Pending;

// Fragment serializers
mod assignments;
mod column_def;
mod expr;
mod name;
mod statement;

use crate::stmt::Statement;

/// Serialize a statement to a PostgreSQL string
#[derive(Debug, Default, Clone, Copy)]
pub struct Serializer {
    _priv: (),
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Serializer {
    pub fn postgresql() -> Self {
        Self::default()
    }

    /// Serializes `stmt`, pushing bound values onto `params` in placeholder
    /// order.
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);
        ret
    }
}

impl<T: Params> Formatter<'_, T> {
    /// Renders `fragment` into its own string, sharing this formatter's
    /// parameters.
    fn render(&mut self, fragment: impl ToSql) -> String {
        let mut dst = String::new();
        let mut nested = Formatter {
            serializer: self.serializer,
            dst: &mut dst,
            params: &mut *self.params,
        };
        fragment.to_sql(&mut nested);
        dst
    }

    /// Like [`render`](Self::render), but holds back the values the fragment
    /// binds until the caller commits them.
    fn render_pending(&mut self, fragment: impl ToSql) -> (String, Pending) {
        let mut dst = String::new();
        let mut pending = Pending::after(&*self.params);
        let mut nested = Formatter {
            serializer: self.serializer,
            dst: &mut dst,
            params: &mut pending,
        };
        fragment.to_sql(&mut nested);
        (dst, pending)
    }
}
