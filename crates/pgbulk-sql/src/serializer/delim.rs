use super::{Formatter, Params, ToSql};

/// Renders each item, separated by `, `.
pub(super) struct Comma<L>(pub(super) L);

impl<L> ToSql for Comma<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        for (i, item) in self.0.into_iter().enumerate() {
            if i > 0 {
                f.dst.push_str(", ");
            }
            item.to_sql(f);
        }
    }
}
