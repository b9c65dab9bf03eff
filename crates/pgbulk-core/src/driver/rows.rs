use crate::{
    stmt::{Value, ValueRecord},
    Error, Result,
};

/// Rows returned by a query, with their column names.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Rows {
    pub columns: Vec<String>,
    pub rows: Vec<ValueRecord>,
}

impl Rows {
    pub fn new(columns: Vec<String>, rows: Vec<ValueRecord>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column named `name`.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| Error::invalid_result(format!("missing column `{name}` in result")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValueRecord> {
        self.rows.iter()
    }

    /// Reads `column` from every row.
    pub fn column(&self, column: &str) -> Result<impl Iterator<Item = &Value>> {
        let index = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| &row[index]))
    }
}

impl IntoIterator for Rows {
    type Item = ValueRecord;
    type IntoIter = std::vec::IntoIter<ValueRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lookup() {
        let rows = Rows::new(
            vec!["id".into(), "__pgbulk_ordinal".into()],
            vec![ValueRecord::from_vec(vec![Value::I64(10), Value::I64(0)])],
        );
        assert_eq!(rows.column_index("__pgbulk_ordinal").unwrap(), 1);
        assert_eq!(
            rows.column("id").unwrap().collect::<Vec<_>>(),
            vec![&Value::I64(10)]
        );
        assert!(rows.column_index("missing").unwrap_err().is_invalid_result());
    }
}
