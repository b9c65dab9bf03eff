//! Writes server-generated identifiers back onto the records that produced
//! them.
//!
//! The server returns `(id, ordinal)` pairs in no particular order. The
//! ordinal is the record's zero-based position in the staged input, so the
//! pairs are collected into a map and then applied by position.

use pgbulk_core::{
    driver::Rows,
    schema::{Record, ValueConverter},
    stmt::Value,
    Error, Result,
};

use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct GeneratedIds {
    by_ordinal: HashMap<usize, Value>,
}

impl GeneratedIds {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, ordinal: Value, id: Value) -> Result<()> {
        let ordinal = ordinal.to_i64()?;
        let ordinal = usize::try_from(ordinal)
            .map_err(|_| Error::invalid_result(format!("negative ordinal {ordinal}")))?;
        self.by_ordinal.insert(ordinal, id);
        Ok(())
    }

    /// Collects every row of `rows` as an `(id, ordinal)` pair.
    pub(crate) fn from_rows(rows: &Rows, id_column: &str, ordinal_column: &str) -> Result<Self> {
        if rows.is_empty() {
            return Ok(Self::new());
        }

        let id = rows.column_index(id_column)?;
        let ordinal = rows.column_index(ordinal_column)?;

        let mut ids = Self::new();
        for row in rows.iter() {
            ids.insert(row[ordinal].clone(), row[id].clone())?;
        }
        Ok(ids)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_ordinal.len()
    }

    /// Assigns each id to the record at its ordinal.
    ///
    /// Records without a returned id are left untouched. An ordinal past the
    /// end of `records` means the statement returned a row for input that
    /// was never staged.
    pub(crate) fn assign<T: Record>(
        mut self,
        records: &mut [T],
        property: &str,
        converter: Option<&ValueConverter>,
    ) -> Result<()> {
        for (ordinal, record) in records.iter_mut().enumerate() {
            let Some(id) = self.by_ordinal.remove(&ordinal) else {
                continue;
            };

            let id = match converter {
                Some(converter) => converter.from_provider(id)?,
                None => id,
            };
            record.set(property, id)?;
        }

        if let Some(ordinal) = self.by_ordinal.keys().min() {
            return Err(Error::invalid_result(format!(
                "ordinal {ordinal} has no input record"
            )));
        }

        Ok(())
    }
}
