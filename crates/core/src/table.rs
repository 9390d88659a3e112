//! Reading submission rows from a tab-separated table.
//!
//! The table needs a header row naming every [`Field`]; columns may appear in
//! any order and extra columns are ignored.

use crate::error::{Error, Result};
use crate::types::{Field, RawRow};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Positions of the required columns within a record.
#[derive(Debug, Clone)]
struct ColumnIndex {
    positions: [usize; Field::ALL.len()],
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut positions = [0; Field::ALL.len()];

        for (slot, field) in positions.iter_mut().zip(Field::ALL) {
            *slot = headers
                .iter()
                .position(|header| header.trim() == field.header())
                .ok_or(Error::MissingColumn(field))?;
        }

        Ok(Self { positions })
    }

    /// Pick the required fields out of one record.
    fn to_row(&self, record: &StringRecord) -> Result<RawRow> {
        let mut row = RawRow::default();

        // UID comes first in Field::ALL, so later failures can name the row.
        for (field, &position) in Field::ALL.into_iter().zip(&self.positions) {
            let value = record.get(position).ok_or_else(|| Error::MalformedRow {
                uid: row.uid.clone(),
                field,
                reason: format!("row has only {} fields", record.len()),
            })?;
            *row.get_mut(field) = value.to_string();
        }

        Ok(row)
    }
}

/// Read every row of a tab-separated submission table.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(reader.headers()?)?;

    let rows = reader
        .records()
        .map(|record| columns.to_row(&record?))
        .collect::<Result<Vec<_>>>()?;

    log::debug!("Read {} rows", rows.len());
    Ok(rows)
}

/// Read a tab-separated submission table from a file.
pub fn read_rows_from_path(path: impl AsRef<Path>) -> Result<Vec<RawRow>> {
    let file = File::open(path.as_ref())?;
    read_rows(BufReader::new(file))
}
