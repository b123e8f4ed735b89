//! CSV export of a formatted result table, plus the matching reader.
//!
//! Exports exactly what the formatter produced: header, one row per line
//! item, trailing totals row. The reader exists so exported files can be
//! re-checked against a fresh calculation.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::domain::{ResultTable, TABLE_HEADER};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("exported file is missing the header row")]
    MissingHeader,
    #[error("exported row has {0} columns, expected 4")]
    MalformedRow(usize),
}

/// Write the table as CSV to any writer.
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TABLE_HEADER)?;
    for row in &table.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.write_record(&table.total_row)?;
    csv_writer.flush()?;
    Ok(())
}

/// Write the table as a CSV file.
pub fn export_to_file(table: &ResultTable, path: &Path) -> Result<(), ExportError> {
    write_csv(table, File::create(path)?)
}

/// Read back an exported table: all rows including the trailing totals row,
/// header excluded.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<[String; 4]>, ExportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        if index == 0 {
            if record.iter().ne(TABLE_HEADER) {
                return Err(ExportError::MissingHeader);
            }
            continue;
        }
        if record.len() != 4 {
            return Err(ExportError::MalformedRow(record.len()));
        }
        rows.push([
            record[0].to_string(),
            record[1].to_string(),
            record[2].to_string(),
            record[3].to_string(),
        ]);
    }

    Ok(rows)
}
