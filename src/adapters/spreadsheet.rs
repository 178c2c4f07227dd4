//! CSV encoding and decoding of patient tables.

use crate::core::dates::parse_date;
use crate::domain::model::{CanonicalField, OutputRecord, SpreadsheetTable};
use crate::utils::error::Result;
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const INVALID_DATE: &str = "Invalid Date";

/// Reads a CSV export into a table. Blank cells become empty strings and
/// rows shorter than the header are padded. Cells that are not valid UTF-8
/// (Latin-1 exports) are decoded lossily instead of failing the batch.
pub fn read_table(data: &[u8]) -> Result<SpreadsheetTable> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = decode_record(reader.byte_headers()?);

    let mut rows = Vec::new();
    for row in reader.byte_records() {
        let row = decode_record(&row?);
        // Export tools like to append fully blank lines.
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(row);
    }

    tracing::debug!("Read spreadsheet with {} rows", rows.len());
    Ok(SpreadsheetTable::new(headers, rows))
}

fn decode_record(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
        .collect()
}

/// Output options shared by every writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// chrono format used to re-render DOB, e.g. `%m-%d-%Y`. DOBs that do
    /// not parse are written as `Invalid Date`.
    pub dob_format: Option<String>,
}

fn display_values(output: &OutputRecord, options: &OutputOptions) -> Vec<String> {
    let mut values: Vec<String> = output.values().into_iter().map(str::to_string).collect();

    if let Some(format) = &options.dob_format {
        let dob = output.record.get(CanonicalField::Dob);
        values[CanonicalField::Dob.index()] = match parse_date(dob) {
            Some(date) => date.format(format).to_string(),
            None => INVALID_DATE.to_string(),
        };
    }
    values
}

pub fn write_csv(outputs: &[OutputRecord], options: &OutputOptions) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(OutputRecord::headers())?;

    for output in outputs {
        writer.write_record(display_values(output, options))?;
    }

    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}

/// One output row with display values, serialized as an object whose keys
/// keep column order.
struct DisplayRow {
    values: Vec<String>,
}

impl Serialize for DisplayRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let headers = OutputRecord::headers();
        let mut map = serializer.serialize_map(Some(headers.len()))?;
        for (key, value) in headers.iter().zip(&self.values) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

pub fn write_json(outputs: &[OutputRecord], options: &OutputOptions) -> Result<Vec<u8>> {
    let rows: Vec<DisplayRow> = outputs
        .iter()
        .map(|output| DisplayRow {
            values: display_values(output, options),
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&rows)?)
}
