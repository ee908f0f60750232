//! CSV encoding of entries.
//!
//! The column set is fixed: `ID,FirstName,LastName,Email,Phone`. The header
//! is always written, so exporting an empty collection still yields a file
//! that imports cleanly. A file with no header row at all is rejected. An
//! empty `ID` cell marks an entry that has not been stored yet.

use crate::entry::Entry;
use crate::error::ServiceError;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub const HEADER: [&str; 5] = ["ID", "FirstName", "LastName", "Email", "Phone"];

#[derive(Serialize, Deserialize)]
struct Row {
    #[serde(rename = "ID", default)]
    id: Option<String>,
    #[serde(rename = "FirstName", default)]
    first_name: String,
    #[serde(rename = "LastName", default)]
    last_name: String,
    #[serde(rename = "Email", default)]
    email: String,
    #[serde(rename = "Phone", default)]
    phone: String,
}

impl From<&Entry> for Row {
    fn from(entry: &Entry) -> Self {
        Row {
            id: entry.id.clone(),
            first_name: entry.first_name.clone(),
            last_name: entry.last_name.clone(),
            email: entry.email.clone(),
            phone: entry.phone.clone(),
        }
    }
}

impl From<Row> for Entry {
    fn from(row: Row) -> Self {
        Entry {
            id: row.id.filter(|id| !id.is_empty()),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
        }
    }
}

/// Write the header and one row per entry.
pub fn write_entries<W: Write>(writer: W, entries: &[Entry]) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(HEADER)?;
    for entry in entries {
        writer.serialize(Row::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse every row. A missing header row or the first malformed row fails the
/// whole read.
pub fn read_entries<R: Read>(reader: R) -> Result<Vec<Entry>, csv::Error> {
    let mut reader = ReaderBuilder::new().from_reader(reader);
    if reader.headers()?.is_empty() {
        let empty = io::Error::new(io::ErrorKind::UnexpectedEof, "empty csv file given");
        return Err(empty.into());
    }

    reader
        .deserialize::<Row>()
        .map(|row| row.map(Entry::from))
        .collect()
}

/// Write `entries` to a fresh `entries.*.csv` temp file, rewound for reading.
///
/// The file is deleted when the returned handle is dropped.
pub fn export_to_temp_file(entries: &[Entry]) -> Result<NamedTempFile, ServiceError> {
    let mut file = tempfile::Builder::new()
        .prefix("entries.")
        .suffix(".csv")
        .tempfile()?;

    write_entries(&mut file, entries)?;
    file.rewind()?;
    Ok(file)
}

pub fn read_file(path: &Path) -> Result<Vec<Entry>, ServiceError> {
    let file = File::open(path)?;
    Ok(read_entries(BufReader::new(file))?)
}
