//! Comma-delimited row files shared by both stores.
//!
//! A table file is one header line followed by one record per line. Fields are
//! joined with [`DELIMITER`] and never quoted, so the encoder refuses text that
//! would shift columns on the way back in. Lines that do not decode are dropped
//! on load and counted in [`Table::skipped`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{Result, StoreError};

/// Field separator used on disk.
pub const DELIMITER: char = ',';

/// A fixed-arity record that maps to one line of a table file.
pub trait Record: Sized {
    /// Header line naming the columns in order.
    const HEADER: &'static str;
    /// Number of fields per line.
    const ARITY: usize;

    /// Fields in column order.
    fn to_fields(&self) -> Vec<String>;

    /// Build a record from exactly `ARITY` fields, or `None` if a typed field
    /// does not parse.
    fn from_fields(fields: &[&str]) -> Option<Self>;

    /// Column names taken from the header.
    fn columns() -> std::str::Split<'static, char> {
        Self::HEADER.split(DELIMITER)
    }
}

/// Records read from a table file plus the number of lines that were dropped.
#[derive(Debug)]
pub struct Table<R> {
    pub rows: Vec<R>,
    pub skipped: usize,
}

/// Serialize one record to a line (without the trailing newline).
pub fn encode<R: Record>(record: &R) -> Result<String> {
    let fields = record.to_fields();
    for (column, value) in R::columns().zip(&fields) {
        if value.contains(|c: char| c == DELIMITER || c == '\n' || c == '\r') {
            return Err(StoreError::UnencodableField { column, value: value.clone() });
        }
    }
    let separator = DELIMITER.to_string();
    Ok(fields.join(separator.as_str()))
}

/// Parse one line. Arity mismatches and unparsable fields yield `None`.
pub fn decode<R: Record>(line: &str) -> Option<R> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() != R::ARITY {
        return None;
    }
    R::from_fields(&fields)
}

/// Read every record after the header.
///
/// Lines are decoded one at a time, so a line that is not valid UTF-8 is
/// skipped like any other malformed row.
pub fn read_table<R: Record>(path: &Path) -> Result<Table<R>> {
    let content = fs::read(path).map_err(|e| StoreError::io(path, e))?;
    let mut table = Table { rows: Vec::new(), skipped: 0 };
    for raw in content.split(|&b| b == b'\n').skip(1) {
        let Ok(line) = std::str::from_utf8(raw) else {
            table.skipped += 1;
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }
        match decode(line) {
            Some(record) => table.rows.push(record),
            None => table.skipped += 1,
        }
    }
    Ok(table)
}

/// Rewrite the whole file: header then every row.
///
/// All rows are encoded before the file is truncated, so a refused field
/// leaves the previous contents in place.
pub fn write_table<R: Record>(path: &Path, rows: &[R]) -> Result<()> {
    let lines = rows.iter().map(encode).collect::<Result<Vec<_>>>()?;
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    write_with_header::<R>(file, &lines).map_err(|e| StoreError::io(path, e))
}

/// Create the file with the header and `rows` if it does not exist yet.
/// Returns `false` when the file was already there; it is never overwritten.
pub fn create_table<R: Record>(path: &Path, rows: &[R]) -> Result<bool> {
    let lines = rows.iter().map(encode).collect::<Result<Vec<_>>>()?;
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    write_with_header::<R>(file, &lines).map_err(|e| StoreError::io(path, e))?;
    Ok(true)
}

/// Append one record without touching existing lines.
pub fn append_row<R: Record>(path: &Path, record: &R) -> Result<()> {
    let line = encode(record)?;
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;
    writeln!(file, "{line}").map_err(|e| StoreError::io(path, e))
}

fn write_with_header<R: Record>(file: File, lines: &[String]) -> io::Result<()> {
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", R::HEADER)?;
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
