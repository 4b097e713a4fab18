//! Delimited-text decoding
//!
//! Real bank exports rarely start with the table: they carry preamble lines
//! (account numbers, statement periods, blank lines) before the header. The
//! decoder sniffs the delimiter, scans for the first line that qualifies as a
//! header row for the requested schema, and keeps everything after it as data
//! rows with their original file line numbers.

use crate::error::IngestError;
use crate::mapping::SchemaKind;

/// One data row below the header
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    /// 1-based line number in the uploaded file
    pub line_number: usize,
    /// The trimmed original line, echoed back on rejection
    pub raw: String,
    /// Split and quote-stripped cells
    pub cells: Vec<String>,
}

/// A decoded table: header plus data rows
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTable {
    pub delimiter: char,
    /// 1-based line number of the header row
    pub header_line: usize,
    pub header: Vec<String>,
    pub rows: Vec<DataRow>,
}

/// Tab wins if the first non-empty line contains one, otherwise comma
pub fn sniff_delimiter(text: &str) -> char {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if first.contains('\t') {
        '\t'
    } else {
        ','
    }
}

/// Split a line into trimmed, quote-stripped cells.
///
/// The delimiter only splits outside double quotes, so a quoted cell may
/// contain the delimiter. Escaped quotes ("") are not handled.
pub fn split_cells(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            current.push(ch);
        } else if ch == delimiter && !in_quotes {
            cells.push(strip_quotes(&current));
            current.clear();
        } else {
            current.push(ch);
        }
    }
    cells.push(strip_quotes(&current));
    cells
}

fn strip_quotes(cell: &str) -> String {
    let trimmed = cell.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    trimmed.to_string()
}

/// Decode an uploaded file into a header row and data rows.
///
/// Lines before the header are treated as preamble and skipped. Empty lines
/// anywhere are skipped. Fails when no line qualifies as a header row.
pub fn decode(text: &str, schema: SchemaKind) -> Result<DecodedTable, IngestError> {
    let delimiter = sniff_delimiter(text);

    let mut header: Option<(usize, Vec<String>)> = None;
    let mut rows = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = idx + 1;
        let cells = split_cells(line, delimiter);
        if header.is_none() {
            if schema.header_matches(&cells) {
                header = Some((line_number, cells));
            }
        } else {
            rows.push(DataRow {
                line_number,
                raw: line.trim().to_string(),
                cells,
            });
        }
    }

    let (header_line, header) = header.ok_or(IngestError::HeaderNotFound { schema })?;

    Ok(DecodedTable {
        delimiter,
        header_line,
        header,
        rows,
    })
}

// ==================== Tests ====================
