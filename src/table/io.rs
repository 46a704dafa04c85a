use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Cell, MessageRow, MessageTable};
use crate::constants::SHEET_NAME;
use crate::error::{CleanerError, Result};

const MAX_SHEET_ROWS: usize = 1_048_576;
const MAX_SHEET_COLUMNS: usize = 16_384;
const MAX_CELL_CHARS: usize = 32_767;

/// On-disk representation of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Xlsx,
    Csv,
}

impl TableFormat {
    /// Dispatch by extension. Any spreadsheet calamine can read counts as `Xlsx`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(TableFormat::Xlsx),
            "csv" => Ok(TableFormat::Csv),
            other => Err(CleanerError::UnsupportedFormat(format!(
                "'.{other}' ({})",
                path.display()
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Xlsx => "xlsx",
            TableFormat::Csv => "csv",
        }
    }
}

/// Load a message table from a spreadsheet or CSV file
pub fn load_table(path: &Path) -> Result<MessageTable> {
    info!("Loading '{}'...", path.display());
    let table = match TableFormat::from_path(path)? {
        TableFormat::Xlsx => load_spreadsheet(path)?,
        TableFormat::Csv => load_csv(path)?,
    };
    debug!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

/// Persist a table, choosing the writer from the path's extension
pub fn save_table(table: &MessageTable, path: &Path) -> Result<()> {
    info!("Saving messages to '{}'...", path.display());
    match TableFormat::from_path(path)? {
        TableFormat::Xlsx => save_spreadsheet(table, path),
        TableFormat::Csv => save_csv(table, path),
    }
}

// ---------------------------------------------------------------------------
// Row assembly shared by both readers
// ---------------------------------------------------------------------------

/// Turn a header row plus data rows into a table. A leading unnamed header is
/// the index column written by an earlier snapshot and becomes the row label.
fn assemble<I>(path: &Path, header: Vec<String>, data: I) -> Result<MessageTable>
where
    I: IntoIterator<Item = Vec<Cell>>,
{
    if header.is_empty() || header.iter().all(|h| h.is_empty()) {
        return Err(CleanerError::EmptyTable(path.display().to_string()));
    }

    let has_index = header.first().map(|h| h.is_empty()).unwrap_or(false);
    let columns: Vec<String> = if has_index {
        header[1..].to_vec()
    } else {
        header
    };

    let mut table = MessageTable::new(columns);
    for (position, mut values) in data.into_iter().enumerate() {
        let index = if has_index {
            let label = if values.is_empty() {
                Cell::Empty
            } else {
                values.remove(0)
            };
            parse_index(&label).unwrap_or(position)
        } else {
            position
        };
        if values.iter().all(Cell::is_empty) {
            continue;
        }
        values.resize(table.columns.len(), Cell::Empty);
        table.rows.push(MessageRow::new(index, values));
    }
    Ok(table)
}

fn parse_index(cell: &Cell) -> Option<usize> {
    match cell {
        Cell::Int(i) if *i >= 0 => Some(*i as usize),
        Cell::Float(v) if *v >= 0.0 && v.fract() == 0.0 => Some(*v as usize),
        Cell::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Spreadsheets
// ---------------------------------------------------------------------------

fn cell_from_data(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::Text(other.to_string()),
    }
}

fn load_spreadsheet(path: &Path) -> Result<MessageTable> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CleanerError::EmptyTable(path.display().to_string()))??;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(first) => first.iter().map(|c| cell_from_data(c).to_string()).collect(),
        None => return Err(CleanerError::EmptyTable(path.display().to_string())),
    };
    let data = rows.map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>());
    assemble(path, header, data)
}

fn save_spreadsheet(table: &MessageTable, path: &Path) -> Result<()> {
    if table.len() + 1 > MAX_SHEET_ROWS || table.columns.len() + 1 > MAX_SHEET_COLUMNS {
        return Err(CleanerError::Pipeline(format!(
            "{} rows x {} columns does not fit in a worksheet",
            table.len(),
            table.columns.len()
        )));
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    // Column 0 holds the row index under an empty header
    for (c, name) in table.columns.iter().enumerate() {
        sheet.write_string(0, (c + 1) as u16, name.as_str())?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let sheet_row = (r + 1) as u32;
        sheet.write_number(sheet_row, 0, row.index as f64)?;
        for (c, value) in row.values.iter().enumerate() {
            let sheet_col = (c + 1) as u16;
            match value {
                Cell::Empty => {}
                Cell::Text(s) => {
                    let text = clip_cell_text(s);
                    if text.len() < s.len() {
                        warn!(
                            "Row {} column '{}': text clipped to {} characters in {}",
                            row.index,
                            table.columns.get(c).map(String::as_str).unwrap_or(""),
                            MAX_CELL_CHARS,
                            path.display()
                        );
                    }
                    sheet.write_string(sheet_row, sheet_col, text)?;
                }
                Cell::Int(i) => {
                    sheet.write_number(sheet_row, sheet_col, *i as f64)?;
                }
                Cell::Float(f) => {
                    sheet.write_number(sheet_row, sheet_col, *f)?;
                }
                Cell::Bool(b) => {
                    sheet.write_boolean(sheet_row, sheet_col, *b)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Longest prefix of `s` a worksheet cell accepts
fn clip_cell_text(s: &str) -> &str {
    match s.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<MessageTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut data = Vec::new();
    for record in reader.records() {
        let record = record?;
        data.push(record.iter().map(Cell::from).collect::<Vec<_>>());
    }
    assemble(path, header, data)
}

fn save_csv(table: &MessageTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push(String::new());
    header.extend(table.columns.iter().cloned());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.index.to_string());
        record.extend(row.values.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_table() -> MessageTable {
        MessageTable::from_text_rows(
            &["ID", "conversationID", "toRecipient", "body"],
            &[
                vec!["10", "7", "LIBRARIAN", "Hello, how can I help?"],
                vec!["11", "7", "PATRON", "Looking for \"Moby Dick\", 2nd ed."],
            ],
        )
    }

    #[test]
    fn test_format_dispatch_by_extension() {
        assert_eq!(TableFormat::from_path(Path::new("a/b.XLSX")).unwrap(), TableFormat::Xlsx);
        assert_eq!(TableFormat::from_path(Path::new("b.csv")).unwrap(), TableFormat::Csv);
        assert!(matches!(
            TableFormat::from_path(Path::new("b.parquet")),
            Err(CleanerError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_csv_snapshot_keeps_row_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.csv");

        let mut table = sample_table();
        table.rows[0].index = 42;
        save_table(&table, &path).unwrap();

        let loaded = load_table(&path).unwrap();
        assert_eq!(loaded.columns, table.columns);
        assert_eq!(loaded.rows[0].index, 42);
        assert_eq!(loaded.rows[1].index, 1);
        assert_eq!(loaded.text(1, 3), "Looking for \"Moby Dick\", 2nd ed.");
    }

    #[test]
    fn test_spreadsheet_snapshot_keeps_row_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.xlsx");

        let mut table = sample_table();
        table.rows[1].index = 99;
        save_table(&table, &path).unwrap();

        let loaded = load_table(&path).unwrap();
        assert_eq!(loaded.columns, table.columns);
        assert_eq!(loaded.rows[0].index, 0);
        assert_eq!(loaded.rows[1].index, 99);
        assert_eq!(loaded.text(0, 3), "Hello, how can I help?");
        assert_eq!(loaded.text(1, 1), "7");
    }

    #[test]
    fn test_csv_without_index_column_is_labelled_by_position() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "conversationID,toRecipient,body\n1,PATRON,hi\n1,LIBRARIAN,hello\n").unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.columns, vec!["conversationID", "toRecipient", "body"]);
        assert_eq!(table.rows.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_oversized_text_is_clipped_only_in_spreadsheets() {
        let dir = tempdir().unwrap();
        let long_body = "é".repeat(40_000);
        let table = MessageTable::from_text_rows(
            &["conversationID", "toRecipient", "body"],
            &[vec!["1", "PATRON", long_body.as_str()]],
        );

        let xlsx = dir.path().join("long.xlsx");
        save_table(&table, &xlsx).unwrap();
        let loaded = load_table(&xlsx).unwrap();
        assert_eq!(loaded.text(0, 2).chars().count(), MAX_CELL_CHARS);
        assert_eq!(table.text(0, 2).chars().count(), 40_000);

        let csv = dir.path().join("long.csv");
        save_table(&table, &csv).unwrap();
        assert_eq!(load_table(&csv).unwrap().text(0, 2), long_body);
    }

    #[test]
    fn test_empty_csv_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(load_table(&path), Err(CleanerError::EmptyTable(_))));
    }
}
