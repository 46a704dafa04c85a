//! Row-oriented message table shared by every pipeline step.
//!
//! The table keeps the column order of the source file and labels each row
//! with a stable index, so a snapshot written after any step can be loaded
//! again and still refer to the same messages.

pub mod io;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::constants::{BODY_COLUMN, CONVERSATION_ID_COLUMN, LIBRARIAN, TO_RECIPIENT_COLUMN};
use crate::error::{CleanerError, Result};

pub use io::{load_table, save_table, TableFormat};

/// A single cell value as read from a spreadsheet or CSV file
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text view of the cell; numbers are rendered the way `Display` does
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Empty => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(i) => write!(f, "{i}"),
            // Spreadsheet readers hand integral ids back as floats
            Cell::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// One message, labelled with its row index in the source export
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub index: usize,
    pub values: Vec<Cell>,
}

impl MessageRow {
    pub fn new(index: usize, values: Vec<Cell>) -> Self {
        Self { index, values }
    }

    pub fn get(&self, col: usize) -> &Cell {
        self.values.get(col).unwrap_or(&EMPTY_CELL)
    }
}

/// Positions of the columns every cleaning step relies on
#[derive(Debug, Clone, Copy)]
pub struct MessageColumns {
    pub conversation_id: usize,
    pub to_recipient: usize,
    pub body: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageTable {
    pub columns: Vec<String>,
    pub rows: Vec<MessageRow>,
}

impl MessageTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from rows of text, labelling rows 0..n
    pub fn from_text_rows<S: AsRef<str>>(columns: &[&str], rows: &[Vec<S>]) -> Self {
        let mut table = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for (i, row) in rows.iter().enumerate() {
            let values = row.iter().map(|v| Cell::from(v.as_ref())).collect();
            table.rows.push(MessageRow::new(i, values));
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| CleanerError::MissingColumn(name.to_string()))
    }

    pub fn message_columns(&self) -> Result<MessageColumns> {
        Ok(MessageColumns {
            conversation_id: self.require_column(CONVERSATION_ID_COLUMN)?,
            to_recipient: self.require_column(TO_RECIPIENT_COLUMN)?,
            body: self.require_column(BODY_COLUMN)?,
        })
    }

    pub fn body_column(&self) -> Result<usize> {
        self.require_column(BODY_COLUMN)
    }

    pub fn text(&self, row: usize, col: usize) -> Cow<'_, str> {
        self.rows[row].get(col).as_text()
    }

    /// Keep only the rows for which `keep` returns true, preserving order
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&MessageRow) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Apply `f` to the text of one column in every row
    pub fn map_text<F>(&mut self, col: usize, mut f: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        for row in &mut self.rows {
            if row.values.len() <= col {
                row.values.resize(col + 1, Cell::Empty);
            }
            let replaced = f(&row.values[col].as_text());
            if let Some(new_text) = replaced {
                row.values[col] = Cell::from(new_text);
            }
        }
    }

    /// Number of rows per non-empty value of `col`
    pub fn group_sizes(&self, col: usize) -> HashMap<String, usize> {
        let mut sizes = HashMap::new();
        for row in &self.rows {
            let cell = row.get(col);
            if cell.is_empty() {
                continue;
            }
            *sizes.entry(cell.to_string()).or_insert(0) += 1;
        }
        sizes
    }
}

/// A message is librarian-side when it is addressed to the librarian queue
pub fn is_librarian(row: &MessageRow, to_recipient_col: usize) -> bool {
    row.get(to_recipient_col).as_text() == LIBRARIAN
}
