//! Ad-hoc inspection helpers for snapshots: regex search over message bodies
//! and a short preview of the first rows.

use crate::constants::{CONVERSATION_ID_COLUMN, ID_COLUMN};
use crate::error::Result;
use crate::lookup::compile_search_pattern;
use crate::table::MessageTable;

const PREVIEW_BODY_CHARS: usize = 80;

/// Case-insensitive search for `pattern` anywhere in `text`, optionally negated
pub fn regex_search(pattern: &str, text: &str, negate: bool) -> Result<bool> {
    let found = compile_search_pattern(pattern)?.is_match(text);
    Ok(found != negate)
}

/// One flag per row: whether its body matches (or, negated, does not match)
pub fn search_mask(table: &MessageTable, pattern: &str, negate: bool) -> Result<Vec<bool>> {
    let re = compile_search_pattern(pattern)?;
    let body = table.body_column()?;
    Ok(table
        .rows
        .iter()
        .map(|row| re.is_match(&row.get(body).as_text()) != negate)
        .collect())
}

/// Rows of `table` selected by `mask`
pub fn filter_by_mask(table: &MessageTable, mask: &[bool]) -> MessageTable {
    let mut out = MessageTable::new(table.columns.clone());
    out.rows = table
        .rows
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(row, _)| row.clone())
        .collect();
    out
}

/// First `n` rows as `index | ID | conversationID | body` lines
pub fn preview(table: &MessageTable, n: usize) -> Result<Vec<String>> {
    let body = table.body_column()?;
    let id = table.column_index(ID_COLUMN);
    let conversation = table.column_index(CONVERSATION_ID_COLUMN);

    Ok(table
        .rows
        .iter()
        .take(n)
        .map(|row| {
            let text = row.get(body).as_text().replace('\n', " ");
            let clipped: String = text.chars().take(PREVIEW_BODY_CHARS).collect();
            let ellipsis = if text.chars().count() > PREVIEW_BODY_CHARS { "..." } else { "" };
            format!(
                "{:>6} | {:>8} | {:>8} | {}{}",
                row.index,
                id.map(|c| row.get(c).to_string()).unwrap_or_default(),
                conversation.map(|c| row.get(c).to_string()).unwrap_or_default(),
                clipped,
                ellipsis
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MessageTable {
        MessageTable::from_text_rows(
            &["ID", "conversationID", "body"],
            &[
                vec!["1", "10", "Do you have the NYT archive?"],
                vec!["2", "10", "Yes, via LINK_REPLACE"],
                vec!["3", "11", "thanks"],
            ],
        )
    }

    #[test]
    fn test_regex_search_negation() {
        assert!(regex_search("nyt", "the NYT", false).unwrap());
        assert!(!regex_search("nyt", "the NYT", true).unwrap());
        assert!(regex_search("(bad", "x", false).is_err());
    }

    #[test]
    fn test_mask_and_filter() {
        let t = table();
        let mask = search_mask(&t, "link_replace|thanks", false).unwrap();
        assert_eq!(mask, vec![false, true, true]);
        let filtered = filter_by_mask(&t, &search_mask(&t, "thanks", true).unwrap());
        assert_eq!(filtered.rows.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_preview_limits_rows() {
        let lines = preview(&table(), 2).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Do you have the NYT archive?"));
        assert!(lines[1].contains("10"));
    }
}
