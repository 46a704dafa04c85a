//! Lookup lists maintained by the reference-desk staff: canned librarian
//! responses and blacklisted message patterns.

use std::collections::HashSet;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use tracing::{debug, info};

use crate::constants::{BLACKLISTED_COLUMN, CANNED_MESSAGE_COLUMN};
use crate::error::{CleanerError, Result};
use crate::table::{load_table, MessageTable};

/// Trimmed, non-empty values of one column
fn column_values(table: &MessageTable, column: &str) -> Result<Vec<String>> {
    let col = table.require_column(column)?;
    Ok(table
        .rows
        .iter()
        .map(|row| row.get(col).as_text().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect())
}

/// Load the set of canned librarian responses
pub fn load_canned_messages(path: &Path) -> Result<HashSet<String>> {
    info!("Loading canned messages from '{}'...", path.display());
    let table = load_table(path)?;
    let canned: HashSet<String> = column_values(&table, CANNED_MESSAGE_COLUMN)?
        .into_iter()
        .collect();
    debug!("Loaded {} canned messages", canned.len());
    Ok(canned)
}

/// Case-insensitive patterns; a body is blacklisted when any of them is found in it
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    patterns: Vec<Regex>,
}

impl Blacklist {
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| compile_search_pattern(p.as_ref().trim()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_match(&self, body: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(body))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Compile a user-supplied pattern for case-insensitive search
pub fn compile_search_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| CleanerError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

pub fn load_blacklist(path: &Path) -> Result<Blacklist> {
    info!("Loading blacklist from '{}'...", path.display());
    let table = load_table(path)?;
    let blacklist = Blacklist::from_patterns(column_values(&table, BLACKLISTED_COLUMN)?)?;
    debug!("Loaded {} blacklist patterns", blacklist.len());
    Ok(blacklist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_blacklist_is_case_insensitive_search() {
        let blacklist = Blacklist::from_patterns(["  are you (still )?there\\?  ", "^test$"]).unwrap();
        assert!(blacklist.is_match("Hello, ARE YOU THERE?"));
        assert!(blacklist.is_match("are you still there?"));
        assert!(blacklist.is_match("TEST"));
        assert!(!blacklist.is_match("a test message"));
    }

    #[test]
    fn test_invalid_blacklist_pattern_names_the_pattern() {
        let err = Blacklist::from_patterns(["ok", "(unclosed"]).unwrap_err();
        match err {
            CleanerError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_load_canned_messages_trims_and_skips_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("canned.csv");
        std::fs::write(
            &path,
            "cannedMessage\n\"  Thank you for using Ask a Librarian.  \"\n\n\"Please hold.\"\n",
        )
        .unwrap();

        let canned = load_canned_messages(&path).unwrap();
        assert_eq!(canned.len(), 2);
        assert!(canned.contains("Thank you for using Ask a Librarian."));
        assert!(canned.contains("Please hold."));
    }

    #[test]
    fn test_load_blacklist_requires_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blacklist.csv");
        std::fs::write(&path, "pattern\nfoo\n").unwrap();
        assert!(matches!(load_blacklist(&path), Err(CleanerError::MissingColumn(_))));
    }
}
