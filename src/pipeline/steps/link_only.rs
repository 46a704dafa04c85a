use tracing::info;

use super::PipelineStep;
use crate::constants::{EMAIL_PLACEHOLDER, LINK_PLACEHOLDER};
use crate::error::Result;
use crate::table::MessageTable;

/// True when the body still has text once placeholders are removed
pub fn has_text_besides_links(body: &str) -> bool {
    !body
        .replace(LINK_PLACEHOLDER, "")
        .replace(EMAIL_PLACEHOLDER, "")
        .trim()
        .is_empty()
}

/// Drops messages that consist only of masked links and addresses
pub struct RemoveLinkOnlyStep;

impl PipelineStep for RemoveLinkOnlyStep {
    fn step_name(&self) -> &'static str {
        "remove_link_only_messages"
    }

    fn snapshot_label(&self) -> String {
        "removed_link_msgs".to_string()
    }

    fn apply(&self, mut table: MessageTable) -> Result<MessageTable> {
        info!("Removing link-messages...");
        let body = table.body_column()?;
        table.retain(|row| has_text_besides_links(&row.get(body).as_text()));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_only_bodies() {
        assert!(!has_text_besides_links("LINK_REPLACE"));
        assert!(!has_text_besides_links("  LINK_REPLACE \n EMAIL_ADDRESS "));
        assert!(!has_text_besides_links(""));
        assert!(has_text_besides_links("see LINK_REPLACE"));
    }

    #[test]
    fn test_step_drops_link_only_rows() {
        let table = MessageTable::from_text_rows(
            &["conversationID", "body"],
            &[
                vec!["1", "LINK_REPLACE"],
                vec!["1", "here you go: LINK_REPLACE"],
                vec!["1", ""],
                vec!["1", "EMAIL_ADDRESS LINK_REPLACE"],
            ],
        );
        let out = RemoveLinkOnlyStep.apply(table).unwrap();
        assert_eq!(out.rows.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1]);
    }
}
