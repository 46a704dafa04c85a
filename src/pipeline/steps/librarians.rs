use tracing::info;

use super::PipelineStep;
use crate::error::Result;
use crate::table::{is_librarian, MessageTable};

/// Keeps patron-side messages only
pub struct RemoveLibrarianMessagesStep;

impl PipelineStep for RemoveLibrarianMessagesStep {
    fn step_name(&self) -> &'static str {
        "remove_librarian_messages"
    }

    fn snapshot_label(&self) -> String {
        "patron_messages".to_string()
    }

    fn apply(&self, mut table: MessageTable) -> Result<MessageTable> {
        info!("Removing librarian messages...");
        let to_recipient = table.message_columns()?.to_recipient;
        table.retain(|row| !is_librarian(row, to_recipient));
        Ok(table)
    }
}
