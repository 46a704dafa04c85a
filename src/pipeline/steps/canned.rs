use std::collections::HashSet;

use tracing::{debug, info};

use super::PipelineStep;
use crate::error::Result;
use crate::table::{is_librarian, MessageTable};

/// Drops librarian-side messages whose trimmed body is a canned response
pub struct RemoveCannedStep {
    canned: HashSet<String>,
}

impl RemoveCannedStep {
    pub fn new(canned: HashSet<String>) -> Self {
        Self { canned }
    }
}

impl PipelineStep for RemoveCannedStep {
    fn step_name(&self) -> &'static str {
        "remove_canned_messages"
    }

    fn snapshot_label(&self) -> String {
        "without_canned".to_string()
    }

    fn apply(&self, mut table: MessageTable) -> Result<MessageTable> {
        info!("Removing canned messages...");
        let cols = table.message_columns()?;
        debug!("Matching against {} canned messages", self.canned.len());

        table.retain(|row| {
            !(is_librarian(row, cols.to_recipient)
                && self.canned.contains(row.get(cols.body).as_text().trim()))
        });
        Ok(table)
    }
}
