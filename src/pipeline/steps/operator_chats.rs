use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::PipelineStep;
use crate::error::Result;
use crate::table::{is_librarian, MessageTable};

/// Drops conversations in which every message is librarian-side
pub struct RemoveOperatorChatsStep;

impl PipelineStep for RemoveOperatorChatsStep {
    fn step_name(&self) -> &'static str {
        "remove_operator_chats"
    }

    fn snapshot_label(&self) -> String {
        "chats_without_operators".to_string()
    }

    fn apply(&self, mut table: MessageTable) -> Result<MessageTable> {
        info!("Removing operator chats...");
        let cols = table.message_columns()?;

        let message_counts = table.group_sizes(cols.conversation_id);
        let mut librarian_counts: HashMap<String, usize> = HashMap::new();
        for row in table.rows.iter().filter(|r| is_librarian(r, cols.to_recipient)) {
            let cell = row.get(cols.conversation_id);
            if !cell.is_empty() {
                *librarian_counts.entry(cell.to_string()).or_insert(0) += 1;
            }
        }

        let operator_only: HashSet<String> = message_counts
            .into_iter()
            .filter(|(id, total)| librarian_counts.get(id) == Some(total))
            .map(|(id, _)| id)
            .collect();
        debug!("{} operator-only conversations", operator_only.len());

        // Rows without a conversation id never form an operator-only group
        table.retain(|row| {
            let cell = row.get(cols.conversation_id);
            cell.is_empty() || !operator_only.contains(cell.to_string().as_str())
        });
        Ok(table)
    }
}
