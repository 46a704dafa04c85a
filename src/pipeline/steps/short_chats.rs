use tracing::info;

use super::PipelineStep;
use crate::constants::DEFAULT_MAX_SHORT_MESSAGES;
use crate::error::Result;
use crate::table::MessageTable;

/// Drops conversations with `max_messages` messages or fewer
pub struct RemoveShortChatsStep {
    max_messages: usize,
}

impl RemoveShortChatsStep {
    pub fn new(max_messages: usize) -> Self {
        Self { max_messages }
    }
}

impl Default for RemoveShortChatsStep {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SHORT_MESSAGES)
    }
}

impl PipelineStep for RemoveShortChatsStep {
    fn step_name(&self) -> &'static str {
        "remove_short_chats"
    }

    fn snapshot_label(&self) -> String {
        "long_chats".to_string()
    }

    fn apply(&self, mut table: MessageTable) -> Result<MessageTable> {
        info!("Removing short chats...");
        let conversation_col = table.message_columns()?.conversation_id;
        let sizes = table.group_sizes(conversation_col);

        // Rows without a conversation id have no size and are dropped
        let max_messages = self.max_messages;
        table.retain(|row| {
            let cell = row.get(conversation_col);
            !cell.is_empty()
                && sizes
                    .get(cell.to_string().as_str())
                    .is_some_and(|count| *count > max_messages)
        });
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(id: &str, messages: usize) -> Vec<Vec<String>> {
        (0..messages)
            .map(|i| vec![id.to_string(), "PATRON".to_string(), format!("message {i}")])
            .collect()
    }

    #[test]
    fn test_keeps_conversations_longer_than_six() {
        let mut rows = conversation("short", 6);
        rows.extend(conversation("long", 7));
        rows.push(vec![String::new(), "PATRON".into(), "no conversation".into()]);
        let table = MessageTable::from_text_rows(&["conversationID", "toRecipient", "body"], &rows);

        let out = RemoveShortChatsStep::default().apply(table).unwrap();
        assert_eq!(out.len(), 7);
        assert!(out.rows.iter().all(|r| r.get(0).as_text() == "long"));
    }

    #[test]
    fn test_custom_threshold() {
        let table = MessageTable::from_text_rows(
            &["conversationID", "toRecipient", "body"],
            &conversation("a", 3),
        );
        assert_eq!(RemoveShortChatsStep::new(2).apply(table.clone()).unwrap().len(), 3);
        assert!(RemoveShortChatsStep::new(3).apply(table).unwrap().is_empty());
    }
}
