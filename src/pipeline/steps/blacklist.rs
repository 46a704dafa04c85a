use tracing::{debug, info};

use super::PipelineStep;
use crate::error::Result;
use crate::lookup::Blacklist;
use crate::table::MessageTable;

/// Drops messages matching any blacklist pattern
pub struct RemoveBlacklistedStep {
    blacklist: Blacklist,
}

impl RemoveBlacklistedStep {
    pub fn new(blacklist: Blacklist) -> Self {
        Self { blacklist }
    }
}

impl PipelineStep for RemoveBlacklistedStep {
    fn step_name(&self) -> &'static str {
        "remove_blacklisted"
    }

    fn snapshot_label(&self) -> String {
        "removed_blacklisted".to_string()
    }

    fn apply(&self, mut table: MessageTable) -> Result<MessageTable> {
        info!("Removing blacklisted messages...");
        let body = table.body_column()?;
        let before = table.len();
        table.retain(|row| !self.blacklist.is_match(&row.get(body).as_text()));
        debug!("{} messages matched the blacklist", before - table.len());
        Ok(table)
    }
}
