use crate::config::Config;
use crate::error::Result;
use crate::lookup;
use crate::pipeline::pipeline_config::StepConfig;
use crate::table::MessageTable;

/// Common trait for all cleaning steps
pub trait PipelineStep: Send + Sync {
    /// Get the name of this pipeline step
    fn step_name(&self) -> &'static str;

    /// File stem fragment for the snapshot written after this step
    fn snapshot_label(&self) -> String;

    /// Transform the table; rows that are dropped are gone for every later step
    fn apply(&self, table: MessageTable) -> Result<MessageTable>;
}

// Re-export all pipeline steps
pub mod blacklist;
pub mod canned;
pub mod emails;
pub mod html_entities;
pub mod librarians;
pub mod link_only;
pub mod links;
pub mod operator_chats;
pub mod sampling;
pub mod short_chats;

pub use blacklist::RemoveBlacklistedStep;
pub use canned::RemoveCannedStep;
pub use emails::MaskEmailsStep;
pub use html_entities::DecodeHtmlEntitiesStep;
pub use librarians::RemoveLibrarianMessagesStep;
pub use link_only::RemoveLinkOnlyStep;
pub use links::{LinkKind, MaskLinksStep};
pub use operator_chats::RemoveOperatorChatsStep;
pub use sampling::{BalancedSampleStep, RandomSampleStep};
pub use short_chats::RemoveShortChatsStep;

/// Instantiate a step. Lookup files are read here so that a bad path or
/// pattern fails the run before any snapshot is written.
pub fn build_step(step: &StepConfig, config: &Config, seed: u64) -> Result<Box<dyn PipelineStep>> {
    let built: Box<dyn PipelineStep> = match step {
        StepConfig::RemoveOperatorChats => Box::new(RemoveOperatorChatsStep),
        StepConfig::RemoveShortChats { max_messages } => {
            Box::new(RemoveShortChatsStep::new(*max_messages))
        }
        StepConfig::DecodeHtmlEntities => Box::new(DecodeHtmlEntitiesStep),
        StepConfig::RemoveCannedMessages => {
            let canned = lookup::load_canned_messages(&config.paths.canned_messages)?;
            Box::new(RemoveCannedStep::new(canned))
        }
        StepConfig::MaskLinks { kind } => Box::new(MaskLinksStep::new(*kind)),
        StepConfig::MaskEmails => Box::new(MaskEmailsStep),
        StepConfig::RemoveLinkOnlyMessages => Box::new(RemoveLinkOnlyStep),
        StepConfig::RemoveBlacklisted => {
            let blacklist = lookup::load_blacklist(&config.paths.blacklist)?;
            Box::new(RemoveBlacklistedStep::new(blacklist))
        }
        StepConfig::RemoveLibrarianMessages => Box::new(RemoveLibrarianMessagesStep),
        StepConfig::RandomSample { size } => Box::new(RandomSampleStep::new(*size, seed)),
        StepConfig::BalancedSample { size } => Box::new(BalancedSampleStep::new(*size, seed)),
    };
    Ok(built)
}
