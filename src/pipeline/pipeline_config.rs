use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::DEFAULT_MAX_SHORT_MESSAGES;
use crate::error::{CleanerError, Result};
use crate::pipeline::steps::LinkKind;

/// Configuration for a complete pipeline execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub steps: Vec<StepConfig>,
}

/// Configuration for individual pipeline steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepConfig {
    RemoveOperatorChats,
    RemoveShortChats {
        #[serde(default = "default_max_short_messages")]
        max_messages: usize,
    },
    DecodeHtmlEntities,
    RemoveCannedMessages,
    MaskLinks {
        kind: LinkKind,
    },
    MaskEmails,
    RemoveLinkOnlyMessages,
    RemoveBlacklisted,
    RemoveLibrarianMessages,
    RandomSample {
        size: usize,
    },
    BalancedSample {
        size: usize,
    },
}

fn default_max_short_messages() -> usize {
    DEFAULT_MAX_SHORT_MESSAGES
}

impl PipelineConfig {
    /// The reference-desk cleaning sequence, ending in a balanced sample
    pub fn default_cleaning(sample_size: usize) -> Self {
        Self {
            name: "reference_chat_cleaning".to_string(),
            steps: vec![
                StepConfig::RemoveOperatorChats,
                StepConfig::RemoveShortChats {
                    max_messages: DEFAULT_MAX_SHORT_MESSAGES,
                },
                StepConfig::DecodeHtmlEntities,
                StepConfig::RemoveCannedMessages,
                StepConfig::MaskLinks {
                    kind: LinkKind::Anchor,
                },
                StepConfig::MaskLinks {
                    kind: LinkKind::BareUrl,
                },
                StepConfig::MaskEmails,
                StepConfig::RemoveLinkOnlyMessages,
                StepConfig::RemoveBlacklisted,
                StepConfig::BalancedSample { size: sample_size },
            ],
        }
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(CleanerError::Config(
                "Pipeline must have at least one step".to_string(),
            ));
        }

        let mut seen_steps = HashSet::new();
        let last = self.steps.len() - 1;

        for (position, step) in self.steps.iter().enumerate() {
            let step_name = step.step_name();

            for dep in step.dependencies() {
                if !seen_steps.contains(dep) {
                    return Err(CleanerError::Config(format!(
                        "Step '{}' depends on '{}' which must run earlier in the pipeline",
                        step_name, dep
                    )));
                }
            }

            if step.is_sampling() && position != last {
                return Err(CleanerError::Config(format!(
                    "Sampling step '{}' must be the last step",
                    step_name
                )));
            }

            seen_steps.insert(step_name);
        }

        Ok(())
    }
}

impl StepConfig {
    /// Get the step name for dependency checking
    pub fn step_name(&self) -> &'static str {
        match self {
            StepConfig::RemoveOperatorChats => "remove_operator_chats",
            StepConfig::RemoveShortChats { .. } => "remove_short_chats",
            StepConfig::DecodeHtmlEntities => "decode_html_entities",
            StepConfig::RemoveCannedMessages => "remove_canned_messages",
            StepConfig::MaskLinks {
                kind: LinkKind::Anchor,
            } => "mask_anchor_links",
            StepConfig::MaskLinks {
                kind: LinkKind::BareUrl,
            } => "mask_bare_links",
            StepConfig::MaskEmails => "mask_emails",
            StepConfig::RemoveLinkOnlyMessages => "remove_link_only_messages",
            StepConfig::RemoveBlacklisted => "remove_blacklisted",
            StepConfig::RemoveLibrarianMessages => "remove_librarian_messages",
            StepConfig::RandomSample { .. } => "random_sample",
            StepConfig::BalancedSample { .. } => "balanced_sample",
        }
    }

    /// Get the dependencies for this step
    pub fn dependencies(&self) -> Vec<&'static str> {
        match self {
            // Addresses are recognised by the link placeholder in their domain
            StepConfig::MaskEmails => vec!["mask_anchor_links", "mask_bare_links"],
            StepConfig::RemoveLinkOnlyMessages => vec!["mask_emails"],
            _ => vec![],
        }
    }

    pub fn is_sampling(&self) -> bool {
        matches!(
            self,
            StepConfig::RandomSample { .. } | StepConfig::BalancedSample { .. }
        )
    }
}
