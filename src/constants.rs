//! Column and value constants shared by the loaders and the cleaning steps.
//! Names match the headers of the reference-desk export.

// Message table columns
pub const CONVERSATION_ID_COLUMN: &str = "conversationID";
pub const TO_RECIPIENT_COLUMN: &str = "toRecipient";
pub const BODY_COLUMN: &str = "body";
pub const ID_COLUMN: &str = "ID";

// Lookup workbook columns
pub const CANNED_MESSAGE_COLUMN: &str = "cannedMessage";
pub const BLACKLISTED_COLUMN: &str = "blackListed";

/// `toRecipient` value that marks a librarian-side message
pub const LIBRARIAN: &str = "LIBRARIAN";

// Placeholders written by the masking steps
pub const LINK_PLACEHOLDER: &str = "LINK_REPLACE";
pub const EMAIL_PLACEHOLDER: &str = "EMAIL_ADDRESS";

/// Sheet name used for every spreadsheet snapshot
pub const SHEET_NAME: &str = "sheet1";

// Default locations, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "cleaner.toml";
pub const DEFAULT_INPUT_PATH: &str = "data/raw/chats.xlsx";
pub const DEFAULT_OUTPUT_DIR: &str = "data/processed";
pub const DEFAULT_CANNED_PATH: &str = "data/lookup/canned_msgs.xlsx";
pub const DEFAULT_BLACKLIST_PATH: &str = "data/lookup/blacklist.xlsx";

pub const DEFAULT_SAMPLE_SIZE: usize = 2700;
/// Conversations with this many messages or fewer are dropped as too short
pub const DEFAULT_MAX_SHORT_MESSAGES: usize = 6;

pub const MANIFEST_FILE: &str = "run_manifest.json";
pub const METRICS_FILE: &str = "metrics.prom";

// Environment overrides
pub const ENV_INPUT: &str = "CHAT_CLEANER_INPUT";
pub const ENV_OUTPUT_DIR: &str = "CHAT_CLEANER_OUTPUT_DIR";
pub const ENV_SAMPLE_SIZE: &str = "CHAT_CLEANER_SAMPLE_SIZE";
pub const ENV_SEED: &str = "CHAT_CLEANER_SEED";
