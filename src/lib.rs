pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod metrics;
pub mod pipeline;
pub mod search;
pub mod table;

pub use config::Config;
pub use error::{CleanerError, Result};
pub use pipeline::{Pipeline, PipelineResult};
pub use table::{load_table, save_table, MessageTable};
