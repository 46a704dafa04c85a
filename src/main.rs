use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use chat_cleaner::config::Config;
use chat_cleaner::logging;
use chat_cleaner::metrics;
use chat_cleaner::pipeline::steps::{BalancedSampleStep, PipelineStep, RandomSampleStep};
use chat_cleaner::pipeline::Pipeline;
use chat_cleaner::search;
use chat_cleaner::table::{load_table, save_table, TableFormat};

#[derive(Parser)]
#[command(name = "chat_cleaner")]
#[command(about = "Cleans library reference-desk chat transcripts for sampling and annotation")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (defaults to ./cleaner.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full cleaning pipeline, writing a snapshot after every step
    Run {
        /// Raw message export (.xlsx, .xls, .ods or .csv)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Directory for snapshots, manifest and metrics
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Canned librarian responses workbook
        #[arg(long)]
        canned: Option<PathBuf>,
        /// Blacklisted patterns workbook
        #[arg(long)]
        blacklist: Option<PathBuf>,
        /// Size of the final balanced sample
        #[arg(long)]
        sample_size: Option<usize>,
        /// Seed for the sampling step
        #[arg(long)]
        seed: Option<u64>,
        /// Snapshot format: xlsx or csv
        #[arg(long)]
        format: Option<String>,
    },
    /// List the configured steps and the snapshot each one writes
    Steps,
    /// Draw a random sample from an existing table
    Sample {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        size: usize,
        /// Half librarian-side, half patron-side messages
        #[arg(long)]
        balanced: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Count and preview messages whose body matches a pattern (case-insensitive)
    Search {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        pattern: String,
        /// Select messages that do NOT match
        #[arg(long)]
        negate: bool,
        /// Number of matches to preview
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Also write the matching rows to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the first rows of a table
    Preview {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
}

fn parse_format(value: &str) -> Result<TableFormat> {
    match value.to_ascii_lowercase().as_str() {
        "xlsx" => Ok(TableFormat::Xlsx),
        "csv" => Ok(TableFormat::Csv),
        other => anyhow::bail!("Unknown snapshot format '{other}' (expected xlsx or csv)"),
    }
}

fn run_pipeline(config: &Config) -> Result<()> {
    let pipeline = Pipeline::from_config(config).context("Failed to build pipeline")?;
    let result = pipeline
        .run(&config.paths.input)
        .with_context(|| format!("Cleaning run over {} failed", config.paths.input.display()))?;

    println!("\n📊 Cleaning results ({}):", result.pipeline);
    println!("   Loaded: {} messages", result.rows_loaded);
    for (i, step) in result.steps.iter().enumerate() {
        println!(
            "   {:>2}. {:<28} {:>7} -> {:<7} {}",
            i + 1,
            step.step,
            step.rows_in,
            step.rows_out,
            step.snapshot.display()
        );
    }
    println!("   Final: {} messages (seed {})", result.rows_final, result.seed);
    Ok(())
}

fn print_steps(config: &Config) -> Result<()> {
    let pipeline_config = config.pipeline_config();
    pipeline_config.validate()?;
    println!("Pipeline '{}':", pipeline_config.name);
    for (i, step) in pipeline_config.steps.iter().enumerate() {
        let deps = step.dependencies();
        if deps.is_empty() {
            println!("  {:>2}. {}", i + 1, step.step_name());
        } else {
            println!("  {:>2}. {} (after {})", i + 1, step.step_name(), deps.join(", "));
        }
    }
    Ok(())
}

fn sample_table(input: &Path, output: &Path, size: usize, balanced: bool, seed: Option<u64>) -> Result<()> {
    let seed = seed.unwrap_or_else(rand::random::<u64>);
    let step: Box<dyn PipelineStep> = if balanced {
        Box::new(BalancedSampleStep::new(size, seed))
    } else {
        Box::new(RandomSampleStep::new(size, seed))
    };

    let table = load_table(input)?;
    let sampled = step.apply(table)?;
    save_table(&sampled, output)?;
    println!("✅ Wrote {} sampled messages to {} (seed {})", sampled.len(), output.display(), seed);
    Ok(())
}

fn search_table(input: &Path, pattern: &str, negate: bool, limit: usize, output: Option<&Path>) -> Result<()> {
    let table = load_table(input)?;
    let mask = search::search_mask(&table, pattern, negate)?;
    let matches = search::filter_by_mask(&table, &mask);

    println!("🔎 {} of {} messages selected", matches.len(), table.len());
    for line in search::preview(&matches, limit)? {
        println!("{line}");
    }
    if let Some(path) = output {
        save_table(&matches, path)?;
        println!("💾 Saved matches to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(&cli.log_dir);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let outcome = match cli.command {
        Commands::Run {
            input,
            output_dir,
            canned,
            blacklist,
            sample_size,
            seed,
            format,
        } => {
            if let Some(v) = input {
                config.paths.input = v;
            }
            if let Some(v) = output_dir {
                config.paths.output_dir = v;
            }
            if let Some(v) = canned {
                config.paths.canned_messages = v;
            }
            if let Some(v) = blacklist {
                config.paths.blacklist = v;
            }
            if let Some(v) = sample_size {
                config.sampling.size = v;
            }
            if seed.is_some() {
                config.sampling.seed = seed;
            }
            if let Some(v) = format {
                config.output.format = parse_format(&v)?;
            }

            metrics::init_metrics();
            info!("🚀 Starting cleaning run on {}", config.paths.input.display());
            run_pipeline(&config)
        }
        Commands::Steps => print_steps(&config),
        Commands::Sample {
            input,
            output,
            size,
            balanced,
            seed,
        } => sample_table(&input, &output, size, balanced, seed),
        Commands::Search {
            input,
            pattern,
            negate,
            limit,
            output,
        } => search_table(&input, &pattern, negate, limit, output.as_deref()),
        Commands::Preview { input, rows } => {
            let table = load_table(&input)?;
            println!("{} rows x {} columns", table.len(), table.columns.len());
            for line in search::preview(&table, rows)? {
                println!("{line}");
            }
            Ok(())
        }
    };

    if let Err(e) = &outcome {
        error!("{:#}", e);
    }
    outcome
}
