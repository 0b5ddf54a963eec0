//! `skuforge` — replay a variant editing scenario and print the result.

mod render;
mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use skuforge_observability::LogFormat;
use skuforge_variants::{EngineConfig, InMemorySink, VariantError};

use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Aligned table of the combination set.
    Table,
    /// Submission payload as JSON.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "skuforge", version, about = "Replay a variant editing scenario")]
struct CliArgs {
    #[arg(value_name = "SCENARIO", help = "Path to a JSON scenario file")]
    scenario: PathBuf,

    #[arg(
        long,
        value_name = "N",
        help = "Characters kept per option value in synthesized SKUs [env: SKUFORGE_SKU_SEGMENT_LEN]"
    )]
    sku_segment_len: Option<usize>,

    #[arg(
        long,
        value_name = "CHAR",
        help = "Separator between SKU segments [env: SKUFORGE_SKU_SEPARATOR]"
    )]
    sku_separator: Option<char>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    #[arg(
        long,
        env = "SKUFORGE_LOG_FORMAT",
        value_name = "FORMAT",
        default_value = "json",
        help = "Log output on stderr (json or pretty)"
    )]
    log_format: LogFormat,
}

impl CliArgs {
    /// Environment first, explicit flags win.
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::from_env();
        if let Some(len) = self.sku_segment_len {
            config.sku_segment_len = len;
        }
        if let Some(separator) = self.sku_separator {
            config.separator = separator;
        }
        config
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    skuforge_observability::init(args.log_format);

    let scenario = Scenario::load(&args.scenario)?;
    let replay = scenario
        .replay(args.engine_config())
        .with_context(|| format!("replaying {}", args.scenario.display()))?;
    tracing::debug!(
        steps = scenario.steps.len(),
        rejected = replay.rejected.len(),
        "scenario replayed"
    );

    match args.output {
        OutputFormat::Table => {
            print!("{}", render::table(replay.editor.combinations()));
            for notice in &replay.notices {
                println!("note: {notice}");
            }
            for error in replay.editor.validation_errors() {
                println!("invalid: {error}");
            }
        }
        OutputFormat::Json => {
            if let Ok(payload) = replay.editor.submission() {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        }
    }

    let mut sink = InMemorySink::new();
    match replay.editor.submit(&mut sink) {
        Ok(count) => {
            tracing::info!(variants = count, "scenario accepted");
            Ok(())
        }
        Err(VariantError::SubmissionBlocked { errors }) => {
            anyhow::bail!("submission blocked by {} invalid field(s)", errors.len())
        }
        Err(err) => Err(err.into()),
    }
}
