mod logging;
mod source;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;

use seedwright_core::{Error as CoreError, SchemaGraph, SkippedEdge};
use seedwright_generate::{
    GenerationConfig, GenerationError, GenerationOptions, PostgresTransport, TransportError,
    analyze, execute_mock_data_generation, generate_mock_data,
};

use logging::init_logging;
use source::{SchemaArgs, detect_engine, open_source};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("run failed: {0}")]
    RunFailed(String),
}

#[derive(Parser, Debug)]
#[command(name = "seedwright", version, about = "Seedwright synthetic data CLI")]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print tables, dependencies and insertion order.
    Analyze(SchemaArgs),
    /// Generate data without writing it.
    Preview(PreviewArgs),
    /// Generate data and insert it, one transaction per table.
    Seed(SeedArgs),
    /// Print the JSON Schema of the generation config file.
    ConfigSchema,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Generation config (.toml or .json).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Run seed; drawn at random and reported when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Records per table when the config sets none.
    #[arg(long)]
    count: Option<usize>,
    /// Probability that a nullable column is NULL.
    #[arg(long, default_value_t = seedwright_generate::model::DEFAULT_NULL_PROBABILITY)]
    null_probability: f64,
}

impl GenerateArgs {
    fn load(&self) -> Result<(GenerationConfig, GenerationOptions), CliError> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::load(path)?,
            None => GenerationConfig::default(),
        };
        if self.count.is_some() {
            config.default_count = self.count;
        }

        if !(0.0..=1.0).contains(&self.null_probability) {
            return Err(CliError::InvalidConfig(format!(
                "--null-probability must be within [0, 1], got {}",
                self.null_probability
            )));
        }

        let options = GenerationOptions {
            seed: self.seed,
            null_probability: self.null_probability,
            ..GenerationOptions::default()
        };
        Ok((config, options))
    }
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    #[command(flatten)]
    generate: GenerateArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = PreviewFormat::Json)]
    format: PreviewFormat,
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum PreviewFormat {
    Json,
    Sql,
}

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    #[serde(flatten)]
    graph: &'a SchemaGraph,
    insertion_order: Vec<String>,
    skipped_edges: Vec<SkippedEdge>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;

    match cli.command {
        Command::Analyze(args) => run_analyze(args).await,
        Command::Preview(args) => run_preview(args).await,
        Command::Seed(args) => run_seed(args).await,
        Command::ConfigSchema => print_json(&schemars::schema_for!(GenerationConfig)),
    }
}

async fn run_analyze(args: SchemaArgs) -> Result<(), CliError> {
    let source = open_source(&args).await?;
    tracing::info!(event = "analyze_started", engine = %source.engine());

    let graph = analyze(source.as_ref()).await?;
    let ordering = graph.ordering();
    tracing::info!(
        event = "analyze_finished",
        tables = graph.len(),
        skipped_edges = ordering.skipped_edges.len()
    );

    print_json(&AnalyzeOutput {
        graph: &graph,
        insertion_order: ordering.tables,
        skipped_edges: ordering.skipped_edges,
    })
}

async fn run_preview(args: PreviewArgs) -> Result<(), CliError> {
    let (config, options) = args.generate.load()?;
    let source = open_source(&args.schema).await?;
    tracing::info!(event = "preview_started", engine = %source.engine());

    let data = generate_mock_data(source.as_ref(), &config, &options).await?;
    tracing::info!(
        event = "preview_finished",
        seed = data.summary.seed,
        records = data.summary.total_records
    );

    match args.format {
        PreviewFormat::Json => print_json(&data),
        PreviewFormat::Sql => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "-- seed: {}", data.summary.seed)?;
            for query in &data.queries {
                writeln!(stdout, "{query}")?;
            }
            Ok(())
        }
    }
}

async fn run_seed(args: SeedArgs) -> Result<(), CliError> {
    let Some(conn) = args.schema.conn.as_deref() else {
        return Err(CliError::InvalidConfig(
            "seed requires --conn; --schema-file is only for analyze and preview".to_string(),
        ));
    };
    if args.schema.schema_file.is_some() {
        return Err(CliError::InvalidConfig(
            "use either --conn or --schema-file".to_string(),
        ));
    }
    let engine = detect_engine(conn)?;
    let (config, options) = args.generate.load()?;

    let timer = Instant::now();
    let source = open_source(&args.schema).await?;
    let mut transport = PostgresTransport::connect(conn).await?;
    transport.set_search_path(&args.schema.schema).await?;
    tracing::info!(event = "run_started", engine = %engine);

    let report =
        execute_mock_data_generation(source.as_ref(), &mut transport, &config, &options).await;
    if let Err(err) = transport.close().await {
        tracing::warn!(event = "close_failed", error = %err);
    }

    tracing::info!(
        event = "run_finished",
        run_id = %report.run_id,
        success = report.success,
        duration_ms = timer.elapsed().as_millis() as u64
    );
    print_json(&report)?;

    if report.success {
        Ok(())
    } else {
        Err(CliError::RunFailed(
            report.error.unwrap_or(report.message),
        ))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
