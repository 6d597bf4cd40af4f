//! @ai:module:intent CLI entry point for the strata CSV reader
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on parser, config, output

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use strata::{output, parser, Field, FileSource, OutputFormat, ParserConfig};

#[derive(Parser)]
#[command(name = "strata")]
#[command(author, version, about = "Read naive CSV files and report failures with full context")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and print every field
    Parse {
        /// Path to the CSV file
        #[arg(default_value = "data/table.csv")]
        path: PathBuf,

        /// Path to a TOML parser configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,

        /// Print the whole cause chain of a failure
        #[arg(long, short)]
        verbose: bool,
    },

    /// Write the default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "strata.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("strata=warn")),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Parse {
            path,
            config,
            format,
            verbose,
        } => run_parse(path, config, format.into(), verbose),
        Commands::Init { output } => init_config(output),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// @ai:intent Parse one file; a parse failure is reported, not propagated
/// @ai:effects fs:read, io:stdout, io:stderr
fn run_parse(
    path: PathBuf,
    config_path: Option<PathBuf>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<ExitCode> {
    let config = match config_path {
        Some(p) => ParserConfig::load(&p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => ParserConfig::default(),
    };

    let source = FileSource::new(path);
    let streaming = matches!(format, OutputFormat::Text);
    let mut fields = Vec::new();

    let result = parser::parse(&source, &config, |row: usize, column: usize, value: &str| {
        if streaming {
            println!("[{}][{}]: {}", row, column, value);
        } else {
            fields.push(Field {
                row,
                column,
                value: value.to_string(),
            });
        }
    });

    match result {
        Ok(summary) => {
            if !streaming {
                println!("{}", output::format_fields(&fields, format)?);
            }
            tracing::debug!("{} records, {} fields", summary.records, summary.fields);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!("Parse failed: {:?}", e);
            let rendered = output::format_error(&e, format, verbose)?;
            match format {
                OutputFormat::Text => eprintln!("{}", rendered),
                OutputFormat::Json | OutputFormat::JsonPretty => println!("{}", rendered),
            }
            Ok(ExitCode::from(1))
        }
    }
}

/// @ai:intent Write the default parser configuration as TOML
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> anyhow::Result<ExitCode> {
    ParserConfig::default()
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote default configuration to {}", output.display());
    Ok(ExitCode::SUCCESS)
}
