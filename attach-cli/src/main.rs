//! Attach CLI - Build `$set` update documents from request bodies
//!
//! This binary provides command-line interfaces for:
//! - process: turn a JSON body (or NDJSON stream of bodies) into update documents
//! - check: validate a config file and list the registered processor types

mod config;

use attach_core::seq::type_name;
use attach_core::{AttachmentProcessor, Body, Request, UpdateDocument};
use clap::{ArgAction, Parser, Subcommand};
use config::{AttachmentConfig, CliError};
use serde_json::Value;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "attach")]
#[command(about = "Attachment processing CLI tool")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); overrides RUST_LOG
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build update documents from request bodies
    ///
    /// Examples:
    ///   attach process --config attach.toml body.json
    ///   attach process --config attach.toml --ndjson bodies.ndjson -o updates.ndjson
    ///   cat request.json | attach process --config attach.toml --request
    Process {
        /// Input file (JSON object, or NDJSON with --ndjson). Reads stdin when omitted
        input: Option<PathBuf>,
        /// Config file (TOML)
        #[arg(short, long)]
        config: PathBuf,
        /// Output file. Writes stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override uploads_folder from the config
        #[arg(long)]
        uploads_folder: Option<String>,
        /// Ignore [to_zip] and emit every attachment under its own key
        #[arg(long)]
        no_zip: bool,
        /// Treat input as a request wrapper: {"body": {...}}
        #[arg(long)]
        request: bool,
        /// Treat input as NDJSON, one body per line
        #[arg(long)]
        ndjson: bool,
        /// Pretty-print output (conflicts with --ndjson)
        #[arg(long, conflicts_with = "ndjson")]
        pretty: bool,
    },
    /// Validate a config file
    Check {
        /// Config file (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Process {
            input,
            config,
            output,
            uploads_folder,
            no_zip,
            request,
            ndjson,
            pretty,
        } => {
            let mut config = AttachmentConfig::load(&config)?;
            if let Some(folder) = uploads_folder {
                config.uploads_folder = folder;
            }
            let processor = config.processor(!no_zip)?;
            let opts = ProcessOptions {
                request,
                ndjson,
                pretty,
            };
            handle_process(&processor, input.as_deref(), output.as_deref(), opts)?;
        }
        Commands::Check { config } => {
            handle_check(&config)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug, Clone, Copy)]
struct ProcessOptions {
    request: bool,
    ndjson: bool,
    pretty: bool,
}

fn handle_process(
    processor: &AttachmentProcessor,
    input: Option<&Path>,
    output: Option<&Path>,
    opts: ProcessOptions,
) -> Result<(), Box<dyn Error>> {
    let reader: Box<dyn Read> = match input {
        Some(path) => Box::new(File::open(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        })?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);

    if opts.ndjson {
        let mut documents = 0usize;
        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(&line).map_err(|e| CliError::InvalidInput {
                line: idx + 1,
                reason: e.to_string(),
            })?;
            let doc = process_value(processor, value, opts.request, idx + 1)?;
            serde_json::to_writer(&mut writer, &doc)?;
            writer.write_all(b"\n")?;
            documents += 1;
        }
        tracing::info!(target: "attach::cli", documents, "processed NDJSON input");
    } else {
        let value: Value = serde_json::from_reader(reader).map_err(|e| CliError::InvalidInput {
            line: e.line(),
            reason: e.to_string(),
        })?;
        let doc = process_value(processor, value, opts.request, 1)?;
        if opts.pretty {
            serde_json::to_writer_pretty(&mut writer, &doc)?;
        } else {
            serde_json::to_writer(&mut writer, &doc)?;
        }
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(())
}

fn process_value(
    processor: &AttachmentProcessor,
    value: Value,
    request: bool,
    line: usize,
) -> Result<UpdateDocument, CliError> {
    if request {
        let request: Request =
            serde_json::from_value(value).map_err(|e| CliError::InvalidInput {
                line,
                reason: format!("expected {{\"body\": {{...}}}}: {}", e),
            })?;
        Ok(processor.process_request(&request)?)
    } else {
        let body: Body = match value {
            Value::Object(map) => map,
            other => {
                return Err(CliError::InvalidInput {
                    line,
                    reason: format!("expected a JSON object body, found {}", type_name(&other)),
                })
            }
        };
        Ok(processor.process(&body)?)
    }
}

fn handle_check(path: &Path) -> Result<(), Box<dyn Error>> {
    let config = AttachmentConfig::load(path)?;
    let processor = config.processor(true)?;

    let types: Vec<&str> = processor.registry().type_names().collect();
    println!("Config OK: {}", path.display());
    println!("Uploads folder: {}", config.uploads_folder);
    println!("Registered types: {}", types.join(", "));
    for (type_name, fields) in processor.routing().iter() {
        println!("  {} <- {}", type_name, fields.join(", "));
    }
    match processor.zip_table() {
        Some(zip) => {
            for (output_key, inputs) in zip.iter() {
                println!("Zip: attachments.{} <- {}", output_key, inputs.join(" + "));
            }
        }
        None => println!("Zip: none"),
    }

    Ok(())
}
