use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use memento::config::AppConfig;
use memento::contacts::{merge_files, write_pretty};
use memento::export::{export_messages, OutputFormat};
use memento::filter::{CursorFilter, FilterPipeline, ParticipantFilter, PlatformFilter};
use memento::logging::init_logging;
use memento::paginate::{Cursor, CURSOR_PARAM};
use memento::query;
use memento::validation::InputValidator;
use memento::{Platform, QueryParams};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Extra configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the archive over HTTP
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Contacts file
        #[arg(long)]
        contacts: Option<PathBuf>,

        /// Message log
        #[arg(long)]
        messages: Option<PathBuf>,
    },
    /// Print one page of messages as JSON
    Query {
        /// Only messages sent by or to this user id
        #[arg(long)]
        contact_id: Option<String>,

        /// Only messages after this RFC 3339 instant
        #[arg(long)]
        cursor: Option<String>,

        /// Page size (1-30)
        #[arg(long)]
        limit: Option<String>,

        /// Message log
        #[arg(long)]
        messages: Option<PathBuf>,
    },
    /// Data tools
    Tools {
        #[command(subcommand)]
        command: ToolCommands,
    },
    /// Export matching messages to files
    Export {
        /// Only messages sent by or to this user id
        #[arg(long)]
        contact_id: Option<String>,

        /// Only messages after this RFC 3339 instant
        #[arg(long)]
        since: Option<String>,

        /// Only messages from this platform
        #[arg(long)]
        platform: Option<String>,

        /// Output format (txt, csv or json)
        #[arg(short, long)]
        format: Option<String>,

        /// Messages per output file
        #[arg(short, long)]
        lines: Option<usize>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Message log
        #[arg(long)]
        messages: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ToolCommands {
    /// Combine multiple contacts files
    CombineContacts {
        /// Contacts file, repeat for each source in merge order
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.override_log_level(level).context("Invalid --log-level")?;
    }

    let _log_guard = init_logging(
        Some(&config.logging.level),
        config.logging.file_path.as_deref(),
        &config.logging.format,
    )?;
    debug!(config = %config.to_yaml()?, "effective configuration");

    match cli.command {
        Commands::Serve {
            host,
            port,
            contacts,
            messages,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(contacts) = contacts {
                config.archive.contacts_file = contacts;
            }
            if let Some(messages) = messages {
                config.archive.messages_file = messages;
            }
            config.validate()?;
            for file in [&config.archive.messages_file, &config.archive.contacts_file] {
                if let Err(e) = InputValidator::validate_archive_file(file) {
                    warn!("{e}; requests will fail until it exists");
                }
            }
            memento::server::serve(&config).await?;
        },
        Commands::Query {
            contact_id,
            cursor,
            limit,
            messages,
        } => {
            let log = messages.unwrap_or(config.archive.messages_file);
            run_query(&log, contact_id, cursor, limit)?;
        },
        Commands::Tools {
            command: ToolCommands::CombineContacts { files },
        } => combine_contacts(&files)?,
        Commands::Export {
            contact_id,
            since,
            platform,
            format,
            lines,
            output_dir,
            messages,
        } => {
            let log = messages.unwrap_or(config.archive.messages_file);
            let format: OutputFormat = format.as_deref().unwrap_or(&config.export.default_format).parse()?;
            let lines = lines.unwrap_or(config.export.max_lines_per_chunk);
            InputValidator::validate_lines_per_chunk(lines)?;
            let output_dir = output_dir.unwrap_or(config.export.output_directory);

            let mut pipeline = FilterPipeline::new();
            if let Some(contact_id) = contact_id {
                pipeline.push(ParticipantFilter::new(contact_id));
            }
            if let Some(since) = since {
                let cursor = Cursor::parse(&since).with_context(|| format!("Invalid --since instant: {since}"))?;
                pipeline.push(CursorFilter::new(cursor.instant()));
            }
            if let Some(platform) = platform {
                pipeline.push(PlatformFilter::new(Platform::from(platform)));
            }

            let files = export_messages(&log, &pipeline, format, lines, &output_dir)?;
            if files.is_empty() {
                warn!("No messages matched; nothing written");
            }
            for file in files {
                info!(path = %file.display(), "exported");
            }
        },
    }

    Ok(())
}

/// Run one query and print the response body to stdout
fn run_query(log: &std::path::Path, contact_id: Option<String>, cursor: Option<String>, limit: Option<String>) -> Result<()> {
    let mut pairs = Vec::new();
    if let Some(contact_id) = contact_id {
        pairs.push((query::CONTACT_PARAM.to_string(), contact_id));
    }
    if let Some(cursor) = cursor {
        pairs.push((CURSOR_PARAM.to_string(), cursor));
    }
    if let Some(limit) = limit {
        pairs.push((query::LIMIT_PARAM.to_string(), limit));
    }
    let params = QueryParams::new(pairs);

    let response = query::answer(log, "/api/messages", &params)?;
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    Ok(())
}

/// Merge contacts files and print the result to stdout
fn combine_contacts(files: &[PathBuf]) -> Result<()> {
    InputValidator::validate_contact_sources(files)?;
    let merged = merge_files(files)?;
    write_pretty(std::io::stdout().lock(), &merged)?;
    Ok(())
}
