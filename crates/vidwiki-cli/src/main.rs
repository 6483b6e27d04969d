use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vidwiki_core::session::SourceKind;
use vidwiki_core::sink::SinkTarget;

mod commands;

#[derive(Parser)]
#[command(name = "vidwiki")]
#[command(about = "vidwiki - turn a video into an SEO-ready article", long_about = None)]
struct Cli {
    /// Use this directory instead of the platform config directory
    #[arg(long, global = true, env = "VIDWIKI_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sessions, most recently updated first
    List,
    /// Create a session
    New {
        /// Session title (ignored with --url, which derives one)
        #[arg(long)]
        title: Option<String>,
        /// Source link to create the session from
        #[arg(long)]
        url: Option<String>,
        #[arg(long, default_value = "youtube", value_parser = parse_source_kind)]
        kind: SourceKind,
    },
    /// Show a session and its saved document
    Show { id: String },
    /// Generate the article for a session
    Generate {
        id: String,
        /// Source link, required when the session has none
        #[arg(long)]
        url: Option<String>,
        /// What the article should cover
        #[arg(long)]
        content: Option<String>,
        /// How the article should read; empty clears it
        #[arg(long)]
        style: Option<String>,
        /// Save the result to these targets (library is always included)
        #[arg(long, value_delimiter = ',', value_parser = parse_target)]
        save: Option<Vec<SinkTarget>>,
        /// Skip the confirmation for external targets
        #[arg(long, short)]
        yes: bool,
    },
    /// Edit the saved article and save it to the library
    Edit {
        id: String,
        /// Read the new body from this file
        #[arg(long)]
        body_file: Option<PathBuf>,
        /// New tag list, separated by commas or spaces
        #[arg(long)]
        tags: Option<String>,
    },
    /// Save the session's article to one or more targets
    Save {
        id: String,
        #[arg(long = "to", value_delimiter = ',', value_parser = parse_target, default_value = "library")]
        targets: Vec<SinkTarget>,
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete a session permanently
    Delete {
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
    /// Report whether each external sink can be written to
    CheckSinks,
}

fn parse_target(value: &str) -> Result<SinkTarget, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("unknown target '{value}' (expected library, drive or sheet)"))
}

fn parse_source_kind(value: &str) -> Result<SourceKind, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("unknown source kind '{value}' (expected youtube or url)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let services = commands::bootstrap(cli.config_dir)?;

    match cli.command {
        Commands::List => commands::session::list(&services).await?,
        Commands::New { title, url, kind } => {
            commands::session::create(&services, title.as_deref(), url.as_deref(), kind).await?
        }
        Commands::Show { id } => commands::session::show(&services, &id).await?,
        Commands::Generate {
            id,
            url,
            content,
            style,
            save,
            yes,
        } => {
            let options = commands::workspace::GenerateOptions {
                url,
                content,
                style,
                save,
                assume_yes: yes,
            };
            commands::workspace::generate(&services, &id, options).await?
        }
        Commands::Edit {
            id,
            body_file,
            tags,
        } => commands::workspace::edit(&services, &id, body_file, tags).await?,
        Commands::Save { id, targets, yes } => {
            commands::workspace::save(&services, &id, &targets, yes).await?
        }
        Commands::Delete { id, yes } => commands::session::delete(&services, &id, yes).await?,
        Commands::CheckSinks => commands::sinks::check(&services).await,
    }

    Ok(())
}
