use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use tag_history::config::{self, Config};
use tag_history::history::cache::FileTagStore;
use tag_history::history::consolidate::ReleaseHistory;
use tag_history::history::ingest::{CacheSettings, TagIngestionClient};
use tag_history::history::notes::ReleaseNotesClient;
use tag_history::history::ordering::OrderingMode;
use tag_history::history::retry;
use tag_history::history::sources::GitHubGraphQlSource;
use tag_history::{logging, report};

#[derive(Parser)]
#[command(name = "tag-history")]
#[command(version, about = "Release statistics from a repository's tag history")]
struct Cli {
    /// Config file (defaults to <data dir>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository owner, overriding the config
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Repository name, overriding the config
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Ignore the tag cache and fetch from the API
    #[arg(long, global = true)]
    refresh: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Per-major-version release statistics
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// All tags sorted by version, as CSV
    Export {
        #[arg(long)]
        json: bool,
    },
    /// Release notes of a single tag
    Notes { tag: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let mut config = Config::load(&config_path)?;
    if let Some(owner) = cli.owner.clone() {
        config.repository.owner = owner;
    }
    if let Some(repo) = cli.repo.clone() {
        config.repository.name = repo;
    }

    let _guard = logging::init(&config::log_path(), &logging::resolve_filter())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, config))
}

fn release_history(config: &Config) -> anyhow::Result<ReleaseHistory> {
    let source = GitHubGraphQlSource::new(&config.api.url, config.api.token.clone())?;
    let store = FileTagStore::new(&config.cache.directory);
    let ingest = TagIngestionClient::new(
        Arc::new(source),
        Arc::new(store),
        CacheSettings::from(&config.cache),
    )
    .with_retry_policy(retry::from_config(&config.api.retry));

    Ok(ReleaseHistory::new(
        Arc::new(ingest),
        &config.repository.owner,
        &config.repository.name,
        OrderingMode::from_strict(config.ordering.strict),
    ))
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Command::Summary { json } => {
            let history = release_history(&config)?;
            if cli.refresh {
                history.ingest().invalidate().await;
            }
            let summaries = history.consolidated_versions().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                print!("{}", report::summary_table(&summaries));
            }
        }
        Command::Export { json } => {
            let history = release_history(&config)?;
            if cli.refresh {
                history.ingest().invalidate().await;
            }
            let records = history.version_details().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print!("{}", report::export_csv(&records));
            }
        }
        Command::Notes { tag } => {
            let client = ReleaseNotesClient::new(
                &config.api.url,
                &config.repository.owner,
                &config.repository.name,
                config.api.token.clone(),
                &config.notes,
            )?;
            println!("{}", client.fetch_release_notes(&tag).await);
        }
    }
    Ok(())
}
