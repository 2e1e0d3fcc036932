use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use plugin_update_provider::config::{self, ProviderConfig};
use plugin_update_provider::logging::{self, LogFormat};
use plugin_update_provider::provider::{PLUGIN_INFORMATION_ACTION, Providers, StatusSnapshot};
use plugin_update_provider::version::registries::UpdateServerRegistry;
use plugin_update_provider::version::store::{KeyValueStore, SqliteStore};

#[derive(Parser)]
#[command(name = "plugin-update-provider")]
#[command(version, about = "Check self-hosted plugins against their update server")]
struct Cli {
    /// JSON config file (`{"registry": {"baseUrl": "..."}}`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store database path (defaults to the data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one update check cycle and print the resulting update status
    Check {
        /// Directory the plugin main files are relative to
        #[arg(long)]
        plugins_dir: PathBuf,

        /// Plugin main files to check
        #[arg(required = true)]
        plugin_files: Vec<PathBuf>,
    },
    /// Print registry metadata for the plugin with the given slug
    Info {
        #[arg(long)]
        plugins_dir: PathBuf,

        #[arg(long)]
        slug: String,

        #[arg(required = true)]
        plugin_files: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(&config::log_path(), cli.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let provider_config = match &cli.config {
        Some(path) => ProviderConfig::load(path)?,
        None => ProviderConfig::default(),
    };

    let db_path = cli.db.unwrap_or_else(config::db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {:?}", parent))?;
    }

    let sqlite = Arc::new(SqliteStore::open(&db_path)?);
    if let Err(e) = sqlite.purge_expired() {
        warn!("Failed to purge expired store entries: {}", e);
    }
    let store: Arc<dyn KeyValueStore> = sqlite;

    let registry = Arc::new(UpdateServerRegistry::new(&provider_config.registry.base_url)?);
    info!("Using update server {}", provider_config.registry.base_url);

    match cli.command {
        Command::Check {
            plugins_dir,
            plugin_files,
        } => {
            let mut providers = Providers::new(plugins_dir, registry, store.clone());
            for plugin_file in &plugin_files {
                providers.register(plugin_file)?;
            }

            let snapshot = StatusSnapshot::new(store);
            let cycle = snapshot.load_for_cycle(providers.file_path_keys());
            let status = providers.check_for_update(Some(cycle)).await;
            snapshot.save(&status)?;

            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Info {
            plugins_dir,
            slug,
            plugin_files,
        } => {
            let mut providers = Providers::new(plugins_dir, registry, store);
            for plugin_file in &plugin_files {
                providers.register(plugin_file)?;
            }

            let info = providers
                .plugin_info(None, PLUGIN_INFORMATION_ACTION, &slug)
                .await;

            if info.is_none() {
                info!("No update information available for {}", slug);
            }
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
