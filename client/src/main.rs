use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use concord_client::Client;
use concord_client::cache::ServerState;
use concord_client::config::{ClientConfig, DEFAULT_CONFIG_PATH};
use concord_client::model::{EditIntegration, Integration, IntegrationExpireBehavior};

#[derive(Parser)]
#[command(name = "concord-integrations", about = "Inspect and manage server integrations")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a server's integrations.
    List { server: String },
    /// Trigger a sync of one integration.
    Sync { server: String, id: String },
    /// Change an integration's expiry settings.
    Edit {
        server: String,
        id: String,
        /// 0 = remove role, 1 = kick.
        #[arg(long)]
        expire_behavior: Option<u8>,
        /// Grace period in days.
        #[arg(long)]
        expire_grace_period: Option<u32>,
        #[arg(long)]
        enable_emoticons: Option<bool>,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Remove an integration from a server.
    Delete {
        server: String,
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load(&cli.config)?;
    if config.auth.token.is_empty() {
        bail!("no API token configured (set [auth] token or CONCORD_TOKEN)");
    }
    let client = Client::from_config(&config).context("failed to build HTTP client")?;

    match cli.command {
        Command::List { server } => {
            let integrations = fetch(&client, &server).await?;
            print_json(&integrations)?;
        }
        Command::Sync { server, id } => {
            let mut integration = find(&client, &server, &id).await?;
            print_json(&*integration.sync().await?)?;
        }
        Command::Edit {
            server,
            id,
            expire_behavior,
            expire_grace_period,
            enable_emoticons,
            reason,
        } => {
            let mut edit = EditIntegration::new();
            if let Some(b) = expire_behavior {
                edit = edit.expire_behavior(IntegrationExpireBehavior::from(b));
            }
            if let Some(days) = expire_grace_period {
                edit = edit.expire_grace_period(days);
            }
            if let Some(enabled) = enable_emoticons {
                edit = edit.enable_emoticons(enabled);
            }
            if edit.is_empty() {
                bail!("nothing to edit");
            }
            let mut integration = find(&client, &server, &id).await?;
            print_json(&*integration.edit(&edit, reason.as_deref()).await?)?;
        }
        Command::Delete { server, id, reason } => {
            let integration = find(&client, &server, &id).await?;
            print_json(integration.delete(reason.as_deref()).await?)?;
        }
    }

    Ok(())
}

async fn fetch(client: &Client, server_id: &str) -> Result<Vec<Integration>> {
    let server = match client.cache().server(server_id) {
        Some(server) => server,
        None => client
            .cache()
            .insert_server(ServerState::new(server_id.to_string(), String::new())),
    };
    client
        .fetch_integrations(&server)
        .await
        .with_context(|| format!("failed to list integrations of server {server_id}"))
}

async fn find(client: &Client, server_id: &str, id: &str) -> Result<Integration> {
    fetch(client, server_id)
        .await?
        .into_iter()
        .find(|i| i.id() == id)
        .ok_or_else(|| anyhow!("integration {id} not found in server {server_id}"))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
