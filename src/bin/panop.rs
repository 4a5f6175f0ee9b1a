use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use panop::{
    AssetFilter, NewAsset, NewZone, Session, Zone,
    config::{ApiConfig, DeclaredConfig},
    db::{
        self,
        state_repo::{self, ResourceKind},
    },
    panop::HttpTransport,
};
use serde::Serialize;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// API host (PANOP_HOST takes precedence)
    #[arg(long, value_name = "HOST", global = true)]
    host: Option<String>,
    /// API access key (PANOP_ACCESS_KEY takes precedence)
    #[arg(long, value_name = "KEY", global = true)]
    access_key: Option<String>,
    /// Accept self-signed or otherwise invalid TLS certificates
    #[arg(long, global = true)]
    skip_tls_verify: bool,
    /// Path to the SQLite state database
    #[arg(long, value_name = "PATH", default_value = "panop-state.db", global = true)]
    state: PathBuf,
    /// Print zone tokens instead of masking them
    #[arg(long, global = true)]
    show_sensitive: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage zones
    #[command(subcommand)]
    Zone(ZoneCommand),
    /// Manage assets
    #[command(subcommand)]
    Asset(AssetCommand),
    /// Inspect the local state store
    #[command(subcommand)]
    State(StateCommand),
}

#[derive(Subcommand, Debug)]
enum ZoneCommand {
    /// Create a zone and start tracking it under ADDRESS
    Create {
        address: String,
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_name = "TYPE")]
        zone_type: Option<String>,
    },
    /// Refresh a tracked zone from the remote
    Read { address: String },
    /// Apply a changed declaration to a tracked zone
    Update {
        address: String,
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_name = "TYPE")]
        zone_type: Option<String>,
    },
    /// Delete a tracked zone remotely and forget it
    Delete { address: String },
    /// Track an existing remote zone by its identifier
    Import { address: String, id: String },
    /// List every zone known to the remote
    List,
}

#[derive(Subcommand, Debug)]
enum AssetCommand {
    /// Create an asset and start tracking it under ADDRESS
    Create {
        address: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        zone_id: i64,
        #[arg(long = "type", value_name = "TYPE")]
        asset_type: Option<String>,
    },
    /// Refresh a tracked asset from the remote
    Read { address: String },
    /// Apply a changed declaration to a tracked asset
    Update {
        address: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        zone_id: i64,
        #[arg(long = "type", value_name = "TYPE")]
        asset_type: Option<String>,
    },
    /// Delete a tracked asset remotely and forget it
    Delete { address: String },
    /// Track an existing remote asset by its identifier
    Import { address: String, id: String },
    /// List assets, optionally only those of one zone
    List {
        #[arg(long)]
        zone_id: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
enum StateCommand {
    /// Show tracked resources
    List {
        #[arg(long, value_parser = ["zone", "asset"])]
        kind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let session = init_session(&cli).await?;

    match &cli.command {
        Command::Zone(cmd) => run_zone(&session, cmd, cli.show_sensitive).await,
        Command::Asset(cmd) => run_asset(&session, cmd).await,
        Command::State(StateCommand::List { kind }) => {
            let kind = kind
                .as_deref()
                .map(str::parse::<ResourceKind>)
                .transpose()
                .map_err(anyhow::Error::msg)?;
            for row in state_repo::list(&session.db, kind).await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.kind,
                    row.address,
                    row.remote_id,
                    row.created_at.to_rfc3339(),
                    row.updated_at.to_rfc3339()
                );
            }
            Ok(())
        }
    }
}

async fn init_session(cli: &Cli) -> Result<Session> {
    let config = ApiConfig::from_env(DeclaredConfig {
        host: cli.host.clone(),
        skip_tls_verify: cli.skip_tls_verify.then_some(true),
        access_key: cli.access_key.clone(),
    })?;
    if config.skip_tls_verify {
        warn!("TLS certificate verification is disabled");
    }
    let transport = HttpTransport::new(&config).context("failed to build HTTP client")?;

    if let Some(parent) = cli.state.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create state directory {}", parent.display()))?;
    }
    let db = db::init_db(&cli.state)
        .await
        .with_context(|| format!("failed to open state store {}", cli.state.display()))?;

    Ok(Session::new(transport, db))
}

async fn run_zone(session: &Session, cmd: &ZoneCommand, show_sensitive: bool) -> Result<()> {
    let show = |zone: &Zone| -> Result<()> {
        if show_sensitive {
            print_json(zone)
        } else {
            print_json(&zone.redacted())
        }
    };

    match cmd {
        ZoneCommand::Create {
            address,
            name,
            zone_type,
        } => {
            let desired = NewZone {
                name: name.clone(),
                zone_type: zone_type.clone(),
            };
            show(&session.create_zone(address, &desired).await?)
        }
        ZoneCommand::Read { address } => match session.read_zone(address).await? {
            Some(zone) => show(&zone),
            None => Ok(()),
        },
        ZoneCommand::Update {
            address,
            name,
            zone_type,
        } => {
            let desired = NewZone {
                name: name.clone(),
                zone_type: zone_type.clone(),
            };
            show(&session.update_zone(address, &desired).await?)
        }
        ZoneCommand::Delete { address } => Ok(session.delete_zone(address).await?),
        ZoneCommand::Import { address, id } => show(&session.import_zone(address, id).await?),
        ZoneCommand::List => {
            let listed = session.zone_lister().list().await?;
            if show_sensitive {
                print_json(&listed)
            } else {
                print_json(&listed.iter().map(Zone::redacted).collect::<Vec<_>>())
            }
        }
    }
}

async fn run_asset(session: &Session, cmd: &AssetCommand) -> Result<()> {
    match cmd {
        AssetCommand::Create {
            address,
            name,
            zone_id,
            asset_type,
        } => {
            let desired = NewAsset {
                name: name.clone(),
                asset_type: asset_type.clone(),
                zone_id: *zone_id,
            };
            print_json(&session.create_asset(address, &desired).await?)
        }
        AssetCommand::Read { address } => match session.read_asset(address).await? {
            Some(asset) => print_json(&asset),
            None => Ok(()),
        },
        AssetCommand::Update {
            address,
            name,
            zone_id,
            asset_type,
        } => {
            let desired = NewAsset {
                name: name.clone(),
                asset_type: asset_type.clone(),
                zone_id: *zone_id,
            };
            print_json(&session.update_asset(address, &desired).await?)
        }
        AssetCommand::Delete { address } => Ok(session.delete_asset(address).await?),
        AssetCommand::Import { address, id } => {
            print_json(&session.import_asset(address, id).await?)
        }
        AssetCommand::List { zone_id } => {
            let filter = AssetFilter { zone_id: *zone_id };
            print_json(&session.asset_lister().list(&filter).await?)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
