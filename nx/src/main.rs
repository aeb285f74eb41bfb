//! Binary entry point: wires configuration, logging, the database pool, the
//! entity store, the dispatcher/decider/ledger collaborators, and the two
//! provider adapters, then drives a CLI surface over the catalog sync
//! service and the kill-switch mode gate. No server loop: this binary
//! drives one sync pass (or one mode-gate command) at a time and exits,
//! mirroring the teacher's `synctv-stream` binary's clap-derive shape
//! rather than its clustered HTTP/gRPC server (out of scope per spec.md §1).

mod credentials;
mod db;
mod migrations;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use nx_core::decider::IncrementalSyncDecider;
use nx_core::dispatch::PriorityDispatcher;
use nx_core::ledger::IngestLedger;
use nx_core::mode_gate::{CatalogModeGate, ReadMode, WriteMode};
use nx_core::models::{SourceAccount, SourceCapabilities, SyncStatus};
use nx_core::provider::ProviderRegistry;
use nx_core::repository::{CheckpointRepository, FingerprintRepository, IngestLedgerRepository};
use nx_core::store::NxStore;
use nx_core::sync_service::{CatalogSyncService, SyncConfig};
use nx_core::Config;
use nx_providers::telegram::TelegramSource;
use nx_providers::xtream::XtreamSource;

use credentials::PlainCredentialsResolver;

#[derive(Parser, Debug)]
#[command(name = "nx")]
#[command(about = "Media-catalog aggregation engine ingest driver", long_about = None)]
struct Args {
    /// Path to a YAML config file (env vars prefixed `NX_` always override).
    #[arg(long, env = "NX_CONFIG_FILE")]
    config_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one sync pass (all phases, every configured account unless
    /// `--account` narrows it).
    Sync {
        /// Only sync this accountKey; default is every account in config.
        #[arg(long)]
        account: Option<String>,
        /// Force a full sync even if the decider would choose incremental/skip.
        #[arg(long)]
        full: bool,
        /// Low-RAM profile: smaller buffer, fewer consumers, smaller batches.
        #[arg(long)]
        low_ram: bool,
    },
    /// Reset the checkpoint for an account so the next sync runs full.
    ClearCheckpoint {
        #[arg(long)]
        account: String,
    },
    /// Inspect or change the catalog-mode kill-switch (spec.md §4.10).
    Mode {
        #[command(subcommand)]
        action: ModeAction,
    },
    /// Apply pending SQL migrations and exit.
    Migrate,
}

#[derive(Subcommand, Debug)]
enum ModeAction {
    /// Print the current read/write mode.
    Status,
    /// Set the read mode independently (legacy|dual|new).
    SetRead { mode: String },
    /// Set the write mode independently (legacy|dual|new).
    SetWrite { mode: String },
    /// Rollback signal: atomically returns both modes to LEGACY/LEGACY.
    Rollback,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config_file.as_deref()).context("failed to load config")?;
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("config error: {e}");
        }
        bail!("invalid configuration ({} error(s))", errors.len());
    }

    nx_core::logging::init_logging(&config.logging)?;
    info!("nx starting");

    let pool = db::init_pool(&config.database).await?;
    migrations::run_migrations(&pool).await?;

    match args.command {
        Command::Migrate => {
            info!("migrations applied, exiting");
        }
        Command::Mode { action } => run_mode_command(pool, action).await?,
        Command::ClearCheckpoint { account } => {
            let checkpoints = CheckpointRepository::new(pool.clone());
            let cleared = checkpoints.clear_account(&account).await?;
            info!(account_key = %account, rows_cleared = cleared, "checkpoint cleared");
        }
        Command::Sync {
            account,
            full,
            low_ram,
        } => run_sync_command(pool, &config, account, full, low_ram).await?,
    }

    Ok(())
}

async fn run_mode_command(pool: sqlx::PgPool, action: ModeAction) -> Result<()> {
    let gate = CatalogModeGate::load(pool).await?;
    match action {
        ModeAction::Status => {
            info!(
                read_mode = ?gate.read_mode().await,
                write_mode = ?gate.write_mode().await,
                "catalog mode status"
            );
        }
        ModeAction::SetRead { mode } => {
            let parsed = parse_read_mode(&mode)?;
            gate.set_read_mode(parsed).await?;
            info!(read_mode = ?parsed, "read mode updated");
        }
        ModeAction::SetWrite { mode } => {
            let parsed = parse_write_mode(&mode)?;
            gate.set_write_mode(parsed).await?;
            info!(write_mode = ?parsed, "write mode updated");
        }
        ModeAction::Rollback => {
            gate.rollback().await?;
            warn!("catalog mode rolled back to LEGACY/LEGACY");
        }
    }
    Ok(())
}

fn parse_read_mode(s: &str) -> Result<ReadMode> {
    match s {
        "legacy" => Ok(ReadMode::Legacy),
        "dual" => Ok(ReadMode::Dual),
        "new" => Ok(ReadMode::New),
        other => bail!("unknown read mode {other:?} (expected legacy|dual|new)"),
    }
}

fn parse_write_mode(s: &str) -> Result<WriteMode> {
    match s {
        "legacy" => Ok(WriteMode::Legacy),
        "dual" => Ok(WriteMode::Dual),
        "new" => Ok(WriteMode::New),
        other => bail!("unknown write mode {other:?} (expected legacy|dual|new)"),
    }
}

async fn run_sync_command(
    pool: sqlx::PgPool,
    config: &Config,
    only_account: Option<String>,
    force_full: bool,
    low_ram: bool,
) -> Result<()> {
    let store = NxStore::new(pool.clone());
    bootstrap_accounts(&store, config).await?;
    let dispatcher = PriorityDispatcher::new();
    let decider = IncrementalSyncDecider::new(CheckpointRepository::new(pool.clone()));
    let ledger = IngestLedger::new(
        IngestLedgerRepository::new(pool.clone()),
        FingerprintRepository::new(pool.clone()),
    );

    let mut registry = ProviderRegistry::new();
    let credentials = Arc::new(PlainCredentialsResolver);
    registry.register_catalog_source(Arc::new(XtreamSource::new(
        store.source_account.clone(),
        credentials,
    )));
    registry.register_catalog_source(Arc::new(TelegramSource::new(
        store.source_account.clone(),
    )));

    let sync_service = CatalogSyncService::new(store, dispatcher, decider, ledger);

    let mut sync_config = if low_ram {
        SyncConfig::low_ram()
    } else {
        SyncConfig::default_profile()
    };
    sync_config.force_full = force_full;
    if !config.sync.enable_episodes_phase {
        sync_config
            .enabled_phases
            .retain(|phase| !matches!(phase, nx_core::models::Phase::Episodes));
    }

    let accounts: Vec<_> = config
        .accounts
        .iter()
        .filter(|a| only_account.as_deref().map_or(true, |k| k == a.account_key))
        .collect();

    if accounts.is_empty() {
        warn!("no matching accounts configured, nothing to sync");
        return Ok(());
    }

    let mut any_failed = false;
    for account in accounts {
        let Some(source) = registry.catalog_source(&account.provider_type) else {
            error!(
                account_key = %account.account_key,
                provider_type = %account.provider_type,
                "no registered catalog source for provider type"
            );
            any_failed = true;
            continue;
        };

        info!(account_key = %account.account_key, provider = %account.provider_type, "sync starting");
        let (mut stream, _handle) =
            sync_service.sync(account.account_key.clone(), source, sync_config.clone());

        use tokio_stream::StreamExt;
        while let Some(status) = stream.next().await {
            log_sync_status(&account.account_key, &status);
            if let SyncStatus::Error { can_retry: false, .. } = status {
                any_failed = true;
            }
        }
    }

    if any_failed {
        bail!("one or more accounts failed to sync");
    }
    Ok(())
}

/// Idempotently upserts every `config.accounts` entry as a `SourceAccount`
/// row, the same declarative-bootstrap shape the teacher uses for its root
/// user: config is the source of truth for which accounts exist, so a
/// changed endpoint or credentials handle here overwrites the stored row on
/// the next run rather than drifting from it silently.
async fn bootstrap_accounts(store: &NxStore, config: &Config) -> Result<()> {
    for account in &config.accounts {
        store
            .source_account
            .upsert(&SourceAccount {
                account_key: account.account_key.clone(),
                provider_type: account.provider_type.clone(),
                endpoint: account.endpoint.clone(),
                credentials_handle: account.credentials_handle.clone(),
                capabilities: SourceCapabilities::default(),
            })
            .await
            .with_context(|| format!("failed to bootstrap account {}", account.account_key))?;
    }
    Ok(())
}

fn log_sync_status(account_key: &str, status: &SyncStatus) {
    match status {
        SyncStatus::Started => info!(account_key, "sync started"),
        SyncStatus::InProgress {
            phase,
            processed,
            total,
        } => info!(account_key, ?phase, processed, ?total, "sync in progress"),
        SyncStatus::Completed {
            totals,
            duration_ms,
            was_incremental,
        } => info!(
            account_key,
            discovered = totals.discovered,
            accepted = totals.accepted,
            rejected = totals.rejected,
            skipped = totals.skipped,
            duration_ms,
            was_incremental,
            "sync completed"
        ),
        SyncStatus::Cancelled {
            reason,
            phase,
            processed,
            can_resume,
        } => warn!(
            account_key,
            %reason,
            ?phase,
            processed,
            can_resume,
            "sync cancelled"
        ),
        SyncStatus::Error {
            error_type,
            message,
            phase,
            processed,
            can_retry,
        } => error!(
            account_key,
            error_type = %error_type,
            message = %message,
            ?phase,
            processed,
            can_retry,
            "sync error"
        ),
    }
}
