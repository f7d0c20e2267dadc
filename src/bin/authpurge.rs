//! AuthPurge Binary
//!
//! Purges inactive (or explicitly named) accounts from an account file,
//! one small slice per tick.

use anyhow::Context;
use authpurge::account::load_accounts;
use authpurge::{
    GroupPermissions, OfflinePlayer, PlayerId, PurgeConfig, PurgeError, PurgeService,
    SessionRegistry,
};
use chrono::{Duration, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// AuthPurge - Incremental Account Purging
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Account file, one `name [last_login_unix_seconds]` per line
    #[arg(short, long)]
    accounts: PathBuf,

    /// Purge accounts without a login for this many days
    #[arg(short, long, default_value_t = 60)]
    days: u32,

    /// Purge exactly these names instead of inactive accounts
    #[arg(short, long = "name")]
    names: Vec<String>,

    /// Automatic purge: refuses thresholds below 30 days
    #[arg(long, conflicts_with = "names")]
    auto: bool,

    /// Players granted the purge bypass permission
    #[arg(long)]
    exempt: Vec<String>,

    /// Players whose permission data cannot be loaded
    #[arg(long)]
    unavailable: Vec<String>,

    /// Delay between purge ticks in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Message prefix
    #[arg(long, default_value = "[AuthPurge]")]
    prefix: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("authpurge=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = PurgeConfig::default()
        .with_tick_interval(std::time::Duration::from_millis(args.tick_ms))
        .with_prefix(&args.prefix)
        .with_days_before_purge(args.days);
    if args.auto {
        config = config.with_auto_purge(args.days);
    }

    let accounts = load_accounts(&args.accounts)
        .with_context(|| format!("loading accounts from {}", args.accounts.display()))?;
    info!("Loaded {} accounts from {}", accounts.len(), args.accounts.display());

    let permissions = Arc::new(GroupPermissions::new());
    for name in &args.exempt {
        permissions.assign_group(name, "exempt");
    }
    for name in &args.unavailable {
        permissions.mark_unavailable(name);
    }

    let mut known = accounts.names();
    known.sort();
    let offline_players: Arc<[OfflinePlayer]> = known
        .into_iter()
        .enumerate()
        .map(|(i, name)| OfflinePlayer::new(PlayerId::from_u128(i as u128), name))
        .collect();

    let sessions = Arc::new(SessionRegistry::new());
    let service = Arc::new(PurgeService::new(
        config,
        accounts.clone(),
        permissions,
        sessions,
    ));

    let task = if args.auto {
        service.run_auto_purge(offline_players)
    } else if args.names.is_empty() {
        let until = Utc::now() - Duration::days(i64::from(args.days));
        service.run_purge(None, until, offline_players).map(Some)
    } else {
        service
            .purge_players(None, &args.names, offline_players)
            .map(Some)
    };

    let task = match task {
        Ok(Some(task)) => task,
        Ok(None) | Err(PurgeError::NothingToPurge) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    info!(
        "Starting purge of {} accounts, one slice every {}ms",
        task.total(),
        args.tick_ms
    );

    let scheduled = service.schedule(task);
    let cancel = scheduled.cancel_handle().clone();
    let shutdown = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, leaving the purge incomplete");
            cancel.cancel();
        }
    });

    let ticks = scheduled.join().await?;
    shutdown.abort();

    println!(
        "Purge stopped after {} ticks, {} accounts remaining",
        ticks,
        accounts.len()
    );

    Ok(())
}
