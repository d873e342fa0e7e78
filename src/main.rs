//! Taskboard CLI - project roll-up reports over a task snapshot.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use taskboard::cli::{Cli, Commands, ConfigCommands};
use taskboard::commands::{self, Output, ReportOptions};
use taskboard::config::{BoardConfig, ConfigOverrides, ResolvedConfig, resolve_config};
use taskboard::logging;
use taskboard::metrics::{Clock, FixedClock, SystemClock, parse_instant};
use taskboard::sort::SortDirection;
use taskboard::store::SnapshotStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = run(cli).await {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), taskboard::Error> {
    let human = cli.human_readable;

    let mut overrides = ConfigOverrides::new().with_log_env();
    if let Commands::Report { sort, desc, .. } = &cli.command {
        if let Some(key) = sort {
            overrides = overrides.with_sort_key(*key);
        }
        if *desc {
            overrides = overrides.with_sort_direction(SortDirection::Desc);
        }
    }
    let config = resolve_config(cli.config.as_deref(), &overrides)?;
    logging::init(config.log_level(), logging::json_requested());
    tracing::debug!(
        log_level = %config.log_level.source,
        sort = %config.sort_key.source,
        "configuration resolved"
    );

    let clock = evaluation_clock(cli.now.as_deref())?;
    let snapshot = cli.snapshot;
    let store = || -> Result<SnapshotStore, taskboard::Error> {
        Ok(open_store(snapshot.clone())?.with_clock(Arc::clone(&clock)))
    };

    match cli.command {
        Commands::Report {
            search,
            status,
            priority,
            assignee,
            collapse,
            ..
        } => {
            let options = ReportOptions {
                search,
                status,
                priority,
                assignee,
                collapse,
            };
            let result = commands::report(&store()?, &config, options, clock.as_ref()).await?;
            output(&result, human);
        }
        Commands::Stats { limit } => {
            let limit = limit.unwrap_or_else(|| config.recent_limit());
            let result = commands::stats(&store()?, limit, clock.as_ref()).await?;
            output(&result, human);
        }
        Commands::Orphans => {
            let result = commands::orphans(&store()?).await?;
            output(&result, human);
        }
        Commands::SetStatus { status, ids } => {
            let result = commands::set_status(&store()?, &ids, status).await?;
            output(&result, human);
            if let Some(err) = result.failure() {
                return Err(err);
            }
        }
        Commands::Assign { profile_id, ids } => {
            let result = commands::assign(&store()?, &ids, &profile_id).await?;
            output(&result, human);
            if let Some(err) = result.failure() {
                return Err(err);
            }
        }
        Commands::Convert { id } => {
            let result = commands::convert(&store()?, &id, clock.as_ref()).await?;
            output(&result, human);
        }
        Commands::Delegate {
            id,
            assignee,
            delegator,
            note,
        } => {
            let result =
                commands::delegate(&store()?, &id, &assignee, &delegator, note.as_deref()).await?;
            output(&result, human);
        }
        Commands::Config { command } => {
            run_config(command, cli.config, &config, human)?;
        }
    }

    Ok(())
}

fn run_config(
    command: ConfigCommands,
    path: Option<PathBuf>,
    config: &ResolvedConfig,
    human: bool,
) -> Result<(), taskboard::Error> {
    match command {
        ConfigCommands::Get { key } => {
            let result = commands::config_get(config, &key)?;
            output(&result, human);
        }
        ConfigCommands::Set { key, value } => {
            let path = path.or_else(BoardConfig::default_path).ok_or_else(|| {
                taskboard::Error::Config("No config location; pass --config <FILE>".to_string())
            })?;
            let result = commands::config_set(&path, &key, &value)?;
            output(&result, human);
        }
        ConfigCommands::List => {
            output(&commands::config_list(config), human);
        }
    }
    Ok(())
}

/// Clock date metrics are evaluated against: pinned by `--now`, else the wall clock.
fn evaluation_clock(raw: Option<&str>) -> Result<Arc<dyn Clock>, taskboard::Error> {
    match raw {
        Some(raw) => parse_instant(raw)
            .map(|instant| Arc::new(FixedClock(instant)) as Arc<dyn Clock>)
            .ok_or_else(|| taskboard::Error::InvalidInput(format!("Invalid --now instant: {}", raw))),
        None => Ok(Arc::new(SystemClock)),
    }
}

fn open_store(path: Option<PathBuf>) -> Result<SnapshotStore, taskboard::Error> {
    let path = path.ok_or_else(|| {
        taskboard::Error::InvalidInput(
            "No snapshot given; pass --snapshot <FILE> or set TB_SNAPSHOT".to_string(),
        )
    })?;
    if !path.exists() {
        return Err(taskboard::Error::NotFound(format!(
            "Snapshot file not found: {}",
            path.display()
        )));
    }
    SnapshotStore::open(&path)
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
