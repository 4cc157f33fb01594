// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{Context, Result};
use application::{check_files, NoteRepository, SyncReport, SyncRun};
use infrastructure::{discovery, AnkiConnectRepository, Backend, CollectionRepository, Config};
use ports::SummaryPresenter;
use tracing::{debug, info};
use crate::cli::args::{Args, Command};

pub fn run(args: Args) -> Result<ExitCode> {
    debug!(?args, "Starting ankisync with arguments");

    let config = effective_config(&args)?;
    debug!(
        backend = ?config.sync.backend,
        extension = %config.sync.extension,
        "Effective configuration"
    );

    let failed = match &args.command {
        Command::Sync { root } => sync(&config, root)?,
        Command::Check { root, json } => check(&config, root, *json)?,
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Configuration file values with command-line overrides applied.
pub fn effective_config(args: &Args) -> Result<Config> {
    let mut config = Config::resolve(args.config.as_deref())?;

    if let Some(backend) = args.backend {
        config.sync.backend = backend;
    }
    if let Some(url) = &args.url {
        config.anki_connect.url = url.clone();
    }
    if let Some(path) = &args.collection {
        config.collection.path = path.to_string_lossy().into_owned();
    }
    if let Some(profile) = &args.profile {
        config.collection.profile = profile.clone();
    }

    Ok(config)
}

fn sync(config: &Config, root: &Path) -> Result<bool> {
    let paths = discovery::find_note_files(root, &config.sync.extension)?;
    info!(count = paths.len(), root = %root.display(), "Found note files");

    let report = match config.sync.backend {
        Backend::Connect => {
            let repository = AnkiConnectRepository::new(&config.anki_connect)?;
            repository.version().with_context(|| {
                format!(
                    "Could not connect to AnkiConnect at {}. Make sure that:\n  \
                     - Anki is running\n  \
                     - the AnkiConnect add-on is installed and set up",
                    repository.url()
                )
            })?;
            sync_with(repository, paths)
        }
        Backend::Collection => {
            util::process::check_anki_not_running()?;
            let collection_path = match config.collection.path() {
                Some(path) => {
                    debug!(?path, "Using provided collection path");
                    path
                }
                None => {
                    debug!(
                        profile = ?config.collection.profile(),
                        "Finding collection path for profile"
                    );
                    find_collection_path(config.collection.profile())?
                }
            };
            sync_with(CollectionRepository::new(&collection_path)?, paths)
        }
    };

    print!("{}", SummaryPresenter::new().render_sync(&report));
    Ok(report.has_failures())
}

fn sync_with<R: NoteRepository>(repository: R, paths: Vec<PathBuf>) -> SyncReport {
    SyncRun::new(repository).run(paths)
}

fn check(config: &Config, root: &Path, json: bool) -> Result<bool> {
    let paths = discovery::find_note_files(root, &config.sync.extension)?;
    let report = check_files(paths);

    if json {
        let output = serde_json::to_string_pretty(&report.valid)
            .context("Failed to serialize notes to JSON")?;
        println!("{output}");
        for error in &report.invalid {
            eprintln!("INVALID  {error}");
        }
    } else {
        print!("{}", SummaryPresenter::new().render_check(&report));
    }

    Ok(report.has_failures())
}

pub fn find_collection_path(profile: Option<&str>) -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;

    // Get the Anki base directory
    #[cfg(target_os = "macos")]
    let anki_path = home.join("Library/Application Support/Anki2");
    #[cfg(target_os = "linux")]
    let anki_path = home.join(".local/share/Anki2");
    #[cfg(target_os = "windows")]
    let anki_path = home.join("AppData/Roaming/Anki2");

    // If profile is specified, use it directly
    if let Some(profile_name) = profile {
        return Ok(anki_path.join(profile_name).join("collection.anki2"));
    }

    // Otherwise, find the first valid profile
    for entry in std::fs::read_dir(&anki_path)
        .with_context(|| format!("Failed to read Anki directory {}", anki_path.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && path.join("collection.anki2").exists() {
            return Ok(path.join("collection.anki2"));
        }
    }

    Err(anyhow::anyhow!("No valid Anki profile found"))
}
