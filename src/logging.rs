use std::{fs, path::PathBuf, sync::Mutex};

use color_eyre::eyre::{Context, Result};
use directories::ProjectDirs;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "DYNAVIEW_LOG";
const LOG_FILE: &str = "dynaview.log";

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "dynaview=warn",
        1 => "dynaview=info",
        2 => "dynaview=debug",
        _ => "dynaview=trace",
    }
}

pub fn log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dynaview").map(|dirs| dirs.data_local_dir().to_path_buf())
}

/// Logs go to a file; the terminal belongs to the TUI.
///
/// `DYNAVIEW_LOG` takes an `EnvFilter` directive and wins over `-v`.
pub fn init(verbose: u8) -> Result<Option<PathBuf>> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(&directive)
            .with_context(|| format!("invalid {LOG_ENV} filter: {directive}"))?,
        Err(_) => EnvFilter::new(level_for(verbose)),
    };

    let Some(dir) = log_dir() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(ErrorLayer::default())
            .try_init()
            .wrap_err("failed to install tracing subscriber")?;
        return Ok(None);
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(ErrorLayer::default())
        .try_init()
        .wrap_err("failed to install tracing subscriber")?;
    Ok(Some(path))
}
