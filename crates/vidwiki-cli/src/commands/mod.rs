pub mod session;
pub mod sinks;
pub mod workspace;

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use vidwiki_application::AppServices;
use vidwiki_infrastructure::VidwikiPaths;

/// Builds the services from `--config-dir` or the platform default.
pub fn bootstrap(config_dir: Option<PathBuf>) -> Result<AppServices> {
    let paths = match config_dir {
        Some(dir) => VidwikiPaths::with_root(dir),
        None => VidwikiPaths::resolve()?,
    };
    tracing::debug!("config dir: {}", paths.config_dir().display());
    AppServices::bootstrap(&paths)
        .with_context(|| format!("Failed to start from {}", paths.config_dir().display()))
}

/// Asks a yes/no question on the terminal. Anything but `y`/`yes` is no.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    print!("{prompt} [y/N] ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
