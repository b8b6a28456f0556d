//! Session token persistence for the CLI
//!
//! Tokens are resolved in this order:
//! 1. the token file (`--token-file`, default `~/.passkeeper/token`)
//! 2. the `PASSKEEPER_TOKEN` environment variable

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

const TOKEN_ENV: &str = "PASSKEEPER_TOKEN";

/// Default token path (~/.passkeeper/token)
pub fn default_token_path() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Unable to determine home directory")?;

    let mut path = PathBuf::from(home);
    path.push(".passkeeper");
    path.push("token");
    Ok(path)
}

/// Write `token` to `path`, creating parent directories as needed.
pub fn save_token(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to open token file: {}", path.display()))?;

    // The mode above only applies to newly created files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict token file: {}", path.display()))?;
    }

    file.write_all(token.as_bytes())
        .with_context(|| format!("Failed to write token file: {}", path.display()))?;

    debug!(path = %path.display(), "token saved");
    Ok(())
}

/// Load the session token from `path`, falling back to `PASSKEEPER_TOKEN`.
pub fn load_token(path: &Path) -> Result<String> {
    load_token_with(path, std::env::var(TOKEN_ENV).ok())
}

fn load_token_with(path: &Path, env_token: Option<String>) -> Result<String> {
    if path.exists() {
        debug!("Reading token from file: {}", path.display());
        let token = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file: {}", path.display()))?
            .trim()
            .to_string();

        if token.is_empty() {
            anyhow::bail!("Token file is empty: {}", path.display());
        }
        return Ok(token);
    }

    if let Some(token) = env_token.filter(|token| !token.trim().is_empty()) {
        debug!("Using token from {} environment variable", TOKEN_ENV);
        return Ok(token.trim().to_string());
    }

    anyhow::bail!(
        "No token found. Run `passkeeper-cli login` or set {} (looked in {})",
        TOKEN_ENV,
        path.display()
    )
}
