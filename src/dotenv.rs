use crate::Result;
use std::path::{Path, PathBuf};

/// Default dotenv file, relative to the current working directory.
pub const DEFAULT_DOTENV_FILE: &str = ".env";

/// Where to find the `.env` file and how to merge it.
#[derive(Debug, Clone, Default)]
pub struct DotenvOptions {
    /// Path to the file. `None` means `.env` in the current directory.
    pub path: Option<PathBuf>,
    /// When true, values from the file replace existing variables.
    pub override_existing: bool,
}

impl DotenvOptions {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOTENV_FILE))
    }
}

/// Merges the dotenv file into the process environment.
///
/// Returns the path that was loaded, or `None` when the file does not exist.
/// This mutates process-wide state and is only called while a client is
/// being constructed.
pub fn load(options: &DotenvOptions) -> Result<Option<PathBuf>> {
    let path = options.resolved_path();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "dotenv file not found, skipping");
        return Ok(None);
    }

    merge(&path, options.override_existing)?;
    tracing::debug!(
        path = %path.display(),
        override_existing = options.override_existing,
        "loaded dotenv file"
    );
    Ok(Some(path))
}

fn merge(path: &Path, override_existing: bool) -> Result<()> {
    if override_existing {
        dotenvy::from_path_override(path)?;
    } else {
        dotenvy::from_path(path)?;
    }
    Ok(())
}
