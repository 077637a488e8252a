//! Content data directory resolution.

use std::path::PathBuf;

use battle_content::ContentFactory;

/// Environment variable overriding the content data directory.
pub const DATA_DIR_VAR: &str = "BATTLE_DATA_DIR";

/// Finds the content data directory.
///
/// Tries in order:
/// 1. the `--data-dir` argument
/// 2. the `BATTLE_DATA_DIR` environment variable
/// 3. `crates/battle/content/data` relative to the current directory
pub fn content_factory(data_dir: Option<PathBuf>) -> anyhow::Result<ContentFactory> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => match std::env::var(DATA_DIR_VAR) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("crates/battle/content/data"),
        },
    };

    if !dir.exists() {
        anyhow::bail!(
            "Content data directory not found: {}\n\nHint: pass --data-dir or set {}",
            dir.display(),
            DATA_DIR_VAR
        );
    }
    tracing::debug!(data_dir = %dir.display(), "using content data directory");
    Ok(ContentFactory::new(dir))
}
