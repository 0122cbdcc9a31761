use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE: &str = "substance-sense.log";
const DEFAULT_FILTER: &str = "substance_sense=info,substance_sense_core=info";

/// Send tracing output to `<data_local_dir>/substance-sense/substance-sense.log`.
/// The terminal belongs to the UI, so nothing is written to stderr.
pub fn init() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .context("could not determine data directory for the log file")?
        .join("substance-sense");
    let (path, file) = open_log_file(&dir)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(path)
}

fn open_log_file(dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    Ok((path, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_is_created_and_appended() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let (path, mut file) = open_log_file(&nested).unwrap();
        writeln!(file, "first").unwrap();
        drop(file);

        let (_, mut file) = open_log_file(&nested).unwrap();
        writeln!(file, "second").unwrap();
        drop(file);

        assert_eq!(path, nested.join(LOG_FILE));
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
