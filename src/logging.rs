use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use env_logger::{Env, Target};

pub const LOG_ENV: &str = "NUMTAP_LOG";

/// Sends log records to `path` so the alternate screen stays clean.
/// Filter comes from `NUMTAP_LOG`, `info` when unset.
pub fn init_file_logger(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // a second init (tests, restarts) keeps the first logger
    let _ = env_logger::Builder::from_env(Env::default().filter_or(LOG_ENV, "info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
    Ok(())
}
