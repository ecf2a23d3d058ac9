//! Logger setup.

use std::path::Path;

use log::LevelFilter;

use crate::error::Result;

fn dispatch(level: LevelFilter) -> fern::Dispatch {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // Image decoders are noisy at debug.
        .level_for("image", LevelFilter::Warn)
}

/// Installs the global logger, writing to stderr and, if given, appending to
/// `file`. Fails if a logger is already installed.
pub fn init(level: LevelFilter, file: Option<&Path>) -> Result<()> {
    let mut dispatch = dispatch(level).chain(std::io::stderr());
    if let Some(file) = file {
        dispatch = dispatch.chain(fern::log_file(file)?);
    }
    dispatch.apply()?;
    log::debug!("Logger initialized at level {level}");
    Ok(())
}
