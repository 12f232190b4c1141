//! # Logging
//!
//! All crates log through the `log` facade. An executable calls [`logger_init`] once, after its
//! session has been created, which sends every record to stdout and to the session's log file.
//! Lines are stamped with the seconds elapsed since the session began so they can be lined up
//! with the telemetry archive.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level};
use serde::Deserialize;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Logging settings, normally the `[log]` table of an executable's parameter file.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Most verbose level that will be recorded. Must be `Info` or more verbose.
    pub min_level: LevelFilter,

    /// Module paths which are capped at `Info` whatever `min_level` is. Used for modules which
    /// trace every cycle.
    #[serde(default)]
    pub quiet_targets: Vec<String>,

    /// If false records only go to the log file.
    #[serde(default = "default_to_stdout")]
    pub to_stdout: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The minimum log level must be at least as verbose as `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Could not open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("Could not install the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::Debug,
            quiet_targets: Vec::new(),
            to_stdout: true,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the logger for this execution.
///
/// Must only be called once per process, a second call returns `FernInitError`.
pub fn logger_init(settings: &LogSettings, session: &Session) -> Result<(), LoggerInitError> {
    if settings.min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(settings.min_level));
    }

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            // Debug and trace records show where they came from
            if record.level() > Level::Info {
                out.finish(format_args!(
                    "[{:10.6} {}] {}: {}",
                    session::get_elapsed_seconds(),
                    level_tag(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "[{:10.6} {}] {}",
                    session::get_elapsed_seconds(),
                    level_tag(record.level()),
                    message
                ))
            }
        })
        .level(settings.min_level);

    for target in settings.quiet_targets.iter() {
        dispatch = dispatch.level_for(target.clone(), LevelFilter::Info);
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    if settings.to_stdout {
        dispatch = dispatch.chain(std::io::stdout());
    }

    dispatch
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", settings.min_level);
    if !settings.quiet_targets.is_empty() {
        info!("    Quiet targets: {:?}", settings.quiet_targets);
    }
    info!("    Log file: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Three letter coloured tag for a level.
fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}

fn default_to_stdout() -> bool {
    true
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_settings_from_toml() {
        let s: LogSettings = crate::params::from_str(
            r#"
            min_level = "trace"
            quiet_targets = ["state_lib::pose_est"]
            "#,
        )
        .unwrap();

        assert_eq!(s.min_level, LevelFilter::Trace);
        assert_eq!(s.quiet_targets, vec![String::from("state_lib::pose_est")]);
        assert!(s.to_stdout);
    }
}
