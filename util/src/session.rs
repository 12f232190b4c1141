//! # Sessions
//!
//! A session is one run of an executable. It owns a directory named after the executable and the
//! wall-clock time it started, which holds the log file and an `arch` directory for telemetry
//! archives:
//!
//! ```text
//! <sessions dir>/state_exec_20240301_153012/
//!     state_exec.log
//!     arch/
//!         robot_state/telemetry.csv
//! ```
//!
//! The session start time (the epoch) is process wide, log lines and archive records are stamped
//! relative to it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

/// Format of the timestamp in a session directory name.
const DIR_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Session {
    /// Directory holding everything produced by this session.
    pub session_root: PathBuf,

    /// Directory archives are written into.
    pub arch_root: PathBuf,

    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable ({}) is not set", crate::host::SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error("A session has already been started in this process")]
    AlreadyStarted,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start the session in `<sw root>/{sessions_dir}`.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let mut sessions_path =
            crate::host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;
        sessions_path.push(sessions_dir);

        Self::new_in(exec_name, sessions_path)
    }

    /// Start the session in an explicit directory.
    ///
    /// Only one session may be started per process.
    pub fn new_in<P: AsRef<Path>>(exec_name: &str, sessions_path: P) -> Result<Self, SessionError> {
        let now = Utc::now();
        SESSION_EPOCH
            .try_init_once(|| now)
            .map_err(|_| SessionError::AlreadyStarted)?;

        let session_root = sessions_path
            .as_ref()
            .join(format!("{}_{}", exec_name, now.format(DIR_TIMESTAMP_FORMAT)));
        let arch_root = session_root.join("arch");

        fs::create_dir_all(&arch_root).map_err(SessionError::CannotCreateDir)?;

        Ok(Session {
            log_file_path: session_root.join(format!("{}.log", exec_name)),
            session_root,
            arch_root,
        })
    }

    /// Path of an archive file, relative to the archive root.
    pub fn arch_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.arch_root.join(path)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds elapsed since the session started, or zero if no session has been started.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(epoch) => time::duration_to_seconds(Utc::now() - *epoch).unwrap_or(std::f64::NAN),
        None => 0.0,
    }
}

/// Time the session started, `None` if no session has been started.
pub fn get_epoch() -> Option<&'static DateTime<Utc>> {
    SESSION_EPOCH.get()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

/// Session shared by every test in this crate, since only one may be started per process.
#[cfg(test)]
pub(crate) fn shared_test_session() -> &'static Session {
    static TEST_SESSION: OnceCell<Session> = OnceCell::uninit();

    TEST_SESSION.get_or_init(|| {
        let dir = std::env::temp_dir().join(format!("util_test_{}", std::process::id()));
        Session::new_in("test_exec", dir).unwrap()
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_session() {
        let session = shared_test_session();
        let dir = std::env::temp_dir().join(format!("util_test_{}", std::process::id()));

        assert!(session.arch_root.is_dir());
        assert!(session.session_root.starts_with(&dir));
        assert_eq!(
            session.log_file_path.file_name().and_then(|n| n.to_str()),
            Some("test_exec.log")
        );
        assert_eq!(
            session.arch_path("robot_state/telemetry.csv"),
            session.arch_root.join("robot_state").join("telemetry.csv")
        );

        assert!(get_epoch().is_some());
        assert!(get_elapsed_seconds() >= 0.0);

        assert!(matches!(
            Session::new_in("test_exec", &dir),
            Err(SessionError::AlreadyStarted)
        ));
    }
}
