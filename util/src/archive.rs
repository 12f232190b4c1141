//! # Archiving
//!
//! Modules record their per-cycle data as CSV rows in the session's archive directory. A module
//! holds one [`Archiver`] per file and implements [`Archived`] to write all of them at the end of
//! its cycle. Records must be flat structs, CSV has no nesting.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use thiserror::Error;

use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Writes records to a single CSV archive file.
///
/// The default archiver has no file and drops every record, which is how archiving is turned off.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot open the archive file: {0}")]
    FileError(std::io::Error),

    #[error("Cannot write the archive record: {0}")]
    CsvError(csv::Error),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A module which archives its data.
pub trait Archived {
    /// Write this cycle's records to all of the module's archives.
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Open an archive at `path` relative to the session's archive root, creating any missing
    /// directories.
    ///
    /// The header row is written with the first record.
    pub fn from_path<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        let arch_path = session.arch_path(path);

        if let Some(parent) = arch_path.parent() {
            fs::create_dir_all(parent).map_err(ArchiveError::FileError)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(arch_path)
            .map_err(ArchiveError::FileError)?;

        Ok(Self {
            writer: Some(WriterBuilder::new().has_headers(true).from_writer(file)),
        })
    }

    /// Append a record, flushing it to disk immediately.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        let writer = match self.writer {
            Some(ref mut w) => w,
            None => return Ok(()),
        };

        writer.serialize(record).map_err(ArchiveError::CsvError)?;
        writer.flush().map_err(ArchiveError::FileError)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Record {
        a: f64,
        b: bool,
    }

    #[test]
    fn test_disabled_archiver_drops_records() {
        let mut arch = Archiver::default();
        assert!(arch.serialise(Record { a: 1.0, b: true }).is_ok());
    }

    #[test]
    fn test_archive_rows() {
        let session = crate::session::shared_test_session();
        let path = session.arch_path("archive_test/records.csv");
        fs::remove_file(&path).ok();

        let mut arch = Archiver::from_path(session, "archive_test/records.csv").unwrap();
        arch.serialise(Record { a: 1.5, b: true }).unwrap();
        arch.serialise(Record { a: -2.0, b: false }).unwrap();

        // Rows are flushed as they are written
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["a,b", "1.5,true", "-2.0,false"]);
    }
}
