//! Daily access journal.
//!
//! Every decoded event becomes one line in a per-day text file:
//!
//! ```text
//! <root>/
//! ├── LOG/
//! │   ├── 20251018.TXT
//! │   └── 20251019.TXT      0004434101,14:30:00,2025/10/19,B=26 V=39389802\r\n
//! └── accesscard/
//!     └── accesscard/
//!         └── LAST.TXT      20251019.txt
//! ```
//!
//! The value column is the combined facility/card value for recognized
//! formats and the raw value otherwise, zero padded to ten digits.
//! `LAST.TXT` names the log file written most recently so an external
//! collector can find it without listing the directory.

use crate::error::{StorageError, StorageResult};
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use wiegand_core::{DecodedEvent, Dispatcher};

/// Directory holding the daily log files.
pub const LOG_DIR: &str = "LOG";

/// Directory holding the pointer file. Collectors expect it nested twice:
/// `accesscard/accesscard/LAST.TXT`.
pub const POINTER_DIR: &str = "accesscard";

/// File naming today's log.
pub const POINTER_FILE: &str = "LAST.TXT";

/// Append-only daily journal of decoded events.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wiegand_core::DecodedEvent;
/// use wiegand_storage::AccessJournal;
///
/// let at = NaiveDate::from_ymd_opt(2025, 10, 19)
///     .unwrap()
///     .and_hms_opt(14, 30, 0)
///     .unwrap();
/// let event = DecodedEvent::recognized(26, 39_389_802, "H10301", 44, 34101);
///
/// assert_eq!(
///     AccessJournal::format_line(&event, at),
///     "0004434101,14:30:00,2025/10/19,B=26 V=39389802\r\n"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessJournal {
    root: PathBuf,
}

impl AccessJournal {
    /// Journal rooted at `root`. Nothing is created until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Log file for `date`: `<root>/LOG/YYYYMMDD.TXT`.
    pub fn log_path(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(LOG_DIR)
            .join(format!("{}.TXT", date.format("%Y%m%d")))
    }

    /// `<root>/accesscard/accesscard/LAST.TXT`.
    pub fn pointer_path(&self) -> PathBuf {
        self.root
            .join(POINTER_DIR)
            .join(POINTER_DIR)
            .join(POINTER_FILE)
    }

    /// One journal line, CRLF terminated.
    pub fn format_line(event: &DecodedEvent, at: NaiveDateTime) -> String {
        format!(
            "{:010},{},{},B={} V={}\r\n",
            event.display_value(),
            at.format("%H:%M:%S"),
            at.format("%Y/%m/%d"),
            event.bit_count(),
            event.raw_value()
        )
    }

    /// Record `event` at the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if a directory or file cannot be written.
    pub fn record(&self, event: &DecodedEvent) -> StorageResult<PathBuf> {
        self.record_at(event, Local::now().naive_local())
    }

    /// Record `event` with an explicit timestamp.
    ///
    /// Appends to that day's log, creating directories and the file as
    /// needed, then points `LAST.TXT` at it. Returns the log file path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if a directory or file cannot be written.
    pub fn record_at(&self, event: &DecodedEvent, at: NaiveDateTime) -> StorageResult<PathBuf> {
        let log_path = self.log_path(at.date());
        let line = Self::format_line(event, at);

        append(&log_path, line.as_bytes())?;
        self.update_pointer(at.date())?;

        debug!(path = %log_path.display(), value = event.display_value(), "Journal entry written");
        Ok(log_path)
    }

    fn update_pointer(&self, date: NaiveDate) -> StorageResult<()> {
        let path = self.pointer_path();
        ensure_parent(&path)?;
        fs::write(&path, format!("{}.txt", date.format("%Y%m%d")))
            .map_err(|e| StorageError::io(&path, e))
    }
}

fn ensure_parent(path: &Path) -> StorageResult<()> {
    match path.parent() {
        Some(dir) => fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e)),
        None => Ok(()),
    }
}

fn append(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StorageError::io(path, e))?;
    file.write_all(bytes).map_err(|e| StorageError::io(path, e))
}

/// Dispatcher that writes every event to an [`AccessJournal`].
#[derive(Debug, Clone)]
pub struct JournalDispatcher {
    journal: AccessJournal,
}

impl JournalDispatcher {
    pub fn new(journal: AccessJournal) -> Self {
        Self { journal }
    }

    pub fn journal(&self) -> &AccessJournal {
        &self.journal
    }
}

impl Dispatcher for JournalDispatcher {
    fn dispatch(&mut self, event: &DecodedEvent) -> wiegand_core::Result<()> {
        self.journal.record(event).map(|_| ()).map_err(|e| {
            error!(error = %e, "Failed to write journal entry");
            wiegand_core::Error::Dispatch(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hh, mm, ss)
            .unwrap()
    }

    #[rstest]
    #[case(DecodedEvent::recognized(26, 39_389_802, "H10301", 44, 34101), "0004434101,")]
    #[case(DecodedEvent::unrecognized(10, 717), "0000000717,")]
    #[case(DecodedEvent::unrecognized(64, u64::MAX), "18446744073709551615,")]
    fn test_value_column(#[case] event: DecodedEvent, #[case] prefix: &str) {
        let line = AccessJournal::format_line(&event, at(2025, 1, 2, 3, 4, 5));
        assert!(line.starts_with(prefix), "{line}");
    }

    #[test]
    fn test_line_layout() {
        let line = AccessJournal::format_line(
            &DecodedEvent::unrecognized(10, 717),
            at(2025, 1, 2, 3, 4, 5),
        );
        assert_eq!(line, "0000000717,03:04:05,2025/01/02,B=10 V=717\r\n");
    }

    #[test]
    fn test_paths() {
        let journal = AccessJournal::new("/srv/wiegand");
        assert_eq!(
            journal.log_path(NaiveDate::from_ymd_opt(2025, 10, 19).unwrap()),
            PathBuf::from("/srv/wiegand/LOG/20251019.TXT")
        );
        assert_eq!(
            journal.pointer_path(),
            PathBuf::from("/srv/wiegand/accesscard/accesscard/LAST.TXT")
        );
    }
}
