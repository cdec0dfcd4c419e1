//! File-based access journal for decoded Wiegand events.
//!
//! This crate persists every decoded card read to a plain-text daily log
//! that existing collectors already parse. It does not match cards against
//! any database; it records what was read and when.
//!
//! # Examples
//!
//! ```no_run
//! use wiegand_core::{DecodedEvent, Dispatcher};
//! use wiegand_storage::{AccessJournal, JournalDispatcher};
//!
//! let mut dispatcher = JournalDispatcher::new(AccessJournal::new("/var/lib/wiegand"));
//! dispatcher
//!     .dispatch(&DecodedEvent::recognized(26, 39_389_802, "H10301", 44, 34101))
//!     .unwrap();
//! ```

pub mod error;
pub mod journal;

pub use error::{StorageError, StorageResult};
pub use journal::{AccessJournal, JournalDispatcher};
