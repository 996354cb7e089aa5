//! # SealLog Core
//!
//! Encrypted, append-only, sequential record store.
//!
//! This crate provides:
//! - Key management (load or create a persisted AES key)
//! - Per-record AES-GCM encryption
//! - Segment storage with size-based rotation and retention cleanup
//! - Integrity verification of stored segments
//! - JSON and CSV export/import
//! - Post-read filtering and a follower for newly appended records
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sealog_core::{Exchange, ExchangeFormat, SegmentStore, StoreConfig};
//!
//! let store = SegmentStore::open(StoreConfig::in_dir(Path::new("data")))?;
//! store.initialize()?;
//!
//! store.append_message("user typed hello", "hw-01")?;
//!
//! for record in store.read_log(true)? {
//!     println!("{} {}", record.timestamp, record.message);
//! }
//!
//! Exchange::new(&store).export(ExchangeFormat::Json, Path::new("out.json"), None)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod crypto;
mod error;
mod exchange;
mod filter;
mod segment;
mod stats;

pub use config::{
    StoreConfig, ACTIVE_SEGMENT_FILE, CONFIG_DIR, KEY_FILE, LOG_DIR, SEGMENT_EXTENSION,
};
pub use crypto::{EncryptionKey, KeyManager, RecordCipher};
pub use error::{CoreError, CoreResult};
pub use exchange::{Exchange, ExchangeFormat, ImportSummary};
pub use filter::{keep_last, parse_timestamp, RecordFilter, REDACTED};
pub use segment::{
    rotated_created_at, AppendOutcome, Follower, Segment, SegmentReport, SegmentStore,
    VerifyReport, VerifyTotals, ROTATED_STAMP_FORMAT,
};
pub use stats::StoreStats;

pub use sealog_codec::{Record, RecordField};

/// SealLog version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Platform tag stamped on records created by this process.
pub const PLATFORM: &str = std::env::consts::OS;
