//! Segment store management.

use crate::config::StoreConfig;
use crate::crypto::{EncryptionKey, KeyManager, RecordCipher};
use crate::error::{CoreError, CoreResult};
use crate::segment::naming::{is_rotated_name, rotated_name, ROTATED_STAMP_FORMAT};
use crate::segment::verify::{SegmentReport, VerifyReport};
use crate::segment::Segment;
use crate::stats::StoreStats;
use crate::PLATFORM;
use chrono::{Local, SecondsFormat, Utc};
use sealog_codec::{decode_line, encode_line, sanitize_message, Record};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Result of a single append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Bytes written, including the line terminator.
    pub bytes_written: u64,
    /// Size of the active segment right after the write.
    pub segment_size: u64,
    /// Where the active segment was moved to, if this append rotated it.
    pub rotated: Option<PathBuf>,
    /// Why rotation failed, if this append crossed the threshold but could
    /// not seal the segment. The record itself is stored either way.
    pub rotation_error: Option<String>,
}

/// Manages the active segment and the rotated segments next to it.
///
/// The store holds no open file handles: every operation opens what it needs
/// and closes it before returning.
///
/// # Concurrency
///
/// Single writer only. Two processes appending to or rotating the same
/// segment directory can interleave renames and lose records; nothing here
/// guards against that.
///
/// # Example
///
/// ```rust,ignore
/// use sealog_core::{SegmentStore, StoreConfig};
///
/// let store = SegmentStore::open(StoreConfig::in_dir(Path::new("data")))?;
/// store.initialize()?;
/// store.append_message("hello", "hw-01")?;
/// let records = store.read_log(true)?;
/// ```
pub struct SegmentStore {
    config: StoreConfig,
    prefix: String,
    cipher: RecordCipher,
}

impl SegmentStore {
    /// Opens a store, loading (or creating) the key at `config.key_path`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid key file, or an I/O error.
    pub fn open(config: StoreConfig) -> CoreResult<Self> {
        let key = KeyManager::load_or_create(&config.key_path)?;
        Self::with_key(config, &key)
    }

    /// Opens a store with a caller-provided key; the key file is not touched.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key length is unsupported.
    pub fn with_key(config: StoreConfig, key: &EncryptionKey) -> CoreResult<Self> {
        let cipher = RecordCipher::new(key)?;
        let prefix = config.effective_prefix();
        Ok(Self {
            config,
            prefix,
            cipher,
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the path of the active segment.
    #[must_use]
    pub fn active_path(&self) -> &Path {
        &self.config.active_path
    }

    /// Returns the cipher records are sealed with.
    #[must_use]
    pub fn cipher(&self) -> &RecordCipher {
        &self.cipher
    }

    /// Returns the fingerprint of the loaded key.
    #[must_use]
    pub fn key_fingerprint(&self) -> &str {
        self.cipher.key_fingerprint()
    }

    /// Creates the segment directory and an empty active segment if missing.
    ///
    /// Safe to call any number of times.
    pub fn initialize(&self) -> CoreResult<()> {
        fs::create_dir_all(self.config.segment_dir())?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.active_path())?;
        Ok(())
    }

    /// Encrypts `record` and appends it to the active segment as one line.
    ///
    /// The size check runs after the write: the append that pushes the
    /// segment past `max_segment_size` lands in it, then the segment is
    /// rotated.
    ///
    /// Once the line is written the append succeeds. A failed rotation is
    /// logged and reported in [`AppendOutcome::rotation_error`]; the next
    /// append over the threshold tries again.
    ///
    /// # Errors
    ///
    /// Returns a codec error if timestamp, platform or hardware id contain a
    /// `|` or a line break, and an I/O error if the write fails.
    pub fn append(&self, record: &Record) -> CoreResult<AppendOutcome> {
        record.check_metadata()?;
        let line = encode_line(record);
        let mut blob = self.cipher.encrypt(line.as_bytes())?;
        blob.push('\n');

        let segment_size = {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.active_path())?;
            file.write_all(blob.as_bytes())?;
            if self.config.sync_on_append {
                file.sync_data()?;
            }
            file.metadata()?.len()
        };
        debug!(bytes = blob.len(), segment_size, "appended record");

        let mut outcome = AppendOutcome {
            bytes_written: blob.len() as u64,
            segment_size,
            rotated: None,
            rotation_error: None,
        };
        if self.config.rotation && segment_size > self.config.max_segment_size {
            match self.rotate() {
                Ok(path) => outcome.rotated = Some(path),
                Err(err) => {
                    warn!(error = %err, segment_size, "rotation after append failed");
                    outcome.rotation_error = Some(err.to_string());
                }
            }
        }
        Ok(outcome)
    }

    /// Records a caller-supplied message.
    ///
    /// The message is sanitized; a blank message is ignored and `None` is
    /// returned. Otherwise a record stamped with the current UTC time and the
    /// platform tag is appended and returned.
    ///
    /// # Errors
    ///
    /// Returns a codec error if `hardware_id` contains a `|` or a line break.
    pub fn append_message(&self, message: &str, hardware_id: &str) -> CoreResult<Option<Record>> {
        let message = sanitize_message(message);
        if message.is_empty() {
            return Ok(None);
        }
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false);
        let record = Record::new(timestamp, PLATFORM, hardware_id, message);
        self.append(&record)?;
        Ok(Some(record))
    }

    /// Seals the active segment under a timestamped name, starts a new empty
    /// active segment and runs [`cleanup`](Self::cleanup).
    ///
    /// Returns the path the active segment was renamed to.
    pub fn rotate(&self) -> CoreResult<PathBuf> {
        let stamp = Local::now().format(ROTATED_STAMP_FORMAT).to_string();
        let dir = self.config.segment_dir();
        let mut attempt = 0;
        let mut target = dir.join(rotated_name(&self.prefix, &stamp, attempt));
        while target.exists() {
            attempt += 1;
            target = dir.join(rotated_name(&self.prefix, &stamp, attempt));
        }

        fs::rename(self.active_path(), &target)?;
        File::create(self.active_path())?;
        sync_directory(dir)?;
        info!(rotated = %target.display(), "rotated active segment");

        let removed = self.cleanup()?;
        if removed > 0 {
            info!(removed, "removed expired segments after rotation");
        }
        Ok(target)
    }

    /// Deletes rotated segments last modified before `now - retention`.
    ///
    /// The active segment is never considered. Returns the number of files
    /// removed.
    pub fn cleanup(&self) -> CoreResult<usize> {
        let Some(cutoff) = SystemTime::now().checked_sub(self.config.retention) else {
            return Ok(0);
        };

        let mut removed = 0;
        for segment in self.list_segments(false)? {
            if segment.modified >= cutoff {
                continue;
            }
            match fs::remove_file(&segment.path) {
                Ok(()) => {
                    debug!(path = %segment.path.display(), "removed expired segment");
                    removed += 1;
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(removed)
    }

    /// Lists existing segments ordered by modification time, oldest first.
    ///
    /// On equal times the active segment sorts last, then paths break the tie.
    pub fn list_segments(&self, include_active: bool) -> CoreResult<Vec<Segment>> {
        let entries = match fs::read_dir(self.config.segment_dir()) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut segments = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path == self.active_path() {
                continue;
            }
            let name = entry.file_name();
            if !is_rotated_name(&self.prefix, &name.to_string_lossy()) {
                continue;
            }
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            segments.push(Segment {
                path,
                modified: metadata.modified()?,
                size: metadata.len(),
                active: false,
            });
        }

        if include_active {
            match fs::metadata(self.active_path()) {
                Ok(metadata) => segments.push(Segment {
                    path: self.active_path().to_path_buf(),
                    modified: metadata.modified()?,
                    size: metadata.len(),
                    active: true,
                }),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        segments.sort_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.active.cmp(&b.active))
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(segments)
    }

    /// Decrypts and parses one stored line.
    ///
    /// # Errors
    ///
    /// Returns an integrity error if the line does not decrypt.
    pub fn decode_line(&self, line: &[u8]) -> CoreResult<Record> {
        let plaintext = self.cipher.decrypt(line)?;
        Ok(decode_line(&String::from_utf8_lossy(&plaintext)))
    }

    /// Reads every record in one segment file.
    ///
    /// Lines that fail to decrypt are skipped. A missing file reads as empty.
    pub fn read_all(&self, path: &Path) -> CoreResult<Vec<Record>> {
        let Some(reader) = open_segment(path)? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for_each_line(reader, |line| {
            match self.decode_line(line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    skipped += 1;
                    debug!(path = %path.display(), error = %err, "skipping undecryptable line");
                }
            }
        })?;

        if skipped > 0 {
            debug!(path = %path.display(), skipped, "segment contained corrupt lines");
        }
        Ok(records)
    }

    /// Reads the active segment.
    pub fn read_active(&self) -> CoreResult<Vec<Record>> {
        self.read_all(self.active_path())
    }

    /// Reads the given segments in order and concatenates their records.
    pub fn read_all_segments(&self, segments: &[Segment]) -> CoreResult<Vec<Record>> {
        let mut records = Vec::new();
        for segment in segments {
            records.extend(self.read_all(&segment.path)?);
        }
        Ok(records)
    }

    /// Reads the whole log in chronological segment order.
    pub fn read_log(&self, include_active: bool) -> CoreResult<Vec<Record>> {
        let segments = self.list_segments(include_active)?;
        self.read_all_segments(&segments)
    }

    /// Counts valid and invalid lines in each segment. Nothing is modified.
    pub fn verify(&self, segments: &[Segment]) -> CoreResult<VerifyReport> {
        let mut report = VerifyReport::default();
        for segment in segments {
            let reader = BufReader::new(File::open(&segment.path)?);
            let mut counts = SegmentReport::new(segment.path.clone());
            for_each_line(reader, |line| {
                counts.tally(self.cipher.decrypt(line).is_ok());
            })?;
            report.push(counts);
        }
        Ok(report)
    }

    /// Audits every segment of the log.
    pub fn verify_log(&self, include_active: bool) -> CoreResult<VerifyReport> {
        let segments = self.list_segments(include_active)?;
        self.verify(&segments)
    }

    /// Truncates the active segment to zero bytes.
    ///
    /// Unconditional; any confirmation belongs to the caller.
    pub fn clear_active(&self) -> CoreResult<()> {
        self.initialize()?;
        File::create(self.active_path())?;
        info!(path = %self.active_path().display(), "cleared active segment");
        Ok(())
    }

    /// Returns size information about the active segment.
    pub fn stats(&self) -> CoreResult<StoreStats> {
        let (exists, size) = match fs::metadata(self.active_path()) {
            Ok(metadata) => (true, metadata.len()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => (false, 0),
            Err(err) => return Err(err.into()),
        };
        Ok(StoreStats {
            exists,
            path: self.active_path().to_path_buf(),
            size,
            rotated_segments: self.list_segments(false)?.len(),
        })
    }
}

impl std::fmt::Debug for SegmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentStore")
            .field("active_path", &self.config.active_path)
            .field("prefix", &self.prefix)
            .field("max_segment_size", &self.config.max_segment_size)
            .finish_non_exhaustive()
    }
}

fn open_segment(path: &Path) -> CoreResult<Option<BufReader<File>>> {
    match File::open(path) {
        Ok(file) => Ok(Some(BufReader::new(file))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(CoreError::Io(err)),
    }
}

/// Calls `f` with every non-blank line, whitespace-trimmed.
fn for_each_line<R: BufRead>(reader: R, mut f: impl FnMut(&[u8])) -> CoreResult<()> {
    for line in reader.split(b'\n') {
        let line = line?;
        let line = line.trim_ascii();
        if !line.is_empty() {
            f(line);
        }
    }
    Ok(())
}

/// Syncs a directory so a rename or create inside it is durable.
#[cfg(unix)]
fn sync_directory(dir: &Path) -> CoreResult<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> CoreResult<()> {
    // NTFS journals metadata updates
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    const TEST_KEY: &[u8] = b"0123456789ABCDEF0123456789ABCDEF";

    fn create_store(config: impl FnOnce(StoreConfig) -> StoreConfig) -> (TempDir, SegmentStore) {
        let dir = tempdir().unwrap();
        let config = config(StoreConfig::in_dir(dir.path()));
        let key = EncryptionKey::from_bytes(TEST_KEY).unwrap();
        let store = SegmentStore::with_key(config, &key).unwrap();
        store.initialize().unwrap();
        (dir, store)
    }

    fn record(message: &str) -> Record {
        Record::new("2026-02-13T00:00:00+00:00", "darwin", "abc123", message)
    }

    fn set_age(path: &Path, age: Duration) {
        let file = OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn initialize_is_idempotent() {
        let (_dir, store) = create_store(|c| c);
        store.append(&record("kept")).unwrap();
        store.initialize().unwrap();

        assert_eq!(store.read_active().unwrap().len(), 1);
    }

    #[test]
    fn initialized_log_has_one_empty_segment() {
        let (_dir, store) = create_store(|c| c);
        let segments = store.list_segments(true).unwrap();

        assert_eq!(segments.len(), 1);
        assert!(segments[0].active);
        assert_eq!(segments[0].size, 0);
    }

    #[test]
    fn append_and_read() {
        let (_dir, store) = create_store(|c| c);
        store.append(&record("hola\nmundo")).unwrap();

        let records = store.read_active().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "hola mundo");
        assert_eq!(records[0].platform, "darwin");
    }

    #[test]
    fn append_writes_one_line_per_record() {
        let (_dir, store) = create_store(|c| c);
        for i in 0..3 {
            store.append(&record(&format!("entry {i}"))).unwrap();
        }

        let raw = fs::read_to_string(store.active_path()).unwrap();
        assert_eq!(raw.lines().count(), 3);
        assert!(raw.ends_with('\n'));
        assert!(!raw.contains("entry"));
    }

    #[test]
    fn append_message_stamps_record() {
        let (_dir, store) = create_store(|c| c);
        let stored = store.append_message("  line one\r\nline two ", "hw-9").unwrap().unwrap();

        assert_eq!(stored.message, "line one  line two");
        assert_eq!(stored.platform, PLATFORM);
        assert_eq!(stored.hardware_id, "hw-9");
        assert!(chrono::DateTime::parse_from_rfc3339(&stored.timestamp).is_ok());
        assert_eq!(store.read_active().unwrap(), vec![stored]);
    }

    #[test]
    fn append_message_ignores_blank_input() {
        let (_dir, store) = create_store(|c| c);
        assert!(store.append_message(" \n ", "hw").unwrap().is_none());
        assert_eq!(fs::metadata(store.active_path()).unwrap().len(), 0);
    }

    #[test]
    fn rotation_happens_after_crossing_write() {
        let (_dir, store) = create_store(|c| c.max_segment_size(200));

        let first = store.append(&record("first")).unwrap();
        assert!(first.rotated.is_none());
        assert!(first.segment_size <= 200);

        let mut crossing = None;
        for i in 0..10 {
            let outcome = store.append(&record(&format!("filler {i}"))).unwrap();
            if outcome.rotated.is_some() {
                crossing = Some(outcome);
                break;
            }
        }
        let crossing = crossing.expect("threshold never crossed");

        // The crossing write landed in the sealed segment.
        assert!(crossing.segment_size > 200);
        let rotated = crossing.rotated.unwrap();
        assert_eq!(fs::metadata(&rotated).unwrap().len(), crossing.segment_size);
        assert_eq!(fs::metadata(store.active_path()).unwrap().len(), 0);
        assert_eq!(store.list_segments(false).unwrap().len(), 1);
    }

    #[test]
    fn failed_rotation_keeps_the_record() {
        // The rotated name points into a directory that does not exist.
        let (_dir, store) =
            create_store(|c| c.max_segment_size(10).rotated_prefix("absent/records"));

        let outcome = store.append(&record("still stored")).unwrap();
        assert!(outcome.rotated.is_none());
        assert!(outcome.rotation_error.is_some());
        assert!(outcome.segment_size > 10);

        let second = store.append(&record("retried")).unwrap();
        assert!(second.rotation_error.is_some());

        let messages: Vec<_> = store
            .read_active()
            .unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(messages, vec!["still stored", "retried"]);
    }

    #[test]
    fn append_rejects_delimiter_in_hardware_id() {
        let (_dir, store) = create_store(|c| c);
        let err = store.append_message("hello", "hw|7").unwrap_err();
        assert!(matches!(err, CoreError::Codec(_)));

        let err = store
            .append(&Record::new("t\n", "p", "h", "m"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Codec(_)));
        assert_eq!(fs::metadata(store.active_path()).unwrap().len(), 0);

        store.append_message("a|b still fine", "hw-7").unwrap();
        let records = store.read_active().unwrap();
        assert_eq!(records[0].hardware_id, "hw-7");
        assert_eq!(records[0].message, "a|b still fine");
    }

    #[test]
    fn rotation_disabled_keeps_growing() {
        let (_dir, store) = create_store(|c| c.max_segment_size(10).rotation(false));
        for i in 0..3 {
            let outcome = store.append(&record(&format!("r{i}"))).unwrap();
            assert!(outcome.rotated.is_none());
        }
        assert!(store.list_segments(false).unwrap().is_empty());
    }

    #[test]
    fn rotate_preserves_records() {
        let (_dir, store) = create_store(|c| c);
        store.append(&record("one")).unwrap();
        let rotated = store.rotate().unwrap();
        store.append(&record("two")).unwrap();

        assert!(rotated
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("records_"));
        assert_eq!(store.read_all(&rotated).unwrap()[0].message, "one");

        let messages: Vec<_> = store
            .read_log(true)
            .unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(messages, vec!["one", "two"]);
    }

    #[test]
    fn rotations_in_same_second_do_not_collide() {
        let (_dir, store) = create_store(|c| c);
        let mut paths = Vec::new();
        for i in 0..3 {
            store.append(&record(&format!("r{i}"))).unwrap();
            paths.push(store.rotate().unwrap());
        }
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 3);
        assert_eq!(store.list_segments(false).unwrap().len(), 3);
        assert_eq!(store.read_log(true).unwrap().len(), 3);
    }

    #[test]
    fn cleanup_respects_retention_window() {
        let (_dir, store) = create_store(|c| c.retention_days(30));
        let day = Duration::from_secs(24 * 60 * 60);

        store.append(&record("old")).unwrap();
        let old = store.rotate().unwrap();
        store.append(&record("recent")).unwrap();
        let recent = store.rotate().unwrap();

        set_age(&old, day * 31);
        set_age(&recent, day * 29);
        set_age(store.active_path(), day * 365);

        assert_eq!(store.cleanup().unwrap(), 1);
        assert!(!old.exists());
        assert!(recent.exists());
        assert!(store.active_path().exists());
        assert_eq!(store.cleanup().unwrap(), 0);
    }

    #[test]
    fn list_segments_orders_by_modification_time() {
        let (_dir, store) = create_store(|c| c);
        store.append(&record("a")).unwrap();
        let first = store.rotate().unwrap();
        store.append(&record("b")).unwrap();
        let second = store.rotate().unwrap();

        // Make the later rotation look older.
        set_age(&second, Duration::from_secs(3600));
        set_age(&first, Duration::from_secs(60));

        let segments = store.list_segments(true).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].path, second);
        assert_eq!(segments[1].path, first);
        assert!(segments[2].active);
    }

    #[test]
    fn active_segment_sorts_last_on_equal_times() {
        let (_dir, store) = create_store(|c| c);
        store.append(&record("sealed")).unwrap();
        let rotated = store.rotate().unwrap();
        store.append(&record("live")).unwrap();

        let stamp = SystemTime::now() - Duration::from_secs(60);
        for path in [rotated.as_path(), store.active_path()] {
            let file = OpenOptions::new().write(true).open(path).unwrap();
            file.set_modified(stamp).unwrap();
        }

        let segments = store.list_segments(true).unwrap();
        assert_eq!(segments[0].path, rotated);
        assert!(segments[1].active);

        let messages: Vec<_> = store
            .read_log(true)
            .unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(messages, vec!["sealed", "live"]);
    }

    #[test]
    fn list_segments_ignores_unrelated_files() {
        let (dir, store) = create_store(|c| c);
        let logs = dir.path().join("logs");
        fs::write(logs.join("notes.txt"), "x").unwrap();
        fs::write(logs.join("other_20260101_000000.enc"), "x").unwrap();
        fs::create_dir(logs.join("records_20260101_000000.enc")).unwrap();

        assert_eq!(store.list_segments(true).unwrap().len(), 1);
    }

    #[test]
    fn list_segments_before_initialize_is_empty() {
        let dir = tempdir().unwrap();
        let key = EncryptionKey::from_bytes(TEST_KEY).unwrap();
        let store = SegmentStore::with_key(StoreConfig::in_dir(dir.path()), &key).unwrap();

        assert!(store.list_segments(true).unwrap().is_empty());
        assert!(store.read_active().unwrap().is_empty());
        assert!(!store.stats().unwrap().exists);
    }

    #[test]
    fn append_without_directory_fails_with_io() {
        let dir = tempdir().unwrap();
        let key = EncryptionKey::from_bytes(TEST_KEY).unwrap();
        let store = SegmentStore::with_key(StoreConfig::in_dir(dir.path()), &key).unwrap();

        let err = store.append(&record("x")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[test]
    fn corrupt_lines_are_skipped_on_read() {
        let (_dir, store) = create_store(|c| c);
        store.append(&record("before")).unwrap();
        {
            let mut file = OpenOptions::new()
                .append(true)
                .open(store.active_path())
                .unwrap();
            file.write_all(b"garbage-line\n\n   \n").unwrap();
        }
        store.append(&record("after")).unwrap();

        let messages: Vec<_> = store
            .read_active()
            .unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(messages, vec!["before", "after"]);
    }

    #[test]
    fn partial_trailing_line_reads_as_invalid() {
        let (_dir, store) = create_store(|c| c);
        store.append(&record("whole")).unwrap();
        let blob = store.cipher().encrypt(b"t|p|h|cut").unwrap();
        {
            let mut file = OpenOptions::new()
                .append(true)
                .open(store.active_path())
                .unwrap();
            file.write_all(&blob.as_bytes()[..blob.len() / 2]).unwrap();
        }

        assert_eq!(store.read_active().unwrap().len(), 1);
        let report = store.verify_log(true).unwrap();
        assert_eq!((report.total.valid, report.total.invalid), (1, 1));
    }

    #[test]
    fn verify_counts_tampered_line() {
        let (_dir, store) = create_store(|c| c);
        store.append(&record("intact")).unwrap();
        store.append(&record("tampered")).unwrap();

        let raw = fs::read_to_string(store.active_path()).unwrap();
        let mut lines: Vec<String> = raw.lines().map(str::to_string).collect();
        let mut bytes = lines[1].clone().into_bytes();
        bytes[10] = if bytes[10] == b'A' { b'B' } else { b'A' };
        lines[1] = String::from_utf8(bytes).unwrap();
        fs::write(store.active_path(), lines.join("\n") + "\n").unwrap();

        let report = store.verify_log(true).unwrap();
        assert_eq!(report.segments.len(), 1);
        assert_eq!(report.segments[0].lines, 2);
        assert_eq!(report.segments[0].valid, 1);
        assert_eq!(report.segments[0].invalid, 1);
        assert_eq!(report.total.segments, 1);

        // Verification is read-only.
        assert_eq!(fs::read_to_string(store.active_path()).unwrap(), lines.join("\n") + "\n");
    }

    #[test]
    fn verify_missing_segment_is_io_error() {
        let (_dir, store) = create_store(|c| c);
        let mut segments = store.list_segments(true).unwrap();
        segments[0].path = store.config().segment_dir().join("records_gone.enc");

        assert!(matches!(store.verify(&segments), Err(CoreError::Io(_))));
    }

    #[test]
    fn wrong_key_reads_nothing() {
        let (dir, store) = create_store(|c| c);
        store.append(&record("secret")).unwrap();

        let other = SegmentStore::with_key(
            StoreConfig::in_dir(dir.path()),
            &EncryptionKey::generate(),
        )
        .unwrap();
        assert!(other.read_active().unwrap().is_empty());
        assert_eq!(other.verify_log(true).unwrap().total.invalid, 1);
    }

    #[test]
    fn clear_active_truncates() {
        let (_dir, store) = create_store(|c| c);
        store.append(&record("gone")).unwrap();
        store.clear_active().unwrap();

        assert_eq!(fs::metadata(store.active_path()).unwrap().len(), 0);
        assert!(store.read_active().unwrap().is_empty());
    }

    #[test]
    fn stats_report_active_segment() {
        let (_dir, store) = create_store(|c| c);
        let outcome = store.append(&record("x")).unwrap();
        store.rotate().unwrap();
        store.append(&record("y")).unwrap();

        let stats = store.stats().unwrap();
        assert!(stats.exists);
        assert_eq!(stats.size, outcome.bytes_written);
        assert_eq!(stats.rotated_segments, 1);
        assert_eq!(stats.path, store.active_path());
    }

    #[test]
    fn open_creates_key_file() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::in_dir(dir.path());
        let key_path = config.key_path.clone();

        let store = SegmentStore::open(config.clone()).unwrap();
        assert!(key_path.exists());
        store.initialize().unwrap();
        store.append(&record("persisted")).unwrap();

        let reopened = SegmentStore::open(config).unwrap();
        assert_eq!(reopened.key_fingerprint(), store.key_fingerprint());
        assert_eq!(reopened.read_active().unwrap()[0].message, "persisted");
    }
}
