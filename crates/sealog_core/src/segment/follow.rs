//! Incremental reads of the active segment.

use crate::error::CoreResult;
use crate::segment::store::SegmentStore;
use sealog_codec::Record;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Upper bound on the bytes read when capturing a segment's first line.
const MAX_HEAD_LEN: u64 = 64 * 1024;

/// Tracks a byte offset into the active segment and returns records appended
/// since the previous poll.
///
/// Only complete lines are consumed; a trailing line without its terminator
/// stays in the file until a later poll sees the newline.
///
/// When the followed segment is replaced (rotated away or cleared), the
/// follower first finishes the rotated segment from the saved offset, then
/// reads any segments sealed after it, then starts over on the new active
/// segment. A segment is recognised by its file id where the platform
/// exposes one (Unix), and otherwise by its first line, which is unique
/// because every blob carries a random nonce. Without a file id, a segment
/// that was still empty at the last poll cannot be recognised after it is
/// rotated, so its records are missed.
#[derive(Debug, Clone)]
pub struct Follower {
    path: PathBuf,
    offset: u64,
    identity: SegmentIdentity,
}

impl Follower {
    /// Creates a follower for the store's active segment.
    ///
    /// With `from_start` the first poll returns everything already stored;
    /// otherwise only records appended after this call are returned.
    pub fn new(store: &SegmentStore, from_start: bool) -> CoreResult<Self> {
        let path = store.active_path().to_path_buf();
        let (offset, identity) = match open(&path)? {
            Some(file) => {
                let len = if from_start { 0 } else { file.metadata()?.len() };
                (len, SegmentIdentity::of(&file)?)
            }
            None => (0, SegmentIdentity::default()),
        };
        Ok(Self {
            path,
            offset,
            identity,
        })
    }

    /// Byte offset of the next unread line.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the records appended since the last poll.
    ///
    /// Lines that fail to decrypt are skipped.
    pub fn poll(&mut self, store: &SegmentStore) -> CoreResult<Vec<Record>> {
        // Missing between a rotation's rename and create.
        let Some(mut file) = open(&self.path)? else {
            return Ok(Vec::new());
        };
        let current = SegmentIdentity::of(&file)?;

        let mut records = Vec::new();
        if !self.identity.continues_as(&current) {
            records = self.drain_sealed(store)?;
            debug!(
                path = %self.path.display(),
                drained = records.len(),
                "active segment replaced, following from start"
            );
            self.offset = 0;
        } else if file.metadata()?.len() < self.offset {
            debug!(path = %self.path.display(), "segment shrank, following from start");
            self.offset = 0;
        }
        self.identity = current;

        let (fresh, consumed) = read_lines(&mut file, self.offset, store, false)?;
        self.offset += consumed;
        records.extend(fresh);
        Ok(records)
    }

    /// Reads the unread tail of the segment this follower was on before it
    /// was rotated, plus every segment sealed after it.
    fn drain_sealed(&self, store: &SegmentStore) -> CoreResult<Vec<Record>> {
        if !self.identity.is_known() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut found = false;
        for segment in store.list_segments(false)? {
            if found {
                records.extend(store.read_all(&segment.path)?);
                continue;
            }
            let Some(mut file) = open(&segment.path)? else {
                continue;
            };
            if self.identity.same_segment(&SegmentIdentity::of(&file)?) {
                let (tail, _) = read_lines(&mut file, self.offset, store, true)?;
                debug!(path = %segment.path.display(), records = tail.len(), "drained rotated segment");
                records.extend(tail);
                found = true;
            }
        }
        Ok(records)
    }
}

/// What a follower remembers about the segment it is reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SegmentIdentity {
    file_id: Option<(u64, u64)>,
    head: Option<Vec<u8>>,
}

impl SegmentIdentity {
    fn of(file: &File) -> io::Result<Self> {
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(0))?;
        let mut head = Vec::new();
        reader.take(MAX_HEAD_LEN).read_until(b'\n', &mut head)?;
        let head = (head.last() == Some(&b'\n')).then_some(head);
        Ok(Self {
            file_id: file_id(file)?,
            head,
        })
    }

    fn is_known(&self) -> bool {
        self.file_id.is_some() || self.head.is_some()
    }

    /// True if `later` is this segment, possibly grown since.
    fn continues_as(&self, later: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.file_id, later.file_id) {
            if a != b {
                return false;
            }
        }
        match (&self.head, &later.head) {
            (Some(a), Some(b)) => a == b,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    fn same_segment(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.file_id, other.file_id) {
            return a == b;
        }
        matches!((&self.head, &other.head), (Some(a), Some(b)) if a == b)
    }
}

#[cfg(unix)]
fn file_id(file: &File) -> io::Result<Option<(u64, u64)>> {
    use std::os::unix::fs::MetadataExt;

    let metadata = file.metadata()?;
    Ok(Some((metadata.dev(), metadata.ino())))
}

#[cfg(not(unix))]
fn file_id(_file: &File) -> io::Result<Option<(u64, u64)>> {
    Ok(None)
}

fn open(path: &Path) -> CoreResult<Option<File>> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Decodes the lines after `offset` and returns them with the number of bytes
/// consumed. Without `sealed`, an unterminated last line is left unread.
fn read_lines(
    file: &mut File,
    offset: u64,
    store: &SegmentStore,
    sealed: bool,
) -> CoreResult<(Vec<Record>, u64)> {
    file.seek(SeekFrom::Start(offset))?;
    let mut chunk = Vec::new();
    file.read_to_end(&mut chunk)?;

    let consumed = if sealed {
        chunk.len()
    } else {
        chunk.iter().rposition(|&b| b == b'\n').map_or(0, |end| end + 1)
    };

    let records = chunk[..consumed]
        .split(|&b| b == b'\n')
        .map(<[u8]>::trim_ascii)
        .filter(|line| !line.is_empty())
        .filter_map(|line| store.decode_line(line).ok())
        .collect();
    Ok((records, consumed as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::crypto::EncryptionKey;
    use std::fs::OpenOptions;
    use std::io::Write;
    use tempfile::{tempdir, TempDir};

    fn create_store(config: impl FnOnce(StoreConfig) -> StoreConfig) -> (TempDir, SegmentStore) {
        let dir = tempdir().unwrap();
        let store = SegmentStore::with_key(
            config(StoreConfig::in_dir(dir.path())),
            &EncryptionKey::from_bytes(&[9u8; 32]).unwrap(),
        )
        .unwrap();
        store.initialize().unwrap();
        (dir, store)
    }

    fn append(store: &SegmentStore, message: &str) {
        store.append_message(message, "hw").unwrap();
    }

    fn messages(records: Vec<Record>) -> Vec<String> {
        records.into_iter().map(|r| r.message).collect()
    }

    #[test]
    fn follows_new_records_only() {
        let (_dir, store) = create_store(|c| c);
        append(&store, "old");

        let mut follower = Follower::new(&store, false).unwrap();
        assert!(follower.poll(&store).unwrap().is_empty());

        append(&store, "new 1");
        append(&store, "new 2");
        assert_eq!(messages(follower.poll(&store).unwrap()), vec!["new 1", "new 2"]);
        assert!(follower.poll(&store).unwrap().is_empty());
    }

    #[test]
    fn from_start_returns_existing() {
        let (_dir, store) = create_store(|c| c);
        append(&store, "old");

        let mut follower = Follower::new(&store, true).unwrap();
        assert_eq!(follower.offset(), 0);
        assert_eq!(messages(follower.poll(&store).unwrap()), vec!["old"]);
    }

    #[test]
    fn partial_line_waits_for_newline() {
        let (_dir, store) = create_store(|c| c);
        let mut follower = Follower::new(&store, false).unwrap();

        append(&store, "complete");
        let blob = store.cipher().encrypt(b"t|p|h|pending").unwrap();
        let (head, tail) = blob.split_at(blob.len() / 2);
        let mut file = OpenOptions::new()
            .append(true)
            .open(store.active_path())
            .unwrap();
        file.write_all(head.as_bytes()).unwrap();

        assert_eq!(messages(follower.poll(&store).unwrap()), vec!["complete"]);
        let after_complete = follower.offset();

        file.write_all(tail.as_bytes()).unwrap();
        file.write_all(b"\n").unwrap();
        assert_eq!(messages(follower.poll(&store).unwrap()), vec!["pending"]);
        assert!(follower.offset() > after_complete);
    }

    #[test]
    fn restarts_after_rotation() {
        let (_dir, store) = create_store(|c| c);
        let mut follower = Follower::new(&store, false).unwrap();
        append(&store, "before rotation with a longer message");
        assert_eq!(follower.poll(&store).unwrap().len(), 1);

        store.rotate().unwrap();
        append(&store, "after");
        assert_eq!(messages(follower.poll(&store).unwrap()), vec!["after"]);
    }

    #[test]
    fn sees_every_record_across_size_rotations() {
        let (_dir, store) = create_store(|c| c.max_segment_size(200));
        let mut follower = Follower::new(&store, false).unwrap();

        let mut seen = Vec::new();
        let expected: Vec<String> = (0..6).map(|i| format!("message number {i}")).collect();
        for message in &expected {
            append(&store, message);
            seen.extend(messages(follower.poll(&store).unwrap()));
        }

        assert!(!store.list_segments(false).unwrap().is_empty());
        assert_eq!(seen, expected);
    }

    #[test]
    fn new_segment_is_read_from_its_start() {
        let (_dir, store) = create_store(|c| c);
        let mut follower = Follower::new(&store, false).unwrap();
        append(&store, "a");
        assert_eq!(messages(follower.poll(&store).unwrap()), vec!["a"]);

        store.rotate().unwrap();
        let long = "a considerably longer record written after rotation";
        append(&store, long);
        append(&store, "second");
        assert_eq!(messages(follower.poll(&store).unwrap()), vec![long, "second"]);
    }

    #[test]
    fn several_rotations_between_polls() {
        let (_dir, store) = create_store(|c| c);
        let mut follower = Follower::new(&store, false).unwrap();
        append(&store, "a");
        assert_eq!(follower.poll(&store).unwrap().len(), 1);

        append(&store, "b");
        store.rotate().unwrap();
        append(&store, "c");
        store.rotate().unwrap();
        append(&store, "d");
        assert_eq!(messages(follower.poll(&store).unwrap()), vec!["b", "c", "d"]);
    }

    #[cfg(unix)]
    #[test]
    fn empty_segment_rotated_before_first_poll() {
        let (_dir, store) = create_store(|c| c);
        let mut follower = Follower::new(&store, false).unwrap();

        append(&store, "one");
        store.rotate().unwrap();
        append(&store, "two");
        assert_eq!(messages(follower.poll(&store).unwrap()), vec!["one", "two"]);
    }

    #[test]
    fn cleared_segment_regrowing_past_offset() {
        let (_dir, store) = create_store(|c| c);
        let mut follower = Follower::new(&store, false).unwrap();
        append(&store, "x");
        assert_eq!(follower.poll(&store).unwrap().len(), 1);

        store.clear_active().unwrap();
        append(&store, "first after clear, long enough to pass the old offset");
        append(&store, "second after clear");
        assert_eq!(
            messages(follower.poll(&store).unwrap()),
            vec![
                "first after clear, long enough to pass the old offset",
                "second after clear"
            ]
        );
    }

    #[test]
    fn skips_corrupt_lines() {
        let (_dir, store) = create_store(|c| c);
        let mut follower = Follower::new(&store, false).unwrap();
        append(&store, "good");
        OpenOptions::new()
            .append(true)
            .open(store.active_path())
            .unwrap()
            .write_all(b"@@corrupt@@\n")
            .unwrap();

        assert_eq!(messages(follower.poll(&store).unwrap()), vec!["good"]);
    }
}
