//! Event file I/O: TFRecord-framed protobuf events on disk.
//!
//! Every record is laid out as
//!
//! ```text
//! [len: u64 LE][masked crc32c(len): u32 LE][payload: len bytes][masked crc32c(payload): u32 LE]
//! ```
//!
//! The writer keeps no userspace buffer: each record is framed in memory and
//! handed to the OS with a single `write_all`. A process forked between two
//! calls therefore inherits nothing half-written.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use prost::Message;
use tracing::{debug, info};

use crate::error::{Result, ScalarLogError};
use crate::models::Event;
use crate::sink::EventSink;

/// Every event file name starts with this.
pub const FILE_PREFIX: &str = "events.out.tfevents";

const MASK_DELTA: u32 = 0xa282_ead8;

// ─── Framing ─────────────────────────────────────────────────────────────────

fn masked_crc(data: &[u8]) -> u32 {
    let crc = crc32c::crc32c(data);
    crc.rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Frame an encoded payload as one TFRecord.
pub fn frame_record(payload: &[u8]) -> Vec<u8> {
    let len = (payload.len() as u64).to_le_bytes();
    let mut buf = Vec::with_capacity(payload.len() + 16);
    buf.extend_from_slice(&len);
    buf.extend_from_slice(&masked_crc(&len).to_le_bytes());
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&masked_crc(payload).to_le_bytes());
    buf
}

/// Read one framed payload. `Ok(None)` on a clean end of stream.
fn read_record<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 8];
    match reader.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let mut crc_buf = [0u8; 4];
    reader.read_exact(&mut crc_buf)?;
    if u32::from_le_bytes(crc_buf) != masked_crc(&len_buf) {
        return Err(ScalarLogError::Corrupt("length checksum mismatch".into()));
    }

    let len = u64::from_le_bytes(len_buf);
    let len = usize::try_from(len)
        .map_err(|_| ScalarLogError::Corrupt(format!("record length {len} too large")))?;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;

    reader.read_exact(&mut crc_buf)?;
    if u32::from_le_bytes(crc_buf) != masked_crc(&payload) {
        return Err(ScalarLogError::Corrupt("payload checksum mismatch".into()));
    }
    Ok(Some(payload))
}

// ─── Writer ──────────────────────────────────────────────────────────────────

/// Event file name for a writer created at `unix_secs`.
///
/// The pid and a random tag keep names unique between writers that open in
/// the same second, including a forked child and its parent.
pub fn event_file_name(unix_secs: i64, suffix: &str) -> String {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{FILE_PREFIX}.{unix_secs:010}.{}.{}{suffix}",
        std::process::id(),
        &tag[..8]
    )
}

/// Append-only writer for a single event file it created itself.
#[derive(Debug)]
pub struct EventFileWriter {
    path: PathBuf,
    file: Option<File>,
}

impl EventFileWriter {
    /// Create `dir` (and parents) if needed, then a fresh event file inside it.
    pub fn create(dir: &Path) -> Result<Self> {
        Self::create_with_suffix(dir, "")
    }

    pub fn create_with_suffix(dir: &Path, suffix: &str) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let now = chrono::Utc::now();
        let path = dir.join(event_file_name(now.timestamp(), suffix));
        let file = OpenOptions::new().create_new(true).append(true).open(&path)?;

        let mut writer = Self {
            path,
            file: Some(file),
        };
        writer.append(&Event::version_record(crate::clock::to_unix_secs(now)))?;
        writer.flush()?;

        info!(path = %writer.path.display(), "Event file opened");
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn file(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(|| {
            ScalarLogError::InvalidState(format!(
                "event file {} is closed",
                self.path.display()
            ))
        })
    }
}

impl EventSink for EventFileWriter {
    fn append(&mut self, event: &Event) -> Result<()> {
        let record = frame_record(&event.encode_to_vec());
        self.file()?.write_all(&record)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.file()?.flush()?;
        Ok(())
    }

    /// Sync and release the file. Closing twice is a no-op.
    fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
            debug!(path = %self.path.display(), "Event file closed");
        }
        Ok(())
    }
}

// ─── Reader ──────────────────────────────────────────────────────────────────

/// Sequential reader over the events of one file, metadata record included.
pub struct EventFileReader<R = BufReader<File>> {
    reader: R,
    done: bool,
}

impl EventFileReader {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> EventFileReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }
}

impl<R: Read> Iterator for EventFileReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let decoded = match read_record(&mut self.reader) {
            Ok(Some(payload)) => Event::decode(payload.as_slice()).map_err(Into::into),
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(e),
        };
        if decoded.is_err() {
            self.done = true;
        }
        Some(decoded)
    }
}

/// Read every event in `path`.
pub fn read_events(path: &Path) -> Result<Vec<Event>> {
    EventFileReader::open(path)?.collect()
}

/// Event files directly inside `dir`, sorted by name (creation order for
/// files written in different seconds).
pub fn find_event_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().contains("tfevents") {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_masked_crc_known_value() {
        // crc32c("123456789") = 0xE3069283
        let crc: u32 = 0xE306_9283;
        assert_eq!(crc32c::crc32c(b"123456789"), crc);
        assert_eq!(
            masked_crc(b"123456789"),
            crc.rotate_right(15).wrapping_add(MASK_DELTA)
        );
    }

    #[test]
    fn test_frame_layout() {
        let framed = frame_record(b"abc");
        assert_eq!(framed.len(), 8 + 4 + 3 + 4);
        assert_eq!(&framed[..8], &3u64.to_le_bytes());
        assert_eq!(&framed[12..15], b"abc");
    }

    #[test]
    fn test_reader_detects_flipped_payload_byte() {
        let event = Event::scalar("x", 1.0, 1.0, 0);
        let mut framed = frame_record(&event.encode_to_vec());
        framed[13] ^= 0xff;

        let mut reader = EventFileReader::new(Cursor::new(framed));
        assert!(matches!(reader.next(), Some(Err(ScalarLogError::Corrupt(_)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_reader_errors_on_truncated_record() {
        let event = Event::scalar("x", 1.0, 1.0, 0);
        let mut framed = frame_record(&event.encode_to_vec());
        framed.truncate(framed.len() - 2);

        let mut reader = EventFileReader::new(Cursor::new(framed));
        assert!(matches!(reader.next(), Some(Err(ScalarLogError::Io(_)))));
    }

    #[test]
    fn test_create_writes_file_version_first() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested/logs");
        let mut writer = EventFileWriter::create(&dir).unwrap();
        writer.append(&Event::scalar("a", 2.0, 5.0, 3)).unwrap();
        writer.close().unwrap();

        let name = writer.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(FILE_PREFIX));

        let events = read_events(writer.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].file_version.as_deref(), Some(crate::models::FILE_VERSION));
        assert_eq!(events[1].scalars().collect::<Vec<_>>(), vec![("a", 2.0f32)]);
        assert_eq!(events[1].step, 3);
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_appends() {
        let tmp = TempDir::new().unwrap();
        let mut writer = EventFileWriter::create(tmp.path()).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.is_closed());
        assert!(matches!(
            writer.append(&Event::scalar("a", 1.0, 1.0, 0)),
            Err(ScalarLogError::InvalidState(_))
        ));
    }

    #[test]
    fn test_two_writers_same_dir_get_distinct_files() {
        let tmp = TempDir::new().unwrap();
        let a = EventFileWriter::create(tmp.path()).unwrap();
        let b = EventFileWriter::create(tmp.path()).unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(find_event_files(tmp.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_find_event_files_ignores_other_entries() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(tmp.path().join("tfevents_dir")).unwrap();
        let writer = EventFileWriter::create_with_suffix(tmp.path(), ".v2").unwrap();

        let files = find_event_files(tmp.path()).unwrap();
        assert_eq!(files, vec![writer.path().to_path_buf()]);
        assert!(files[0].to_string_lossy().ends_with(".v2"));
        assert!(find_event_files(&tmp.path().join("missing")).unwrap().is_empty());
    }
}
