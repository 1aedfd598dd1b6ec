use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use cas_types::ContentAddress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::object::{PutOutcome, StoreStats, StoredObject};
use crate::traits::ObjectStore;

/// Magic bytes at the start of every object file.
const MAGIC: &[u8; 4] = b"CAS1";

/// Header size: 4 bytes magic + 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 12;

/// Bytes a record adds on top of its payload: header, timestamp, and the
/// bincode length prefix of the payload.
const RECORD_OVERHEAD: u64 = HEADER_SIZE as u64 + 8 + 8;

/// Name prefix of in-flight temporary files.
const TMP_PREFIX: &str = ".tmp-";

/// Temporary files younger than this may belong to a live writer in another
/// process and are left alone on open.
const STALE_TEMP_AGE: Duration = Duration::from_secs(15 * 60);

/// Subdirectory of the store root holding the fan-out tree.
const OBJECTS_DIR: &str = "objects";

/// Serialized body of an object file, as read back.
#[derive(Deserialize)]
struct ObjectRecord {
    created_at_ms: i64,
    payload: Vec<u8>,
}

/// Write-side view of [`ObjectRecord`] borrowing the caller's payload.
/// Encodes to the same bytes.
#[derive(Serialize)]
struct ObjectRecordRef<'a> {
    created_at_ms: i64,
    payload: &'a [u8],
}

/// Disk-backed object store.
///
/// Each object lives in its own file at `<root>/objects/<2 hex>/<62 hex>`.
///
/// On-disk format of an object file:
/// ```text
/// [4 bytes: magic "CAS1"]
/// [4 bytes: body length (little-endian u32)]
/// [4 bytes: CRC32 of body (little-endian u32)]
/// [N bytes: body (bincode-serialized { created_at_ms, payload })]
/// ```
///
/// A put writes the complete file under a temporary name in the target
/// directory, syncs it, and links it into place only if no file exists under
/// the final name. Readers therefore see either nothing or a whole record,
/// and racing writers of one address produce exactly one file.
pub struct FileObjectStore {
    root: PathBuf,
    objects: PathBuf,
}

impl FileObjectStore {
    /// Open (or create) a store rooted at `root`.
    ///
    /// Temporary files left behind by an interrupted writer are removed once
    /// they are older than a grace period; younger ones may still be in use
    /// by another process sharing the directory.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        let objects = root.join(OBJECTS_DIR);
        fs::create_dir_all(&objects)?;

        let store = Self { root, objects };
        let removed = store.remove_stale_temp_files()?;
        if removed > 0 {
            warn!(removed, "removed stale temporary object files");
        }
        info!(root = %store.root.display(), "opened file object store");
        Ok(store)
    }

    /// The directory this store was opened on.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `address`.
    pub fn object_path(&self, address: &ContentAddress) -> PathBuf {
        let hex = address.to_hex();
        self.objects.join(&hex[..2]).join(&hex[2..])
    }

    fn remove_stale_temp_files(&self) -> StoreResult<usize> {
        let now = SystemTime::now();
        let mut removed = 0;
        for entry in WalkDir::new(&self.objects).min_depth(2).max_depth(2) {
            let entry = entry.map_err(walk_error)?;
            if !entry.file_type().is_file() || !is_temp_name(entry.file_name()) {
                continue;
            }
            let modified = entry.metadata().map_err(walk_error)?.modified()?;
            // A clock step backwards reads as "just written".
            let age = now.duration_since(modified).unwrap_or_default();
            if age < STALE_TEMP_AGE {
                debug!(path = %entry.path().display(), "keeping recent temporary file");
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                // Its writer finished or another opener got there first.
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }

    fn encode_record(created_at: DateTime<Utc>, payload: &[u8]) -> StoreResult<Vec<u8>> {
        let record = ObjectRecordRef {
            created_at_ms: created_at.timestamp_millis(),
            payload,
        };
        let body =
            bincode::serialize(&record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let length = u32::try_from(body.len()).map_err(|_| {
            StoreError::Serialization(format!("record of {} bytes is too large", body.len()))
        })?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&length.to_le_bytes());
        buf.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    fn decode_record(address: &ContentAddress, bytes: &[u8]) -> StoreResult<StoredObject> {
        let corrupt = |reason: String| StoreError::Corrupt {
            address: *address,
            reason,
        };

        if bytes.len() < HEADER_SIZE {
            return Err(corrupt(format!("truncated header ({} bytes)", bytes.len())));
        }
        if &bytes[0..4] != MAGIC {
            return Err(corrupt("bad magic".into()));
        }
        let length = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let expected_crc = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let body = &bytes[HEADER_SIZE..];
        if body.len() != length {
            return Err(corrupt(format!(
                "length mismatch: header says {length}, file has {}",
                body.len()
            )));
        }
        let actual_crc = crc32fast::hash(body);
        if actual_crc != expected_crc {
            return Err(corrupt(format!(
                "CRC mismatch: expected {expected_crc:08x}, computed {actual_crc:08x}"
            )));
        }

        let record: ObjectRecord =
            bincode::deserialize(body).map_err(|e| corrupt(format!("undecodable body: {e}")))?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(record.created_at_ms)
            .ok_or_else(|| corrupt(format!("timestamp out of range: {}", record.created_at_ms)))?;

        Ok(StoredObject {
            address: *address,
            payload: record.payload,
            created_at,
        })
    }
}

impl ObjectStore for FileObjectStore {
    fn put(&self, address: &ContentAddress, payload: &[u8]) -> StoreResult<PutOutcome> {
        let path = self.object_path(address);
        if path.try_exists()? {
            return Ok(PutOutcome::AlreadyPresent);
        }

        let dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "object path has no parent"))?;
        fs::create_dir_all(dir)?;

        let frame = Self::encode_record(Utc::now(), payload)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(TMP_PREFIX)
            .tempfile_in(dir)?;
        tmp.write_all(&frame)?;
        tmp.as_file().sync_all()?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                sync_dir(dir)?;
                debug!(address = %address.short_hex(), size = payload.len(), "file put");
                Ok(PutOutcome::Created)
            }
            // Another writer linked the same address first. The temporary
            // file is removed when the returned handle drops.
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Ok(PutOutcome::AlreadyPresent)
            }
            Err(e) => Err(StoreError::Io(e.error)),
        }
    }

    fn get(&self, address: &ContentAddress) -> StoreResult<StoredObject> {
        let bytes = match fs::read(self.object_path(address)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*address))
            }
            Err(e) => return Err(e.into()),
        };
        Self::decode_record(address, &bytes)
    }

    fn exists(&self, address: &ContentAddress) -> bool {
        match self.object_path(address).try_exists() {
            Ok(present) => present,
            Err(e) => {
                warn!(address = %address.short_hex(), error = %e, "exists check failed");
                false
            }
        }
    }

    fn stats(&self) -> StoreResult<StoreStats> {
        let mut stats = StoreStats::default();
        for entry in WalkDir::new(&self.objects).min_depth(2).max_depth(2) {
            let entry = entry.map_err(walk_error)?;
            if !entry.file_type().is_file() || is_temp_name(entry.file_name()) {
                continue;
            }
            let len = entry.metadata().map_err(walk_error)?.len();
            stats.objects += 1;
            stats.total_bytes += len.saturating_sub(RECORD_OVERHEAD);
        }
        Ok(stats)
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

impl std::fmt::Debug for FileObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileObjectStore")
            .field("root", &self.root)
            .finish()
    }
}

fn is_temp_name(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with(TMP_PREFIX))
}

fn walk_error(e: walkdir::Error) -> StoreError {
    StoreError::Io(e.into())
}

/// Make the new directory entry durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cas_crypto::AddressCodec;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn addr(content: &[u8]) -> ContentAddress {
        AddressCodec::default().derive(content)
    }

    #[test]
    fn put_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::open(dir.path()).unwrap();
        let a = addr(b"hello world");

        assert_eq!(store.put(&a, b"hello world").unwrap(), PutOutcome::Created);
        let obj = store.get(&a).unwrap();
        assert_eq!(obj.address, a);
        assert_eq!(obj.payload, b"hello world");
    }

    #[test]
    fn layout_uses_fanout_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::open(dir.path()).unwrap();
        let a = addr(b"layout");
        store.put(&a, b"layout").unwrap();

        let hex = a.to_hex();
        let expected = dir.path().join("objects").join(&hex[..2]).join(&hex[2..]);
        assert_eq!(store.object_path(&a), expected);
        assert!(expected.is_file());
    }

    #[test]
    fn get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::open(dir.path()).unwrap();
        let a = addr(b"never written");
        assert!(matches!(store.get(&a), Err(StoreError::NotFound(x)) if x == a));
        assert!(!store.exists(&a));
    }

    #[test]
    fn second_put_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::open(dir.path()).unwrap();
        let a = addr(b"once");
        store.put(&a, b"once").unwrap();
        let first = store.get(&a).unwrap();

        assert_eq!(
            store.put(&a, b"different bytes").unwrap(),
            PutOutcome::AlreadyPresent
        );
        let again = store.get(&a).unwrap();
        assert_eq!(again.payload, b"once");
        assert_eq!(again.created_at, first.created_at);
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let a = addr(b"durable");
        {
            let store = FileObjectStore::open(dir.path()).unwrap();
            store.put(&a, b"durable").unwrap();
        }
        let store = FileObjectStore::open(dir.path()).unwrap();
        assert!(store.exists(&a));
        assert_eq!(store.get(&a).unwrap().payload, b"durable");
    }

    #[test]
    fn flipped_byte_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::open(dir.path()).unwrap();
        let a = addr(b"fragile payload");
        store.put(&a, b"fragile payload").unwrap();

        let path = store.object_path(&a);
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, &bytes).unwrap();

        let err = store.get(&a).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref reason, .. } if reason.contains("CRC")));
    }

    #[test]
    fn truncated_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::open(dir.path()).unwrap();
        let a = addr(b"truncate me");
        store.put(&a, b"truncate me").unwrap();

        let path = store.object_path(&a);
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();
        assert!(matches!(store.get(&a), Err(StoreError::Corrupt { .. })));

        fs::write(&path, &bytes[..5]).unwrap();
        assert!(matches!(store.get(&a), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn bad_magic_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::open(dir.path()).unwrap();
        let a = addr(b"magic");
        store.put(&a, b"magic").unwrap();

        let path = store.object_path(&a);
        let mut bytes = fs::read(&path).unwrap();
        bytes[0] = b'X';
        fs::write(&path, &bytes).unwrap();
        let err = store.get(&a).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref reason, .. } if reason == "bad magic"));
    }

    fn write_aged(path: &Path, age: Duration) {
        fs::write(path, b"partial").unwrap();
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn stale_temp_files_are_removed_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let fanout = dir.path().join("objects").join("ab");
        fs::create_dir_all(&fanout).unwrap();
        let stale = fanout.join(".tmp-crashed");
        write_aged(&stale, STALE_TEMP_AGE + Duration::from_secs(60));

        let store = FileObjectStore::open(dir.path()).unwrap();
        assert!(!stale.exists());
        assert_eq!(store.stats().unwrap().objects, 0);
    }

    #[test]
    fn recent_temp_files_survive_open() {
        let dir = tempfile::tempdir().unwrap();
        let fanout = dir.path().join("objects").join("cd");
        fs::create_dir_all(&fanout).unwrap();
        let in_flight = fanout.join(".tmp-writing");
        fs::write(&in_flight, b"partial").unwrap();

        let store = FileObjectStore::open(dir.path()).unwrap();
        assert!(in_flight.exists());
        assert_eq!(store.stats().unwrap().objects, 0);

        // A second opener on the same directory must not break a put in flight.
        let _other = FileObjectStore::open(dir.path()).unwrap();
        assert!(in_flight.exists());
        let a = addr(b"still works");
        assert_eq!(store.put(&a, b"still works").unwrap(), PutOutcome::Created);
    }

    #[test]
    fn borrowed_record_matches_owned_layout() {
        let created_at = Utc::now();
        let frame = FileObjectStore::encode_record(created_at, b"layout check").unwrap();
        let body = &frame[HEADER_SIZE..];
        let record: ObjectRecord = bincode::deserialize(body).unwrap();
        assert_eq!(record.payload, b"layout check");
        assert_eq!(record.created_at_ms, created_at.timestamp_millis());
        assert_eq!(frame.len() as u64, RECORD_OVERHEAD + b"layout check".len() as u64);

        let a = addr(b"layout check");
        let decoded = FileObjectStore::decode_record(&a, &frame).unwrap();
        assert_eq!(decoded.payload, b"layout check");
        assert_eq!(decoded.created_at.timestamp_millis(), created_at.timestamp_millis());
    }

    #[test]
    fn stats_count_payload_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::open(dir.path()).unwrap();
        store.put(&addr(b"12345"), b"12345").unwrap();
        store.put(&addr(b"123456789"), b"123456789").unwrap();
        assert_eq!(
            store.stats().unwrap(),
            StoreStats {
                objects: 2,
                total_bytes: 14
            }
        );
    }

    #[test]
    fn concurrent_identical_puts_create_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileObjectStore::open(dir.path()).unwrap());
        let a = addr(b"contended");
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.put(&a, b"contended").unwrap()
                })
            })
            .collect();

        let created = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .filter(PutOutcome::is_created)
            .count();
        assert_eq!(created, 1);
        assert_eq!(store.stats().unwrap().objects, 1);
        assert_eq!(store.get(&a).unwrap().payload, b"contended");
    }

    #[test]
    fn debug_and_backend() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::open(dir.path()).unwrap();
        assert!(format!("{store:?}").contains("FileObjectStore"));
        assert_eq!(store.backend(), "file");
        assert_eq!(store.root(), dir.path());
    }
}
