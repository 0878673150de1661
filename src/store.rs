//! Content-addressable object store
//!
//! Persists blobs, trees and commits under their content identity in a
//! sharded directory layout:
//!
//! ```text
//! <root>/
//! ├── metadata.json     # Repository format metadata
//! ├── objects/          # Content-addressable objects (sharded)
//! │   └── <prefix>/     # First 2 chars of the identity
//! │       └── <suffix>  # Remaining 38 chars
//! ├── refs/heads/       # Branch pointers (owned by RefStore)
//! ├── HEAD              # Symbolic pointer (owned by RefStore)
//! └── index.json        # Staged index (owned by StagedIndex)
//! ```
//!
//! Writes are append-only: a new identity produces a new file and an
//! existing object is never rewritten, so `put` of identical content is
//! an idempotent no-op. There is no deletion. Every `get` re-verifies
//! the stored bytes against the requested identity, so corruption is
//! surfaced rather than silently returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

use crate::error::{LedgeError, Result};
use crate::object::{decode_object, encode_object, ObjectId, ObjectKind};

/// On-disk format version written into `metadata.json`
const FORMAT_VERSION: u32 = 1;

/// Metadata stored at the repository root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Version of the on-disk format
    pub format_version: u32,
    /// Ledge version that created the repository
    pub ledge_version: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Content-addressable persistence for blobs, trees and commits
///
/// The store exclusively owns all object bytes once written. Cross
/// references between objects are identities, never live references,
/// which keeps the object graph an arena of immutable records.
#[derive(Debug)]
pub struct ObjectStore {
    /// Repository data directory
    root: PathBuf,
}

impl ObjectStore {
    /// Initialize a new store at `root`
    ///
    /// Creates the directory structure and writes the metadata file.
    ///
    /// # Errors
    ///
    /// - [`LedgeError::RepositoryExists`] if `root` already exists
    /// - [`LedgeError::Io`] if filesystem operations fail
    pub fn init(root: PathBuf) -> Result<Self> {
        if root.exists() {
            return Err(LedgeError::RepositoryExists(root));
        }

        fs::create_dir_all(&root)?;
        fs::create_dir_all(root.join("objects"))?;
        fs::create_dir_all(root.join("refs").join("heads"))?;

        let metadata = StoreMetadata {
            format_version: FORMAT_VERSION,
            ledge_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
        };
        let metadata_json = serde_json::to_string_pretty(&metadata)?;
        fs::write(root.join("metadata.json"), metadata_json)?;

        info!("Initialized object store at {:?}", root);
        Ok(Self { root })
    }

    /// Open an existing store at `root`
    ///
    /// # Errors
    ///
    /// - [`LedgeError::NotARepository`] if no metadata file is present
    /// - [`LedgeError::Json`] if the metadata file cannot be parsed
    pub fn open(root: PathBuf) -> Result<Self> {
        let metadata_path = root.join("metadata.json");
        if !metadata_path.exists() {
            return Err(LedgeError::NotARepository(root));
        }

        // Parse eagerly so a damaged metadata file fails open, not later.
        let metadata_json = fs::read_to_string(&metadata_path)?;
        let _metadata: StoreMetadata = serde_json::from_str(&metadata_json)?;

        debug!("Opened object store at {:?}", root);
        Ok(Self { root })
    }

    /// Store an object, returning its identity
    ///
    /// Computes the identity over the canonical encoding and writes the
    /// encoded bytes if the object is not already present. Writing
    /// identical content twice is a no-op, not an error. The write is
    /// durable before this method returns.
    pub fn put(&self, kind: ObjectKind, payload: &[u8]) -> Result<ObjectId> {
        let id = ObjectId::for_content(kind, payload);

        let object_path = self.object_path(&id);
        if object_path.exists() {
            trace!("Object {} already present", id.short());
            return Ok(id);
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| LedgeError::corrupt(id.clone(), "object path has no parent"))?;
        fs::create_dir_all(object_dir)?;
        fs::write(&object_path, encode_object(kind, payload))?;

        trace!("Stored {} object {} ({} bytes)", kind, id.short(), payload.len());
        Ok(id)
    }

    /// Load an object by identity
    ///
    /// The stored bytes are decoded and the digest recomputed; a record
    /// whose contents no longer hash to `id` is reported as corruption,
    /// never returned.
    ///
    /// # Errors
    ///
    /// - [`LedgeError::ObjectNotFound`] if the identity is absent
    /// - [`LedgeError::CorruptObject`] if framing or digest verification fails
    pub fn get(&self, id: &ObjectId) -> Result<(ObjectKind, Vec<u8>)> {
        let object_path = self.object_path(id);
        if !object_path.exists() {
            return Err(LedgeError::ObjectNotFound(id.clone()));
        }

        let bytes = fs::read(&object_path)?;
        let (kind, payload) = decode_object(id, &bytes)?;

        if &ObjectId::for_content(kind, &payload) != id {
            return Err(LedgeError::corrupt(id.clone(), "digest mismatch"));
        }

        trace!("Loaded {} object {} ({} bytes)", kind, id.short(), payload.len());
        Ok((kind, payload))
    }

    /// Check whether an object exists
    pub fn exists(&self, id: &ObjectId) -> bool {
        self.object_path(id).exists()
    }

    /// Load an object and require a specific kind
    ///
    /// A kind mismatch means a reference of the wrong type was followed,
    /// which is corruption of the pointer graph.
    pub fn get_kind(&self, id: &ObjectId, expected: ObjectKind) -> Result<Vec<u8>> {
        let (kind, payload) = self.get(id)?;
        if kind != expected {
            return Err(LedgeError::corrupt(
                id.clone(),
                format!("expected {} object, found {}", expected, kind),
            ));
        }
        Ok(payload)
    }

    /// Repository data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sharded path for an object identity
    fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (prefix, suffix) = id.as_str().split_at(2);
        self.root.join("objects").join(prefix).join(suffix)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn create_test_store() -> (ObjectStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ledge");
        let store = ObjectStore::init(root).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_init_and_open() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ledge");

        let _store = ObjectStore::init(root.clone()).unwrap();
        assert!(root.join("objects").exists());
        assert!(root.join("refs").join("heads").exists());
        assert!(root.join("metadata.json").exists());

        // Re-init must fail, re-open must succeed
        assert!(matches!(
            ObjectStore::init(root.clone()),
            Err(LedgeError::RepositoryExists(_))
        ));
        let _reopened = ObjectStore::open(root).unwrap();
    }

    #[test]
    fn test_open_missing() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert!(matches!(
            ObjectStore::open(missing),
            Err(LedgeError::NotARepository(_))
        ));
    }

    #[test]
    fn test_put_get_round_trip() {
        let (store, _temp_dir) = create_test_store();

        let id = store.put(ObjectKind::Blob, b"file contents").unwrap();
        assert!(store.exists(&id));

        let (kind, payload) = store.get(&id).unwrap();
        assert_eq!(kind, ObjectKind::Blob);
        assert_eq!(payload, b"file contents");
    }

    #[test]
    fn test_put_is_idempotent() {
        let (store, _temp_dir) = create_test_store();

        let first = store.put(ObjectKind::Blob, b"same bytes").unwrap();
        let second = store.put(ObjectKind::Blob, b"same bytes").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_get_missing_object() {
        let (store, _temp_dir) = create_test_store();
        let id = ObjectId::for_content(ObjectKind::Blob, b"never stored");
        assert!(matches!(store.get(&id), Err(LedgeError::ObjectNotFound(_))));
        assert!(!store.exists(&id));
    }

    #[test]
    fn test_get_detects_tampering() {
        let (store, _temp_dir) = create_test_store();

        let id = store.put(ObjectKind::Blob, b"original").unwrap();
        let path = store.object_path(&id);
        fs::write(&path, encode_object(ObjectKind::Blob, b"tampered")).unwrap();

        let err = store.get(&id).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_get_kind_mismatch() {
        let (store, _temp_dir) = create_test_store();

        let id = store.put(ObjectKind::Blob, b"not a tree").unwrap();
        let err = store.get_kind(&id, ObjectKind::Tree).unwrap_err();
        assert!(err.is_corruption());
    }
}
