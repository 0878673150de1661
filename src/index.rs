//! Staged index: content intended for the next commit
//!
//! A mapping from repository-relative path to blob identity, persisted
//! as pretty-printed JSON at `index.json`. The index is ephemeral state:
//! `add` populates it, `commit` consumes and clears it. Only the logical
//! contents matter to the core; a missing file is simply an empty index.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::error::Result;
use crate::object::ObjectId;

const INDEX_FILE: &str = "index.json";

/// The staged path -> blob mapping
#[derive(Debug, Serialize, Deserialize)]
pub struct StagedIndex {
    #[serde(skip)]
    path: PathBuf,
    entries: BTreeMap<String, ObjectId>,
}

impl StagedIndex {
    /// Load the index from the repository data directory
    ///
    /// A repository without an index file has an empty index.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(INDEX_FILE);
        if !path.exists() {
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }

        let json = fs::read_to_string(&path)?;
        let mut index: StagedIndex = serde_json::from_str(&json)?;
        index.path = path;
        Ok(index)
    }

    /// Persist the current contents
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&self.path, json)?;
        trace!("Saved staged index ({} entries)", self.entries.len());
        Ok(())
    }

    /// Stage a path at a blob identity
    ///
    /// Re-staging an unchanged file maps the same path to the same blob
    /// identity and leaves the index logically unchanged.
    pub fn insert(&mut self, path: String, blob: ObjectId) {
        self.entries.insert(path, blob);
    }

    /// Staged entries, sorted by path
    pub fn entries(&self) -> &BTreeMap<String, ObjectId> {
        &self.entries
    }

    /// Whether anything is staged
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of staged entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop all staged entries and persist the empty index
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }
}
