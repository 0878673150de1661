//! Branch references and the symbolic HEAD pointer
//!
//! Branches live as one file per name under `refs/heads/`, each holding
//! a commit identity. `HEAD` holds `ref: refs/heads/<name>` and names
//! the currently checked-out branch. Every update replaces exactly one
//! file atomically (temp file in the same directory, then rename), so a
//! reader observes the old value or the new value, never a partial
//! write. Every reference must resolve to a commit present in the
//! object store; a pointer at a missing commit is corruption.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::{LedgeError, Result};
use crate::object::ObjectId;
use crate::store::ObjectStore;

/// Branch that HEAD points at after `init`
pub const DEFAULT_BRANCH: &str = "main";

const HEAD_PREFIX: &str = "ref: refs/heads/";

/// Mutable branch/HEAD state for one repository
///
/// Modeled as an explicit store object passed to the operations that
/// need it rather than process-global state, so several repository
/// instances can coexist in one process.
#[derive(Debug)]
pub struct RefStore {
    root: PathBuf,
}

impl RefStore {
    /// Initialize references for a fresh repository
    ///
    /// Points HEAD at the default branch. The branch itself has no
    /// commits yet and therefore no file under `refs/heads/`.
    pub fn init(root: &Path) -> Result<Self> {
        let refs = Self {
            root: root.to_path_buf(),
        };
        write_atomic(&refs.head_path(), format!("{}{}\n", HEAD_PREFIX, DEFAULT_BRANCH))?;
        debug!("Initialized HEAD -> {}", DEFAULT_BRANCH);
        Ok(refs)
    }

    /// Open references of an existing repository
    pub fn open(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Create or overwrite a branch pointer
    ///
    /// # Errors
    ///
    /// - [`LedgeError::InvalidTarget`] if `target` does not exist in the store
    pub fn set_branch(&self, store: &ObjectStore, name: &str, target: &ObjectId) -> Result<()> {
        if !store.exists(target) {
            return Err(LedgeError::InvalidTarget(target.clone()));
        }

        write_atomic(&self.branch_path(name), format!("{}\n", target))?;
        trace!("Branch '{}' -> {}", name, target.short());
        Ok(())
    }

    /// Resolve a branch name to its commit identity
    ///
    /// # Errors
    ///
    /// - [`LedgeError::UnknownBranch`] if no such branch exists
    /// - [`LedgeError::CorruptReference`] if the pointer file does not
    ///   hold a valid identity (corruption)
    /// - [`LedgeError::DanglingReference`] if the pointer targets a
    ///   commit absent from the store (corruption)
    pub fn resolve(&self, store: &ObjectStore, name: &str) -> Result<ObjectId> {
        let path = self.branch_path(name);
        if !path.exists() {
            return Err(LedgeError::UnknownBranch(name.to_string()));
        }

        // The file exists, so unparseable contents are store corruption
        // rather than a bad branch name.
        let content = fs::read_to_string(&path)?;
        let id = ObjectId::from_hex(content.trim()).ok_or_else(|| {
            LedgeError::CorruptReference {
                branch: name.to_string(),
            }
        })?;

        if !store.exists(&id) {
            return Err(LedgeError::DanglingReference {
                branch: name.to_string(),
                id,
            });
        }
        Ok(id)
    }

    /// Tip of the current branch, or `None` before the first commit
    pub fn current_tip(&self, store: &ObjectStore) -> Result<Option<ObjectId>> {
        let branch = self.current_branch()?;
        match self.resolve(store, &branch) {
            Ok(id) => Ok(Some(id)),
            Err(LedgeError::UnknownBranch(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Point HEAD at an existing branch
    ///
    /// Checkout of a non-existent branch is an error; HEAD updates never
    /// implicitly create branches.
    pub fn set_head(&self, name: &str) -> Result<()> {
        if !self.branch_exists(name) {
            return Err(LedgeError::UnknownBranch(name.to_string()));
        }
        write_atomic(&self.head_path(), format!("{}{}\n", HEAD_PREFIX, name))?;
        debug!("HEAD -> {}", name);
        Ok(())
    }

    /// Name of the branch HEAD points at
    pub fn current_branch(&self) -> Result<String> {
        let content = fs::read_to_string(self.head_path())?;
        let trimmed = content.trim();
        match trimmed.strip_prefix(HEAD_PREFIX) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(LedgeError::NotARepository(self.root.clone())),
        }
    }

    /// Whether a branch pointer file exists
    pub fn branch_exists(&self, name: &str) -> bool {
        self.branch_path(name).exists()
    }

    /// All branch names, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let heads = self.heads_dir();
        let mut names = Vec::new();
        if heads.exists() {
            for entry in fs::read_dir(heads)? {
                let entry = entry?;
                if entry.path().is_file() {
                    names.push(entry.file_name().to_string_lossy().to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn heads_dir(&self) -> PathBuf {
        self.root.join("refs").join("heads")
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        self.heads_dir().join(name)
    }

    fn head_path(&self) -> PathBuf {
        self.root.join("HEAD")
    }
}

/// Replace a file's contents atomically via a sibling temp file
fn write_atomic(path: &Path, content: String) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| LedgeError::Io(std::io::Error::other("ref path has no parent")))?;
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path)
        .map_err(|e| LedgeError::Io(e.error))?;
    Ok(())
}
