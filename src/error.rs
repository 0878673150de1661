//! Error types for the Ledge library
//!
//! Errors split into two families: integrity errors, which indicate a
//! corrupted repository and are never recovered automatically, and usage
//! errors, which carry enough context (name, identity, path) for the
//! caller to correct the invocation. Merge outcomes are deliberately
//! *not* errors; see [`crate::merge::MergeOutcome`].

use std::path::PathBuf;
use thiserror::Error;

use crate::object::ObjectId;

/// Type alias for Results in the Ledge library
pub type Result<T> = std::result::Result<T, LedgeError>;

/// Main error type for all Ledge operations
#[derive(Debug, Error)]
pub enum LedgeError {
    /// I/O errors during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UTF-8 conversion error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Walk directory error from walkdir crate
    #[error("Walk directory error")]
    WalkDir(#[from] walkdir::Error),

    /// Object not found in content-addressable storage
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// Stored object bytes do not match their identity or framing
    #[error("Corrupt object {id}: {reason}")]
    CorruptObject {
        /// Identity under which the object was stored
        id: ObjectId,
        /// What failed while decoding or verifying
        reason: String,
    },

    /// A reference points at a commit that does not exist
    #[error("Dangling reference: branch '{branch}' points at missing commit {id}")]
    DanglingReference {
        /// Branch holding the bad pointer
        branch: String,
        /// Commit identity the branch points at
        id: ObjectId,
    },

    /// Branch pointer file does not contain a valid commit identity
    #[error("Corrupt reference: branch '{branch}' does not contain a valid identity")]
    CorruptReference {
        /// Branch holding the unreadable pointer
        branch: String,
    },

    /// Branch name does not resolve to any reference
    #[error("Unknown branch: '{0}'")]
    UnknownBranch(String),

    /// Branch already exists and would be overwritten
    #[error("Branch '{0}' already exists")]
    BranchExists(String),

    /// Commit parent does not resolve to an existing commit object
    #[error("Invalid parent commit: {0}")]
    InvalidParent(ObjectId),

    /// Branch update target does not exist in the object store
    #[error("Invalid branch target: {0}")]
    InvalidTarget(ObjectId),

    /// Commit would produce no change over the current branch tip
    #[error("Nothing to commit: staged tree is identical to the branch tip")]
    EmptyCommit,

    /// Operation requires at least one commit on the current branch
    #[error("No commits yet on the current branch")]
    NoCommitsYet,

    /// Checkout refused because staged changes would be lost
    #[error("Staged changes present; commit them before switching branches")]
    StagedChangesPresent,

    /// Path cannot be represented as a tree entry
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// Offending repository-relative path
        path: String,
        /// Why the path cannot be represented
        reason: String,
    },

    /// Path given to add does not exist or is not a regular file
    #[error("Cannot stage {path:?}: {reason}")]
    CannotStage {
        /// Offending path as given by the caller
        path: PathBuf,
        /// Why staging failed
        reason: String,
    },

    /// Directory is not a Ledge repository
    #[error("Not a ledge repository: {0:?}")]
    NotARepository(PathBuf),

    /// Repository already exists at the given path
    #[error("Repository already exists at {0:?}")]
    RepositoryExists(PathBuf),
}

impl LedgeError {
    /// Create a corrupt-object error with a custom reason
    pub fn corrupt(id: ObjectId, reason: impl Into<String>) -> Self {
        LedgeError::CorruptObject {
            id,
            reason: reason.into(),
        }
    }

    /// Create a cannot-stage error with a custom reason
    pub fn cannot_stage(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LedgeError::CannotStage {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-path error with a custom reason
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        LedgeError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error indicates repository corruption
    ///
    /// Corruption errors are fatal: the store no longer satisfies its
    /// integrity invariants and no retry can succeed.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            LedgeError::ObjectNotFound(_)
                | LedgeError::CorruptObject { .. }
                | LedgeError::DanglingReference { .. }
                | LedgeError::CorruptReference { .. }
        )
    }

    /// Check if this error is a caller-correctable usage error
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            LedgeError::UnknownBranch(_)
                | LedgeError::BranchExists(_)
                | LedgeError::InvalidParent(_)
                | LedgeError::InvalidTarget(_)
                | LedgeError::EmptyCommit
                | LedgeError::NoCommitsYet
                | LedgeError::StagedChangesPresent
                | LedgeError::InvalidPath { .. }
                | LedgeError::CannotStage { .. }
                | LedgeError::NotARepository(_)
                | LedgeError::RepositoryExists(_)
        )
    }
}
