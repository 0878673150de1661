//! # Ledge - Local version control for a single user
//!
//! A small version control system built on a content-addressable object
//! store: snapshot files, commit them with history, branch, and merge,
//! all on the local filesystem with no network or locking machinery.
//!
//! ## Overview
//!
//! Ledge tracks a working directory through four layers:
//! - Immutable blob, tree and commit objects addressed by content hash
//! - A commit graph where each commit names up to two ordered parents
//! - Named branch pointers plus a symbolic HEAD, updated atomically
//! - A merge engine that reports fast-forwards, merge commits and
//!   conflicts as first-class outcomes rather than errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ledge::Repository;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::init("./my_project")?;
//!
//! // Stage and commit a file
//! repo.add(&[PathBuf::from("notes.txt")])?;
//! let commit = repo.commit("First notes", "alice")?;
//! println!("Created commit {}", commit.short());
//!
//! // Branch, switch, and later merge back
//! repo.branch("ideas")?;
//! repo.checkout("ideas")?;
//! // ... edit, add, commit ...
//! repo.checkout("main")?;
//! let outcome = repo.merge("ideas", "alice")?;
//! println!("Merge outcome: {:?}", outcome);
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Concepts
//!
//! ### Objects
//!
//! Every stored value is a blob (file content), a tree (directory
//! listing) or a commit, identified by a 160-bit hash of its kind and
//! payload. Identical content always yields the same identity, so
//! storage deduplicates for free and retrieval verifies integrity by
//! re-hashing.
//!
//! ### Trees
//!
//! A commit's snapshot is a tree of sorted entries. Building a tree
//! from the same path -> blob mapping always produces the same
//! identity, which lets tree comparison skip entire unchanged subtrees.
//!
//! ### Branches and HEAD
//!
//! A branch is a named pointer at a commit; HEAD names the current
//! branch. Pointer updates are atomic file replacements, and a pointer
//! at a commit missing from the store is reported as corruption, never
//! silently repaired.
//!
//! ### Merging
//!
//! Merges are three-way: changes relative to the common ancestor decide
//! each path. Conflicting paths refuse the whole merge and leave the
//! target branch exactly as it was.
//!
//! ## Error Handling
//!
//! All operations return `Result<T, LedgeError>`. The taxonomy keeps
//! integrity violations (corrupt objects, dangling references) apart
//! from usage errors (unknown branch, empty commit), and
//! [`LedgeError::is_corruption`] classifies them.
//!
//! ## Module Organization
//!
//! - [`repository`]: The `Repository` facade and working-tree I/O
//! - [`object`]: Object identities, kinds and canonical encoding
//! - [`store`]: Content-addressable object store
//! - [`tree`]: Tree building, flattening and diffing
//! - [`commit`]: Commit encoding and graph queries
//! - [`refs`]: Branch pointers and HEAD
//! - [`index`]: The staged index
//! - [`merge`]: The merge engine and its outcomes
//! - [`error`]: Error types and handling

pub mod commit;
pub mod error;
pub mod index;
pub mod merge;
pub mod object;
pub mod refs;
pub mod repository;
pub mod store;
pub mod tree;

pub use commit::{Commit, CommitGraph};
pub use error::{LedgeError, Result};
pub use index::StagedIndex;
pub use merge::MergeOutcome;
pub use object::{ObjectId, ObjectKind};
pub use refs::{RefStore, DEFAULT_BRANCH};
pub use repository::{Repository, StatusReport, DATA_DIR};
pub use store::ObjectStore;
pub use tree::ChangeKind;

/// Library version from the crate manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
