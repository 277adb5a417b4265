//! Merge policy vocabulary, conflict descriptors and resolution payloads.
//!
//! The conflict subsystem covers:
//! 1. **Policy** -- the detail level / resolution strategy pair every
//!    merge-shaped request carries, and the rules tying them together.
//! 2. **Metadata** -- what the service reports about each conflicting file.
//! 3. **Resolution** -- the per-file directives a caller supplies with
//!    `AUTOMERGE`.

pub mod metadata;
pub mod policy;
pub mod resolution;

pub use metadata::{
    BatchDescribeMergeConflictsError, Conflict, ConflictMetadata, FileModes, FileSizes,
    IsBinaryFile, MergeHunk, MergeHunkDetail, MergeOperations, ObjectTypes,
};
pub use policy::{require_merge_commit, MergePolicy};
pub use resolution::{ConflictResolution, DeleteFileEntry, ReplaceContentEntry, SetFileModeEntry};
