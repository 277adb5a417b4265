//! Conflict descriptors returned by the merge-inspection operations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::enums::{ChangeType, FileMode, ObjectType};
use crate::errors::ModelError;

/// Per-side file sizes in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSizes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileModes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FileMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<FileMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<FileMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<ObjectType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsBinaryFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<bool>,
}

impl IsBinaryFile {
    pub fn any(&self) -> bool {
        [self.source, self.destination, self.base]
            .into_iter()
            .any(|b| b == Some(true))
    }
}

/// Which change each side made to the path since the merge base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOperations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ChangeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<ChangeType>,
}

/// Everything the service reports about one conflicting file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictMetadata {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_sizes: FileSizes,
    #[serde(default)]
    pub file_modes: FileModes,
    #[serde(default)]
    pub object_types: ObjectTypes,
    #[serde(default)]
    pub number_of_conflicts: i32,
    #[serde(default)]
    pub is_binary_file: IsBinaryFile,
    #[serde(default)]
    pub content_conflict: bool,
    #[serde(default)]
    pub file_mode_conflict: bool,
    #[serde(default)]
    pub object_type_conflict: bool,
    #[serde(default)]
    pub merge_operations: MergeOperations,
}

impl ConflictMetadata {
    /// Number of conflict flags (content, file mode, object type) set.
    pub fn conflict_flag_count(&self) -> i32 {
        [
            self.content_conflict,
            self.file_mode_conflict,
            self.object_type_conflict,
        ]
        .into_iter()
        .filter(|f| *f)
        .count() as i32
    }

    pub fn has_conflict(&self) -> bool {
        self.number_of_conflicts > 0 || self.conflict_flag_count() > 0
    }

    /// One side deleted the file while the other kept changing it.
    pub fn is_edit_delete(&self) -> bool {
        let ops = &self.merge_operations;
        matches!(
            (ops.source, ops.destination),
            (Some(ChangeType::Deleted), Some(ChangeType::Modified | ChangeType::Added))
                | (Some(ChangeType::Modified | ChangeType::Added), Some(ChangeType::Deleted))
        )
    }

    /// Check the counting rules:
    /// - `numberOfConflicts` is never negative;
    /// - it is at least the number of conflict flags set;
    /// - it is zero when no flag is set.
    ///
    /// Service data is a point-in-time copy, so callers typically log a
    /// violation rather than reject the response.
    pub fn check_consistency(&self) -> Result<(), ModelError> {
        let n = self.number_of_conflicts;
        let flags = self.conflict_flag_count();
        if n < 0 {
            return Err(ModelError::violation(
                "numberOfConflicts must not be negative",
                format!("{}: {}", self.file_path, n),
            ));
        }
        if n < flags {
            return Err(ModelError::violation(
                "numberOfConflicts must cover every conflict flag",
                format!("{}: {} conflicts, {} flags set", self.file_path, n, flags),
            ));
        }
        if flags == 0 && n != 0 {
            return Err(ModelError::violation(
                "numberOfConflicts must be zero without conflict flags",
                format!("{}: {} conflicts, no flags set", self.file_path, n),
            ));
        }
        debug!(path = %self.file_path, conflicts = n, "conflict metadata consistent");
        Ok(())
    }
}

/// A line range on one side of a merge hunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeHunkDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hunk_content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeHunk {
    #[serde(default)]
    pub is_conflict: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MergeHunkDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<MergeHunkDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<MergeHunkDetail>,
}

/// Metadata plus hunks for one file, as returned by batch describe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_metadata: Option<ConflictMetadata>,
    #[serde(default)]
    pub merge_hunks: Vec<MergeHunk>,
}

impl Conflict {
    pub fn conflicting_hunks(&self) -> impl Iterator<Item = &MergeHunk> {
        self.merge_hunks.iter().filter(|h| h.is_conflict)
    }
}

/// A file the service could not describe in a batch call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDescribeMergeConflictsError {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub exception_name: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> ConflictMetadata {
        serde_json::from_str(
            r#"{
                "filePath": "src/readme.md",
                "fileSizes": {"source": 120, "destination": 98, "base": 90},
                "fileModes": {"source": "NORMAL", "destination": "EXECUTABLE", "base": "NORMAL"},
                "objectTypes": {"source": "FILE", "destination": "FILE", "base": "FILE"},
                "numberOfConflicts": 3,
                "isBinaryFile": {"source": false, "destination": false, "base": false},
                "contentConflict": true,
                "fileModeConflict": true,
                "objectTypeConflict": false,
                "mergeOperations": {"source": "M", "destination": "M"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_decode_fixture() {
        let meta = fixture();
        assert_eq!(meta.file_path, "src/readme.md");
        assert_eq!(meta.file_modes.destination, Some(FileMode::Executable));
        assert_eq!(meta.merge_operations.source, Some(ChangeType::Modified));
        assert_eq!(meta.conflict_flag_count(), 2);
        assert!(meta.has_conflict());
        assert!(!meta.is_binary_file.any());
        assert!(meta.check_consistency().is_ok());
    }

    #[test]
    fn test_no_flags_requires_zero_conflicts() {
        let mut meta = fixture();
        meta.content_conflict = false;
        meta.file_mode_conflict = false;
        meta.number_of_conflicts = 0;
        assert!(meta.check_consistency().is_ok());
        assert!(!meta.has_conflict());

        meta.number_of_conflicts = 2;
        assert!(matches!(
            meta.check_consistency(),
            Err(ModelError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn test_count_below_flags_is_inconsistent() {
        let mut meta = fixture();
        meta.object_type_conflict = true;
        meta.number_of_conflicts = 2;
        assert!(meta.check_consistency().is_err());
    }

    #[test]
    fn test_negative_count_is_inconsistent() {
        let mut meta = fixture();
        meta.number_of_conflicts = -1;
        assert!(meta.check_consistency().is_err());
    }

    #[test]
    fn test_edit_delete_detection() {
        let mut meta = fixture();
        assert!(!meta.is_edit_delete());
        meta.merge_operations.destination = Some(ChangeType::Deleted);
        assert!(meta.is_edit_delete());
    }

    #[test]
    fn test_missing_fields_default() {
        let meta: ConflictMetadata = serde_json::from_str(r#"{"filePath": "a.txt"}"#).unwrap();
        assert_eq!(meta.number_of_conflicts, 0);
        assert!(meta.check_consistency().is_ok());
    }

    #[test]
    fn test_conflicting_hunks() {
        let conflict: Conflict = serde_json::from_str(
            r#"{
                "conflictMetadata": {"filePath": "a.txt", "numberOfConflicts": 1, "contentConflict": true},
                "mergeHunks": [
                    {"isConflict": false, "base": {"startLine": 1, "endLine": 2, "hunkContent": "x"}},
                    {"isConflict": true, "source": {"startLine": 3, "endLine": 4, "hunkContent": "y"}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(conflict.conflicting_hunks().count(), 1);
    }
}
