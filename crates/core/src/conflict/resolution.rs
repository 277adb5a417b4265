//! Caller-supplied conflict resolution, sent with `AUTOMERGE`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::enums::{FileMode, ReplacementType};
use crate::errors::ModelError;

/// The service rejects payloads with more entries than this.
pub const MAX_RESOLUTION_ENTRIES: usize = 100;

/// Base64 encoding for blob fields.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s.as_bytes()).map_err(D::Error::custom))
            .transpose()
    }
}

/// Replace the content of a conflicting file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceContentEntry {
    pub file_path: String,
    pub replacement_type: ReplacementType,
    /// Only present with `USE_NEW_CONTENT`.
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_mode: Option<FileMode>,
}

impl ReplaceContentEntry {
    /// Keep one side's (or the base's) version of the file.
    pub fn keep(file_path: impl Into<String>, replacement_type: ReplacementType) -> Self {
        Self {
            file_path: file_path.into(),
            replacement_type,
            content: None,
            file_mode: None,
        }
    }

    /// Replace the file with new content.
    pub fn new_content(file_path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_path: file_path.into(),
            replacement_type: ReplacementType::UseNewContent,
            content: Some(content.into()),
            file_mode: None,
        }
    }

    pub fn with_file_mode(mut self, mode: FileMode) -> Self {
        self.file_mode = Some(mode);
        self
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.file_path.is_empty() {
            return Err(ModelError::validation("replaceContents.filePath", "required", ""));
        }
        let wants_content = self.replacement_type == ReplacementType::UseNewContent;
        match (wants_content, self.content.is_some()) {
            (true, false) => Err(ModelError::violation(
                "USE_NEW_CONTENT requires content",
                self.file_path.clone(),
            )),
            (false, true) => Err(ModelError::violation(
                "content is only allowed with USE_NEW_CONTENT",
                format!("{} uses {}", self.file_path, self.replacement_type),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileEntry {
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFileModeEntry {
    pub file_path: String,
    pub file_mode: FileMode,
}

/// Per-file directives applied when merging with `AUTOMERGE`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResolution {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replace_contents: Vec<ReplaceContentEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete_files: Vec<DeleteFileEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_file_modes: Vec<SetFileModeEntry>,
}

impl ConflictResolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(mut self, entry: ReplaceContentEntry) -> Self {
        self.replace_contents.push(entry);
        self
    }

    pub fn delete(mut self, file_path: impl Into<String>) -> Self {
        self.delete_files.push(DeleteFileEntry {
            file_path: file_path.into(),
        });
        self
    }

    pub fn set_mode(mut self, file_path: impl Into<String>, file_mode: FileMode) -> Self {
        self.set_file_modes.push(SetFileModeEntry {
            file_path: file_path.into(),
            file_mode,
        });
        self
    }

    pub fn entry_count(&self) -> usize {
        self.replace_contents.len() + self.delete_files.len() + self.set_file_modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Check the payload on its own: entry shapes, one directive per path,
    /// and the entry limit.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.entry_count() > MAX_RESOLUTION_ENTRIES {
            return Err(ModelError::violation(
                "too many conflict resolution entries",
                format!("{} > {}", self.entry_count(), MAX_RESOLUTION_ENTRIES),
            ));
        }

        for entry in &self.replace_contents {
            entry.validate()?;
        }

        let paths = self
            .replace_contents
            .iter()
            .map(|e| e.file_path.as_str())
            .chain(self.delete_files.iter().map(|e| e.file_path.as_str()))
            .chain(self.set_file_modes.iter().map(|e| e.file_path.as_str()));
        let mut seen = HashSet::new();
        for path in paths {
            if path.is_empty() {
                return Err(ModelError::validation("conflictResolution.filePath", "required", ""));
            }
            if !seen.insert(path) {
                return Err(ModelError::violation(
                    "one conflict resolution entry per file",
                    path.to_string(),
                ));
            }
        }
        Ok(())
    }
}
