//! The conflict policy every merge-shaped request carries.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::resolution::ConflictResolution;
use crate::enums::{ConflictDetailLevel, ConflictResolutionStrategy, MergeOption};
use crate::errors::ModelError;

/// Detail level, resolution strategy, and the optional resolution payload.
///
/// Serialized flattened into the enclosing request as `conflictDetailLevel`,
/// `conflictResolutionStrategy` and `conflictResolution`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePolicy {
    #[serde(default)]
    pub conflict_detail_level: ConflictDetailLevel,
    #[serde(default)]
    pub conflict_resolution_strategy: ConflictResolutionStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_resolution: Option<ConflictResolution>,
}

impl MergePolicy {
    pub fn new(
        conflict_detail_level: ConflictDetailLevel,
        conflict_resolution_strategy: ConflictResolutionStrategy,
    ) -> Self {
        Self {
            conflict_detail_level,
            conflict_resolution_strategy,
            conflict_resolution: None,
        }
    }

    /// A resolution payload is only meaningful with `AUTOMERGE`.
    /// `AUTOMERGE` without a payload is allowed: the service then merges
    /// whatever it can resolve on its own.
    pub fn validate(&self) -> Result<(), ModelError> {
        match (&self.conflict_resolution, self.conflict_resolution_strategy) {
            (Some(_), strategy) if strategy != ConflictResolutionStrategy::Automerge => {
                Err(ModelError::violation(
                    "conflictResolution requires AUTOMERGE",
                    format!("conflictResolutionStrategy is {}", strategy),
                ))
            }
            (Some(resolution), _) => {
                debug!(
                    entries = resolution.entry_count(),
                    "validating conflict resolution payload"
                );
                resolution.validate()
            }
            (None, _) => Ok(()),
        }
    }

    /// Strategies other than `NONE` let the service resolve conflicts
    /// without stopping the merge.
    pub fn resolves_automatically(&self) -> bool {
        self.conflict_resolution_strategy != ConflictResolutionStrategy::None
    }
}

/// Reject `FAST_FORWARD_MERGE` for operations that must produce a merge
/// commit.
pub fn require_merge_commit(option: MergeOption, operation: &str) -> Result<(), ModelError> {
    if !option.creates_merge_commit() {
        return Err(ModelError::violation(
            "merge option must create a merge commit",
            format!("{} does not accept {}", operation, option),
        ));
    }
    Ok(())
}
