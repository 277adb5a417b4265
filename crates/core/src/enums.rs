//! Closed wire vocabularies.
//!
//! Every enumerated field has exactly one string form. `parse` matches it
//! exactly (case-sensitive) and `as_str` produces it; serde, `Display` and
//! `FromStr` all go through that pair.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ModelError;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Parse the exact wire string.
            pub fn parse(s: &str) -> Result<Self, ModelError> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(ModelError::InvalidEnumValue {
                        family: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }

            /// The wire string for this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

wire_enum! {
    /// Algorithm used to combine two commit specifiers.
    MergeOption {
        FastForward => "FAST_FORWARD_MERGE",
        Squash => "SQUASH_MERGE",
        ThreeWay => "THREE_WAY_MERGE",
    }
}

impl MergeOption {
    /// Whether this option produces a merge commit. Fast-forward only moves
    /// the destination reference.
    pub fn creates_merge_commit(self) -> bool {
        !matches!(self, Self::FastForward)
    }
}

wire_enum! {
    /// Granularity at which two branches are judged to conflict.
    ConflictDetailLevel {
        FileLevel => "FILE_LEVEL",
        LineLevel => "LINE_LEVEL",
    }
}

impl Default for ConflictDetailLevel {
    fn default() -> Self {
        Self::FileLevel
    }
}

wire_enum! {
    /// Policy applied when a merge would otherwise stop on a conflict.
    ConflictResolutionStrategy {
        /// Manual resolution required.
        None => "NONE",
        AcceptSource => "ACCEPT_SOURCE",
        AcceptDestination => "ACCEPT_DESTINATION",
        /// Merge automatically, applying any caller-supplied resolution.
        Automerge => "AUTOMERGE",
    }
}

impl Default for ConflictResolutionStrategy {
    fn default() -> Self {
        Self::None
    }
}

wire_enum! {
    /// Pull request lifecycle status. `Open` moves to `Closed` once.
    PullRequestStatus {
        Open => "OPEN",
        Closed => "CLOSED",
    }
}

impl PullRequestStatus {
    /// Whether the service can move a pull request from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Open, Self::Closed))
    }
}

wire_enum! {
    /// Git file mode of a tree entry.
    FileMode {
        Executable => "EXECUTABLE",
        Normal => "NORMAL",
        Symlink => "SYMLINK",
    }
}

wire_enum! {
    /// Kind of object found at a conflicting path.
    ObjectType {
        File => "FILE",
        Directory => "DIRECTORY",
        GitLink => "GIT_LINK",
        SymbolicLink => "SYMBOLIC_LINK",
    }
}

wire_enum! {
    /// Change one side of a merge made to a path.
    ChangeType {
        Added => "A",
        Modified => "M",
        Deleted => "D",
    }
}

wire_enum! {
    /// How a conflicting file's content is replaced during AUTOMERGE.
    ReplacementType {
        KeepBase => "KEEP_BASE",
        KeepSource => "KEEP_SOURCE",
        KeepDestination => "KEEP_DESTINATION",
        UseNewContent => "USE_NEW_CONTENT",
    }
}

wire_enum! {
    ApprovalState {
        Approve => "APPROVE",
        Revoke => "REVOKE",
    }
}

wire_enum! {
    OverrideStatus {
        Override => "OVERRIDE",
        Revoke => "REVOKE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip<E>(all: &[E])
    where
        E: Copy + PartialEq + std::fmt::Debug + std::str::FromStr + std::fmt::Display,
        <E as std::str::FromStr>::Err: std::fmt::Debug,
    {
        for e in all {
            let parsed: E = e.to_string().parse().unwrap();
            assert_eq!(parsed, *e);
        }
    }

    #[test]
    fn test_every_literal_round_trips() {
        assert_round_trip(MergeOption::ALL);
        assert_round_trip(ConflictDetailLevel::ALL);
        assert_round_trip(ConflictResolutionStrategy::ALL);
        assert_round_trip(PullRequestStatus::ALL);
        assert_round_trip(FileMode::ALL);
        assert_round_trip(ObjectType::ALL);
        assert_round_trip(ChangeType::ALL);
        assert_round_trip(ReplacementType::ALL);
        assert_round_trip(ApprovalState::ALL);
        assert_round_trip(OverrideStatus::ALL);
    }

    #[test]
    fn test_wire_literals() {
        assert_eq!(MergeOption::ThreeWay.as_str(), "THREE_WAY_MERGE");
        assert_eq!(MergeOption::FastForward.as_str(), "FAST_FORWARD_MERGE");
        assert_eq!(ConflictDetailLevel::LineLevel.as_str(), "LINE_LEVEL");
        assert_eq!(
            ConflictResolutionStrategy::AcceptDestination.as_str(),
            "ACCEPT_DESTINATION"
        );
        assert_eq!(FileMode::Symlink.as_str(), "SYMLINK");
        assert_eq!(ChangeType::Deleted.as_str(), "D");
    }

    #[test]
    fn test_parse_rejects_unknown_and_wrong_case() {
        for bad in ["", "three_way_merge", "REBASE_MERGE", " SQUASH_MERGE"] {
            let err = MergeOption::parse(bad).unwrap_err();
            assert!(matches!(
                err,
                ModelError::InvalidEnumValue { family: "MergeOption", .. }
            ));
        }
        assert!(matches!(
            ConflictDetailLevel::parse("WORD_LEVEL"),
            Err(ModelError::InvalidEnumValue { family: "ConflictDetailLevel", .. })
        ));
        assert!(matches!(
            ConflictResolutionStrategy::parse("none"),
            Err(ModelError::InvalidEnumValue { family: "ConflictResolutionStrategy", .. })
        ));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ConflictDetailLevel::default(), ConflictDetailLevel::FileLevel);
        assert_eq!(
            ConflictResolutionStrategy::default(),
            ConflictResolutionStrategy::None
        );
    }

    #[test]
    fn test_serde_uses_wire_strings() {
        let json = serde_json::to_string(&MergeOption::Squash).unwrap();
        assert_eq!(json, "\"SQUASH_MERGE\"");
        let back: MergeOption = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MergeOption::Squash);

        let err = serde_json::from_str::<FileMode>("\"READONLY\"").unwrap_err();
        assert!(err.to_string().contains("not a valid FileMode"));
    }

    #[test]
    fn test_pull_request_status_is_one_way() {
        use PullRequestStatus::*;
        assert!(Open.can_transition_to(Closed));
        assert!(!Closed.can_transition_to(Open));
        assert!(!Open.can_transition_to(Open));
        assert!(!Closed.can_transition_to(Closed));
    }

    #[test]
    fn test_fast_forward_creates_no_merge_commit() {
        assert!(!MergeOption::FastForward.creates_merge_commit());
        assert!(MergeOption::Squash.creates_merge_commit());
        assert!(MergeOption::ThreeWay.creates_merge_commit());
    }
}
