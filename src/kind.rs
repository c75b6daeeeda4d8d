//! The five request categories tracked independently per entity.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A logical operation against an entity.
///
/// Each kind owns its own outstanding-request sequence; a pending `read`
/// never suppresses or aborts an `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Fetch the entity's current state.
    Read,
    /// Persist a new entity.
    Create,
    /// Persist the entity's full state.
    Update,
    /// Persist a partial update.
    Patch,
    /// Remove the entity from the backend.
    Delete,
}

impl OperationKind {
    /// Every kind, in the order the default-mode table lists them.
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Read,
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Patch,
        OperationKind::Delete,
    ];

    /// Stable lowercase identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Read => "read",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Patch => "patch",
            OperationKind::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(OperationKind::Read),
            "create" => Ok(OperationKind::Create),
            "update" => Ok(OperationKind::Update),
            "patch" => Ok(OperationKind::Patch),
            "delete" => Ok(OperationKind::Delete),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }
}
