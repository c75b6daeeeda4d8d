//! Concurrency modes and the per-kind default table.

use crate::error::ConfigError;
use crate::kind::OperationKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy selector for one dispatched operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Dispatch unconditionally; in-flight requests of the kind are left
    /// alone.
    Force,
    /// Dispatch only when nothing of the kind is in flight; otherwise the
    /// call is suppressed.
    Prevent,
    /// Abort everything of the kind currently in flight, then dispatch.
    Abort,
}

impl Mode {
    /// Stable lowercase identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::Force => "force",
            Mode::Prevent => "prevent",
            Mode::Abort => "abort",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "force" => Ok(Mode::Force),
            "prevent" => Ok(Mode::Prevent),
            "abort" => Ok(Mode::Abort),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// Per-kind default modes, applied when a call carries no explicit
/// override.
///
/// Reads default to [`Mode::Abort`]: a newer fetch supersedes a stale one.
/// Every write kind defaults to [`Mode::Prevent`]: a second save while one
/// is in flight is suppressed. Hosts may replace any entry at runtime;
/// changes affect subsequent calls only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeDefaults {
    /// Default for `read` operations.
    pub read: Mode,
    /// Default for `create` operations.
    pub create: Mode,
    /// Default for `update` operations.
    pub update: Mode,
    /// Default for `patch` operations.
    pub patch: Mode,
    /// Default for `delete` operations.
    pub delete: Mode,
}

impl Default for ModeDefaults {
    fn default() -> Self {
        Self {
            read: Mode::Abort,
            create: Mode::Prevent,
            update: Mode::Prevent,
            patch: Mode::Prevent,
            delete: Mode::Prevent,
        }
    }
}

impl ModeDefaults {
    /// The default mode for one operation kind.
    #[must_use]
    pub const fn mode_for(&self, kind: OperationKind) -> Mode {
        match kind {
            OperationKind::Read => self.read,
            OperationKind::Create => self.create,
            OperationKind::Update => self.update,
            OperationKind::Patch => self.patch,
            OperationKind::Delete => self.delete,
        }
    }

    /// Replaces the default mode for one operation kind.
    pub fn set(&mut self, kind: OperationKind, mode: Mode) {
        match kind {
            OperationKind::Read => self.read = mode,
            OperationKind::Create => self.create = mode,
            OperationKind::Update => self.update = mode,
            OperationKind::Patch => self.patch = mode,
            OperationKind::Delete => self.delete = mode,
        }
    }
}
