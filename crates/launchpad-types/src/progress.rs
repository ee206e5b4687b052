//! Progress status vocabulary and the persisted progress snapshot shape.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse status of a task, and the derived status of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Error,
}

impl ProgressStatus {
    /// Wire name of the status (`pending`, `in-progress`, `completed`, `error`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Pending => "pending",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Error => "error",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProgressStatus::Pending),
            "in-progress" | "in_progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            "error" => Ok(ProgressStatus::Error),
            other => Err(format!("unknown progress status: '{other}'")),
        }
    }
}

/// Persisted form of the progress tree: section id -> task id -> status.
///
/// Serializes to `{"infrastructure":{"repo_creation":"pending",...},...}`.
pub type ProgressSnapshot = BTreeMap<String, BTreeMap<String, ProgressStatus>>;
