//! Processing activity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of processing performed on a data subject's personal data.
///
/// The set is open: values written by other services that are not one of
/// the well-known kinds are kept verbatim in [`ActivityType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    /// Personal data was read.
    DataAccess,
    /// Personal data was exported (e.g. a subject access request).
    DataExport,
    /// Personal data was changed.
    DataModification,
    /// Personal data was erased.
    DataDeletion,
    /// Any other activity label.
    Other(String),
}

impl ActivityType {
    /// Return the stored string form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::DataAccess => "data_access",
            Self::DataExport => "data_export",
            Self::DataModification => "data_modification",
            Self::DataDeletion => "data_deletion",
            Self::Other(s) => s,
        }
    }

    /// Whether this is one of the well-known activity kinds.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for ActivityType {
    fn from(s: &str) -> Self {
        match s {
            "data_access" => Self::DataAccess,
            "data_export" => Self::DataExport,
            "data_modification" => Self::DataModification,
            "data_deletion" => Self::DataDeletion,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ActivityType {
    fn from(s: String) -> Self {
        match Self::from(s.as_str()) {
            Self::Other(_) => Self::Other(s),
            known => known,
        }
    }
}

impl From<ActivityType> for String {
    fn from(activity: ActivityType) -> Self {
        match activity {
            ActivityType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
