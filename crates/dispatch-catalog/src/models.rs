//! Plain data types for the catalog's declarative surface. No behavior
//! lives here -- these are the shapes [`crate::api::CatalogApi`] methods
//! return (namespaces, tables, table versions, partitions, streams,
//! deltas).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a delta's content should be combined with what a partition already
/// has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaType {
    Append,
    Upsert,
    Delete,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid delta type: {0}")]
pub struct DeltaTypeParseError(String);

impl std::fmt::Display for DeltaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeltaType::Append => "append",
            DeltaType::Upsert => "upsert",
            DeltaType::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DeltaType {
    type Err = DeltaTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(DeltaType::Append),
            "upsert" => Ok(DeltaType::Upsert),
            "delete" => Ok(DeltaType::Delete),
            other => Err(DeltaTypeParseError(other.to_string())),
        }
    }
}

/// Lifecycle state of a table version or stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Staged,
    Active,
    Deprecated,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid lifecycle state: {0}")]
pub struct LifecycleStateParseError(String);

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LifecycleState::Staged => "staged",
            LifecycleState::Active => "active",
            LifecycleState::Deprecated => "deprecated",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for LifecycleState {
    type Err = LifecycleStateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staged" => Ok(LifecycleState::Staged),
            "active" => Ok(LifecycleState::Active),
            "deprecated" => Ok(LifecycleState::Deprecated),
            other => Err(LifecycleStateParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMeta {
    pub id: Uuid,
    pub namespace: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableVersion {
    pub table_id: Uuid,
    pub version: u32,
    pub state: LifecycleState,
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamMeta {
    pub id: Uuid,
    pub table_id: Uuid,
    pub table_version: u32,
    pub state: LifecycleState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionMeta {
    pub id: Uuid,
    pub stream_id: Uuid,
    pub partition_values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delta {
    pub id: Uuid,
    pub partition_id: Uuid,
    pub delta_type: DeltaType,
    pub stream_position: u64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn delta_type_round_trips_through_display_and_from_str() {
        for dt in [DeltaType::Append, DeltaType::Upsert, DeltaType::Delete] {
            let s = dt.to_string();
            assert_eq!(DeltaType::from_str(&s).unwrap(), dt);
        }
    }

    #[test]
    fn delta_type_rejects_unknown_strings() {
        assert!(DeltaType::from_str("overwrite").is_err());
    }
}
