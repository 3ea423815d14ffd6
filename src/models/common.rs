//! Shared pieces of the V3 resource schema.
//!
//! Every V3 resource carries the same skeleton: `guid`, timestamps,
//! `relationships`, `metadata` (labels/annotations), and a `links` map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A resource link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// The `links` map present on every resource.
pub type Links = HashMap<String, Link>;

/// Labels and annotations attached to a resource.
///
/// V3 permits null values, hence `Option<String>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub labels: HashMap<String, Option<String>>,
    #[serde(default)]
    pub annotations: HashMap<String, Option<String>>,
}

impl Metadata {
    /// True when no labels or annotations are set.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.annotations.is_empty()
    }
}

/// The `data` entry of a relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipData {
    pub guid: String,
}

/// A to-one relationship (e.g. a space's organization).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToOneRelationship {
    #[serde(default)]
    pub data: Option<RelationshipData>,
}

impl ToOneRelationship {
    /// Build a relationship pointing at `guid`.
    pub fn to(guid: impl Into<String>) -> Self {
        Self {
            data: Some(RelationshipData { guid: guid.into() }),
        }
    }

    /// The related resource's GUID, if set.
    pub fn guid(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.guid.as_str())
    }
}

/// A to-many relationship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToManyRelationship {
    #[serde(default)]
    pub data: Vec<RelationshipData>,
}

/// The `last_operation` block on service instances and bindings.
///
/// Converts into a poll [`Operation`](crate::poll::Operation) via
/// [`ServiceInstance::poll_last_operation`](crate::ServiceInstance::poll_last_operation)
/// workflows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastOperation {
    /// What the platform is doing: `create`, `update`, or `delete`.
    #[serde(rename = "type", default)]
    pub operation_type: String,
    /// `initial`, `in progress`, `succeeded`, or `failed`.
    #[serde(default)]
    pub state: String,
    /// Human-readable detail, present on failure and sometimes while in
    /// progress.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}
