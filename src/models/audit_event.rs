//! Audit event model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::CfClient;
use crate::error::{CfError, Result};
use crate::models::common::Links;
use crate::pagination::{comma_separated, is_empty_filter, ListEnvelope, Page};
use crate::traits::{Get, List};

/// An audit event.
///
/// Audit events record who did what to which resource. They are read-only
/// and retained by the platform for a bounded window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub guid: String,

    /// Event type, e.g. `audit.app.create`.
    #[serde(rename = "type", default)]
    pub event_type: String,

    /// Who performed the action.
    #[serde(default)]
    pub actor: Option<EventParticipant>,

    /// The resource acted upon.
    #[serde(default)]
    pub target: Option<EventParticipant>,

    /// Event-type-specific payload (request bodies, before/after values).
    #[serde(default)]
    pub data: serde_json::Value,

    /// Space the event occurred in, when applicable.
    #[serde(default)]
    pub space: Option<EventRef>,

    /// Organization the event occurred in, when applicable.
    #[serde(default)]
    pub organization: Option<EventRef>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub links: Links,
}

/// Actor or target of an audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventParticipant {
    pub guid: String,
    #[serde(rename = "type", default)]
    pub participant_type: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A bare GUID reference on an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRef {
    pub guid: String,
}

/// Query parameters for listing audit events.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditEventListQuery {
    /// Filter by event types (e.g. `audit.app.create`).
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub types: Vec<String>,

    /// Filter by target resource GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub target_guids: Vec<String>,

    /// Filter by space GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub space_guids: Vec<String>,

    /// Filter by organization GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub organization_guids: Vec<String>,

    /// Sort order (`created_at` or `updated_at`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

#[async_trait]
impl Get for AuditEvent {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &CfClient, guid: String) -> Result<Self> {
        let path = format!("v3/audit_events/{}", urlencoding::encode(&guid));
        let response = client.get(&path).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl List for AuditEvent {
    type Query = AuditEventListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &CfClient,
        query: &Self::Query,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        #[derive(Serialize)]
        struct RequestParams<'a> {
            #[serde(flatten)]
            query: &'a AuditEventListQuery,
            page: u32,
            per_page: u32,
        }

        let params = RequestParams {
            query,
            page,
            per_page,
        };

        let response = client.get_with_query("v3/audit_events", &params).await?;
        let envelope: ListEnvelope<AuditEvent> =
            response.json().await.map_err(CfError::HttpError)?;
        Ok(Page::from_envelope(envelope, page, per_page))
    }
}
