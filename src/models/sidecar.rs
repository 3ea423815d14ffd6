//! Sidecar model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::CfClient;
use crate::error::{CfError, Result};
use crate::models::common::ToOneRelationship;
use crate::pagination::{ListEnvelope, Page};
use crate::traits::{Delete, Get, Update};

/// A sidecar: an additional process run alongside an app's processes in
/// the same container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sidecar {
    pub guid: String,

    pub name: String,

    /// Command the sidecar runs.
    #[serde(default)]
    pub command: String,

    /// Process types the sidecar attaches to (e.g. `["web"]`).
    #[serde(default)]
    pub process_types: Vec<String>,

    /// Memory reservation; `None` shares the process allocation.
    #[serde(default)]
    pub memory_in_mb: Option<u64>,

    /// `user` (via this API) or `buildpack`.
    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub relationships: SidecarRelationships,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Relationships carried by a sidecar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SidecarRelationships {
    #[serde(default)]
    pub app: ToOneRelationship,
}

impl Sidecar {
    /// The GUID of the app this sidecar belongs to.
    pub fn app_guid(&self) -> Option<&str> {
        self.relationships.app.guid()
    }

    /// Create a sidecar for an app.
    #[tracing::instrument(skip(client, params))]
    pub async fn create_for_app(
        client: &CfClient,
        app_guid: &str,
        params: SidecarCreateParams,
    ) -> Result<Sidecar> {
        let path = format!("v3/apps/{}/sidecars", urlencoding::encode(app_guid));
        let response = client.post(&path, &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }

    /// Fetch a single page of an app's sidecars.
    #[tracing::instrument(skip(client))]
    pub async fn list_for_app_page(
        client: &CfClient,
        app_guid: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Sidecar>> {
        #[derive(Serialize)]
        struct RequestParams {
            page: u32,
            per_page: u32,
        }

        let path = format!("v3/apps/{}/sidecars", urlencoding::encode(app_guid));
        let response = client
            .get_with_query(&path, &RequestParams { page, per_page })
            .await?;
        let envelope: ListEnvelope<Sidecar> =
            response.json().await.map_err(CfError::HttpError)?;
        Ok(Page::from_envelope(envelope, page, per_page))
    }

    /// Fetch a single page of the sidecars attached to a process.
    #[tracing::instrument(skip(client))]
    pub async fn list_for_process_page(
        client: &CfClient,
        process_guid: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Sidecar>> {
        #[derive(Serialize)]
        struct RequestParams {
            page: u32,
            per_page: u32,
        }

        let path = format!("v3/processes/{}/sidecars", urlencoding::encode(process_guid));
        let response = client
            .get_with_query(&path, &RequestParams { page, per_page })
            .await?;
        let envelope: ListEnvelope<Sidecar> =
            response.json().await.map_err(CfError::HttpError)?;
        Ok(Page::from_envelope(envelope, page, per_page))
    }
}

/// Parameters for creating a sidecar.
#[derive(Debug, Clone, Serialize)]
pub struct SidecarCreateParams {
    pub name: String,
    pub command: String,
    pub process_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_in_mb: Option<u64>,
}

impl SidecarCreateParams {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        process_types: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            process_types,
            memory_in_mb: None,
        }
    }
}

/// Parameters for updating a sidecar.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SidecarUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_in_mb: Option<u64>,
}

#[async_trait]
impl Get for Sidecar {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &CfClient, guid: String) -> Result<Self> {
        let path = format!("v3/sidecars/{}", urlencoding::encode(&guid));
        let response = client.get(&path).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl Update for Sidecar {
    type Id = String;
    type Params = SidecarUpdateParams;

    #[tracing::instrument(skip(client, params))]
    async fn update(client: &CfClient, guid: String, params: Self::Params) -> Result<Self> {
        let path = format!("v3/sidecars/{}", urlencoding::encode(&guid));
        let response = client.patch(&path, &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl Delete for Sidecar {
    type Id = String;

    // Sidecar deletes are synchronous (204), so this always yields None.
    #[tracing::instrument(skip(client))]
    async fn delete(client: &CfClient, guid: String) -> Result<Option<String>> {
        let path = format!("v3/sidecars/{}", urlencoding::encode(&guid));
        let response = client.delete(&path).await?;
        Ok(CfClient::job_guid_from_response(&response))
    }
}

/// Fetch all sidecars for an app.
pub async fn list_app_sidecars(client: &CfClient, app_guid: &str) -> Result<Vec<Sidecar>> {
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let result = Sidecar::list_for_app_page(client, app_guid, page, 100).await?;
        let has_more = result.has_more;
        all.extend(result.resources);
        if !has_more {
            break;
        }
        page += 1;
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_deserializes() {
        let sidecar: Sidecar = serde_json::from_str(
            r#"{
                "guid": "sc-1",
                "name": "auth-proxy",
                "command": "./proxy --port 8081",
                "process_types": ["web"],
                "memory_in_mb": 128,
                "origin": "user",
                "relationships": {"app": {"data": {"guid": "a-1"}}}
            }"#,
        )
        .unwrap();

        assert_eq!(sidecar.process_types, vec!["web"]);
        assert_eq!(sidecar.memory_in_mb, Some(128));
        assert_eq!(sidecar.app_guid(), Some("a-1"));
    }
}
