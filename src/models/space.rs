//! Space model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::CfClient;
use crate::error::{CfError, Result};
use crate::models::common::{Links, Metadata, ToOneRelationship};
use crate::pagination::{comma_separated, is_empty_filter, ListEnvelope, Page};
use crate::traits::{Create, Delete, Get, List, Update};

/// A Cloud Foundry space.
///
/// Spaces partition an organization; apps and service instances are scoped
/// to a space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub guid: String,

    /// The space name, unique within its organization.
    pub name: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub relationships: SpaceRelationships,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub links: Links,
}

/// Relationships carried by a space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpaceRelationships {
    #[serde(default)]
    pub organization: ToOneRelationship,
}

impl Space {
    /// The GUID of the organization this space belongs to.
    pub fn organization_guid(&self) -> Option<&str> {
        self.relationships.organization.guid()
    }

    /// List the apps in this space.
    pub async fn apps(&self, client: &CfClient) -> Result<Vec<crate::models::app::App>> {
        let query = crate::models::app::AppListQuery {
            space_guids: vec![self.guid.clone()],
            ..Default::default()
        };
        crate::models::app::App::list_all(client, &query).await
    }
}

/// Query parameters for listing spaces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpaceListQuery {
    /// Filter by space names.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub names: Vec<String>,

    /// Filter by space GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub guids: Vec<String>,

    /// Filter by owning organization GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub organization_guids: Vec<String>,

    /// Sort order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Label selector expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
}

/// Parameters for creating a space.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceCreateParams {
    pub name: String,
    pub relationships: SpaceRelationships,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl SpaceCreateParams {
    /// Minimal creation request: a name and the owning organization.
    pub fn new(name: impl Into<String>, organization_guid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relationships: SpaceRelationships {
                organization: ToOneRelationship::to(organization_guid),
            },
            metadata: None,
        }
    }
}

/// Parameters for updating a space.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpaceUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[async_trait]
impl Get for Space {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &CfClient, guid: String) -> Result<Self> {
        let path = format!("v3/spaces/{}", urlencoding::encode(&guid));
        let response = client.get(&path).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl List for Space {
    type Query = SpaceListQuery;

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
            query: &'a SpaceListQuery,
            page: u32,
            per_page: u32,
        }

        let params = RequestParams {
            query,
            page,
            per_page,
        };

        let response = client.get_with_query("v3/spaces", &params).await?;
        let envelope: ListEnvelope<Space> = response.json().await.map_err(CfError::HttpError)?;
        Ok(Page::from_envelope(envelope, page, per_page))
    }
}

#[async_trait]
impl Create for Space {
    type Params = SpaceCreateParams;

    #[tracing::instrument(skip(client, params))]
    async fn create(client: &CfClient, params: Self::Params) -> Result<Self> {
        let response = client.post("v3/spaces", &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl Update for Space {
    type Id = String;
    type Params = SpaceUpdateParams;

    #[tracing::instrument(skip(client, params))]
    async fn update(client: &CfClient, guid: String, params: Self::Params) -> Result<Self> {
        let path = format!("v3/spaces/{}", urlencoding::encode(&guid));
        let response = client.patch(&path, &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl Delete for Space {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &CfClient, guid: String) -> Result<Option<String>> {
        let path = format!("v3/spaces/{}", urlencoding::encode(&guid));
        let response = client.delete(&path).await?;
        Ok(CfClient::job_guid_from_response(&response))
    }
}
