//! Organization model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::CfClient;
use crate::error::{CfError, Result};
use crate::models::common::{Links, Metadata, ToOneRelationship};
use crate::pagination::{comma_separated, is_empty_filter, ListEnvelope, Page};
use crate::traits::{Create, Delete, Get, List, Update};

/// A Cloud Foundry organization.
///
/// Organizations are the top-level tenancy unit; they own spaces and are
/// constrained by an organization quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub guid: String,

    /// The organization name.
    pub name: String,

    /// Whether the org is suspended (members cannot make changes).
    #[serde(default)]
    pub suspended: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub relationships: OrganizationRelationships,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub links: Links,
}

/// Relationships carried by an organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationRelationships {
    #[serde(default)]
    pub quota: ToOneRelationship,
}

impl Organization {
    /// The GUID of this org's quota, if one is applied.
    pub fn quota_guid(&self) -> Option<&str> {
        self.relationships.quota.guid()
    }

    /// List this org's spaces.
    pub async fn spaces(
        &self,
        client: &CfClient,
    ) -> Result<Vec<crate::models::space::Space>> {
        let query = crate::models::space::SpaceListQuery {
            organization_guids: vec![self.guid.clone()],
            ..Default::default()
        };
        crate::models::space::Space::list_all(client, &query).await
    }
}

/// Query parameters for listing organizations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationListQuery {
    /// Filter by org names.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub names: Vec<String>,

    /// Filter by org GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub guids: Vec<String>,

    /// Sort order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Label selector expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
}

/// Parameters for creating an organization.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationCreateParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl OrganizationCreateParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suspended: None,
            metadata: None,
        }
    }
}

/// Parameters for updating an organization.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[async_trait]
impl Get for Organization {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &CfClient, guid: String) -> Result<Self> {
        let path = format!("v3/organizations/{}", urlencoding::encode(&guid));
        let response = client.get(&path).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl List for Organization {
    type Query = OrganizationListQuery;

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
            query: &'a OrganizationListQuery,
            page: u32,
            per_page: u32,
        }

        let params = RequestParams {
            query,
            page,
            per_page,
        };

        let response = client.get_with_query("v3/organizations", &params).await?;
        let envelope: ListEnvelope<Organization> =
            response.json().await.map_err(CfError::HttpError)?;
        Ok(Page::from_envelope(envelope, page, per_page))
    }
}

#[async_trait]
impl Create for Organization {
    type Params = OrganizationCreateParams;

    #[tracing::instrument(skip(client, params))]
    async fn create(client: &CfClient, params: Self::Params) -> Result<Self> {
        let response = client.post("v3/organizations", &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl Update for Organization {
    type Id = String;
    type Params = OrganizationUpdateParams;

    #[tracing::instrument(skip(client, params))]
    async fn update(client: &CfClient, guid: String, params: Self::Params) -> Result<Self> {
        let path = format!("v3/organizations/{}", urlencoding::encode(&guid));
        let response = client.patch(&path, &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl Delete for Organization {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &CfClient, guid: String) -> Result<Option<String>> {
        let path = format!("v3/organizations/{}", urlencoding::encode(&guid));
        let response = client.delete(&path).await?;
        Ok(CfClient::job_guid_from_response(&response))
    }
}
