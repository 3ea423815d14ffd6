//! App revision model and trait implementations.
//!
//! Revisions snapshot an app's deployable code and configuration; the
//! platform records one per deploy so earlier versions can be rolled back
//! to.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::CfClient;
use crate::error::{CfError, Result};
use crate::models::common::{Links, Metadata, ToOneRelationship};
use crate::pagination::{comma_separated, is_empty_filter, ListEnvelope, Page};
use crate::traits::{Get, List, Update};

/// An app revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub guid: String,

    /// Monotonically increasing version number within the app.
    #[serde(default)]
    pub version: u64,

    /// Why the revision was created (e.g. "Initial revision",
    /// "New droplet deployed").
    #[serde(default)]
    pub description: Option<String>,

    /// The droplet this revision runs.
    #[serde(default)]
    pub droplet: Option<RevisionDroplet>,

    /// Whether the revision can still be deployed.
    #[serde(default)]
    pub deployable: bool,

    #[serde(default)]
    pub relationships: RevisionRelationships,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub links: Links,
}

/// Droplet reference on a revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionDroplet {
    #[serde(default)]
    pub guid: Option<String>,
}

/// Relationships carried by a revision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevisionRelationships {
    #[serde(default)]
    pub app: ToOneRelationship,
}

impl Revision {
    /// The GUID of the app this revision belongs to.
    pub fn app_guid(&self) -> Option<&str> {
        self.relationships.app.guid()
    }
}

/// Query parameters for listing an app's revisions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RevisionListQuery {
    /// Filter by version numbers.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub versions: Vec<String>,

    /// Sort order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

/// Query type for revision listing (includes the owning app's GUID).
pub type RevisionQuery = (String, RevisionListQuery);

/// Parameters for updating a revision (metadata only).
#[derive(Debug, Clone, Default, Serialize)]
pub struct RevisionUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[async_trait]
impl Get for Revision {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &CfClient, guid: String) -> Result<Self> {
        let path = format!("v3/revisions/{}", urlencoding::encode(&guid));
        let response = client.get(&path).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl List for Revision {
    type Query = RevisionQuery; // (app_guid, filters)

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &CfClient,
        query: &Self::Query,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let (app_guid, filters) = query;

        #[derive(Serialize)]
        struct RequestParams<'a> {
            #[serde(flatten)]
            query: &'a RevisionListQuery,
            page: u32,
            per_page: u32,
        }

        let params = RequestParams {
            query: filters,
            page,
            per_page,
        };

        let path = format!("v3/apps/{}/revisions", urlencoding::encode(app_guid));
        let response = client.get_with_query(&path, &params).await?;
        let envelope: ListEnvelope<Revision> =
            response.json().await.map_err(CfError::HttpError)?;
        Ok(Page::from_envelope(envelope, page, per_page))
    }
}

#[async_trait]
impl Update for Revision {
    type Id = String;
    type Params = RevisionUpdateParams;

    #[tracing::instrument(skip(client, params))]
    async fn update(client: &CfClient, guid: String, params: Self::Params) -> Result<Self> {
        let path = format!("v3/revisions/{}", urlencoding::encode(&guid));
        let response = client.patch(&path, &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

// Convenience functions for working with revisions

/// Fetch all revisions for an app.
///
/// # Example
///
/// ```ignore
/// use cfapi::{list_app_revisions, RevisionListQuery};
///
/// let revisions = list_app_revisions(&client, &app_guid, RevisionListQuery::default()).await?;
/// for revision in revisions {
///     println!("v{}: {:?}", revision.version, revision.description);
/// }
/// ```
pub async fn list_app_revisions(
    client: &CfClient,
    app_guid: &str,
    query: RevisionListQuery,
) -> Result<Vec<Revision>> {
    Revision::list_all(client, &(app_guid.to_string(), query)).await
}

/// Fetch a single page of an app's revisions.
pub async fn list_app_revisions_page(
    client: &CfClient,
    app_guid: &str,
    query: RevisionListQuery,
    page: u32,
    per_page: u32,
) -> Result<Page<Revision>> {
    Revision::list_page(client, &(app_guid.to_string(), query), page, per_page).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_deserializes_documented_shape() {
        let revision: Revision = serde_json::from_str(
            r#"{
                "guid": "r-1",
                "version": 2,
                "description": "New droplet deployed",
                "droplet": {"guid": "d-1"},
                "deployable": true,
                "relationships": {"app": {"data": {"guid": "a-1"}}}
            }"#,
        )
        .unwrap();

        assert_eq!(revision.version, 2);
        assert!(revision.deployable);
        assert_eq!(revision.app_guid(), Some("a-1"));
    }
}
