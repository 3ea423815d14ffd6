//! Application model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::CfClient;
use crate::error::{CfError, Result};
use crate::models::common::{Links, Metadata, ToOneRelationship};
use crate::pagination::{comma_separated, is_empty_filter, ListEnvelope, Page};
use crate::traits::{Create, Delete, Get, List, Update};

/// A Cloud Foundry application.
///
/// Apps are the unit of deployment: each belongs to a space and carries a
/// lifecycle (buildpack or docker) plus a desired state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub guid: String,

    /// The application name, unique within its space.
    pub name: String,

    /// Desired state: `STARTED` or `STOPPED`.
    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// How the app is staged and run.
    #[serde(default)]
    pub lifecycle: Option<Lifecycle>,

    #[serde(default)]
    pub relationships: AppRelationships,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub links: Links,
}

/// Staging/running lifecycle of an app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lifecycle {
    /// `buildpack`, `docker`, or `cnb`.
    #[serde(rename = "type")]
    pub lifecycle_type: String,
    /// Type-specific data (buildpack names, stack, ...).
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Relationships carried by an app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppRelationships {
    #[serde(default)]
    pub space: ToOneRelationship,
}

impl App {
    /// Whether the desired state is `STARTED`.
    pub fn is_started(&self) -> bool {
        self.state == "STARTED"
    }

    /// The GUID of the space this app lives in.
    pub fn space_guid(&self) -> Option<&str> {
        self.relationships.space.guid()
    }

    /// Request the app be started.
    #[tracing::instrument(skip(client))]
    pub async fn start(client: &CfClient, guid: &str) -> Result<App> {
        let path = format!("v3/apps/{}/actions/start", urlencoding::encode(guid));
        let response = client.post(&path, &serde_json::json!({})).await?;
        response.json().await.map_err(CfError::HttpError)
    }

    /// Request the app be stopped.
    #[tracing::instrument(skip(client))]
    pub async fn stop(client: &CfClient, guid: &str) -> Result<App> {
        let path = format!("v3/apps/{}/actions/stop", urlencoding::encode(guid));
        let response = client.post(&path, &serde_json::json!({})).await?;
        response.json().await.map_err(CfError::HttpError)
    }

    /// List this app's revisions.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let app = App::get(&client, guid).await?;
    /// for revision in app.revisions(&client).await? {
    ///     println!("revision {}: {:?}", revision.version, revision.description);
    /// }
    /// ```
    pub async fn revisions(
        &self,
        client: &CfClient,
    ) -> Result<Vec<crate::models::revision::Revision>> {
        crate::models::revision::list_app_revisions(client, &self.guid, Default::default()).await
    }

    /// List this app's sidecars.
    pub async fn sidecars(
        &self,
        client: &CfClient,
    ) -> Result<Vec<crate::models::sidecar::Sidecar>> {
        crate::models::sidecar::list_app_sidecars(client, &self.guid).await
    }
}

/// Query parameters for listing apps.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppListQuery {
    /// Filter by app names.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub names: Vec<String>,

    /// Filter by app GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub guids: Vec<String>,

    /// Filter by owning organization GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub organization_guids: Vec<String>,

    /// Filter by owning space GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub space_guids: Vec<String>,

    /// Sort order (`name`, `created_at`, `updated_at`; prefix with `-` to
    /// descend).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Label selector expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
}

/// Parameters for creating an app.
#[derive(Debug, Clone, Serialize)]
pub struct AppCreateParams {
    pub name: String,
    pub relationships: AppRelationships,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl AppCreateParams {
    /// Minimal creation request: a name and the owning space.
    pub fn new(name: impl Into<String>, space_guid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relationships: AppRelationships {
                space: ToOneRelationship::to(space_guid),
            },
            lifecycle: None,
            environment_variables: None,
            metadata: None,
        }
    }
}

/// Parameters for updating an app.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[async_trait]
impl Get for App {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &CfClient, guid: String) -> Result<Self> {
        let path = format!("v3/apps/{}", urlencoding::encode(&guid));
        let response = client.get(&path).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl List for App {
    type Query = AppListQuery;

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
            query: &'a AppListQuery,
            page: u32,
            per_page: u32,
        }

        let params = RequestParams {
            query,
            page,
            per_page,
        };

        let response = client.get_with_query("v3/apps", &params).await?;
        let envelope: ListEnvelope<App> = response.json().await.map_err(CfError::HttpError)?;
        Ok(Page::from_envelope(envelope, page, per_page))
    }
}

#[async_trait]
impl Create for App {
    type Params = AppCreateParams;

    #[tracing::instrument(skip(client, params))]
    async fn create(client: &CfClient, params: Self::Params) -> Result<Self> {
        let response = client.post("v3/apps", &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl Update for App {
    type Id = String;
    type Params = AppUpdateParams;

    #[tracing::instrument(skip(client, params))]
    async fn update(client: &CfClient, guid: String, params: Self::Params) -> Result<Self> {
        let path = format!("v3/apps/{}", urlencoding::encode(&guid));
        let response = client.patch(&path, &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl Delete for App {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &CfClient, guid: String) -> Result<Option<String>> {
        let path = format!("v3/apps/{}", urlencoding::encode(&guid));
        let response = client.delete(&path).await?;
        Ok(CfClient::job_guid_from_response(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_list_query_serializes_filters_comma_separated() {
        let query = AppListQuery {
            names: vec!["web".to_string(), "worker".to_string()],
            space_guids: vec!["s-1".to_string()],
            order_by: Some("-created_at".to_string()),
            ..Default::default()
        };

        let serialized = serde_qs::to_string(&query).expect("Failed to serialize query");
        assert!(serialized.contains("names=web%2Cworker") || serialized.contains("names=web,worker"));
        assert!(serialized.contains("space_guids=s-1"));
        assert!(serialized.contains("order_by=-created_at"));
        // Empty filters omitted entirely
        assert!(!serialized.contains("guids="));
        assert!(!serialized.contains("organization_guids"));
    }

    #[test]
    fn test_app_deserializes_documented_shape() {
        let app: App = serde_json::from_str(
            r#"{
                "guid": "1cb006ee-fb05-47e1-b541-c34179ddc446",
                "name": "my_app",
                "state": "STARTED",
                "created_at": "2016-03-17T21:41:30Z",
                "updated_at": "2016-06-08T16:41:26Z",
                "lifecycle": {
                    "type": "buildpack",
                    "data": {"buildpacks": ["java_buildpack"], "stack": "cflinuxfs4"}
                },
                "relationships": {"space": {"data": {"guid": "2f35885d-0c9d-4423-83ad-fd05066f8576"}}},
                "metadata": {"labels": {}, "annotations": {}},
                "links": {"self": {"href": "https://api.example.org/v3/apps/1cb006ee"}}
            }"#,
        )
        .unwrap();

        assert!(app.is_started());
        assert_eq!(app.space_guid(), Some("2f35885d-0c9d-4423-83ad-fd05066f8576"));
        assert_eq!(
            app.lifecycle.as_ref().unwrap().lifecycle_type,
            "buildpack"
        );
    }
}
