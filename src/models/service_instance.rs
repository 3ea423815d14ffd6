//! Service instance model and trait implementations.
//!
//! Managed service instances are provisioned by a broker and complete
//! asynchronously: creation answers `202` with a job, and the instance's
//! `last_operation` block tracks broker-side progress. User-provided
//! instances are plain records and complete synchronously.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::CfClient;
use crate::error::{CfError, Result};
use crate::models::common::{LastOperation, Links, Metadata, ToOneRelationship};
use crate::pagination::{comma_separated, is_empty_filter, ListEnvelope, Page};
use crate::poll::{poll_until_terminal, Operation, PollPolicy};
use crate::traits::{Delete, Get, List};

/// A Cloud Foundry service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub guid: String,

    /// The instance name, unique within its space.
    pub name: String,

    /// `managed` or `user-provided`.
    #[serde(rename = "type", default)]
    pub instance_type: String,

    /// Broker-side progress of the most recent create/update/delete.
    #[serde(default)]
    pub last_operation: Option<LastOperation>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether a newer service plan version exists (managed only).
    #[serde(default)]
    pub upgrade_available: Option<bool>,

    #[serde(default)]
    pub dashboard_url: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub relationships: ServiceInstanceRelationships,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub links: Links,
}

/// Relationships carried by a service instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceInstanceRelationships {
    #[serde(default)]
    pub space: ToOneRelationship,
    /// Present on managed instances only.
    #[serde(default)]
    pub service_plan: ToOneRelationship,
}

impl ServiceInstance {
    /// Whether this is a broker-managed instance.
    pub fn is_managed(&self) -> bool {
        self.instance_type == "managed"
    }

    /// Whether this is a user-provided instance.
    pub fn is_user_provided(&self) -> bool {
        self.instance_type == "user-provided"
    }

    /// The GUID of the space this instance lives in.
    pub fn space_guid(&self) -> Option<&str> {
        self.relationships.space.guid()
    }

    /// View this instance's `last_operation` as a poll [`Operation`].
    ///
    /// Returns `None` when the platform has not recorded one (common for
    /// user-provided instances).
    pub fn as_operation(&self) -> Option<Operation> {
        let last = self.last_operation.as_ref()?;
        let mut operation = Operation::new(&self.guid, &last.state);
        if let Some(description) = &last.description {
            operation = operation.with_description(description);
        }
        Some(operation)
    }

    /// Provision a managed instance.
    ///
    /// The broker works asynchronously; the returned GUID is the job
    /// tracking the provision. Callers typically follow with
    /// [`Job::poll_complete`](crate::Job::poll_complete) or
    /// [`poll_last_operation`](Self::poll_last_operation).
    #[tracing::instrument(skip(client, params))]
    pub async fn create_managed(
        client: &CfClient,
        params: ManagedServiceInstanceCreateParams,
    ) -> Result<String> {
        let response = client.post("v3/service_instances", &params).await?;
        CfClient::job_guid_from_response(&response).ok_or_else(|| CfError::ApiError {
            title: "CF-UnexpectedResponse".to_string(),
            detail: "managed service instance creation did not return a job location"
                .to_string(),
            code: None,
            status_code: Some(response.status().as_u16()),
        })
    }

    /// Create a user-provided instance. Synchronous; returns the created
    /// instance directly.
    #[tracing::instrument(skip(client, params))]
    pub async fn create_user_provided(
        client: &CfClient,
        params: UserProvidedServiceInstanceCreateParams,
    ) -> Result<ServiceInstance> {
        let response = client.post("v3/service_instances", &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }

    /// Update a managed instance. Returns the GUID of the job tracking the
    /// update.
    #[tracing::instrument(skip(client, params))]
    pub async fn update_managed(
        client: &CfClient,
        guid: &str,
        params: ServiceInstanceUpdateParams,
    ) -> Result<String> {
        let path = format!("v3/service_instances/{}", urlencoding::encode(guid));
        let response = client.patch(&path, &params).await?;
        CfClient::job_guid_from_response(&response).ok_or_else(|| CfError::ApiError {
            title: "CF-UnexpectedResponse".to_string(),
            detail: "managed service instance update did not return a job location".to_string(),
            code: None,
            status_code: Some(response.status().as_u16()),
        })
    }

    /// Update a user-provided instance. Synchronous.
    #[tracing::instrument(skip(client, params))]
    pub async fn update_user_provided(
        client: &CfClient,
        guid: &str,
        params: ServiceInstanceUpdateParams,
    ) -> Result<ServiceInstance> {
        let path = format!("v3/service_instances/{}", urlencoding::encode(guid));
        let response = client.patch(&path, &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }

    /// Poll this instance's `last_operation` until it reaches a terminal
    /// state, returning the final instance.
    ///
    /// A `failed` last operation surfaces as [`CfError::OperationFailed`]
    /// with the broker's description attached. An instance without a
    /// `last_operation` is treated as not found.
    pub async fn poll_last_operation(
        client: &CfClient,
        guid: &str,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<ServiceInstance> {
        let observed: Arc<Mutex<Option<ServiceInstance>>> = Arc::new(Mutex::new(None));

        let fetch = {
            let observed = Arc::clone(&observed);
            let client = client.clone();
            let guid = guid.to_string();
            move || {
                let observed = Arc::clone(&observed);
                let client = client.clone();
                let guid = guid.clone();
                async move {
                    let instance = ServiceInstance::get(&client, guid.clone()).await?;
                    let operation =
                        instance.as_operation().ok_or_else(|| CfError::NotFound {
                            entity_type: "service instance last_operation",
                            guid: guid.clone(),
                        })?;
                    *observed.lock().expect("instance snapshot lock poisoned") = Some(instance);
                    Ok(operation)
                }
            }
        };

        poll_until_terminal(guid, fetch, policy, cancel).await?;

        let instance = observed
            .lock()
            .expect("instance snapshot lock poisoned")
            .take()
            .ok_or_else(|| CfError::NotFound {
                entity_type: "service instance",
                guid: guid.to_string(),
            })?;
        Ok(instance)
    }
}

/// Query parameters for listing service instances.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceInstanceListQuery {
    /// Filter by instance names.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub names: Vec<String>,

    /// Filter by instance GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub guids: Vec<String>,

    /// Filter by owning space GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub space_guids: Vec<String>,

    /// Filter by owning organization GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub organization_guids: Vec<String>,

    /// Filter by instance type (`managed` or `user-provided`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    /// Sort order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Label selector expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
}

/// Parameters for provisioning a managed service instance.
#[derive(Debug, Clone, Serialize)]
pub struct ManagedServiceInstanceCreateParams {
    /// Always `managed`.
    #[serde(rename = "type")]
    instance_type: &'static str,
    pub name: String,
    pub relationships: ServiceInstanceRelationships,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ManagedServiceInstanceCreateParams {
    pub fn new(
        name: impl Into<String>,
        space_guid: impl Into<String>,
        service_plan_guid: impl Into<String>,
    ) -> Self {
        Self {
            instance_type: "managed",
            name: name.into(),
            relationships: ServiceInstanceRelationships {
                space: ToOneRelationship::to(space_guid),
                service_plan: ToOneRelationship::to(service_plan_guid),
            },
            parameters: None,
            tags: Vec::new(),
            metadata: None,
        }
    }
}

/// Relationships for a user-provided instance (space only; no plan).
#[derive(Debug, Clone, Serialize)]
pub struct UserProvidedRelationships {
    pub space: ToOneRelationship,
}

/// Parameters for creating a user-provided service instance.
#[derive(Debug, Clone, Serialize)]
pub struct UserProvidedServiceInstanceCreateParams {
    /// Always `user-provided`.
    #[serde(rename = "type")]
    instance_type: &'static str,
    pub name: String,
    pub relationships: UserProvidedRelationships,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syslog_drain_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_service_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl UserProvidedServiceInstanceCreateParams {
    pub fn new(name: impl Into<String>, space_guid: impl Into<String>) -> Self {
        Self {
            instance_type: "user-provided",
            name: name.into(),
            relationships: UserProvidedRelationships {
                space: ToOneRelationship::to(space_guid),
            },
            credentials: None,
            syslog_drain_url: None,
            route_service_url: None,
            tags: Vec::new(),
        }
    }
}

/// Parameters for updating a service instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceInstanceUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[async_trait]
impl Get for ServiceInstance {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &CfClient, guid: String) -> Result<Self> {
        let path = format!("v3/service_instances/{}", urlencoding::encode(&guid));
        let response = client.get(&path).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl List for ServiceInstance {
    type Query = ServiceInstanceListQuery;

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
            query: &'a ServiceInstanceListQuery,
            page: u32,
            per_page: u32,
        }

        let params = RequestParams {
            query,
            page,
            per_page,
        };

        let response = client.get_with_query("v3/service_instances", &params).await?;
        let envelope: ListEnvelope<ServiceInstance> =
            response.json().await.map_err(CfError::HttpError)?;
        Ok(Page::from_envelope(envelope, page, per_page))
    }
}

#[async_trait]
impl Delete for ServiceInstance {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &CfClient, guid: String) -> Result<Option<String>> {
        let path = format!("v3/service_instances/{}", urlencoding::encode(&guid));
        let response = client.delete(&path).await?;
        Ok(CfClient::job_guid_from_response(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_operation_maps_to_poll_operation() {
        let instance: ServiceInstance = serde_json::from_str(
            r#"{
                "guid": "si-1",
                "name": "my-db",
                "type": "managed",
                "last_operation": {
                    "type": "create",
                    "state": "in progress",
                    "description": "provisioning cluster"
                }
            }"#,
        )
        .unwrap();

        assert!(instance.is_managed());
        let operation = instance.as_operation().unwrap();
        assert_eq!(operation.guid, "si-1");
        assert_eq!(operation.state, "in progress");
        assert_eq!(operation.description.as_deref(), Some("provisioning cluster"));
    }

    #[test]
    fn test_user_provided_without_last_operation() {
        let instance: ServiceInstance = serde_json::from_str(
            r#"{"guid": "si-2", "name": "creds", "type": "user-provided"}"#,
        )
        .unwrap();
        assert!(instance.is_user_provided());
        assert!(instance.as_operation().is_none());
    }

    #[test]
    fn test_managed_create_params_shape() {
        let params = ManagedServiceInstanceCreateParams::new("my-db", "space-1", "plan-1");
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["type"], "managed");
        assert_eq!(json["relationships"]["space"]["data"]["guid"], "space-1");
        assert_eq!(
            json["relationships"]["service_plan"]["data"]["guid"],
            "plan-1"
        );
        // Empty optionals omitted
        assert!(json.get("parameters").is_none());
        assert!(json.get("tags").is_none());
    }
}
