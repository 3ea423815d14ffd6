//! Organization quota model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::CfClient;
use crate::error::{CfError, Result};
use crate::models::common::{Links, RelationshipData, ToManyRelationship};
use crate::pagination::{comma_separated, is_empty_filter, ListEnvelope, Page};
use crate::traits::{Create, Delete, Get, List, Update};

/// An organization quota.
///
/// Quotas cap what the organizations they are applied to may consume:
/// app memory and instances, service instances, routes, and domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationQuota {
    pub guid: String,

    pub name: String,

    #[serde(default)]
    pub apps: AppQuotaLimits,

    #[serde(default)]
    pub services: ServiceQuotaLimits,

    #[serde(default)]
    pub routes: RouteQuotaLimits,

    #[serde(default)]
    pub domains: DomainQuotaLimits,

    #[serde(default)]
    pub relationships: QuotaRelationships,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub links: Links,
}

/// App-related limits; `None` means unlimited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppQuotaLimits {
    #[serde(default)]
    pub total_memory_in_mb: Option<u64>,
    #[serde(default)]
    pub per_process_memory_in_mb: Option<u64>,
    #[serde(default)]
    pub total_instances: Option<u64>,
    #[serde(default)]
    pub per_app_tasks: Option<u64>,
    #[serde(default)]
    pub log_rate_limit_in_bytes_per_second: Option<u64>,
}

/// Service-related limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceQuotaLimits {
    #[serde(default)]
    pub paid_services_allowed: bool,
    #[serde(default)]
    pub total_service_instances: Option<u64>,
    #[serde(default)]
    pub total_service_keys: Option<u64>,
}

/// Route-related limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteQuotaLimits {
    #[serde(default)]
    pub total_routes: Option<u64>,
    #[serde(default)]
    pub total_reserved_ports: Option<u64>,
}

/// Domain-related limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainQuotaLimits {
    #[serde(default)]
    pub total_domains: Option<u64>,
}

/// Organizations the quota is applied to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaRelationships {
    #[serde(default)]
    pub organizations: ToManyRelationship,
}

impl OrganizationQuota {
    /// GUIDs of the organizations this quota applies to.
    pub fn organization_guids(&self) -> Vec<&str> {
        self.relationships
            .organizations
            .data
            .iter()
            .map(|d| d.guid.as_str())
            .collect()
    }

    /// Apply this quota to additional organizations. Returns the GUIDs of
    /// all organizations now covered.
    #[tracing::instrument(skip(client))]
    pub async fn apply_to_organizations(
        client: &CfClient,
        guid: &str,
        organization_guids: &[String],
    ) -> Result<Vec<String>> {
        #[derive(Serialize)]
        struct Body {
            data: Vec<RelationshipData>,
        }
        #[derive(Deserialize)]
        struct Applied {
            data: Vec<RelationshipData>,
        }

        let path = format!(
            "v3/organization_quotas/{}/relationships/organizations",
            urlencoding::encode(guid)
        );
        let body = Body {
            data: organization_guids
                .iter()
                .map(|g| RelationshipData { guid: g.clone() })
                .collect(),
        };
        let response = client.post(&path, &body).await?;
        let applied: Applied = response.json().await.map_err(CfError::HttpError)?;
        Ok(applied.data.into_iter().map(|d| d.guid).collect())
    }
}

/// Query parameters for listing organization quotas.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationQuotaListQuery {
    /// Filter by quota names.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub names: Vec<String>,

    /// Filter by quota GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub guids: Vec<String>,

    /// Filter by applied organization GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub organization_guids: Vec<String>,
}

/// Parameters for creating an organization quota.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationQuotaCreateParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apps: Option<AppQuotaLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<ServiceQuotaLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<RouteQuotaLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<DomainQuotaLimits>,
}

impl OrganizationQuotaCreateParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            apps: None,
            services: None,
            routes: None,
            domains: None,
        }
    }
}

/// Parameters for updating an organization quota.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationQuotaUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apps: Option<AppQuotaLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<ServiceQuotaLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<RouteQuotaLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<DomainQuotaLimits>,
}

#[async_trait]
impl Get for OrganizationQuota {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &CfClient, guid: String) -> Result<Self> {
        let path = format!("v3/organization_quotas/{}", urlencoding::encode(&guid));
        let response = client.get(&path).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl List for OrganizationQuota {
    type Query = OrganizationQuotaListQuery;

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
            query: &'a OrganizationQuotaListQuery,
            page: u32,
            per_page: u32,
        }

        let params = RequestParams {
            query,
            page,
            per_page,
        };

        let response = client
            .get_with_query("v3/organization_quotas", &params)
            .await?;
        let envelope: ListEnvelope<OrganizationQuota> =
            response.json().await.map_err(CfError::HttpError)?;
        Ok(Page::from_envelope(envelope, page, per_page))
    }
}

#[async_trait]
impl Create for OrganizationQuota {
    type Params = OrganizationQuotaCreateParams;

    #[tracing::instrument(skip(client, params))]
    async fn create(client: &CfClient, params: Self::Params) -> Result<Self> {
        let response = client.post("v3/organization_quotas", &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl Update for OrganizationQuota {
    type Id = String;
    type Params = OrganizationQuotaUpdateParams;

    #[tracing::instrument(skip(client, params))]
    async fn update(client: &CfClient, guid: String, params: Self::Params) -> Result<Self> {
        let path = format!("v3/organization_quotas/{}", urlencoding::encode(&guid));
        let response = client.patch(&path, &params).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[async_trait]
impl Delete for OrganizationQuota {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &CfClient, guid: String) -> Result<Option<String>> {
        let path = format!("v3/organization_quotas/{}", urlencoding::encode(&guid));
        let response = client.delete(&path).await?;
        Ok(CfClient::job_guid_from_response(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_limits_mean_unlimited() {
        let quota: OrganizationQuota = serde_json::from_str(
            r#"{
                "guid": "q-1",
                "name": "default",
                "apps": {"total_memory_in_mb": null, "total_instances": 100},
                "services": {"paid_services_allowed": true, "total_service_instances": null},
                "relationships": {"organizations": {"data": [{"guid": "o-1"}]}}
            }"#,
        )
        .unwrap();

        assert!(quota.apps.total_memory_in_mb.is_none());
        assert_eq!(quota.apps.total_instances, Some(100));
        assert!(quota.services.paid_services_allowed);
        assert_eq!(quota.organization_guids(), vec!["o-1"]);
    }
}
