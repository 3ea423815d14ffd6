//! App and service usage event models.
//!
//! Usage events are the platform's billing/chargeback feed. Consumers
//! typically page forward from the last GUID they processed, hence the
//! `after_guid` filter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::CfClient;
use crate::error::{CfError, Result};
use crate::models::common::Links;
use crate::pagination::{comma_separated, is_empty_filter, ListEnvelope, Page};
use crate::traits::{Get, List};

/// A current/previous value pair as recorded on usage events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta<T> {
    #[serde(default)]
    pub current: Option<T>,
    #[serde(default)]
    pub previous: Option<T>,
}

/// A named GUID reference on a usage event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRef {
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// An app usage event (app start/stop, scale, task activity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppUsageEvent {
    pub guid: String,

    #[serde(default)]
    pub state: Delta<String>,

    #[serde(default)]
    pub memory_in_mb_per_instance: Delta<u64>,

    #[serde(default)]
    pub instance_count: Delta<u64>,

    #[serde(default)]
    pub app: Option<UsageRef>,

    #[serde(default)]
    pub process: Option<UsageRef>,

    #[serde(default)]
    pub space: Option<UsageRef>,

    #[serde(default)]
    pub organization: Option<UsageRef>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub links: Links,
}

/// A service usage event (instance created/updated/deleted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceUsageEvent {
    pub guid: String,

    #[serde(default)]
    pub state: Delta<String>,

    #[serde(default)]
    pub service_instance: Option<UsageRef>,

    #[serde(default)]
    pub service_plan: Option<UsageRef>,

    #[serde(default)]
    pub service_offering: Option<UsageRef>,

    #[serde(default)]
    pub space: Option<UsageRef>,

    #[serde(default)]
    pub organization: Option<UsageRef>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub links: Links,
}

/// Query parameters shared by both usage event feeds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageEventListQuery {
    /// Return only events after the given event GUID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_guid: Option<String>,

    /// Filter by event GUIDs.
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "is_empty_filter")]
    pub guids: Vec<String>,
}

macro_rules! usage_event_endpoints {
    ($resource:ty, $path:literal) => {
        #[async_trait]
        impl Get for $resource {
            type Id = String;

            async fn get(client: &CfClient, guid: String) -> Result<Self> {
                let path = format!(concat!($path, "/{}"), urlencoding::encode(&guid));
                let response = client.get(&path).await?;
                response.json().await.map_err(CfError::HttpError)
            }
        }

        #[async_trait]
        impl List for $resource {
            type Query = UsageEventListQuery;

            async fn list_page(
                client: &CfClient,
                query: &Self::Query,
                page: u32,
                per_page: u32,
            ) -> Result<Page<Self>> {
                #[derive(Serialize)]
                struct RequestParams<'a> {
                    #[serde(flatten)]
                    query: &'a UsageEventListQuery,
                    page: u32,
                    per_page: u32,
                }

                let params = RequestParams {
                    query,
                    page,
                    per_page,
                };

                let response = client.get_with_query($path, &params).await?;
                let envelope: ListEnvelope<$resource> =
                    response.json().await.map_err(CfError::HttpError)?;
                Ok(Page::from_envelope(envelope, page, per_page))
            }
        }
    };
}

usage_event_endpoints!(AppUsageEvent, "v3/app_usage_events");
usage_event_endpoints!(ServiceUsageEvent, "v3/service_usage_events");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_usage_event_state_delta() {
        let event: AppUsageEvent = serde_json::from_str(
            r#"{
                "guid": "ev-1",
                "state": {"current": "STARTED", "previous": "STOPPED"},
                "instance_count": {"current": 3, "previous": 1},
                "app": {"guid": "a-1", "name": "web"}
            }"#,
        )
        .unwrap();

        assert_eq!(event.state.current.as_deref(), Some("STARTED"));
        assert_eq!(event.state.previous.as_deref(), Some("STOPPED"));
        assert_eq!(event.instance_count.current, Some(3));
        assert_eq!(event.app.unwrap().name.as_deref(), Some("web"));
    }

    #[test]
    fn test_usage_query_after_guid() {
        let query = UsageEventListQuery {
            after_guid: Some("ev-99".to_string()),
            ..Default::default()
        };
        let serialized = serde_qs::to_string(&query).expect("Failed to serialize query");
        assert!(serialized.contains("after_guid=ev-99"));
        assert!(!serialized.contains("guids"));
    }
}
