//! Job model and polling integration.
//!
//! Jobs track asynchronous platform work (deletes, service operations,
//! deployment rollouts). A job moves through `PROCESSING`/`POLLING` to
//! `COMPLETE` or `FAILED` and never transitions again after that.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::CfClient;
use crate::error::{CfError, Result};
use crate::models::common::Links;
use crate::poll::{poll_until_terminal, Operation, PollPolicy};
use crate::traits::Get;

/// A Cloud Foundry job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub guid: String,

    /// What the job is doing (e.g. `app.delete`, `service_instance.create`).
    #[serde(default)]
    pub operation: String,

    /// `PROCESSING`, `POLLING`, `COMPLETE`, or `FAILED`.
    #[serde(default)]
    pub state: String,

    /// Populated when the job failed.
    #[serde(default)]
    pub errors: Vec<JobError>,

    /// Non-fatal warnings collected while the job ran.
    #[serde(default)]
    pub warnings: Vec<JobWarning>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub links: Links,
}

/// An error recorded on a failed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    #[serde(default)]
    pub code: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

/// A warning recorded on a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobWarning {
    #[serde(default)]
    pub detail: String,
}

impl Job {
    /// View this job as a poll [`Operation`].
    ///
    /// The description carries the first error detail when the job failed.
    pub fn as_operation(&self) -> Operation {
        let mut operation = Operation::new(&self.guid, &self.state);
        if let Some(err) = self.errors.first() {
            operation = operation.with_description(&err.detail);
        }
        operation
    }

    /// Poll this job until it completes.
    ///
    /// Returns the final [`Job`] on success; a `FAILED` terminal state
    /// surfaces as [`CfError::OperationFailed`] with the job's first error
    /// detail as the description.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use std::time::Duration;
    /// use cfapi::{Delete, Job, PollPolicy, Space};
    /// use tokio_util::sync::CancellationToken;
    ///
    /// if let Some(job_guid) = Space::delete(&client, space_guid).await? {
    ///     let policy = PollPolicy::with_deadline(
    ///         Duration::from_secs(2),
    ///         Duration::from_secs(120),
    ///     );
    ///     Job::poll_complete(&client, &job_guid, &policy, &CancellationToken::new()).await?;
    /// }
    /// ```
    pub async fn poll_complete(
        client: &CfClient,
        guid: &str,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<Job> {
        let observed: Arc<Mutex<Option<Job>>> = Arc::new(Mutex::new(None));

        let fetch = {
            let observed = Arc::clone(&observed);
            let client = client.clone();
            let guid = guid.to_string();
            move || {
                let observed = Arc::clone(&observed);
                let client = client.clone();
                let guid = guid.clone();
                async move {
                    let job = Job::get(&client, guid).await?;
                    let operation = job.as_operation();
                    *observed.lock().expect("job snapshot lock poisoned") = Some(job);
                    Ok(operation)
                }
            }
        };

        poll_until_terminal(guid, fetch, policy, cancel).await?;

        let job = observed
            .lock()
            .expect("job snapshot lock poisoned")
            .take()
            .ok_or_else(|| CfError::NotFound {
                entity_type: "job",
                guid: guid.to_string(),
            })?;
        Ok(job)
    }
}

#[async_trait]
impl Get for Job {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &CfClient, guid: String) -> Result<Self> {
        let path = format!("v3/jobs/{}", urlencoding::encode(&guid));
        let response = client.get(&path).await?;
        response.json().await.map_err(CfError::HttpError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_job_operation_carries_error_detail() {
        let job: Job = serde_json::from_str(
            r#"{
                "guid": "job-1",
                "operation": "app.delete",
                "state": "FAILED",
                "errors": [{"code": 10008, "title": "CF-UnprocessableEntity", "detail": "something went wrong"}],
                "warnings": []
            }"#,
        )
        .unwrap();

        let operation = job.as_operation();
        assert_eq!(operation.guid, "job-1");
        assert_eq!(operation.state, "FAILED");
        assert_eq!(operation.description.as_deref(), Some("something went wrong"));
    }

    #[test]
    fn test_processing_job_operation_has_no_description() {
        let job: Job = serde_json::from_str(
            r#"{"guid": "job-2", "operation": "space.delete", "state": "PROCESSING"}"#,
        )
        .unwrap();
        let operation = job.as_operation();
        assert_eq!(operation.state, "PROCESSING");
        assert!(operation.description.is_none());
    }
}
