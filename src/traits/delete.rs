//! Delete trait for removing resources.

use async_trait::async_trait;

use crate::client::CfClient;
use crate::error::Result;

/// Delete an existing resource.
///
/// Most V3 deletes are asynchronous: the platform answers `202 Accepted`
/// and performs the delete under a job. `delete` returns `Some(job_guid)`
/// in that case so the caller can poll the job to completion; synchronous
/// deletes return `None`.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use cfapi::{CfClient, Delete, Job, PollPolicy, Space};
///
/// let client = CfClient::from_env().await?;
/// if let Some(job_guid) = Space::delete(&client, space_guid).await? {
///     let policy = PollPolicy::with_deadline(Duration::from_secs(2), Duration::from_secs(120));
///     Job::poll_complete(&client, &job_guid, &policy, &cancel).await?;
/// }
/// ```
#[async_trait]
pub trait Delete: Sized {
    /// The ID type for this resource.
    type Id;

    /// Delete the resource.
    ///
    /// Returns the GUID of the job tracking an asynchronous delete, or
    /// `None` when the platform deleted synchronously.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is not found or the request fails.
    async fn delete(client: &CfClient, id: Self::Id) -> Result<Option<String>>;
}
