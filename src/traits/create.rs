//! Create trait for provisioning new resources.

use async_trait::async_trait;

use crate::client::CfClient;
use crate::error::Result;

/// Create a new resource.
///
/// Implement this trait for resource types whose creation endpoint
/// answers synchronously with the created resource. The response is
/// statically typed as `Self`; no dynamic casting is involved.
///
/// Asynchronously-created resources (e.g. managed service instances)
/// expose inherent methods returning the tracking job GUID instead.
///
/// # Example
///
/// ```ignore
/// use cfapi::{CfClient, Create, Organization, OrganizationCreateParams};
///
/// let client = CfClient::from_env().await?;
/// let org = Organization::create(
///     &client,
///     OrganizationCreateParams::new("my-org"),
/// ).await?;
/// ```
#[async_trait]
pub trait Create: Sized {
    /// Parameters for the creation request.
    type Params;

    /// Create the resource and return the created version.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected or fails.
    async fn create(client: &CfClient, params: Self::Params) -> Result<Self>;
}
