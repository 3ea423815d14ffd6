//! Update trait for modifying resources.

use async_trait::async_trait;

use crate::client::CfClient;
use crate::error::Result;

/// Update an existing resource.
///
/// Implement this trait for resource types that can be modified
/// after creation (V3 uses `PATCH` semantics: absent fields are left
/// unchanged).
///
/// # Example
///
/// ```ignore
/// use cfapi::{CfClient, App, AppUpdateParams, Update};
///
/// let client = CfClient::from_env().await?;
/// let updated = App::update(
///     &client,
///     "585bc3c1-3743-497d-88b0-403ad6b56d16".to_string(),
///     AppUpdateParams {
///         name: Some("renamed".to_string()),
///         ..Default::default()
///     },
/// ).await?;
/// ```
#[async_trait]
pub trait Update: Sized {
    /// The ID type for this resource.
    type Id;

    /// Parameters for the update.
    type Params;

    /// Update the resource and return the updated version.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is not found or the request fails.
    async fn update(client: &CfClient, id: Self::Id, params: Self::Params) -> Result<Self>;
}
