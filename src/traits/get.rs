//! Get trait for fetching single resources.

use async_trait::async_trait;

use crate::client::CfClient;
use crate::error::Result;

/// Fetch a single resource by GUID.
///
/// Implement this trait for resource types that can be fetched
/// individually by a unique identifier.
///
/// # Example
///
/// ```ignore
/// use cfapi::{CfClient, App, Get};
///
/// let client = CfClient::from_env().await?;
/// let app = App::get(&client, "585bc3c1-3743-497d-88b0-403ad6b56d16".to_string()).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this resource (typically a String GUID).
    type Id;

    /// Fetch the resource by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is not found or the request fails.
    async fn get(client: &CfClient, id: Self::Id) -> Result<Self>;
}
