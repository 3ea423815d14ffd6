//! List trait for fetching collections of resources.

use async_trait::async_trait;

use crate::client::CfClient;
use crate::error::Result;
use crate::pagination::Page;

/// Default page size for list operations.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Maximum pages to fetch (safety limit).
const MAX_PAGES: u32 = 1000;

/// List/filter resources with pagination support.
///
/// Implement this trait for resource types that can be listed with
/// optional filtering and pagination.
///
/// # Example
///
/// ```ignore
/// use cfapi::{CfClient, App, List};
///
/// let client = CfClient::from_env().await?;
///
/// // Fetch a single page
/// let page = App::list_page(&client, &Default::default(), 1, 50).await?;
///
/// // Fetch all pages
/// let all_apps = App::list_all(&client, &Default::default()).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// List resources matching the query (single page).
    ///
    /// # Arguments
    ///
    /// * `client` - The Cloud Foundry API client
    /// * `query` - Query parameters for filtering
    /// * `page` - Page number (1-indexed)
    /// * `per_page` - Number of results per page
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &CfClient,
        query: &Self::Query,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>>;

    /// List all resources matching the query (fetches all pages).
    ///
    /// This method automatically handles pagination, fetching pages
    /// until the envelope reports no `next` link.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(client: &CfClient, query: &Self::Query) -> Result<Vec<Self>> {
        let mut all_resources = Vec::new();
        let mut page = 1;

        loop {
            let result = Self::list_page(client, query, page, DEFAULT_PER_PAGE).await?;
            let has_more = result.has_more;
            all_resources.extend(result.resources);

            if !has_more {
                break;
            }
            page += 1;

            // Safety limit to prevent infinite loops
            if page > MAX_PAGES {
                tracing::warn!("Reached pagination limit of {} pages, stopping", MAX_PAGES);
                break;
            }
        }

        Ok(all_resources)
    }
}
