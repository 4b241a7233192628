//! Get trait for fetching single resources.

use async_trait::async_trait;

use crate::client::ClcClient;
use crate::error::Result;

/// Fetch a single resource by ID.
///
/// Implement this trait for resource types that can be fetched individually
/// by an identifier scoped to the session's account alias.
///
/// # Example
///
/// ```ignore
/// use clcapi::{ClcClient, Server, Get};
///
/// let client = ClcClient::from_env()?;
/// let server = Server::get(&client, "WA1ACMEWEB01".to_string()).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this resource (e.g., a location or server name).
    type Id;

    /// Fetch the resource by ID.
    ///
    /// # Arguments
    ///
    /// * `client` - The CLC API client
    /// * `id` - The resource identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is not found or the request fails.
    async fn get(client: &ClcClient, id: Self::Id) -> Result<Self>;
}
