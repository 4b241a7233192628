//! List trait for fetching every resource of a kind.

use async_trait::async_trait;

use crate::client::ClcClient;
use crate::error::Result;

/// List resources visible to an account.
///
/// The provider returns these endpoints unpaginated, so a single request
/// yields the full set.
///
/// # Example
///
/// ```ignore
/// use clcapi::{ClcClient, Datacenter, List};
///
/// let client = ClcClient::from_env()?;
/// let datacenters = Datacenter::list(&client, &Default::default()).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters scoping the listing.
    type Query: Default + Send + Sync;

    /// List resources matching the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list(client: &ClcClient, query: &Self::Query) -> Result<Vec<Self>>;
}
