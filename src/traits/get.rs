//! Get trait for fetching single entities.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::client::Etf2lClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// Implement this trait for entity types that can be fetched individually.
/// Single lookups never paginate.
///
/// # Example
///
/// ```ignore
/// use etf2l::{Etf2lClient, Get, Team};
/// use tokio_util::sync::CancellationToken;
///
/// let client = Etf2lClient::new()?;
/// let team = Team::get(&client, &CancellationToken::new(), 2).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity.
    type Id: Send;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](crate::Etf2lError::NotFound) if the API has no
    /// such entity, or any other transport error.
    async fn get(client: &Etf2lClient, cancel: &CancellationToken, id: Self::Id) -> Result<Self>;
}
