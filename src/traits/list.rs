//! List trait for fetching collections of entities.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::client::Etf2lClient;
use crate::error::Result;
use crate::pagination::{Page, Paged, Request};

/// List/filter entities through the pagination driver.
///
/// Implementors only describe where the first page lives and which
/// envelope the pages decode into; traversal is shared.
///
/// # Example
///
/// ```ignore
/// use etf2l::{Ban, BanQuery, Etf2lClient, List};
/// use tokio_util::sync::CancellationToken;
///
/// let client = Etf2lClient::new()?;
/// let cancel = CancellationToken::new();
///
/// // First page only
/// let bans = Ban::list(&client, &cancel, &BanQuery::default()).await?;
///
/// // Every page
/// let query = BanQuery { recursive: true, ..Default::default() };
/// let all_bans = Ban::list(&client, &cancel, &query).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Filters and path parameters, including the `recursive` flag.
    type Query: Send + Sync;

    /// Decoded shape of one page.
    type Envelope: Paged<Item = Self>;

    /// The request for the first page.
    fn request(query: &Self::Query) -> Request;

    /// Fetch the first page, or every page if the query is recursive.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails; no partial list is
    /// returned.
    async fn list(
        client: &Etf2lClient,
        cancel: &CancellationToken,
        query: &Self::Query,
    ) -> Result<Vec<Self>> {
        client
            .paginate::<Self::Envelope>(cancel, Self::request(query))
            .await
    }

    /// Fetch only the first page, keeping the pager metadata.
    async fn list_page(
        client: &Etf2lClient,
        cancel: &CancellationToken,
        query: &Self::Query,
    ) -> Result<Page<Self>> {
        client
            .fetch_page::<Self::Envelope>(cancel, &Self::request(query))
            .await
    }
}
