//! Server config whitelists.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::Etf2lClient;
use crate::error::Result;
use crate::models::common::lenient_map;

/// A downloadable item whitelist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Whitelist {
    #[serde(default)]
    pub filename: String,
    /// Unix time of the last edit.
    #[serde(default)]
    pub last_change: i64,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhitelistsResponse {
    #[serde(default, deserialize_with = "lenient_map")]
    whitelists: HashMap<String, Whitelist>,
}

/// Fetch every whitelist, keyed by game mode.
#[tracing::instrument(skip(client, cancel))]
pub async fn get_whitelists(
    client: &Etf2lClient,
    cancel: &CancellationToken,
) -> Result<HashMap<String, Whitelist>> {
    let response: WhitelistsResponse = client.execute(cancel, "/whitelists").await?;
    Ok(response.whitelists)
}
