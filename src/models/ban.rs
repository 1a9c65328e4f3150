//! Ban model and trait implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::Etf2lClient;
use crate::error::Result;
use crate::models::common::{lenient_string, unix_time};
use crate::models::envelope::BansEnvelope;
use crate::pagination::{Query, Request};
use crate::traits::List;

/// A ban from the public ban list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ban {
    /// Unix time the ban started.
    #[serde(default)]
    pub start: i64,
    /// Unix time the ban ends.
    #[serde(default)]
    pub end: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub steamid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub steamid64: String,
    /// Profile URL.
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub reason: String,
}

impl Ban {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.start)
    }

    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.end)
    }
}

/// Ban state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanStatus {
    Active,
    Expired,
}

impl BanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

/// Filters for `/bans`.
#[derive(Debug, Clone, Default)]
pub struct BanQuery {
    /// ETF2L player id (not a SteamID).
    pub player_id: Option<u64>,
    pub status: Option<BanStatus>,
    /// Ban reason, e.g. `VAC`.
    pub reason: Option<String>,
    /// Follow every page.
    pub recursive: bool,
}

impl List for Ban {
    type Query = BanQuery;
    type Envelope = BansEnvelope<Ban>;

    fn request(query: &BanQuery) -> Request {
        let mut params = Query::new();
        params
            .push_opt("player", query.player_id)
            .push_opt("status", query.status.map(|s| s.as_str()))
            .push_opt("reason", query.reason.as_deref());

        Request::new("/bans")
            .with_query(params)
            .recursive(query.recursive)
    }
}

/// Fetch bans matching `query`.
pub async fn get_bans(
    client: &Etf2lClient,
    cancel: &CancellationToken,
    query: &BanQuery,
) -> Result<Vec<Ban>> {
    Ban::list(client, cancel, query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ban_request_filters() {
        let query = BanQuery {
            player_id: Some(139491),
            status: Some(BanStatus::Expired),
            reason: Some("VAC".to_string()),
            recursive: false,
        };
        assert_eq!(
            Ban::request(&query).target(),
            "/bans?player=139491&status=expired&reason=VAC"
        );
    }

    #[test]
    fn test_ban_decodes_numeric_steamid64() {
        let ban: Ban = serde_json::from_value(serde_json::json!({
            "start": 1, "end": 2, "name": "x",
            "steamid": "STEAM_0:0:1", "steamid64": 76561197960265730u64,
            "expired": true, "reason": "VAC"
        }))
        .unwrap();
        assert_eq!(ban.steamid64, "76561197960265730");
        assert!(ban.expired);
    }
}
