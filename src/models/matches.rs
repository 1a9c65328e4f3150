//! Match models and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::Etf2lClient;
use crate::error::{Etf2lError, Result};
use crate::models::common::{unix_time, Clan, CompetitionRef, Division, MatchUrls};
use crate::models::envelope::ResultsEnvelope;
use crate::pagination::{Page, Query, Request, PAGE_PARAM};
use crate::traits::{Get, List};

/// Largest page size `/matches` accepts.
pub const MAX_MATCH_LIMIT: u32 = 2000;

/// A league match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: u64,
    pub clan1: Clan,
    pub clan2: Clan,
    #[serde(default)]
    pub competition: Option<CompetitionRef>,
    /// Unix time the result was submitted.
    #[serde(default)]
    pub submitted: Option<i64>,
    #[serde(default)]
    pub defaultwin: bool,
    #[serde(default)]
    pub division: Option<Division>,
    #[serde(default)]
    pub maps: Vec<String>,
    #[serde(default)]
    pub r1: Option<i64>,
    #[serde(default)]
    pub r2: Option<i64>,
    #[serde(default)]
    pub round: Option<String>,
    /// Scheduled unix time.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub week: Option<i64>,
    #[serde(default)]
    pub urls: MatchUrls,
}

impl Match {
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        self.time.and_then(unix_time)
    }

    /// True once both scores are in.
    pub fn is_played(&self) -> bool {
        self.r1.is_some() && self.r2.is_some()
    }
}

/// Score of one map in a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapResult {
    #[serde(default)]
    pub match_order: u32,
    #[serde(default)]
    pub clan1: i64,
    #[serde(default)]
    pub clan2: i64,
    #[serde(default)]
    pub map: String,
    #[serde(default)]
    pub golden_cap: bool,
}

/// Full match record from `/matches/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetails {
    pub id: u64,
    pub clan1: Clan,
    pub clan2: Clan,
    #[serde(default)]
    pub competition: Option<CompetitionRef>,
    #[serde(default)]
    pub defaultwin: bool,
    #[serde(default)]
    pub division: Option<Division>,
    #[serde(default)]
    pub maps: Vec<String>,
    #[serde(default)]
    pub r1: Option<i64>,
    #[serde(default)]
    pub r2: Option<i64>,
    #[serde(default)]
    pub round: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub submitted: Option<i64>,
    #[serde(default)]
    pub week: Option<i64>,
    #[serde(default)]
    pub urls: MatchUrls,
    #[serde(default)]
    pub players: Vec<serde_json::Value>,
    #[serde(default)]
    pub bye_week: bool,
    #[serde(default)]
    pub demos: Vec<serde_json::Value>,
    #[serde(default)]
    pub map_results: Vec<MapResult>,
}

/// Filters accepted by `/matches` and `/team/{id}/matches`.
#[derive(Debug, Clone, Default)]
pub struct MatchFilters {
    /// Team id of the blu team.
    pub clan1: Option<u64>,
    /// Team id of the red team.
    pub clan2: Option<u64>,
    /// Team id of either team.
    pub vs: Option<u64>,
    /// `Some(true)` for upcoming matches, `Some(false)` for finished ones.
    pub scheduled: Option<bool>,
    /// Competition id.
    pub competition: Option<u64>,
    /// Only matches after this unix time.
    pub from: Option<i64>,
    /// Only matches before this unix time.
    pub to: Option<i64>,
    /// Division name.
    pub division: Option<String>,
    /// Team type name (e.g. "6v6").
    pub team_type: Option<String>,
    /// Round name.
    pub round: Option<String>,
    /// ETF2L player ids; any of them must have played.
    pub players: Vec<u64>,
}

impl MatchFilters {
    pub(crate) fn append_to(&self, query: &mut Query) {
        query
            .push_opt("clan1", self.clan1)
            .push_opt("clan2", self.clan2)
            .push_opt("vs", self.vs)
            .push_opt("scheduled", self.scheduled.map(u8::from))
            .push_opt("competition", self.competition)
            .push_opt("from", self.from)
            .push_opt("to", self.to)
            .push_opt("division", self.division.as_deref())
            .push_opt("team_type", self.team_type.as_deref())
            .push_opt("round", self.round.as_deref())
            .push_list("players", &self.players);
    }
}

/// Query for `/matches`.
#[derive(Debug, Clone, Default)]
pub struct MatchQuery {
    pub filters: MatchFilters,
    /// Page size, at most [`MAX_MATCH_LIMIT`].
    pub limit: Option<u32>,
    /// Follow every page.
    pub recursive: bool,
}

/// API response wrapper for a single match.
#[derive(Debug, Deserialize)]
struct MatchDetailsResponse {
    #[serde(rename = "match")]
    details: MatchDetails,
}

#[async_trait]
impl Get for MatchDetails {
    type Id = u64;

    #[tracing::instrument(skip(client, cancel))]
    async fn get(client: &Etf2lClient, cancel: &CancellationToken, id: u64) -> Result<Self> {
        let response: MatchDetailsResponse =
            client.execute(cancel, &format!("/matches/{id}")).await?;
        Ok(response.details)
    }
}

impl List for Match {
    type Query = MatchQuery;
    type Envelope = ResultsEnvelope<Match>;

    fn request(query: &MatchQuery) -> Request {
        let mut params = Query::new();
        query.filters.append_to(&mut params);
        params.push_opt("limit", query.limit.map(|l| l.min(MAX_MATCH_LIMIT)));
        Request::new("/matches")
            .with_query(params)
            .recursive(query.recursive)
    }
}

/// Fetch one page of `/matches` with its totals.
///
/// # Errors
///
/// Returns [`Etf2lError::InvalidArgument`] if `limit` exceeds
/// [`MAX_MATCH_LIMIT`].
#[tracing::instrument(skip(client, cancel))]
pub async fn matches_page(
    client: &Etf2lClient,
    cancel: &CancellationToken,
    page: u32,
    limit: u32,
) -> Result<Page<Match>> {
    if limit > MAX_MATCH_LIMIT {
        return Err(Etf2lError::InvalidArgument(format!(
            "limit {limit} too big, max {MAX_MATCH_LIMIT}"
        )));
    }

    let mut params = Query::new();
    params.push(PAGE_PARAM, page).push("limit", limit);
    let request = Request::new("/matches").with_query(params);

    client
        .fetch_page::<ResultsEnvelope<Match>>(cancel, &request)
        .await
}

/// Fetch the full record of a match.
pub async fn get_match(
    client: &Etf2lClient,
    cancel: &CancellationToken,
    match_id: u64,
) -> Result<MatchDetails> {
    MatchDetails::get(client, cancel, match_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_request_clamps_limit() {
        let query = MatchQuery {
            filters: MatchFilters {
                scheduled: Some(true),
                ..Default::default()
            },
            limit: Some(5000),
            recursive: false,
        };

        let request = Match::request(&query);
        assert_eq!(request.target(), "/matches?scheduled=1&limit=2000");
    }

    #[test]
    fn test_empty_filters_produce_bare_path() {
        let request = Match::request(&MatchQuery::default());
        assert_eq!(request.target(), "/matches");
    }

    #[tokio::test]
    async fn test_matches_page_rejects_big_limit() {
        let client = Etf2lClient::new().unwrap();
        let result = matches_page(&client, &CancellationToken::new(), 1, 2001).await;
        assert!(matches!(result, Err(Etf2lError::InvalidArgument(_))));
    }

    #[test]
    fn test_match_played() {
        let m: Match = serde_json::from_value(serde_json::json!({
            "id": 1,
            "clan1": { "id": 1, "name": "a" },
            "clan2": { "id": 2, "name": "b" },
            "r1": 6,
            "r2": 0,
            "time": 1700000000
        }))
        .unwrap();
        assert!(m.is_played());
        assert!(m.scheduled_at().is_some());
    }
}
