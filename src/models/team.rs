//! Team model and trait implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::Etf2lClient;
use crate::error::Result;
use crate::models::common::{lenient_map, Clan, CompetitionRef, Division, SteamGroup, SteamPlayer};
use crate::models::matches::MatchFilters;
use crate::models::player::{Irc, TeamCompetition, TeamUrls, TransferPlayer, TransferTeam};
use crate::pagination::{LinkedPage, Pager, Query, Request};
use crate::traits::{Get, List};

/// An ETF2L team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub homepage: Option<String>,

    #[serde(default)]
    pub server: Option<String>,

    #[serde(rename = "type", alias = "teamType", default)]
    pub team_type: Option<String>,

    #[serde(default)]
    pub irc: Option<Irc>,

    #[serde(default)]
    pub steam: SteamGroup,

    /// Competitions keyed by competition id.
    #[serde(default, deserialize_with = "lenient_map")]
    pub competitions: HashMap<String, TeamCompetition>,

    /// Current roster.
    #[serde(default)]
    pub players: Vec<TeamPlayer>,

    #[serde(default)]
    pub name_changes: Vec<TeamNameChange>,

    #[serde(default)]
    pub urls: TeamUrls,
}

impl Team {
    /// Roster members holding `role` (e.g. "Leader").
    pub fn players_with_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a TeamPlayer> {
        self.players
            .iter()
            .filter(move |p| p.role.as_deref().is_some_and(|r| r.eq_ignore_ascii_case(role)))
    }
}

/// A roster entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamPlayer {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub steam: SteamPlayer,
    #[serde(default)]
    pub url: Option<String>,
}

/// A past rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamNameChange {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub time: i64,
}

/// A join/leave event on a team's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamTransfer {
    /// The player who joined or left.
    #[serde(default)]
    pub who: TransferPlayer,
    /// Who performed the transfer.
    #[serde(default)]
    pub by: TransferPlayer,
    #[serde(default)]
    pub team: TransferTeam,
    #[serde(default)]
    pub time: i64,
    #[serde(rename = "type", default)]
    pub transfer_type: String,
}

/// A finished match from a team's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResult {
    pub clan1: Clan,
    pub clan2: Clan,
    #[serde(default)]
    pub competition: Option<CompetitionRef>,
    #[serde(default)]
    pub defaultwin: bool,
    #[serde(default)]
    pub division: Option<Division>,
    /// Outcome from the team's side.
    #[serde(default)]
    pub result: Option<i64>,
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
    pub week: Option<i64>,
}

/// A played or scheduled match of a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMatch {
    pub id: Option<u64>,
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
    pub week: Option<i64>,
}

/// Query for a team's transfers or results.
#[derive(Debug, Clone, Default)]
pub struct TeamQuery {
    pub team_id: u64,
    /// Follow every page.
    pub recursive: bool,
}

impl TeamQuery {
    pub fn new(team_id: u64) -> Self {
        Self {
            team_id,
            recursive: false,
        }
    }

    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// Query for a team's matches.
#[derive(Debug, Clone, Default)]
pub struct TeamMatchQuery {
    pub team_id: u64,
    pub filters: MatchFilters,
    /// Follow every page.
    pub recursive: bool,
}

/// API response wrapper for a single team.
#[derive(Debug, Deserialize)]
struct TeamResponse {
    team: Team,
}

#[async_trait]
impl Get for Team {
    type Id = u64;

    #[tracing::instrument(skip(client, cancel))]
    async fn get(client: &Etf2lClient, cancel: &CancellationToken, id: u64) -> Result<Self> {
        let response: TeamResponse = client.execute(cancel, &format!("/team/{id}")).await?;
        Ok(response.team)
    }
}

impl List for TeamTransfer {
    type Query = TeamQuery;
    type Envelope = LinkedPage<TeamTransfer>;

    fn request(query: &TeamQuery) -> Request {
        Request::new(format!("/team/{}/transfers", query.team_id)).recursive(query.recursive)
    }
}

impl List for TeamResult {
    type Query = TeamQuery;
    type Envelope = Pager<TeamResult>;

    fn request(query: &TeamQuery) -> Request {
        Request::new(format!("/team/{}/results", query.team_id)).recursive(query.recursive)
    }
}

impl List for TeamMatch {
    type Query = TeamMatchQuery;
    type Envelope = Pager<TeamMatch>;

    fn request(query: &TeamMatchQuery) -> Request {
        let mut params = Query::new();
        query.filters.append_to(&mut params);
        Request::new(format!("/team/{}/matches", query.team_id))
            .with_query(params)
            .recursive(query.recursive)
    }
}

// Convenience functions for working with teams

/// Fetch a team's transfer history.
pub async fn get_team_transfers(
    client: &Etf2lClient,
    cancel: &CancellationToken,
    team_id: u64,
    recursive: bool,
) -> Result<Vec<TeamTransfer>> {
    TeamTransfer::list(client, cancel, &TeamQuery::new(team_id).recursive(recursive)).await
}

/// Fetch a team's results.
pub async fn get_team_results(
    client: &Etf2lClient,
    cancel: &CancellationToken,
    team_id: u64,
    recursive: bool,
) -> Result<Vec<TeamResult>> {
    TeamResult::list(client, cancel, &TeamQuery::new(team_id).recursive(recursive)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_team_match_request_carries_filters() {
        let query = TeamMatchQuery {
            team_id: 2,
            filters: MatchFilters {
                competition: Some(500),
                players: vec![1, 2],
                ..Default::default()
            },
            recursive: true,
        };

        let request = TeamMatch::request(&query);
        assert_eq!(request.path(), "/team/2/matches");
        assert_eq!(request.query().get("competition"), Some("500"));
        assert_eq!(
            request.target(),
            "/team/2/matches?competition=500&players%5B%5D=1&players%5B%5D=2"
        );
    }

    #[test]
    fn test_players_with_role() {
        let team: Team = serde_json::from_value(json!({
            "id": 2,
            "name": "Froyotech",
            "competitions": {},
            "players": [
                { "id": 1, "name": "a", "role": "Leader" },
                { "id": 2, "name": "b", "role": "Member" }
            ]
        }))
        .unwrap();

        let leaders: Vec<_> = team.players_with_role("leader").collect();
        assert_eq!(leaders.len(), 1);
        assert_eq!(leaders[0].id, 1);
    }
}
