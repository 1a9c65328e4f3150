//! Competition models and trait implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::Etf2lClient;
use crate::error::Result;
use crate::models::common::{lenient_map, Clan, CompetitionRef, Division, SteamGroup};
use crate::models::envelope::{CompetitionsEnvelope, MatchesEnvelope, ResultsEnvelope, TeamsEnvelope};
use crate::pagination::{Query, Request};
use crate::traits::{Get, List};

/// Links on a competition record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitionUrls {
    #[serde(default)]
    pub matches: Option<String>,
    #[serde(default)]
    pub results: Option<String>,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub teams: Option<String>,
}

/// A competition as listed by `/competition/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competition {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(rename = "type", default)]
    pub competition_type: Option<String>,
    #[serde(default)]
    pub urls: CompetitionUrls,
}

/// Signup counts of a competition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitionSignups {
    #[serde(default)]
    pub max: Option<u32>,
    #[serde(default)]
    pub signedup: u32,
}

/// Full competition record from `/competition/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionDetails {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Map pool.
    #[serde(default)]
    pub pool: Vec<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(rename = "type", default)]
    pub competition_type: Option<String>,
    #[serde(default)]
    pub teams: CompetitionSignups,
    #[serde(default)]
    pub urls: CompetitionUrls,
}

/// A team signed up to a competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionTeam {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    /// Non-zero once the team dropped out.
    #[serde(default)]
    pub dropped: i64,
    #[serde(default)]
    pub steam: SteamGroup,
    #[serde(default)]
    pub url: Option<String>,
}

/// A finished match of a competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionResult {
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
    pub week: Option<i64>,
}

/// Score pair of a competition match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub r1: Option<i64>,
    #[serde(default)]
    pub r2: Option<i64>,
}

/// A played or scheduled match of a competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionMatch {
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
    pub result: Option<Score>,
    #[serde(default)]
    pub round: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub week: Option<i64>,
    #[serde(default)]
    pub skill_contrib: Option<i64>,
}

/// A standings row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionTable {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub drop: bool,
    #[serde(default)]
    pub division_id: Option<u64>,
    #[serde(default)]
    pub division_name: Option<String>,
    #[serde(default)]
    pub maps_played: u32,
    #[serde(default)]
    pub maps_won: u32,
    #[serde(default)]
    pub maps_lost: u32,
    #[serde(default)]
    pub gc_won: u32,
    #[serde(default)]
    pub gc_lost: u32,
    #[serde(default)]
    pub penalty_points: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub ach: i64,
    #[serde(default)]
    pub byes: u32,
    #[serde(default)]
    pub seeded_points: i64,
}

/// Standings of a competition, keyed as the API keys them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitionTables {
    #[serde(default, deserialize_with = "lenient_map")]
    pub tables: HashMap<String, CompetitionTable>,
}

/// Filter on the archived flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchivedState {
    Active,
    Archived,
}

/// Filters for `/competition/list`.
#[derive(Debug, Clone, Default)]
pub struct CompetitionQuery {
    pub archived: Option<ArchivedState>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub comp_type: Option<String>,
    pub team_type: Option<String>,
    pub competition: Option<String>,
    /// Follow every page.
    pub recursive: bool,
}

/// Query for the per-competition lists (teams, results, matches).
#[derive(Debug, Clone, Default)]
pub struct CompetitionIdQuery {
    pub competition_id: u64,
    /// Follow every page.
    pub recursive: bool,
}

impl CompetitionIdQuery {
    pub fn new(competition_id: u64) -> Self {
        Self {
            competition_id,
            recursive: false,
        }
    }

    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    fn request(&self, tail: &str) -> Request {
        Request::new(format!("/competition/{}/{}", self.competition_id, tail))
            .recursive(self.recursive)
    }
}

/// API response wrapper for a single competition.
#[derive(Debug, Deserialize)]
struct CompetitionResponse {
    competition: CompetitionDetails,
}

#[async_trait]
impl Get for CompetitionDetails {
    type Id = u64;

    #[tracing::instrument(skip(client, cancel))]
    async fn get(client: &Etf2lClient, cancel: &CancellationToken, id: u64) -> Result<Self> {
        let response: CompetitionResponse =
            client.execute(cancel, &format!("/competition/{id}")).await?;
        Ok(response.competition)
    }
}

#[async_trait]
impl Get for CompetitionTables {
    type Id = u64;

    #[tracing::instrument(skip(client, cancel))]
    async fn get(client: &Etf2lClient, cancel: &CancellationToken, id: u64) -> Result<Self> {
        client
            .execute(cancel, &format!("/competition/{id}/tables"))
            .await
    }
}

impl List for Competition {
    type Query = CompetitionQuery;
    type Envelope = CompetitionsEnvelope<Competition>;

    fn request(query: &CompetitionQuery) -> Request {
        let mut params = Query::new();
        params
            .push_opt(
                "archived",
                query.archived.map(|a| u8::from(a == ArchivedState::Archived)),
            )
            .push_opt("name", query.name.as_deref())
            .push_opt("description", query.description.as_deref())
            .push_opt("category", query.category.as_deref())
            .push_opt("comp_type", query.comp_type.as_deref())
            .push_opt("team_type", query.team_type.as_deref())
            .push_opt("competition", query.competition.as_deref());

        Request::new("/competition/list")
            .with_query(params)
            .recursive(query.recursive)
    }
}

impl List for CompetitionTeam {
    type Query = CompetitionIdQuery;
    type Envelope = TeamsEnvelope<CompetitionTeam>;

    fn request(query: &CompetitionIdQuery) -> Request {
        query.request("teams")
    }
}

impl List for CompetitionResult {
    type Query = CompetitionIdQuery;
    type Envelope = ResultsEnvelope<CompetitionResult>;

    fn request(query: &CompetitionIdQuery) -> Request {
        query.request("results")
    }
}

impl List for CompetitionMatch {
    type Query = CompetitionIdQuery;
    type Envelope = MatchesEnvelope<CompetitionMatch>;

    fn request(query: &CompetitionIdQuery) -> Request {
        query.request("matches")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_competition_list_filters() {
        let query = CompetitionQuery {
            archived: Some(ArchivedState::Active),
            category: Some("6v6 Season".to_string()),
            ..Default::default()
        };
        assert_eq!(
            Competition::request(&query).target(),
            "/competition/list?archived=0&category=6v6+Season"
        );
    }

    #[test]
    fn test_competition_id_paths() {
        let query = CompetitionIdQuery::new(1).recursive(true);
        assert_eq!(CompetitionTeam::request(&query).path(), "/competition/1/teams");
        assert_eq!(CompetitionResult::request(&query).path(), "/competition/1/results");
        assert_eq!(CompetitionMatch::request(&query).path(), "/competition/1/matches");
        assert!(CompetitionMatch::request(&query).is_recursive());
    }

    #[test]
    fn test_tables_decode() {
        let tables: CompetitionTables = serde_json::from_value(json!({
            "tables": {
                "101": { "id": 101, "name": "Team A", "maps_won": 4, "score": 12 }
            }
        }))
        .unwrap();
        assert_eq!(tables.tables["101"].maps_won, 4);

        let empty: CompetitionTables = serde_json::from_value(json!({ "tables": [] })).unwrap();
        assert!(empty.tables.is_empty());
    }
}
