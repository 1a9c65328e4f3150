//! Player model and trait implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::Etf2lClient;
use crate::error::Result;
use crate::models::common::{
    lenient_map, lenient_string_list, unix_time, Clan, CompetitionRef, Division, SteamGroup,
    SteamPlayer,
};
use crate::pagination::{LinkedPage, Pager, Request};
use crate::traits::{Get, List};

/// An ETF2L player profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub country: Option<String>,

    /// Site title (e.g. "Player", "Admin").
    #[serde(default)]
    pub title: Option<String>,

    /// Unix time of registration.
    #[serde(default)]
    pub registered: Option<i64>,

    /// Classes the player lists on their profile.
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub classes: Vec<String>,

    #[serde(default)]
    pub steam: SteamPlayer,

    /// Past and current bans.
    #[serde(default)]
    pub bans: Option<Vec<BanPeriod>>,

    /// Teams the player is currently on.
    #[serde(default)]
    pub teams: Option<Vec<PlayerTeam>>,

    #[serde(default)]
    pub urls: PlayerUrls,
}

impl Player {
    /// Registration date, if known.
    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        self.registered.and_then(unix_time)
    }

    /// Whether any ban on the profile covers `now`.
    pub fn is_banned_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        self.bans
            .iter()
            .flatten()
            .any(|ban| ban.start <= now && now < ban.end)
    }

    /// Fetch this player's match results.
    pub async fn results(
        &self,
        client: &Etf2lClient,
        cancel: &CancellationToken,
        recursive: bool,
    ) -> Result<Vec<PlayerResult>> {
        get_player_results(client, cancel, &self.id.to_string(), recursive).await
    }

    /// Fetch this player's transfer history.
    pub async fn transfers(
        &self,
        client: &Etf2lClient,
        cancel: &CancellationToken,
        recursive: bool,
    ) -> Result<Vec<PlayerTransfer>> {
        get_player_transfers(client, cancel, &self.id.to_string(), recursive).await
    }
}

/// One ban entry on a player profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BanPeriod {
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub end: i64,
    #[serde(default)]
    pub reason: String,
}

/// Links on a player profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerUrls {
    #[serde(default)]
    pub results: Option<String>,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub transfers: Option<String>,
}

/// A team as listed on a player profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTeam {
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
    #[serde(default)]
    pub urls: TeamUrls,
}

/// IRC channel of a team.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Irc {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

/// Links on a team record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamUrls {
    #[serde(default)]
    pub matches: Option<String>,
    #[serde(default)]
    pub results: Option<String>,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub transfers: Option<String>,
}

/// A competition a team took part in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamCompetition {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub competition: Option<String>,
    #[serde(default)]
    pub division: Option<Division>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A match result from a player's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResult {
    pub clan1: Clan,
    pub clan2: Clan,
    #[serde(default)]
    pub competition: Option<CompetitionRef>,
    #[serde(default)]
    pub defaultwin: bool,
    #[serde(default)]
    pub division: Option<Division>,
    /// Outcome from the player's side.
    #[serde(default)]
    pub result: Option<i64>,
    #[serde(default)]
    pub maps: Vec<String>,
    /// Played as a mercenary.
    #[serde(default)]
    pub merced: bool,
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

/// Someone involved in a transfer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferPlayer {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steam: SteamPlayer,
    #[serde(default)]
    pub url: Option<String>,
}

/// The team side of a transfer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferTeam {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steam: SteamGroup,
    #[serde(rename = "type", default)]
    pub team_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A join/leave event on a player's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTransfer {
    /// Who performed the transfer.
    #[serde(default)]
    pub by: TransferPlayer,
    #[serde(default)]
    pub team: TransferTeam,
    #[serde(default)]
    pub time: i64,
    /// `joined`, `left`, `kicked`, ...
    #[serde(rename = "type", default)]
    pub transfer_type: String,
}

impl PlayerTransfer {
    pub fn happened_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.time)
    }
}

/// Query for a player's results or transfers.
#[derive(Debug, Clone, Default)]
pub struct PlayerQuery {
    /// ETF2L player id or SteamID in any format.
    pub player_id: String,
    /// Follow every page.
    pub recursive: bool,
}

impl PlayerQuery {
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            recursive: false,
        }
    }

    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    fn path(&self, tail: &str) -> String {
        format!("/player/{}/{}", urlencoding::encode(&self.player_id), tail)
    }
}

/// API response wrapper for a single player.
#[derive(Debug, Deserialize)]
struct PlayerResponse {
    player: Player,
}

#[async_trait]
impl Get for Player {
    type Id = String; // ETF2L id or SteamID

    #[tracing::instrument(skip(client, cancel))]
    async fn get(client: &Etf2lClient, cancel: &CancellationToken, id: String) -> Result<Self> {
        let path = format!("/player/{}", urlencoding::encode(&id));
        let response: PlayerResponse = client.execute(cancel, &path).await?;
        Ok(response.player)
    }
}

impl List for PlayerResult {
    type Query = PlayerQuery;
    type Envelope = Pager<PlayerResult>;

    fn request(query: &PlayerQuery) -> Request {
        Request::new(query.path("results")).recursive(query.recursive)
    }
}

impl List for PlayerTransfer {
    type Query = PlayerQuery;
    type Envelope = LinkedPage<PlayerTransfer>;

    fn request(query: &PlayerQuery) -> Request {
        Request::new(query.path("transfers")).recursive(query.recursive)
    }
}

// Convenience functions for working with players

/// Fetch a player by ETF2L id or SteamID.
pub async fn get_player(
    client: &Etf2lClient,
    cancel: &CancellationToken,
    player_id: &str,
) -> Result<Player> {
    Player::get(client, cancel, player_id.to_string()).await
}

/// Fetch a player's match results.
pub async fn get_player_results(
    client: &Etf2lClient,
    cancel: &CancellationToken,
    player_id: &str,
    recursive: bool,
) -> Result<Vec<PlayerResult>> {
    PlayerResult::list(client, cancel, &PlayerQuery::new(player_id).recursive(recursive)).await
}

/// Fetch a player's transfer history.
pub async fn get_player_transfers(
    client: &Etf2lClient,
    cancel: &CancellationToken,
    player_id: &str,
    recursive: bool,
) -> Result<Vec<PlayerTransfer>> {
    PlayerTransfer::list(client, cancel, &PlayerQuery::new(player_id).recursive(recursive)).await
}
