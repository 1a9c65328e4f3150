//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the etf2l binary.

use clap::{Parser, Subcommand, ValueEnum};

/// ETF2L API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "etf2l", about = "ETF2L league API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single entity by ID.
    Get {
        /// The type of entity to get.
        entity: Entity,

        /// ETF2L id (players also accept any SteamID format).
        id: String,
    },

    /// List a collection, optionally following every page.
    List {
        /// The collection to list.
        resource: Resource,

        /// Player, team or competition id the collection belongs to.
        #[arg(long)]
        id: Option<String>,

        /// Follow next-page links until the last page.
        #[arg(long, short = 'r')]
        recursive: bool,
    },
}

/// Entities that can be fetched individually.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A registered player.
    #[value(alias = "players")]
    Player,
    /// A team.
    #[value(alias = "teams")]
    Team,
    /// A competition's details.
    #[value(alias = "competitions")]
    Competition,
    /// A match's details.
    #[value(alias = "matches")]
    Match,
    /// A competition's standings.
    Tables,
}

/// Collections that can be listed.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    /// The public ban list.
    Bans,
    /// Uploaded demos.
    Demos,
    /// All league matches.
    Matches,
    /// Competitions.
    Competitions,
    /// A player's results (requires --id).
    PlayerResults,
    /// A player's transfers (requires --id).
    PlayerTransfers,
    /// A team's results (requires --id).
    TeamResults,
    /// A team's transfers (requires --id).
    TeamTransfers,
    /// A team's matches (requires --id).
    TeamMatches,
    /// Teams signed up to a competition (requires --id).
    CompetitionTeams,
    /// A competition's results (requires --id).
    CompetitionResults,
    /// A competition's matches (requires --id).
    CompetitionMatches,
    /// Players looking for a team.
    PlayerRecruitment,
    /// Teams looking for players.
    TeamRecruitment,
    /// Server config whitelists.
    Whitelists,
}

impl Resource {
    /// Whether the collection hangs off a player, team or competition.
    pub fn needs_id(&self) -> bool {
        matches!(
            self,
            Self::PlayerResults
                | Self::PlayerTransfers
                | Self::TeamResults
                | Self::TeamTransfers
                | Self::TeamMatches
                | Self::CompetitionTeams
                | Self::CompetitionResults
                | Self::CompetitionMatches
        )
    }
}
