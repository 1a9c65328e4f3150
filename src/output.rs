//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::Utc;

use crate::{unix_time, Clan, CompetitionDetails, MatchDetails, Player, Team};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn format_time(secs: i64) -> String {
    unix_time(secs)
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| secs.to_string())
}

impl PrettyPrint for Player {
    fn pretty_print(&self) -> String {
        let header = format!("Player: {} (#{})", self.name, self.id);
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![header, divider];

        if let Some(ref country) = self.country {
            lines.push(format!("Country:        {}", country));
        }

        if let Some(ref title) = self.title {
            lines.push(format!("Title:          {}", title));
        }

        if !self.steam.id64.is_empty() {
            lines.push(format!("SteamID64:      {}", self.steam.id64));
        }

        if let Some(registered) = self.registered_at() {
            lines.push(format!("Registered:     {}", registered.format(TIME_FORMAT)));
        }

        if !self.classes.is_empty() {
            lines.push(format!("Classes:        {}", self.classes.join(", ")));
        }

        if let Some(ref teams) = self.teams {
            let names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
            lines.push(format!("Teams:          {}", names.join(", ")));
        }

        if self.is_banned_at(Utc::now()) {
            lines.push("Banned:         yes".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Team {
    fn pretty_print(&self) -> String {
        let header = format!("Team: {} (#{})", self.name, self.id);
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![header, divider];

        if let Some(ref tag) = self.tag {
            lines.push(format!("Tag:            {}", tag));
        }

        if let Some(ref team_type) = self.team_type {
            lines.push(format!("Type:           {}", team_type));
        }

        if let Some(ref country) = self.country {
            lines.push(format!("Country:        {}", country));
        }

        let leaders: Vec<&str> = self
            .players_with_role("Leader")
            .map(|p| p.name.as_str())
            .collect();
        if !leaders.is_empty() {
            lines.push(format!("Leaders:        {}", leaders.join(", ")));
        }

        lines.push(format!("Roster:         {} players", self.players.len()));
        lines.push(format!("Competitions:   {}", self.competitions.len()));

        lines.join("\n")
    }
}

impl PrettyPrint for CompetitionDetails {
    fn pretty_print(&self) -> String {
        let header = format!("Competition: {} (#{})", self.name, self.id);
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![header, divider];

        if let Some(ref category) = self.category {
            lines.push(format!("Category:       {}", category));
        }

        if let Some(ref competition_type) = self.competition_type {
            lines.push(format!("Type:           {}", competition_type));
        }

        match self.teams.max {
            Some(max) => lines.push(format!("Signups:        {}/{}", self.teams.signedup, max)),
            None => lines.push(format!("Signups:        {}", self.teams.signedup)),
        }

        if !self.pool.is_empty() {
            lines.push(format!("Map pool:       {}", self.pool.join(", ")));
        }

        if self.archived {
            lines.push("Archived:       yes".to_string());
        }

        lines.join("\n")
    }
}

fn score(clan: &Clan, rounds: Option<i64>) -> String {
    match rounds {
        Some(r) => format!("{} {}", clan.name, r),
        None => clan.name.clone(),
    }
}

impl PrettyPrint for MatchDetails {
    fn pretty_print(&self) -> String {
        let header = format!("Match #{}", self.id);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![
            header,
            divider,
            format!(
                "Teams:          {} vs {}",
                score(&self.clan1, self.r1),
                score(&self.clan2, self.r2)
            ),
        ];

        if let Some(ref competition) = self.competition {
            lines.push(format!("Competition:    {}", competition.name));
        }

        if let Some(ref round) = self.round {
            lines.push(format!("Round:          {}", round));
        }

        if let Some(time) = self.time {
            lines.push(format!("Scheduled:      {}", format_time(time)));
        }

        if !self.maps.is_empty() {
            lines.push(format!("Maps:           {}", self.maps.join(", ")));
        }

        if self.defaultwin {
            lines.push("Default win:    yes".to_string());
        }

        lines.join("\n")
    }
}
