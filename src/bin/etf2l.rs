//! ETF2L API CLI binary.
//!
//! A command-line interface for browsing the ETF2L league API.

use std::process::ExitCode;

use clap::Parser;
use etf2l::cli::{Cli, Command, Entity, Resource};
use etf2l::{
    get_whitelists, unix_time, Ban, BanQuery, CancellationToken, Clan, Competition,
    CompetitionDetails, CompetitionIdQuery, CompetitionMatch, CompetitionQuery, CompetitionResult,
    CompetitionTables, CompetitionTeam, Demo, DemoQuery, Etf2lClient, Etf2lError, Get, List, Match,
    MatchDetails, MatchQuery, Player, PlayerQuery, PlayerRecruitment, PlayerResult,
    PlayerTransfer, PrettyPrint, RecruitmentQuery, Team, TeamMatch, TeamMatchQuery, TeamQuery,
    TeamRecruitment, TeamResult, TeamTransfer,
};
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match Etf2lClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Check the ETF2L_* environment variables");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling outstanding requests");
            on_signal.cancel();
        }
    });

    match run(&client, &cancel, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &Etf2lClient, cancel: &CancellationToken, cli: Cli) -> etf2l::Result<()> {
    match cli.command {
        Command::Get { entity, id } => handle_get(client, cancel, entity, &id, cli.json).await,
        Command::List {
            resource,
            id,
            recursive,
        } => handle_list(client, cancel, resource, id.as_deref(), recursive, cli.json).await,
    }
}

fn parse_id(id: &str) -> etf2l::Result<u64> {
    id.trim()
        .parse()
        .map_err(|_| Etf2lError::InvalidArgument(format!("'{id}' is not a numeric id")))
}

async fn handle_get(
    client: &Etf2lClient,
    cancel: &CancellationToken,
    entity: Entity,
    id: &str,
    json: bool,
) -> etf2l::Result<()> {
    match entity {
        Entity::Player => {
            let player = Player::get(client, cancel, id.to_string()).await?;
            output_single(&player, json)?;
        }
        Entity::Team => {
            let team = Team::get(client, cancel, parse_id(id)?).await?;
            output_single(&team, json)?;
        }
        Entity::Competition => {
            let competition = CompetitionDetails::get(client, cancel, parse_id(id)?).await?;
            output_single(&competition, json)?;
        }
        Entity::Match => {
            let details = MatchDetails::get(client, cancel, parse_id(id)?).await?;
            output_single(&details, json)?;
        }
        Entity::Tables => {
            let tables = CompetitionTables::get(client, cancel, parse_id(id)?).await?;
            if json {
                println!("{}", to_json(&tables)?);
            } else {
                let mut rows: Vec<StandingRow> = tables
                    .tables
                    .values()
                    .map(|t| StandingRow::from(t))
                    .collect();
                rows.sort_by(|a, b| a.division.cmp(&b.division).then(b.score.cmp(&a.score)));
                println!("{}", Table::new(rows));
            }
        }
    }
    Ok(())
}

async fn handle_list(
    client: &Etf2lClient,
    cancel: &CancellationToken,
    resource: Resource,
    id: Option<&str>,
    recursive: bool,
    json: bool,
) -> etf2l::Result<()> {
    let id = match (resource.needs_id(), id) {
        (true, None) => {
            eprintln!("Hint: Use 'etf2l list <resource> --id <ID>'");
            return Err(Etf2lError::InvalidArgument(
                "--id required for this collection".to_string(),
            ));
        }
        (_, id) => id.unwrap_or_default(),
    };

    match resource {
        Resource::Bans => {
            let query = BanQuery {
                recursive,
                ..Default::default()
            };
            let bans = Ban::list(client, cancel, &query).await?;
            output_list(&bans, json, |b| BanRow::from(b))?;
        }
        Resource::Demos => {
            let query = DemoQuery {
                recursive,
                ..Default::default()
            };
            let demos = Demo::list(client, cancel, &query).await?;
            output_list(&demos, json, |d| DemoRow::from(d))?;
        }
        Resource::Matches => {
            let query = MatchQuery {
                recursive,
                ..Default::default()
            };
            let matches = Match::list(client, cancel, &query).await?;
            output_list(&matches, json, |m| {
                MatchRow::new(Some(m.id), &m.clan1, &m.clan2, m.r1, m.r2, m.time)
            })?;
        }
        Resource::Competitions => {
            let query = CompetitionQuery {
                recursive,
                ..Default::default()
            };
            let competitions = Competition::list(client, cancel, &query).await?;
            output_list(&competitions, json, |c| CompetitionRow::from(c))?;
        }
        Resource::PlayerResults => {
            let query = PlayerQuery::new(id).recursive(recursive);
            let results = PlayerResult::list(client, cancel, &query).await?;
            output_list(&results, json, |r| {
                MatchRow::new(None, &r.clan1, &r.clan2, r.r1, r.r2, r.time)
            })?;
        }
        Resource::PlayerTransfers => {
            let query = PlayerQuery::new(id).recursive(recursive);
            let transfers = PlayerTransfer::list(client, cancel, &query).await?;
            output_list(&transfers, json, |t| TransferRow {
                time: format_time(t.time),
                kind: t.transfer_type.clone(),
                team: t.team.name.clone(),
                player: String::new(),
                by: t.by.name.clone(),
            })?;
        }
        Resource::TeamResults => {
            let query = TeamQuery::new(parse_id(id)?).recursive(recursive);
            let results = TeamResult::list(client, cancel, &query).await?;
            output_list(&results, json, |r| {
                MatchRow::new(None, &r.clan1, &r.clan2, r.r1, r.r2, r.time)
            })?;
        }
        Resource::TeamTransfers => {
            let query = TeamQuery::new(parse_id(id)?).recursive(recursive);
            let transfers = TeamTransfer::list(client, cancel, &query).await?;
            output_list(&transfers, json, |t| TransferRow {
                time: format_time(t.time),
                kind: t.transfer_type.clone(),
                team: t.team.name.clone(),
                player: t.who.name.clone(),
                by: t.by.name.clone(),
            })?;
        }
        Resource::TeamMatches => {
            let query = TeamMatchQuery {
                team_id: parse_id(id)?,
                recursive,
                ..Default::default()
            };
            let matches = TeamMatch::list(client, cancel, &query).await?;
            output_list(&matches, json, |m| {
                MatchRow::new(m.id, &m.clan1, &m.clan2, m.r1, m.r2, m.time)
            })?;
        }
        Resource::CompetitionTeams => {
            let query = CompetitionIdQuery::new(parse_id(id)?).recursive(recursive);
            let teams = CompetitionTeam::list(client, cancel, &query).await?;
            output_list(&teams, json, |t| CompetitionTeamRow {
                id: t.id,
                name: t.name.clone(),
                country: t.country.clone().unwrap_or_default(),
                dropped: if t.dropped != 0 { "yes" } else { "" }.to_string(),
            })?;
        }
        Resource::CompetitionResults => {
            let query = CompetitionIdQuery::new(parse_id(id)?).recursive(recursive);
            let results = CompetitionResult::list(client, cancel, &query).await?;
            output_list(&results, json, |r| {
                MatchRow::new(Some(r.id), &r.clan1, &r.clan2, r.r1, r.r2, r.time)
            })?;
        }
        Resource::CompetitionMatches => {
            let query = CompetitionIdQuery::new(parse_id(id)?).recursive(recursive);
            let matches = CompetitionMatch::list(client, cancel, &query).await?;
            output_list(&matches, json, |m: &CompetitionMatch| {
                let score = m.result.clone().unwrap_or_default();
                MatchRow::new(Some(m.id), &m.clan1, &m.clan2, score.r1, score.r2, m.time)
            })?;
        }
        Resource::PlayerRecruitment => {
            let query = RecruitmentQuery {
                recursive,
                ..Default::default()
            };
            let posts = PlayerRecruitment::list(client, cancel, &query).await?;
            output_list(&posts, json, |p| RecruitmentRow {
                id: p.id,
                name: p.name.clone(),
                classes: p.classes.join(", "),
                skill: p.skill.clone().unwrap_or_default(),
                team_type: p.team_type.clone().unwrap_or_default(),
            })?;
        }
        Resource::TeamRecruitment => {
            let query = RecruitmentQuery {
                recursive,
                ..Default::default()
            };
            let posts = TeamRecruitment::list(client, cancel, &query).await?;
            output_list(&posts, json, |p| RecruitmentRow {
                id: p.id,
                name: p.name.clone(),
                classes: p.classes.join(", "),
                skill: p.skill.clone().unwrap_or_default(),
                team_type: p.team_type.clone().unwrap_or_default(),
            })?;
        }
        Resource::Whitelists => {
            let whitelists = get_whitelists(client, cancel).await?;
            if json {
                println!("{}", to_json(&whitelists)?);
            } else {
                let mut rows: Vec<WhitelistRow> = whitelists
                    .iter()
                    .map(|(mode, w)| WhitelistRow {
                        mode: mode.clone(),
                        filename: w.filename.clone(),
                        changed: format_time(w.last_change),
                    })
                    .collect();
                rows.sort_by(|a, b| a.mode.cmp(&b.mode));
                println!("{}", Table::new(rows));
            }
        }
    }
    Ok(())
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> etf2l::Result<()> {
    if json {
        println!("{}", to_json(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> etf2l::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", to_json(items)?);
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} records", items.len());
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> etf2l::Result<String> {
    serde_json::to_string_pretty(value).map_err(Etf2lError::EncodeFailed)
}

fn format_time(secs: i64) -> String {
    unix_time(secs)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct BanRow {
    name: String,
    steamid64: String,
    reason: String,
    start: String,
    end: String,
    expired: bool,
}

impl From<&Ban> for BanRow {
    fn from(b: &Ban) -> Self {
        Self {
            name: b.name.clone(),
            steamid64: b.steamid64.clone(),
            reason: b.reason.clone(),
            start: format_time(b.start),
            end: format_time(b.end),
            expired: b.expired,
        }
    }
}

#[derive(Tabled)]
struct DemoRow {
    id: u64,
    time: String,
    owner: String,
    #[tabled(rename = "match")]
    match_id: String,
    downloads: u64,
}

impl From<&Demo> for DemoRow {
    fn from(d: &Demo) -> Self {
        Self {
            id: d.id,
            time: format_time(d.time),
            owner: d.owner_name.clone().unwrap_or_default(),
            match_id: d.match_id.map(|m| m.to_string()).unwrap_or_default(),
            downloads: d.downloads,
        }
    }
}

#[derive(Tabled)]
struct MatchRow {
    id: String,
    time: String,
    blu: String,
    red: String,
    score: String,
}

impl MatchRow {
    fn new(
        id: Option<u64>,
        clan1: &Clan,
        clan2: &Clan,
        r1: Option<i64>,
        r2: Option<i64>,
        time: Option<i64>,
    ) -> Self {
        let score = match (r1, r2) {
            (Some(a), Some(b)) => format!("{a}-{b}"),
            _ => String::new(),
        };
        Self {
            id: id.map(|i| i.to_string()).unwrap_or_default(),
            time: time.map(format_time).unwrap_or_default(),
            blu: clan1.name.clone(),
            red: clan2.name.clone(),
            score,
        }
    }
}

#[derive(Tabled)]
struct CompetitionRow {
    id: u64,
    name: String,
    category: String,
    archived: bool,
}

impl From<&Competition> for CompetitionRow {
    fn from(c: &Competition) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            category: c.category.clone().unwrap_or_default(),
            archived: c.archived,
        }
    }
}

#[derive(Tabled)]
struct TransferRow {
    time: String,
    #[tabled(rename = "type")]
    kind: String,
    team: String,
    player: String,
    by: String,
}

#[derive(Tabled)]
struct CompetitionTeamRow {
    id: u64,
    name: String,
    country: String,
    dropped: String,
}

#[derive(Tabled)]
struct RecruitmentRow {
    id: u64,
    name: String,
    classes: String,
    skill: String,
    #[tabled(rename = "type")]
    team_type: String,
}

#[derive(Tabled)]
struct WhitelistRow {
    mode: String,
    filename: String,
    changed: String,
}

#[derive(Tabled)]
struct StandingRow {
    division: String,
    team: String,
    score: i64,
    won: u32,
    lost: u32,
}

impl From<&etf2l::CompetitionTable> for StandingRow {
    fn from(t: &etf2l::CompetitionTable) -> Self {
        Self {
            division: t.division_name.clone().unwrap_or_default(),
            team: t.name.clone(),
            score: t.score,
            won: t.maps_won,
            lost: t.maps_lost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_unencodable_output_is_an_encode_error() {
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], 1u8);

        let err = to_json(&bad).unwrap_err();
        assert!(matches!(err, Etf2lError::EncodeFailed(_)));
    }

    #[test]
    fn test_to_json_pretty_prints() {
        let out = to_json(&[1, 2]).unwrap();
        assert_eq!(out, "[\n  1,\n  2\n]");
    }
}
