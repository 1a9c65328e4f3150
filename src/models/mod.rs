//! ETF2L API model types.

mod ban;
mod common;
mod competition;
mod demo;
mod envelope;
mod matches;
mod player;
mod recruitment;
mod team;
mod whitelist;

pub use ban::*;
pub use common::{
    unix_time, Clan, CompetitionRef, Division, MatchUrls, Status, SteamGroup, SteamPlayer,
};
pub use competition::*;
pub use demo::*;
pub use envelope::*;
pub use matches::*;
pub use player::*;
pub use recruitment::*;
pub use team::*;
pub use whitelist::*;
