//! Demo model and trait implementations.

use serde::{Deserialize, Serialize};

use crate::models::envelope::DemosEnvelope;
use crate::pagination::{Query, Request};
use crate::traits::List;

/// An uploaded demo file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demo {
    pub id: u64,
    #[serde(default)]
    pub time: i64,
    /// Match the demo belongs to.
    #[serde(rename = "match", default)]
    pub match_id: Option<u64>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub stv: bool,
    #[serde(default)]
    pub first_person: bool,
    #[serde(default)]
    pub downloads: u64,
    /// ETF2L id of the uploader.
    #[serde(default)]
    pub owner: Option<u64>,
    #[serde(default)]
    pub owner_name: Option<String>,
    /// File removed from storage.
    #[serde(default)]
    pub pruned: bool,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
}

/// Kind of recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoType {
    Stv,
    FirstPerson,
}

impl DemoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stv => "stv",
            Self::FirstPerson => "first_person",
        }
    }
}

/// Filters for `/demos`.
#[derive(Debug, Clone, Default)]
pub struct DemoQuery {
    /// ETF2L id of the uploader.
    pub player_id: Option<String>,
    pub types: Vec<DemoType>,
    /// Include pruned demos.
    pub pruned: bool,
    /// Unix time lower bound.
    pub from: Option<i64>,
    /// Unix time upper bound.
    pub to: Option<i64>,
    /// Follow every page.
    pub recursive: bool,
}

impl List for Demo {
    type Query = DemoQuery;
    type Envelope = DemosEnvelope<Demo>;

    fn request(query: &DemoQuery) -> Request {
        let mut params = Query::new();
        params
            .push_opt("player", query.player_id.as_deref())
            .push_list("type", query.types.iter().map(|t| t.as_str()))
            .push_opt("pruned", query.pruned.then_some(1))
            .push_opt("from", query.from)
            .push_opt("to", query.to);

        Request::new("/demos")
            .with_query(params)
            .recursive(query.recursive)
    }
}
