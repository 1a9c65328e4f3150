//! Recruitment post models and trait implementations.

use serde::{Deserialize, Serialize};

use crate::models::common::{lenient_string_list, SteamPlayer};
use crate::models::envelope::RecruitmentEnvelope;
use crate::pagination::{Query, Request};
use crate::traits::List;

/// Comment activity on a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecruitmentComments {
    #[serde(default)]
    pub count: u32,
    /// Unix time of the latest comment.
    #[serde(default)]
    pub last: Option<i64>,
}

/// Links on a player recruitment post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerRecruitmentUrls {
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub recruitment: Option<String>,
}

/// Links on a team recruitment post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRecruitmentUrls {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub recruitment: Option<String>,
}

/// A player looking for a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecruitment {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub classes: Vec<String>,
    #[serde(default)]
    pub comments: RecruitmentComments,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub steam: SteamPlayer,
    #[serde(rename = "type", default)]
    pub team_type: Option<String>,
    #[serde(default)]
    pub urls: PlayerRecruitmentUrls,
}

/// A team looking for players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecruitment {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub classes: Vec<String>,
    #[serde(default)]
    pub comments: RecruitmentComments,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub steam: SteamPlayer,
    #[serde(rename = "type", default)]
    pub team_type: Option<String>,
    #[serde(default)]
    pub urls: TeamRecruitmentUrls,
}

/// Filters shared by both recruitment lists.
#[derive(Debug, Clone, Default)]
pub struct RecruitmentQuery {
    pub country: Option<String>,
    /// Any of these classes.
    pub classes: Vec<String>,
    /// Any of these skill levels.
    pub skills: Vec<String>,
    /// Team type, e.g. "6v6".
    pub team_type: Option<String>,
    /// ETF2L id of the post's author.
    pub user: Option<u64>,
    /// Follow every page.
    pub recursive: bool,
}

impl RecruitmentQuery {
    fn request(&self, path: &str) -> Request {
        let mut params = Query::new();
        params
            .push_opt("country", self.country.as_deref())
            .push_list("class", &self.classes)
            .push_list("skill", &self.skills)
            .push_opt("type", self.team_type.as_deref())
            .push_opt("user", self.user);

        Request::new(path)
            .with_query(params)
            .recursive(self.recursive)
    }
}

impl List for PlayerRecruitment {
    type Query = RecruitmentQuery;
    type Envelope = RecruitmentEnvelope<PlayerRecruitment>;

    fn request(query: &RecruitmentQuery) -> Request {
        query.request("/recruitment/players")
    }
}

impl List for TeamRecruitment {
    type Query = RecruitmentQuery;
    type Envelope = RecruitmentEnvelope<TeamRecruitment>;

    fn request(query: &RecruitmentQuery) -> Request {
        query.request("/recruitment/teams")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recruitment_lists_encode_as_arrays() {
        let query = RecruitmentQuery {
            classes: vec!["Scout".to_string(), "Demoman".to_string()],
            skills: vec!["High".to_string()],
            user: Some(5),
            ..Default::default()
        };
        assert_eq!(
            TeamRecruitment::request(&query).target(),
            "/recruitment/teams?class%5B%5D=Scout&class%5B%5D=Demoman&skill%5B%5D=High&user=5"
        );
        assert_eq!(
            PlayerRecruitment::request(&query).path(),
            "/recruitment/players"
        );
    }
}
