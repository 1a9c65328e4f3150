//! Records shared by several resources, and lenient field decoders.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// `status` block included in most envelopes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

/// Steam identifiers of a player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SteamPlayer {
    #[serde(default)]
    pub avatar: Option<String>,
    /// Legacy `STEAM_0:X:Y` form.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// `[U:1:Z]` form.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id3: String,
    /// 64-bit community id.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id64: String,
}

/// Steam group of a team, as embedded in team records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SteamGroup {
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, alias = "group")]
    pub steam_group: Option<String>,
}

/// Division a match or team was placed in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Division {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub skill_contrib: Option<i64>,
    #[serde(default)]
    pub tier: Option<i64>,
}

/// A team as it appears inside a match record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clan {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub drop: bool,
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steam: SteamGroup,
    #[serde(default)]
    pub url: Option<String>,
    /// Only present on player results.
    #[serde(default)]
    pub was_in_team: Option<bool>,
}

/// Short reference to a competition, embedded in match records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitionRef {
    #[serde(default)]
    pub category: Option<String>,
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub competition_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Links attached to a match record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchUrls {
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub api: Option<String>,
}

/// Convert an API unix timestamp into a UTC date.
pub fn unix_time(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Accepts a string or a number; `null` becomes an empty string.
pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Accepts an object; PHP serializes an empty map as `[]`, and absent
/// maps sometimes arrive as `null`.
pub(crate) fn lenient_map<'de, D, K, V>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: DeserializeOwned + Eq + Hash,
    V: DeserializeOwned,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrList<K: Eq + Hash, V> {
        Map(HashMap<K, V>),
        List(Vec<serde_json::Value>),
        Null(()),
    }

    match MapOrList::<K, V>::deserialize(deserializer)? {
        MapOrList::Map(map) => Ok(map),
        MapOrList::List(list) if list.is_empty() => Ok(HashMap::new()),
        MapOrList::List(_) => Err(serde::de::Error::custom("expected a map, got a non-empty list")),
        MapOrList::Null(()) => Ok(HashMap::new()),
    }
}

/// Accepts a list of strings; `false`, `null` or any non-list means none.
pub(crate) fn lenient_string_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "lenient_map")]
        map: HashMap<String, u32>,
        #[serde(default, deserialize_with = "lenient_string_list")]
        list: Vec<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        id: String,
    }

    #[test]
    fn test_empty_php_array_decodes_as_empty_map() {
        let holder: Holder = serde_json::from_value(json!({ "map": [] })).unwrap();
        assert!(holder.map.is_empty());

        let holder: Holder = serde_json::from_value(json!({ "map": { "a": 1 } })).unwrap();
        assert_eq!(holder.map.get("a"), Some(&1));
    }

    #[test]
    fn test_string_list_tolerates_false() {
        let holder: Holder = serde_json::from_value(json!({ "list": false })).unwrap();
        assert!(holder.list.is_empty());

        let holder: Holder =
            serde_json::from_value(json!({ "list": ["Scout", "Medic"] })).unwrap();
        assert_eq!(holder.list, vec!["Scout", "Medic"]);
    }

    #[test]
    fn test_numeric_id_becomes_string() {
        let holder: Holder = serde_json::from_value(json!({ "id": 76561197970669109u64 })).unwrap();
        assert_eq!(holder.id, "76561197970669109");
    }

    #[test]
    fn test_unix_time() {
        let date = unix_time(0).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "1970-01-01");
    }
}
