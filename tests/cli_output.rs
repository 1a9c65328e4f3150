//! CLI output formatting tests
//!
//! JSON output with --json, pretty-print output as default.

use etf2l::{PrettyPrint, Team};

fn make_test_team() -> Team {
    serde_json::from_value(serde_json::json!({
        "id": 31,
        "name": "Test Team",
        "tag": "TT",
        "type": "6on6",
        "country": "Germany",
        "competitions": { "700": { "category": "6v6 Season", "competition": "Season 40" } },
        "players": [
            { "id": 1, "name": "captain", "role": "Leader", "steam": {} },
            { "id": 2, "name": "member", "role": "Member", "steam": {} }
        ]
    }))
    .unwrap()
}

#[test]
fn test_json_output_is_valid_json() {
    let team = make_test_team();
    let json_output = serde_json::to_string_pretty(&team).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json_output).unwrap();
    assert!(parsed.is_object());
    assert_eq!(parsed["name"], "Test Team");
    assert_eq!(parsed["type"], "6on6");
}

#[test]
fn test_json_list_output_is_array() {
    let teams = vec![make_test_team(), make_test_team()];
    let json_output = serde_json::to_string_pretty(&teams).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json_output).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
}

#[test]
fn test_default_output_is_not_json() {
    let pretty_output = make_test_team().pretty_print();

    let parse_result: Result<serde_json::Value, _> = serde_json::from_str(&pretty_output);
    assert!(parse_result.is_err(), "Default output should NOT be valid JSON");
}

#[test]
fn test_team_pretty_print_shows_key_fields() {
    let output = make_test_team().pretty_print();

    assert!(output.starts_with("Team: Test Team (#31)"));
    assert!(output.contains("Tag:            TT"));
    assert!(output.contains("Leaders:        captain"));
    assert!(output.contains("Roster:         2 players"));
    assert!(output.contains("Competitions:   1"));
}
