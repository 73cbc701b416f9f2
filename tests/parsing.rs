use leaderboard_terminal::leaderboard_fetch::{parse_player_stats_json, parse_valid_players_json};

#[test]
fn parses_player_list() {
    let raw = r#"["alice", " bob ", "", "carol"]"#;
    let players = parse_valid_players_json(raw).expect("list should parse");
    assert_eq!(players, vec!["alice", "bob", "carol"]);
}

#[test]
fn player_list_null_is_empty() {
    assert!(parse_valid_players_json("null").expect("null should parse").is_empty());
    assert!(parse_valid_players_json("   ").expect("blank should parse").is_empty());
}

#[test]
fn player_list_rejects_malformed_json() {
    assert!(parse_valid_players_json("{\"nope\":").is_err());
}

#[test]
fn parses_player_stats_records() {
    let raw = r#"[
        {"playerName": "alice", "stats": {"kills": 3, "deaths": 1, "assists": 2, "wins": 1, "score": 420}},
        {"playerName": "bob", "stats": {"kills": 0}}
    ]"#;
    let stats = parse_player_stats_json(raw).expect("stats should parse");

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].username, "alice");
    assert_eq!(stats[0].stats.kills, 3.0);
    assert_eq!(stats[0].stats.score, 420.0);
    // Fields the source omits default to zero.
    assert_eq!(stats[1].username, "bob");
    assert_eq!(stats[1].stats.deaths, 0.0);
    assert_eq!(stats[1].stats.score, 0.0);
}

#[test]
fn player_stats_tolerates_unknown_fields_and_missing_stats() {
    let raw = r#"[
        {"playerName": "alice", "rank": 12, "stats": {"kills": 1, "streak": 4}},
        {"playerName": "bob"}
    ]"#;
    let stats = parse_player_stats_json(raw).expect("stats should parse");
    assert_eq!(stats[0].stats.kills, 1.0);
    assert_eq!(stats[1].stats, Default::default());
}

#[test]
fn player_stats_null_is_empty() {
    assert!(parse_player_stats_json("null").expect("null should parse").is_empty());
    assert!(parse_player_stats_json("").expect("empty should parse").is_empty());
}
