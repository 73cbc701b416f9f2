use leaderboard_terminal::fake_feed::demo_stats;

#[test]
fn demo_stats_cover_every_requested_player_in_order() {
    let mut rng = rand::thread_rng();
    let usernames = vec![
        "alice".to_string(),
        "bob".to_string(),
        "carol".to_string(),
    ];

    let stats = demo_stats(&usernames, &mut rng);

    assert_eq!(stats.len(), usernames.len());
    for (record, name) in stats.iter().zip(usernames.iter()) {
        assert_eq!(&record.username, name);
        assert!(record.stats.kills >= 0.0);
        assert!(record.stats.score >= 0.0);
    }
}
