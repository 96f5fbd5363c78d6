use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use pitchside::api_football::parse_envelope;
use pitchside::normalizers::{
    ApiEvent, ApiFixture, ApiLineup, ApiTeamStats, format_match_date, normalize_fixture,
    normalize_match_details, sort_by_kickoff,
};
use pitchside::pitch_layout::{PitchMarkers, layout_lineup};
use pitchside::state::{EventKind, PlayerId};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture() -> ApiFixture {
    let fixtures: Vec<ApiFixture> =
        parse_envelope(&read_fixture("fixture.json")).expect("fixture should parse");
    fixtures.into_iter().next().expect("one fixture")
}

#[test]
fn parses_fixture_summary() {
    let summary = normalize_fixture(&fixture());
    assert_eq!(summary.id, 1035037);
    assert_eq!(summary.home.name, "Manchester United");
    assert_eq!(summary.away.id, 40);
    assert_eq!(summary.score.home, Some(2));
    assert_eq!(summary.score.ht_away, Some(1));
    assert_eq!(summary.elapsed, Some(67));
    assert!(summary.is_live());
    assert_eq!(summary.score_text(), "2-1");
    assert_eq!(summary.venue.as_deref(), Some("Old Trafford"));
    let league = summary.league.expect("league");
    assert_eq!(league.season, 2023);
    assert_eq!(league.round.as_deref(), Some("Regular Season - 28"));
}

#[test]
fn fixture_lists_sort_newest_first_for_results() {
    let fixtures: Vec<ApiFixture> =
        parse_envelope(&read_fixture("fixtures_list.json")).expect("list should parse");
    let mut matches: Vec<_> = fixtures.iter().map(normalize_fixture).collect();

    sort_by_kickoff(&mut matches, false);
    let ids: Vec<u64> = matches.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![12, 13, 11]);

    sort_by_kickoff(&mut matches, true);
    let ids: Vec<u64> = matches.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![11, 13, 12]);

    // Missing venue names and half-time scores stay empty.
    let beta_gamma = matches.iter().find(|m| m.id == 13).expect("fixture 13");
    assert_eq!(beta_gamma.score.ht_home, None);
    let alpha_beta = matches.iter().find(|m| m.id == 11).expect("fixture 11");
    assert_eq!(alpha_beta.venue, None);
}

#[test]
fn envelope_errors_are_reported() {
    let err = parse_envelope::<ApiFixture>(&read_fixture("errors.json"))
        .expect_err("errors should fail the parse");
    let msg = err.to_string();
    assert!(msg.contains("valid year"));
    assert!(msg.contains("Free plans"));
    assert!(msg.contains(", "));
}

#[test]
fn parses_full_match_detail() {
    let lineups: Vec<ApiLineup> =
        parse_envelope(&read_fixture("lineups.json")).expect("lineups should parse");
    let events: Vec<ApiEvent> =
        parse_envelope(&read_fixture("events.json")).expect("events should parse");
    let stats: Vec<ApiTeamStats> =
        parse_envelope(&read_fixture("statistics.json")).expect("stats should parse");

    let detail = normalize_match_details(
        &fixture(),
        Some(lineups.as_slice()),
        &events,
        Some(stats.as_slice()),
    );
    assert_eq!(detail.referee.as_deref(), Some("M. Oliver"));

    // Lineups are matched to sides by team id, not response order.
    let lineups = detail.lineups.expect("lineups");
    let home = lineups.home.expect("home lineup");
    let away = lineups.away.expect("away lineup");
    assert_eq!(home.team.name, "Manchester United");
    assert_eq!(home.formation, None);
    assert_eq!(home.starting_xi.len(), 11);
    assert_eq!(home.starting_xi[9].id, PlayerId::Text("anon-9".to_string()));
    assert_eq!(away.formation.as_deref(), Some("4-3-3"));
    assert_eq!(away.coach.as_ref().map(|c| c.name.as_str()), Some("J. Klopp"));
    assert_eq!(away.substitutes.len(), 2);
    let colors = away.colors.as_ref().expect("colors");
    assert_eq!(
        colors.player.as_ref().map(|c| c.primary.as_str()),
        Some("e41e2c")
    );

    assert_eq!(detail.events.len(), 4);
    assert_eq!(detail.events[0].id, "12-Goal-0");
    assert_eq!(detail.events[0].kind, EventKind::Goal);
    assert_eq!(
        detail.events[0].assist.as_ref().map(|a| a.name.as_str()),
        Some("B. Fernandes")
    );
    assert_eq!(detail.events[1].extra_minute, Some(2));
    assert!(detail.events[1].assist.is_none());
    assert_eq!(detail.events[2].kind, EventKind::Card);
    assert_eq!(detail.events[3].kind, EventKind::Subst);
    assert_eq!(detail.events[3].id, "61-subst-3");

    let stats = detail.stats.expect("stats");
    let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Shots on Goal", "Ball Possession", "Yellow Cards", "expected_goals"]
    );
    assert_eq!(stats[1].home, "38%");
    assert_eq!(stats[2].home, "-");
    assert_eq!(stats[2].away, "1");
    assert_eq!(stats[3].home, "-");
    assert_eq!(stats[3].away, "1.94");
}

#[test]
fn parsed_lineups_lay_out_on_the_pitch() {
    let lineups: Vec<ApiLineup> =
        parse_envelope(&read_fixture("lineups.json")).expect("lineups should parse");
    let detail = normalize_match_details(&fixture(), Some(lineups.as_slice()), &[], None);
    let lineups = detail.lineups.expect("lineups");

    for lineup in [lineups.home.as_ref(), lineups.away.as_ref()] {
        let layout = layout_lineup(lineup);
        let PitchMarkers::Players(players) = layout.markers else {
            panic!("expected positioned players");
        };
        assert_eq!(players.len(), 11);
        assert_eq!(players.iter().filter(|p| p.is_goalkeeper).count(), 1);
        let keeper = players.iter().find(|p| p.is_goalkeeper).expect("keeper");
        assert!(keeper.y > 80.0);
    }
}

#[test]
fn missing_sections_stay_empty() {
    let detail = normalize_match_details(&fixture(), None, &[], None);
    assert!(detail.lineups.is_none());
    assert!(detail.events.is_empty());
    assert!(detail.stats.is_none());

    let only_home: Vec<ApiTeamStats> = parse_envelope::<ApiTeamStats>(&read_fixture(
        "statistics.json",
    ))
    .expect("stats should parse")
    .into_iter()
    .filter(|s| s.team.id == 33)
    .collect();
    let detail = normalize_match_details(&fixture(), None, &[], Some(only_home.as_slice()));
    assert!(detail.stats.is_none());
}

#[test]
fn match_dates_are_relative_to_today() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 12).expect("date");
    let summary = normalize_fixture(&fixture());
    assert_eq!(format_match_date(&summary.date, today), "2 days ago");
}
