use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::state::{
    Coach, EventKind, EventPerson, KitColor, KitColors, LeagueInfo, MatchDetail, MatchEvent,
    MatchLineups, MatchStat, MatchSummary, Player, PlayerId, Score, TeamInfo, TeamLineup,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiFixture {
    pub fixture: ApiFixtureInfo,
    #[serde(default)]
    pub league: Option<ApiLeague>,
    pub teams: ApiTeams,
    #[serde(default)]
    pub goals: ApiGoals,
    #[serde(default)]
    pub score: ApiScore,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiFixtureInfo {
    pub id: u64,
    #[serde(default)]
    pub referee: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub venue: Option<ApiVenue>,
    pub status: ApiStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiVenue {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub long: String,
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub elapsed: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiLeague {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub season: Option<i32>,
    #[serde(default)]
    pub round: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTeams {
    pub home: ApiTeam,
    pub away: ApiTeam,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTeam {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiGoals {
    pub home: Option<u8>,
    pub away: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiScore {
    #[serde(default)]
    pub halftime: ApiGoals,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiLineup {
    pub team: ApiLineupTeam,
    #[serde(default)]
    pub coach: Option<ApiCoach>,
    #[serde(default)]
    pub formation: Option<String>,
    #[serde(default, rename = "startXI")]
    pub start_xi: Option<Vec<ApiLineupEntry>>,
    #[serde(default)]
    pub substitutes: Option<Vec<ApiLineupEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiLineupTeam {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub colors: Option<ApiColors>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiColors {
    #[serde(default)]
    pub player: Option<KitColor>,
    #[serde(default)]
    pub goalkeeper: Option<KitColor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCoach {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiLineupEntry {
    pub player: ApiLineupPlayer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiLineupPlayer {
    pub id: Option<PlayerId>,
    pub name: String,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub grid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiEvent {
    pub time: ApiEventTime,
    pub team: ApiTeam,
    #[serde(default)]
    pub player: Option<ApiPerson>,
    #[serde(default)]
    pub assist: Option<ApiPerson>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiEventTime {
    #[serde(default)]
    pub elapsed: u16,
    #[serde(default)]
    pub extra: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPerson {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTeamStats {
    pub team: ApiTeam,
    #[serde(default)]
    pub statistics: Vec<ApiStatEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiStatEntry {
    #[serde(rename = "type")]
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Live,
    Finished,
    Scheduled,
    Halted,
    Unknown,
}

pub fn classify_status(short: &str) -> StatusClass {
    match short.trim().to_ascii_uppercase().as_str() {
        "1H" | "2H" | "HT" | "ET" | "P" | "BT" | "LIVE" | "INT" => StatusClass::Live,
        "FT" | "AET" | "PEN" => StatusClass::Finished,
        "NS" | "TBD" => StatusClass::Scheduled,
        "PST" | "CANC" | "SUSP" | "ABD" | "AWD" | "WO" => StatusClass::Halted,
        _ => StatusClass::Unknown,
    }
}

fn team_info(team: &ApiTeam) -> TeamInfo {
    TeamInfo {
        id: team.id,
        name: team.name.clone(),
    }
}

pub fn normalize_fixture(fixture: &ApiFixture) -> MatchSummary {
    MatchSummary {
        id: fixture.fixture.id,
        date: fixture.fixture.date.clone(),
        status: fixture.fixture.status.long.clone(),
        status_short: fixture.fixture.status.short.clone(),
        elapsed: fixture.fixture.status.elapsed,
        home: team_info(&fixture.teams.home),
        away: team_info(&fixture.teams.away),
        score: Score {
            home: fixture.goals.home,
            away: fixture.goals.away,
            ht_home: fixture.score.halftime.home,
            ht_away: fixture.score.halftime.away,
        },
        league: fixture.league.as_ref().map(|league| LeagueInfo {
            id: league.id,
            name: league.name.clone(),
            country: league.country.clone().unwrap_or_default(),
            season: league.season.unwrap_or_default(),
            round: league.round.clone(),
        }),
        venue: fixture
            .fixture
            .venue
            .as_ref()
            .and_then(|v| v.name.clone())
            .filter(|name| !name.trim().is_empty()),
    }
}

fn normalize_player(entry: &ApiLineupEntry, index: usize) -> Player {
    let raw = &entry.player;
    Player {
        // Unknown ids still need to be distinct within a lineup.
        id: raw
            .id
            .clone()
            .unwrap_or_else(|| PlayerId::Text(format!("anon-{index}"))),
        name: raw.name.clone(),
        number: raw.number,
        position: raw.pos.clone().filter(|p| !p.trim().is_empty()),
        grid: raw.grid.clone().filter(|g| !g.trim().is_empty()),
    }
}

pub fn normalize_lineup(lineup: &ApiLineup) -> TeamLineup {
    let players = |entries: &Option<Vec<ApiLineupEntry>>| -> Vec<Player> {
        entries
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(idx, entry)| normalize_player(entry, idx))
            .collect()
    };

    TeamLineup {
        team: TeamInfo {
            id: lineup.team.id,
            name: lineup.team.name.clone(),
        },
        formation: lineup
            .formation
            .clone()
            .filter(|f| !f.trim().is_empty()),
        coach: lineup.coach.as_ref().and_then(|coach| {
            Some(Coach {
                id: coach.id.unwrap_or_default(),
                name: coach.name.clone()?,
            })
        }),
        starting_xi: players(&lineup.start_xi),
        substitutes: players(&lineup.substitutes),
        colors: lineup.team.colors.as_ref().map(|colors| KitColors {
            player: colors.player.clone(),
            goalkeeper: colors.goalkeeper.clone(),
        }),
    }
}

pub fn normalize_event(event: &ApiEvent, index: usize) -> MatchEvent {
    let person = |p: &Option<ApiPerson>| -> Option<EventPerson> {
        let p = p.as_ref()?;
        Some(EventPerson {
            id: p.id?,
            name: p.name.clone()?,
        })
    };

    MatchEvent {
        id: format!("{}-{}-{index}", event.time.elapsed, event.kind),
        minute: event.time.elapsed,
        extra_minute: event.time.extra,
        kind: EventKind::from_api(&event.kind),
        detail: event.detail.clone(),
        team: team_info(&event.team),
        player: person(&event.player),
        assist: person(&event.assist),
        comments: event.comments.clone(),
    }
}

/// Merges per-team statistic lists into home/away rows, home order first.
pub fn normalize_stats(
    home: Option<&ApiTeamStats>,
    away: Option<&ApiTeamStats>,
) -> Option<Vec<MatchStat>> {
    let (home, away) = (home?, away?);
    let mut rows: Vec<MatchStat> = home
        .statistics
        .iter()
        .map(|s| MatchStat {
            name: s.name.clone(),
            home: stat_value_to_string(&s.value),
            away: "-".to_string(),
        })
        .collect();

    for stat in &away.statistics {
        let value = stat_value_to_string(&stat.value);
        match rows.iter_mut().find(|row| row.name == stat.name) {
            Some(row) => row.away = value,
            None => rows.push(MatchStat {
                name: stat.name.clone(),
                home: "-".to_string(),
                away: value,
            }),
        }
    }

    if rows.is_empty() { None } else { Some(rows) }
}

fn stat_value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(true) => "yes".to_string(),
        serde_json::Value::Bool(false) => "no".to_string(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

pub fn normalize_match_details(
    fixture: &ApiFixture,
    lineups: Option<&[ApiLineup]>,
    events: &[ApiEvent],
    stats: Option<&[ApiTeamStats]>,
) -> MatchDetail {
    let home_id = fixture.teams.home.id;
    let away_id = fixture.teams.away.id;

    let lineups = lineups.and_then(|list| {
        let home = list.iter().find(|l| l.team.id == home_id);
        let away = list.iter().find(|l| l.team.id == away_id);
        if home.is_none() && away.is_none() {
            return None;
        }
        Some(MatchLineups {
            home: home.map(normalize_lineup),
            away: away.map(normalize_lineup),
        })
    });

    let stats = stats.and_then(|list| {
        normalize_stats(
            list.iter().find(|s| s.team.id == home_id),
            list.iter().find(|s| s.team.id == away_id),
        )
    });

    MatchDetail {
        summary: normalize_fixture(fixture),
        referee: fixture
            .fixture
            .referee
            .clone()
            .filter(|r| !r.trim().is_empty()),
        lineups,
        events: events
            .iter()
            .enumerate()
            .map(|(idx, e)| normalize_event(e, idx))
            .collect(),
        stats,
    }
}

fn kickoff_timestamp(date: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(date.trim())
        .ok()
        .map(|dt| dt.timestamp())
}

/// Results newest first, upcoming fixtures soonest first. Unparseable dates sort last.
pub fn sort_by_kickoff(matches: &mut [MatchSummary], upcoming: bool) {
    matches.sort_by(|a, b| {
        match (kickoff_timestamp(&a.date), kickoff_timestamp(&b.date)) {
            (Some(ta), Some(tb)) if upcoming => ta.cmp(&tb),
            (Some(ta), Some(tb)) => tb.cmp(&ta),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        }
    });
}

/// Short relative label for a kickoff date, e.g. `Today`, `3 days ago`, `In 2 days`.
pub fn format_match_date(date: &str, today: NaiveDate) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(date.trim()) else {
        return if date.trim().is_empty() {
            "TBD".to_string()
        } else {
            date.trim().chars().take(10).collect()
        };
    };
    let day = parsed.date_naive();
    let diff = (today - day).num_days();
    match diff {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        -1 => "Tomorrow".to_string(),
        2..=6 => format!("{diff} days ago"),
        -6..=-2 => format!("In {} days", -diff),
        _ => day.format("%b %-d").to_string(),
    }
}

pub fn format_kickoff_time(date: &str) -> String {
    DateTime::parse_from_rfc3339(date.trim())
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|_| "--:--".to_string())
}
