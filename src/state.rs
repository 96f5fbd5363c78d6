use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalizers::{StatusClass, classify_status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Pulse,
    Match { fixture_id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureView {
    Recent,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchSide {
    Home,
    Away,
}

pub const PLACEHOLDER_FIXTURE_ID: u64 = 0;
pub const PLACEHOLDER_HOME: &str = "Northbridge";
pub const PLACEHOLDER_AWAY: &str = "Southport";

pub fn placeholder_match_summary() -> MatchSummary {
    MatchSummary {
        id: PLACEHOLDER_FIXTURE_ID,
        date: String::new(),
        status: "Second Half".to_string(),
        status_short: "2H".to_string(),
        elapsed: Some(64),
        home: TeamInfo {
            id: 1,
            name: PLACEHOLDER_HOME.to_string(),
        },
        away: TeamInfo {
            id: 2,
            name: PLACEHOLDER_AWAY.to_string(),
        },
        score: Score {
            home: Some(2),
            away: Some(1),
            ht_home: Some(1),
            ht_away: Some(1),
        },
        league: Some(LeagueInfo {
            id: 0,
            name: "Demo League".to_string(),
            country: "Nowhere".to_string(),
            season: 2025,
            round: None,
        }),
        venue: Some("Demo Park".to_string()),
    }
}

pub fn placeholder_match_detail() -> MatchDetail {
    let summary = placeholder_match_summary();
    let home = summary.home.clone();
    let away = summary.away.clone();

    let events = vec![
        placeholder_event(0, 9, EventKind::Goal, "Normal Goal", &home, "K. Rook"),
        placeholder_event(1, 27, EventKind::Card, "Yellow Card", &away, "D. Moss"),
        placeholder_event(2, 38, EventKind::Goal, "Normal Goal", &away, "E. Pike"),
        placeholder_event(3, 58, EventKind::Goal, "Penalty", &home, "T. Vale"),
        placeholder_event(4, 61, EventKind::Subst, "Substitution 1", &away, "O. Reed"),
    ];

    let stats = vec![
        placeholder_stat("Ball Possession", "58%", "42%"),
        placeholder_stat("Total Shots", "14", "9"),
        placeholder_stat("Shots on Goal", "6", "3"),
        placeholder_stat("expected_goals", "1.72", "0.86"),
        placeholder_stat("Corner Kicks", "5", "2"),
        placeholder_stat("Yellow Cards", "-", "1"),
    ];

    let home_lineup = TeamLineup {
        team: home,
        formation: Some("4-3-3".to_string()),
        coach: Some(Coach {
            id: 1,
            name: "H. Marsh".to_string(),
        }),
        starting_xi: vec![
            placeholder_player(101, "A. Stone", 1, "G"),
            placeholder_player(102, "R. Vega", 2, "D"),
            placeholder_player(103, "M. Holt", 4, "D"),
            placeholder_player(104, "F. Lund", 5, "D"),
            placeholder_player(105, "B. Crane", 3, "D"),
            placeholder_player(106, "J. Nox", 6, "M"),
            placeholder_player(107, "T. Vale", 8, "M"),
            placeholder_player(108, "G. Wren", 10, "M"),
            placeholder_player(109, "S. Lark", 7, "F"),
            placeholder_player(110, "K. Rook", 9, "F"),
            placeholder_player(111, "U. Finch", 11, "F"),
        ],
        substitutes: vec![
            placeholder_player(112, "P. Vale", 12, "D"),
            placeholder_player(113, "S. Quinn", 18, "F"),
        ],
        colors: None,
    };

    // No formation reported: exercises the unlabelled fallback grid.
    let away_lineup = TeamLineup {
        team: away,
        formation: None,
        coach: None,
        starting_xi: vec![
            placeholder_player(201, "L. Park", 1, "G"),
            placeholder_player(202, "D. Moss", 2, "D"),
            placeholder_player(203, "I. Noor", 5, "D"),
            placeholder_player(204, "W. Shaw", 4, "D"),
            placeholder_player(205, "C. Hale", 7, "M"),
            placeholder_player(206, "V. Ash", 10, "M"),
            placeholder_player(207, "Y. Bell", 8, "M"),
            placeholder_player(208, "N. Gray", 14, "M"),
            placeholder_player(209, "Q. Hart", 17, "M"),
            placeholder_player(210, "E. Pike", 11, "F"),
            placeholder_player(211, "Z. Cole", 9, "F"),
        ],
        substitutes: vec![placeholder_player(212, "O. Reed", 19, "F")],
        colors: None,
    };

    MatchDetail {
        summary,
        referee: Some("A. Whistle".to_string()),
        lineups: Some(MatchLineups {
            home: Some(home_lineup),
            away: Some(away_lineup),
        }),
        events,
        stats: Some(stats),
    }
}

fn placeholder_player(id: u64, name: &str, number: u32, pos: &str) -> Player {
    Player {
        id: PlayerId::Num(id),
        name: name.to_string(),
        number: Some(number),
        position: Some(pos.to_string()),
        grid: None,
    }
}

fn placeholder_event(
    index: usize,
    minute: u16,
    kind: EventKind,
    detail: &str,
    team: &TeamInfo,
    player: &str,
) -> MatchEvent {
    MatchEvent {
        id: format!("{minute}-{}-{index}", kind.api_name()),
        minute,
        extra_minute: None,
        kind,
        detail: detail.to_string(),
        team: team.clone(),
        player: Some(EventPerson {
            id: 1000 + index as u64,
            name: player.to_string(),
        }),
        assist: None,
        comments: None,
    }
}

fn placeholder_stat(name: &str, home: &str, away: &str) -> MatchStat {
    MatchStat {
        name: name.to_string(),
        home: home.to_string(),
        away: away.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub fixture_view: FixtureView,
    pub selected: usize,
    pub fixtures: HashMap<FixtureView, Vec<MatchSummary>>,
    pub match_detail: HashMap<u64, MatchDetail>,
    pub pitch_side: PitchSide,
    pub source_label: String,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Pulse,
            fixture_view: FixtureView::Recent,
            selected: 0,
            fixtures: HashMap::with_capacity(2),
            match_detail: HashMap::with_capacity(16),
            pitch_side: PitchSide::Home,
            source_label: String::new(),
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn visible_matches(&self) -> &[MatchSummary] {
        self.fixtures
            .get(&self.fixture_view)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn selected_match(&self) -> Option<&MatchSummary> {
        match self.screen {
            Screen::Match { fixture_id } => self
                .fixtures
                .values()
                .flatten()
                .find(|m| m.id == fixture_id)
                .or_else(|| self.match_detail.get(&fixture_id).map(|d| &d.summary)),
            Screen::Pulse => self.visible_matches().get(self.selected),
        }
    }

    /// Live status of a fixture, preferring the detail header over any list row.
    pub fn fixture_is_live(&self, fixture_id: u64) -> bool {
        self.match_detail
            .get(&fixture_id)
            .map(|d| &d.summary)
            .or_else(|| {
                self.fixtures
                    .values()
                    .flatten()
                    .find(|m| m.id == fixture_id)
            })
            .is_some_and(MatchSummary::is_live)
    }

    pub fn selected_match_id(&self) -> Option<u64> {
        match self.screen {
            Screen::Match { fixture_id } => Some(fixture_id),
            Screen::Pulse => self.selected_match().map(|m| m.id),
        }
    }

    pub fn selected_detail(&self) -> Option<&MatchDetail> {
        self.selected_match_id()
            .and_then(|id| self.match_detail.get(&id))
    }

    pub fn select_next(&mut self) {
        let total = self.visible_matches().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let total = self.visible_matches().len();
        self.selected = self.selected.min(total.saturating_sub(1));
    }

    pub fn toggle_fixture_view(&mut self) {
        self.fixture_view = match self.fixture_view {
            FixtureView::Recent => FixtureView::Upcoming,
            FixtureView::Upcoming => FixtureView::Recent,
        };
        self.selected = 0;
    }

    pub fn toggle_pitch_side(&mut self) {
        self.pitch_side = match self.pitch_side {
            PitchSide::Home => PitchSide::Away,
            PitchSide::Away => PitchSide::Home,
        };
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub id: u64,
    pub name: String,
    pub country: String,
    pub season: i32,
    #[serde(default)]
    pub round: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub home: Option<u8>,
    pub away: Option<u8>,
    pub ht_home: Option<u8>,
    pub ht_away: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub id: u64,
    pub date: String,
    pub status: String,
    pub status_short: String,
    #[serde(default)]
    pub elapsed: Option<u16>,
    pub home: TeamInfo,
    pub away: TeamInfo,
    pub score: Score,
    #[serde(default)]
    pub league: Option<LeagueInfo>,
    #[serde(default)]
    pub venue: Option<String>,
}

impl MatchSummary {
    pub fn status_class(&self) -> StatusClass {
        classify_status(&self.status_short)
    }

    pub fn is_live(&self) -> bool {
        self.status_class() == StatusClass::Live
    }

    pub fn score_text(&self) -> String {
        match (self.score.home, self.score.away) {
            (Some(h), Some(a)) => format!("{h}-{a}"),
            _ => "v".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerId {
    Num(u64),
    Text(String),
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::Num(id) => write!(f, "{id}"),
            PlayerId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub position: Option<String>,
    // API-Football "row:col" hint, kept for display only.
    #[serde(default)]
    pub grid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coach {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitColor {
    pub primary: String,
    pub number: String,
    pub border: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitColors {
    #[serde(default)]
    pub player: Option<KitColor>,
    #[serde(default)]
    pub goalkeeper: Option<KitColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamLineup {
    pub team: TeamInfo,
    pub formation: Option<String>,
    pub coach: Option<Coach>,
    pub starting_xi: Vec<Player>,
    pub substitutes: Vec<Player>,
    #[serde(default)]
    pub colors: Option<KitColors>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchLineups {
    pub home: Option<TeamLineup>,
    pub away: Option<TeamLineup>,
}

impl MatchLineups {
    pub fn side(&self, side: PitchSide) -> Option<&TeamLineup> {
        match side {
            PitchSide::Home => self.home.as_ref(),
            PitchSide::Away => self.away.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Goal,
    Card,
    Subst,
    Var,
    Other,
}

impl EventKind {
    pub fn from_api(raw: &str) -> Self {
        match raw {
            "Goal" => EventKind::Goal,
            "Card" => EventKind::Card,
            "subst" => EventKind::Subst,
            "Var" => EventKind::Var,
            _ => EventKind::Other,
        }
    }

    pub fn api_name(self) -> &'static str {
        match self {
            EventKind::Goal => "Goal",
            EventKind::Card => "Card",
            EventKind::Subst => "subst",
            EventKind::Var => "Var",
            EventKind::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPerson {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: String,
    pub minute: u16,
    pub extra_minute: Option<u16>,
    pub kind: EventKind,
    pub detail: String,
    pub team: TeamInfo,
    pub player: Option<EventPerson>,
    pub assist: Option<EventPerson>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStat {
    pub name: String,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub summary: MatchSummary,
    #[serde(default)]
    pub referee: Option<String>,
    pub lineups: Option<MatchLineups>,
    pub events: Vec<MatchEvent>,
    pub stats: Option<Vec<MatchStat>>,
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetFixtures {
        view: FixtureView,
        matches: Vec<MatchSummary>,
    },
    SetMatchDetails {
        id: u64,
        detail: MatchDetail,
    },
    SetSource(String),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchFixtures { view: FixtureView },
    FetchMatchDetails { fixture_id: u64 },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetFixtures { view, matches } => {
            let selected_id = if state.fixture_view == view {
                state.selected_match_id()
            } else {
                None
            };
            state.fixtures.insert(view, matches);
            if state.fixture_view == view {
                if let Some(id) = selected_id
                    && let Some(idx) = state.visible_matches().iter().position(|m| m.id == id)
                {
                    state.selected = idx;
                }
                state.clamp_selection();
            }
        }
        Delta::SetMatchDetails { id, detail } => {
            let mut detail = detail;
            if let Some(existing) = state.match_detail.get(&id) {
                // A refresh may come back without lineups or stats; keep what we had.
                if detail.lineups.is_none() && existing.lineups.is_some() {
                    detail.lineups = existing.lineups.clone();
                }
                if detail.stats.is_none() && existing.stats.is_some() {
                    detail.stats = existing.stats.clone();
                }
                if detail.events.is_empty() && !existing.events.is_empty() {
                    detail.events = existing.events.clone();
                }
            }

            // The detail header is fresher than the list row; keep the list in step.
            let mut score_changed = false;
            for list in state.fixtures.values_mut() {
                if let Some(row) = list.iter_mut().find(|m| m.id == id) {
                    score_changed |= row.score.home.is_some()
                        && detail.summary.score.home.is_some()
                        && row.score != detail.summary.score;
                    *row = detail.summary.clone();
                }
            }
            if score_changed {
                state.push_log(format!(
                    "[ALERT] Score: {} {} {}",
                    detail.summary.home.name,
                    detail.summary.score_text(),
                    detail.summary.away.name
                ));
            }

            state.match_detail.insert(id, detail);
        }
        Delta::SetSource(label) => {
            state.source_label = label;
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
