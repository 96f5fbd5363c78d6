use anyhow::{Context, Result, anyhow, bail};
use chrono::{Datelike, NaiveDate, Utc};
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http_cache::{self, fetch_json_cached};
use crate::http_client::http_client;
use crate::normalizers::{
    ApiEvent, ApiFixture, ApiLineup, ApiTeamStats, normalize_fixture, normalize_match_details,
    sort_by_kickoff,
};
use crate::state::{MatchDetail, MatchSummary};

pub const API_BASE: &str = "https://v3.football.api-sports.io";
const API_KEY_HEADER: &str = "x-apisports-key";
const UPCOMING_STATUSES: &str = "NS-1H-HT-2H-ET-P-BT-SUSP-INT-LIVE";
const DEFAULT_LEAGUE: u64 = 39;
const DEFAULT_LIMIT: usize = 25;
const MAX_LIMIT: usize = 100;

pub fn api_key() -> Result<String> {
    api_key_from(|name| std::env::var(name).ok())
}

fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    ["API_FOOTBALL_KEY", "APISPORTS_KEY"]
        .into_iter()
        .filter_map(|name| lookup(name))
        .map(|val| val.trim().to_string())
        .find(|val| !val.is_empty())
        .ok_or_else(|| anyhow!("API_FOOTBALL_KEY is not configured"))
}

/// Seasons start in July; earlier months belong to the season that began last year.
pub fn current_season(today: NaiveDate) -> i32 {
    if today.month() >= 7 {
        today.year()
    } else {
        today.year() - 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureQuery {
    pub league: Option<u64>,
    pub team: Option<u64>,
    pub season: Option<i32>,
    pub limit: usize,
    pub upcoming: bool,
}

impl FixtureQuery {
    pub fn from_env(upcoming: bool) -> Self {
        Self::from_vars(upcoming, |name| std::env::var(name).ok())
    }

    pub fn from_vars(upcoming: bool, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |name: &str| lookup(name).and_then(|val| val.trim().parse::<u64>().ok());
        let team = parsed("PITCHSIDE_TEAM");
        let league = match team {
            Some(_) => parsed("PITCHSIDE_LEAGUE"),
            None => parsed("PITCHSIDE_LEAGUE").or(Some(DEFAULT_LEAGUE)),
        };
        Self {
            league,
            team,
            season: lookup("PITCHSIDE_SEASON").and_then(|val| val.trim().parse::<i32>().ok()),
            limit: parsed("PITCHSIDE_LIMIT")
                .map(|val| val as usize)
                .unwrap_or(DEFAULT_LIMIT)
                .clamp(1, MAX_LIMIT),
            upcoming,
        }
    }

    pub fn params(&self, season: i32) -> Result<Vec<(&'static str, String)>> {
        if self.league.is_none() && self.team.is_none() {
            bail!("Missing league or team parameter");
        }
        let limit = self.limit.clamp(1, MAX_LIMIT);
        let mut params = vec![("season", season.to_string())];
        if let Some(league) = self.league {
            params.push(("league", league.to_string()));
        }
        if let Some(team) = self.team {
            params.push(("team", team.to_string()));
        }
        match (self.team.is_some(), self.upcoming) {
            (true, false) => params.push(("last", limit.to_string())),
            (true, true) => params.push(("next", limit.to_string())),
            (false, false) => params.push(("status", "FT".to_string())),
            (false, true) => params.push(("status", UPCOMING_STATUSES.to_string())),
        }
        Ok(params)
    }

    pub fn describe(&self) -> String {
        let scope = match (self.team, self.league) {
            (Some(team), _) => format!("team {team}"),
            (None, Some(league)) => format!("league {league}"),
            (None, None) => "nothing".to_string(),
        };
        let view = if self.upcoming { "upcoming" } else { "recent" };
        format!("{view} fixtures for {scope}")
    }
}

/// Joins envelope errors with `", "`; `None` when there are none.
pub fn envelope_errors(root: &Value) -> Option<String> {
    let messages: Vec<String> = match root.get("errors")? {
        Value::Array(items) => items.iter().map(value_text).collect(),
        Value::Object(map) => map.values().map(value_text).collect(),
        Value::String(msg) if !msg.trim().is_empty() => vec![msg.clone()],
        _ => Vec::new(),
    };
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(", "))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decodes the `response` array of an API-Football envelope.
pub fn parse_envelope<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid api-football json")?;
    if let Some(errors) = envelope_errors(&root) {
        bail!("{errors}");
    }
    match root.get("response") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(response) => {
            Vec::<T>::deserialize(response).context("unexpected api-football response shape")
        }
    }
}

pub fn endpoint_url(endpoint: &str, params: &[(&str, String)]) -> Result<Url> {
    Url::parse_with_params(&format!("{API_BASE}{endpoint}"), params)
        .with_context(|| format!("invalid url for {endpoint}"))
}

fn get<T: DeserializeOwned>(endpoint: &str, params: &[(&str, String)]) -> Result<Vec<T>> {
    let key = api_key()?;
    let client = http_client()?;
    let url = endpoint_url(endpoint, params)?;
    let body = fetch_json_cached(client, url.as_str(), &[(API_KEY_HEADER, key.as_str())])
        .with_context(|| format!("GET {endpoint}"))?;
    parse_envelope(&body).inspect_err(|_| http_cache::forget(url.as_str()))
}

pub fn fetch_fixtures(query: &FixtureQuery) -> Result<Vec<MatchSummary>> {
    let season = query
        .season
        .unwrap_or_else(|| current_season(Utc::now().date_naive()));
    let mut fixtures: Vec<ApiFixture> = get("/fixtures", &query.params(season)?)?;

    // A team's new season is often empty until the first fixtures are published.
    if fixtures.is_empty() && query.season.is_none() && query.team.is_some() {
        fixtures = get("/fixtures", &query.params(season - 1)?)?;
    }

    let mut matches: Vec<MatchSummary> = fixtures.iter().map(normalize_fixture).collect();
    sort_by_kickoff(&mut matches, query.upcoming);
    matches.truncate(query.limit.clamp(1, MAX_LIMIT));
    Ok(matches)
}

pub fn fetch_fixture(fixture_id: u64) -> Result<ApiFixture> {
    let fixtures: Vec<ApiFixture> = get("/fixtures", &[("id", fixture_id.to_string())])?;
    fixtures
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("fixture {fixture_id} not found"))
}

#[derive(Debug, Clone)]
pub struct DetailFetch {
    pub detail: MatchDetail,
    pub warnings: Vec<String>,
}

/// Fetches header, lineups, events and statistics concurrently.
///
/// Only the fixture header is required; the other sections degrade to empty with a warning.
pub fn fetch_match_details(fixture_id: u64) -> Result<DetailFetch> {
    let params = [("fixture", fixture_id.to_string())];
    let ((fixture, lineups), (events, stats)) = rayon::join(
        || {
            rayon::join(
                || fetch_fixture(fixture_id),
                || get::<ApiLineup>("/fixtures/lineups", &params),
            )
        },
        || {
            rayon::join(
                || get::<ApiEvent>("/fixtures/events", &params),
                || get::<ApiTeamStats>("/fixtures/statistics", &params),
            )
        },
    );

    let fixture = fixture.with_context(|| format!("fixture {fixture_id}"))?;
    let mut warnings = Vec::new();
    let lineups = lineups
        .map_err(|err| warnings.push(format!("lineups {fixture_id}: {err:#}")))
        .ok();
    let events = events
        .map_err(|err| warnings.push(format!("events {fixture_id}: {err:#}")))
        .unwrap_or_default();
    let stats = stats
        .map_err(|err| warnings.push(format!("statistics {fixture_id}: {err:#}")))
        .ok();

    let detail = normalize_match_details(&fixture, lineups.as_deref(), &events, stats.as_deref());
    Ok(DetailFetch { detail, warnings })
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamSearchHit {
    pub team: TeamSearchTeam,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamSearchTeam {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

pub fn search_teams(query: &str) -> Result<Vec<TeamSearchHit>> {
    let query = query.trim();
    // The upstream rejects shorter searches.
    if query.chars().count() < 3 {
        bail!("team search needs at least 3 characters");
    }
    get("/teams", &[("search", query.to_string())])
}
