use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::api_football::{self, FixtureQuery};
use crate::state::{
    Delta, FixtureView, PLACEHOLDER_FIXTURE_ID, ProviderCommand, placeholder_match_detail,
    placeholder_match_summary,
};

const TICK: Duration = Duration::from_millis(900);

pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        if let Err(err) = api_football::api_key() {
            let _ = tx.send(Delta::Log(format!("[INFO] {err}; showing demo fixture")));
            run_demo(&tx, &cmd_rx);
            return;
        }
        run_live(&tx, &cmd_rx);
    });
}

fn run_demo(tx: &Sender<Delta>, cmd_rx: &Receiver<ProviderCommand>) {
    let _ = tx.send(Delta::SetSource("demo".to_string()));
    send_demo_fixtures(tx, FixtureView::Recent);

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            ProviderCommand::FetchFixtures { view } => send_demo_fixtures(tx, view),
            ProviderCommand::FetchMatchDetails { fixture_id } => {
                if fixture_id == PLACEHOLDER_FIXTURE_ID {
                    let _ = tx.send(Delta::SetMatchDetails {
                        id: fixture_id,
                        detail: placeholder_match_detail(),
                    });
                } else {
                    let _ = tx.send(Delta::Log(format!(
                        "[WARN] Demo mode has no details for fixture {fixture_id}"
                    )));
                }
            }
        }
    }
}

fn send_demo_fixtures(tx: &Sender<Delta>, view: FixtureView) {
    let matches = match view {
        FixtureView::Recent => vec![placeholder_match_summary()],
        FixtureView::Upcoming => Vec::new(),
    };
    let _ = tx.send(Delta::SetFixtures { view, matches });
}

fn run_live(tx: &Sender<Delta>, cmd_rx: &Receiver<ProviderCommand>) {
    let pool = build_fetch_pool();
    let inflight_max = env_u64("DETAILS_INFLIGHT_MAX", 8, 1, 64) as usize;
    let inflight_details: Arc<Mutex<HashSet<u64>>> = Arc::new(Mutex::new(HashSet::new()));
    let fixtures_interval = Duration::from_secs(env_u64("FIXTURES_POLL_SECS", 120, 30, 86_400));

    let _ = tx.send(Delta::SetSource(source_label(&FixtureQuery::from_env(false))));

    // Views the UI has asked for; each one is re-polled on the fixtures interval.
    let mut polled: HashMap<FixtureView, Instant> = HashMap::new();
    refresh_fixtures(tx, FixtureView::Recent);
    polled.insert(FixtureView::Recent, Instant::now());

    loop {
        match cmd_rx.recv_timeout(TICK) {
            Ok(ProviderCommand::FetchFixtures { view }) => {
                refresh_fixtures(tx, view);
                polled.insert(view, Instant::now());
            }
            Ok(ProviderCommand::FetchMatchDetails { fixture_id }) => {
                {
                    let mut inflight = inflight_details
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    if inflight.contains(&fixture_id) || inflight.len() >= inflight_max {
                        continue;
                    }
                    inflight.insert(fixture_id);
                }

                let tx = tx.clone();
                let inflight_details = inflight_details.clone();
                let job = move || {
                    fetch_details(&tx, fixture_id);
                    inflight_details
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .remove(&fixture_id);
                };
                match pool.as_ref() {
                    Some(pool) => pool.spawn(job),
                    None => {
                        thread::spawn(job);
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }

        let due: Vec<FixtureView> = polled
            .iter()
            .filter(|(_, last)| last.elapsed() >= fixtures_interval)
            .map(|(view, _)| *view)
            .collect();
        for view in due {
            refresh_fixtures(tx, view);
            polled.insert(view, Instant::now());
        }
    }
}

fn refresh_fixtures(tx: &Sender<Delta>, view: FixtureView) {
    let query = FixtureQuery::from_env(view == FixtureView::Upcoming);
    match api_football::fetch_fixtures(&query) {
        Ok(matches) => {
            if matches.is_empty() {
                let _ = tx.send(Delta::Log(format!("[INFO] No {}", query.describe())));
            }
            let _ = tx.send(Delta::SetFixtures { view, matches });
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] Fixtures fetch error: {err:#}")));
        }
    }
}

fn fetch_details(tx: &Sender<Delta>, fixture_id: u64) {
    match api_football::fetch_match_details(fixture_id) {
        Ok(fetch) => {
            for warning in fetch.warnings {
                let _ = tx.send(Delta::Log(format!("[WARN] Match details: {warning}")));
            }
            let _ = tx.send(Delta::SetMatchDetails {
                id: fixture_id,
                detail: fetch.detail,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] Match details error: {err:#}")));
        }
    }
}

fn source_label(query: &FixtureQuery) -> String {
    let season = query
        .season
        .map(|s| s.to_string())
        .unwrap_or_else(|| "current".to_string());
    match (query.team, query.league) {
        (Some(team), _) => format!("api-football team {team} ({season})"),
        (None, Some(league)) => format!("api-football league {league} ({season})"),
        (None, None) => "api-football".to_string(),
    }
}

fn env_u64(key: &str, default: u64, min: u64, max: u64) -> u64 {
    parse_bounded(env::var(key).ok().as_deref(), default, min, max)
}

fn parse_bounded(raw: Option<&str>, default: u64, min: u64, max: u64) -> u64 {
    raw.and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}

fn build_fetch_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(env_u64("FETCH_PARALLELISM", 4, 2, 32) as usize)
        .thread_name(|idx| format!("pitchside-fetch-{idx}"))
        .build()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn bounded_env_values() {
        assert_eq!(parse_bounded(None, 120, 30, 600), 120);
        assert_eq!(parse_bounded(Some("5"), 120, 30, 600), 30);
        assert_eq!(parse_bounded(Some(" 90 "), 120, 30, 600), 90);
        assert_eq!(parse_bounded(Some("soon"), 120, 30, 600), 120);
    }

    #[test]
    fn source_label_names_the_scope() {
        let query = FixtureQuery {
            league: Some(39),
            team: None,
            season: Some(2024),
            limit: 25,
            upcoming: false,
        };
        assert_eq!(source_label(&query), "api-football league 39 (2024)");
    }

    #[test]
    fn demo_provider_serves_placeholder_fixture() {
        let (tx, rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        cmd_tx
            .send(ProviderCommand::FetchMatchDetails {
                fixture_id: PLACEHOLDER_FIXTURE_ID,
            })
            .expect("send");
        cmd_tx
            .send(ProviderCommand::FetchMatchDetails { fixture_id: 77 })
            .expect("send");
        drop(cmd_tx);

        run_demo(&tx, &cmd_rx);
        let deltas: Vec<Delta> = rx.try_iter().collect();

        assert!(matches!(&deltas[0], Delta::SetSource(label) if label == "demo"));
        assert!(matches!(
            &deltas[1],
            Delta::SetFixtures { view: FixtureView::Recent, matches } if matches.len() == 1
        ));
        assert!(matches!(
            &deltas[2],
            Delta::SetMatchDetails { id, .. } if *id == PLACEHOLDER_FIXTURE_ID
        ));
        assert!(matches!(&deltas[3], Delta::Log(msg) if msg.contains("77")));
    }
}
