use std::collections::HashMap;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use pitchside::feed;
use pitchside::formation::TemplateSource;
use pitchside::normalizers::{StatusClass, format_kickoff_time, format_match_date};
use pitchside::pitch_layout::layout_lineup;
use pitchside::pitch_view::render_pitch_rows;
use pitchside::state::{
    AppState, Delta, EventKind, FixtureView, MatchDetail, MatchEvent, MatchSummary, PitchSide,
    Player, ProviderCommand, Screen, TeamLineup, apply_delta,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    detail_refresh: Duration,
    last_detail_refresh: HashMap<u64, Instant>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let detail_refresh = std::env::var("DETAILS_POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(60)
            .max(30);
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            detail_refresh: Duration::from_secs(detail_refresh),
            last_detail_refresh: HashMap::new(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('b') | KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else {
                    self.state.screen = Screen::Pulse;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.state.screen == Screen::Pulse {
                    self.state.select_next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.state.screen == Screen::Pulse {
                    self.state.select_prev();
                }
            }
            KeyCode::Char('d') | KeyCode::Enter => {
                if self.state.screen != Screen::Pulse {
                    return;
                }
                let Some(fixture_id) = self.state.selected_match_id() else {
                    self.state.push_log("[INFO] No match selected");
                    return;
                };
                self.state.screen = Screen::Match { fixture_id };
                self.state.pitch_side = PitchSide::Home;
                self.request_match_details(fixture_id, true);
            }
            KeyCode::Tab => {
                if matches!(self.state.screen, Screen::Match { .. }) {
                    self.state.toggle_pitch_side();
                }
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                if self.state.screen != Screen::Pulse {
                    return;
                }
                self.state.toggle_fixture_view();
                let view = self.state.fixture_view;
                if !self.state.fixtures.contains_key(&view) {
                    self.request_fixtures(view, true);
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => match self.state.screen {
                Screen::Pulse => self.request_fixtures(self.state.fixture_view, true),
                Screen::Match { fixture_id } => self.request_match_details(fixture_id, true),
            },
            _ => {}
        }
    }

    fn send(&mut self, cmd: ProviderCommand, what: &str, announce: bool) -> bool {
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log(format!("[INFO] {what} fetch unavailable"));
            }
            return false;
        };
        if tx.send(cmd).is_err() {
            if announce {
                self.state.push_log(format!("[WARN] {what} request failed"));
            }
            return false;
        }
        if announce {
            self.state.push_log(format!("[INFO] {what} request sent"));
        }
        true
    }

    fn request_fixtures(&mut self, view: FixtureView, announce: bool) {
        self.send(ProviderCommand::FetchFixtures { view }, "Fixtures", announce);
    }

    fn request_match_details(&mut self, fixture_id: u64, announce: bool) {
        if self.send(
            ProviderCommand::FetchMatchDetails { fixture_id },
            "Match details",
            announce,
        ) {
            self.last_detail_refresh.insert(fixture_id, Instant::now());
        }
    }

    fn maybe_refresh_match_details(&mut self) {
        let Screen::Match { fixture_id } = self.state.screen else {
            return;
        };
        if !self.state.fixture_is_live(fixture_id) {
            return;
        }
        let due = self
            .last_detail_refresh
            .get(&fixture_id)
            .map(|t| t.elapsed() >= self.detail_refresh)
            .unwrap_or(true);
        if due {
            self.request_match_details(fixture_id, false);
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_refresh_match_details();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Pulse => render_pulse(frame, chunks[1], &app.state),
        Screen::Match { .. } => render_match(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let source = if state.source_label.is_empty() {
        "connecting"
    } else {
        state.source_label.as_str()
    };
    match state.screen {
        Screen::Pulse => format!(
            " PITCHSIDE | {} | {source}",
            fixture_view_label(state.fixture_view)
        ),
        Screen::Match { .. } => format!(" PITCHSIDE | MATCH | {source}"),
    }
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Pulse => {
            " Enter/d Open | j/k/↑/↓ Move | u Recent/Upcoming | r Refresh | ? Help | q Quit"
                .to_string()
        }
        Screen::Match { .. } => {
            " b/Esc Back | Tab Home/Away pitch | r Refresh | ? Help | q Quit".to_string()
        }
    }
}

fn fixture_view_label(view: FixtureView) -> &'static str {
    match view {
        FixtureView::Recent => "RECENT",
        FixtureView::Upcoming => "UPCOMING",
    }
}

fn render_pulse(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(4)])
        .split(area);

    let widths = pulse_columns();
    render_pulse_header(frame, sections[0], &widths);

    let list_area = sections[1];
    let matches = state.visible_matches();
    if matches.is_empty() {
        let message = if state.fixtures.contains_key(&state.fixture_view) {
            "No fixtures for this view"
        } else {
            "Loading fixtures..."
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
    } else {
        let today = Utc::now().date_naive();
        let visible = list_area.height as usize;
        let (start, end) = visible_range(state.selected, matches.len(), visible);
        for (i, idx) in (start..end).enumerate() {
            let row_area = Rect {
                x: list_area.x,
                y: list_area.y + i as u16,
                width: list_area.width,
                height: 1,
            };
            let selected = idx == state.selected;
            let row_style = if selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            if selected {
                frame.render_widget(Block::default().style(row_style), row_area);
            }

            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(widths)
                .split(row_area);

            let m = &matches[idx];
            let when = format!(
                "{} {}",
                format_match_date(&m.date, today),
                format_kickoff_time(&m.date)
            );
            let fixture = format!("{} {} {}", m.home.name, m.score_text(), m.away.name);
            let competition = m
                .league
                .as_ref()
                .map(|l| match &l.round {
                    Some(round) => format!("{} - {round}", l.name),
                    None => l.name.clone(),
                })
                .unwrap_or_else(|| "-".to_string());

            frame.render_widget(Paragraph::new(when).style(row_style), cols[0]);
            frame.render_widget(
                Paragraph::new(status_text(m)).style(row_style.patch(status_style(m))),
                cols[1],
            );
            frame.render_widget(Paragraph::new(fixture).style(row_style), cols[2]);
            frame.render_widget(Paragraph::new(competition).style(row_style), cols[3]);
        }
    }

    let console = Paragraph::new(console_text(state, 3))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, sections[2]);
}

fn pulse_columns() -> [Constraint; 4] {
    [
        Constraint::Length(18),
        Constraint::Length(8),
        Constraint::Min(30),
        Constraint::Min(16),
    ]
}

fn render_pulse_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);
    for (col, title) in cols.iter().zip(["When", "Status", "Match", "Competition"]) {
        frame.render_widget(Paragraph::new(title).style(style), *col);
    }
}

fn status_text(m: &MatchSummary) -> String {
    match (m.status_class(), m.elapsed) {
        (StatusClass::Live, Some(minute)) if m.status_short != "HT" => format!("{minute}'"),
        _ if m.status_short.is_empty() => "-".to_string(),
        _ => m.status_short.clone(),
    }
}

fn status_style(m: &MatchSummary) -> Style {
    match m.status_class() {
        StatusClass::Live => Style::default().fg(Color::Green),
        StatusClass::Halted => Style::default().fg(Color::Red),
        StatusClass::Scheduled => Style::default().fg(Color::Cyan),
        StatusClass::Finished | StatusClass::Unknown => Style::default(),
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_match(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(5),
        ])
        .split(area);

    let detail = state.selected_detail();
    let scoreboard = Paragraph::new(scoreboard_text(state.selected_match(), detail))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(scoreboard, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(10),
            Constraint::Length(9),
        ])
        .split(columns[1]);

    let lineup = detail
        .and_then(|d| d.lineups.as_ref())
        .and_then(|l| l.side(state.pitch_side));
    render_pitch(frame, columns[0], state, lineup);

    let events_block = Block::default().title("Events").borders(Borders::ALL);
    let events_height = events_block.inner(right[0]).height as usize;
    let events = Paragraph::new(events_text(detail, events_height)).block(events_block);
    frame.render_widget(events, right[0]);

    let stats_block = Block::default().title("Stats").borders(Borders::ALL);
    let stats_height = stats_block.inner(right[1]).height as usize;
    let stats = Paragraph::new(stats_text(detail, stats_height)).block(stats_block);
    frame.render_widget(stats, right[1]);

    let bench = Paragraph::new(bench_text(lineup))
        .block(Block::default().title("Bench").borders(Borders::ALL));
    frame.render_widget(bench, right[2]);

    let console = Paragraph::new(console_text(state, 3))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn scoreboard_text(summary: Option<&MatchSummary>, detail: Option<&MatchDetail>) -> String {
    let Some(m) = detail.map(|d| &d.summary).or(summary) else {
        return "Loading match...".to_string();
    };
    let mut status = m.status.clone();
    if m.is_live()
        && let Some(minute) = m.elapsed
    {
        status = format!("{status} {minute}'");
    }
    if let (Some(h), Some(a)) = (m.score.ht_home, m.score.ht_away) {
        status = format!("{status} | HT {h}-{a}");
    }

    let mut context = vec![format!(
        "{} {}",
        format_match_date(&m.date, Utc::now().date_naive()),
        format_kickoff_time(&m.date)
    )];
    if let Some(league) = &m.league {
        context.push(league.name.clone());
    }
    if let Some(venue) = &m.venue {
        context.push(venue.clone());
    }
    if let Some(referee) = detail.and_then(|d| d.referee.as_ref()) {
        context.push(format!("Ref: {referee}"));
    }

    format!(
        "{}  {}  {}\n{status}\n{}",
        m.home.name,
        m.score_text(),
        m.away.name,
        context.join(" | ")
    )
}

fn render_pitch(frame: &mut Frame, area: Rect, state: &AppState, lineup: Option<&TeamLineup>) {
    let summary = layout_lineup(lineup);
    let team = match (lineup, state.selected_match()) {
        (Some(l), _) => l.team.name.clone(),
        (None, Some(m)) => match state.pitch_side {
            PitchSide::Home => m.home.name.clone(),
            PitchSide::Away => m.away.name.clone(),
        },
        (None, None) => "-".to_string(),
    };
    let shape = match (&summary.formation, summary.source) {
        (_, TemplateSource::Preset) | (_, TemplateSource::Generated) => {
            summary.formation.clone().unwrap_or_default()
        }
        (Some(formation), TemplateSource::Default) => format!("{formation}?"),
        _ if lineup.is_none() => "no lineup".to_string(),
        _ => "grid".to_string(),
    };
    let side = match state.pitch_side {
        PitchSide::Home => "home",
        PitchSide::Away => "away",
    };

    let block = Block::default()
        .title(format!("Pitch - {team} ({shape}) [{side}]"))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let rows = render_pitch_rows(&summary.markers, inner.width as usize, inner.height as usize);
    let pitch = Paragraph::new(rows.join("\n")).style(Style::default().fg(Color::Green));
    frame.render_widget(pitch, inner);
}

fn events_text(detail: Option<&MatchDetail>, height: usize) -> String {
    let Some(detail) = detail else {
        return "Loading events...".to_string();
    };
    if detail.events.is_empty() {
        return "No events yet".to_string();
    }
    let start = detail.events.len().saturating_sub(height.max(1));
    detail.events[start..]
        .iter()
        .map(event_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn event_line(event: &MatchEvent) -> String {
    let minute = match event.extra_minute {
        Some(extra) => format!("{}+{extra}'", event.minute),
        None => format!("{}'", event.minute),
    };
    let who = event
        .player
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or("-");
    let mut line = format!(
        "{minute:>6} {} {} {who}",
        event_kind_label(event.kind),
        event.team.name
    );
    if let Some(assist) = &event.assist {
        let joiner = if event.kind == EventKind::Subst { "for" } else { "ast." };
        line.push_str(&format!(" ({joiner} {})", assist.name));
    }
    if !event.detail.is_empty() {
        line.push_str(&format!(" - {}", event.detail));
    }
    line
}

fn event_kind_label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Goal => "GOAL",
        EventKind::Card => "CARD",
        EventKind::Subst => "SUB ",
        EventKind::Var => "VAR ",
        EventKind::Other => "    ",
    }
}

fn stats_text(detail: Option<&MatchDetail>, height: usize) -> String {
    let Some(stats) = detail.and_then(|d| d.stats.as_ref()) else {
        return "No statistics".to_string();
    };
    stats
        .iter()
        .take(height.max(1))
        .map(|row| format!("{:>6}  {:^18}  {:<6}", row.home, row.name, row.away))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_text(lineup: Option<&TeamLineup>) -> String {
    let Some(lineup) = lineup else {
        return "No lineup yet".to_string();
    };
    let mut lines = Vec::new();
    if let Some(coach) = &lineup.coach {
        lines.push(format!("Coach: {}", coach.name));
    }
    if lineup.substitutes.is_empty() {
        lines.push("No substitutes listed".to_string());
    }
    lines.extend(lineup.substitutes.iter().map(format_player));
    lines.push("[n] = goalkeeper".to_string());
    lines.join("\n")
}

fn format_player(player: &Player) -> String {
    let num = player
        .number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "--".to_string());
    match player.position.as_deref() {
        Some(pos) => format!("{num:>2} {} {pos}", player.name),
        None => format!("{num:>2} {}", player.name),
    }
}

fn console_text(state: &AppState, lines: usize) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(lines);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Pitchside - Help",
        "",
        "Fixtures:",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Open match",
        "  u            Recent / upcoming",
        "  r            Refresh list",
        "",
        "Match:",
        "  Tab          Home / away pitch",
        "  r            Refresh details",
        "  b / Esc      Back",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
