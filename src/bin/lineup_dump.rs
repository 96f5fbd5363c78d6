use anyhow::{Context, Result, bail};

use pitchside::api_football;
use pitchside::pitch_layout::{PitchMarkers, layout_lineup};
use pitchside::pitch_view::render_pitch_rows;
use pitchside::state::{MatchDetail, PLACEHOLDER_FIXTURE_ID, placeholder_match_detail};

const WIDTH: usize = 48;
const HEIGHT: usize = 20;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let fixture_id = parse_fixture_arg()?;
    let detail = if fixture_id == PLACEHOLDER_FIXTURE_ID {
        placeholder_match_detail()
    } else {
        let fetch = api_football::fetch_match_details(fixture_id)
            .with_context(|| format!("fetch match details for {fixture_id}"))?;
        for warning in &fetch.warnings {
            eprintln!("warning: {warning}");
        }
        fetch.detail
    };

    print_detail(&detail);
    Ok(())
}

fn parse_fixture_arg() -> Result<u64> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix("--fixture=") {
            return raw.trim().parse().context("invalid --fixture value");
        }
        if arg == "--fixture" {
            let Some(next) = args.get(idx + 1) else {
                bail!("--fixture needs a value");
            };
            return next.trim().parse().context("invalid --fixture value");
        }
        if arg == "--demo" {
            return Ok(PLACEHOLDER_FIXTURE_ID);
        }
    }
    bail!("usage: lineup_dump --fixture <id> | --demo")
}

fn print_detail(detail: &MatchDetail) {
    let summary = &detail.summary;
    println!(
        "{} {} {} ({})",
        summary.home.name,
        summary.score_text(),
        summary.away.name,
        summary.status
    );

    let Some(lineups) = &detail.lineups else {
        println!("No lineups published yet.");
        return;
    };

    for lineup in [lineups.home.as_ref(), lineups.away.as_ref()] {
        let layout = layout_lineup(lineup);
        let team = lineup.map(|l| l.team.name.as_str()).unwrap_or("-");
        println!();
        println!(
            "{team} {} [{:?}]",
            layout.formation.as_deref().unwrap_or("(no formation)"),
            layout.source
        );
        for row in render_pitch_rows(&layout.markers, WIDTH, HEIGHT) {
            println!("|{row}|");
        }
        if let PitchMarkers::Players(players) = &layout.markers {
            for p in players {
                println!(
                    "  {:<6} {:>5.1},{:>5.1}  {:<24} {}",
                    p.slot_label,
                    p.x,
                    p.y,
                    p.player.name,
                    p.player.position.as_deref().unwrap_or("-")
                );
            }
        }
    }
}
