use anyhow::{Context, Result};

use pitchside::api_football;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        eprintln!("usage: team_search <name>");
        std::process::exit(2);
    }

    let hits = api_football::search_teams(&query)
        .with_context(|| format!("search teams for {query:?}"))?;
    if hits.is_empty() {
        println!("No teams match {query:?}");
        return Ok(());
    }

    println!("{:>8}  {:<32} {:<6} Country", "Id", "Team", "Code");
    for hit in hits {
        let team = hit.team;
        println!(
            "{:>8}  {:<32} {:<6} {}",
            team.id,
            team.name,
            team.code.unwrap_or_default(),
            team.country.unwrap_or_default()
        );
    }
    println!();
    println!("Set PITCHSIDE_TEAM=<id> to follow a team.");
    Ok(())
}
