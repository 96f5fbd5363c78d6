use std::collections::HashMap;

use once_cell::sync::Lazy;

// Candidate slots per position code, most specific first.
static SPECIFIC: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let entries: &[(&str, &[&str])] = &[
        ("GK", &["GK"]),
        ("GOALKEEPER", &["GK"]),
        ("G", &["GK"]),
        ("LB", &["LB", "LWB"]),
        ("LEFTBACK", &["LB", "LWB"]),
        ("LWB", &["LWB", "LB"]),
        ("RB", &["RB", "RWB"]),
        ("RIGHTBACK", &["RB", "RWB"]),
        ("RWB", &["RWB", "RB"]),
        ("CB", &["LCB", "RCB", "CB"]),
        ("CENTERBACK", &["LCB", "RCB", "CB"]),
        ("CENTREBACK", &["LCB", "RCB", "CB"]),
        ("LCB", &["LCB", "CB"]),
        ("RCB", &["RCB", "CB"]),
        ("SW", &["CB", "LCB", "RCB"]),
        ("DM", &["CDM", "LDM", "RDM"]),
        ("CDM", &["CDM", "LDM", "RDM"]),
        ("LDM", &["LDM", "CDM"]),
        ("RDM", &["RDM", "CDM"]),
        ("CM", &["CM", "LCM", "RCM"]),
        ("LCM", &["LCM", "CM"]),
        ("RCM", &["RCM", "CM"]),
        ("AM", &["CAM", "LAM", "RAM"]),
        ("CAM", &["CAM", "LAM", "RAM"]),
        ("LAM", &["LAM", "LW"]),
        ("RAM", &["RAM", "RW"]),
        ("LM", &["LM", "LAM"]),
        ("RM", &["RM", "RAM"]),
        ("LW", &["LW", "LAM"]),
        ("RW", &["RW", "RAM"]),
        ("CF", &["ST", "CF"]),
        ("FW", &["ST", "CF"]),
        ("F", &["ST", "CF"]),
        ("ST", &["ST", "CF"]),
        ("STRIKER", &["ST", "CF"]),
        ("SS", &["SS", "ST", "CF"]),
        ("LS", &["LS", "ST", "CF"]),
        ("RS", &["RS", "ST", "CF"]),
        // API-Football lineups only report G/D/M/F.
        ("D", DEFENDER_SLOTS),
        ("M", MIDFIELDER_SLOTS),
    ];
    entries.iter().copied().collect()
});

static BROAD: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let entries: &[(&str, &[&str])] = &[
        ("DEFENDER", DEFENDER_SLOTS),
        ("MIDFIELDER", MIDFIELDER_SLOTS),
        ("ATTACKER", &["ST", "CF", "SS", "LW", "RW"]),
        ("FORWARD", &["ST", "CF", "LW", "RW"]),
    ];
    entries.iter().copied().collect()
});

const DEFENDER_SLOTS: &[&str] = &["LB", "RB", "LCB", "RCB", "CB"];
const MIDFIELDER_SLOTS: &[&str] = &["CM", "LCM", "RCM", "CDM", "CAM"];

/// Uppercases the label and drops everything that is not an ASCII letter.
pub fn normalize_position(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Ordered template slot ids a player with this position label may fill.
///
/// Unknown or empty labels yield an empty list; those players are placed by backfill.
pub fn slot_candidates(position: Option<&str>) -> &'static [&'static str] {
    let Some(raw) = position else {
        return &[];
    };
    let key = normalize_position(raw);
    if key.is_empty() {
        return &[];
    }
    SPECIFIC
        .get(key.as_str())
        .or_else(|| BROAD.get(key.as_str()))
        .copied()
        .unwrap_or(&[])
}

pub fn is_goalkeeper_label(position: Option<&str>) -> bool {
    position
        .map(normalize_position)
        .is_some_and(|key| matches!(key.as_str(), "G" | "GK" | "GOALKEEPER"))
}
