use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// Pitch coordinates are 0..=100 on both axes: x runs left to right, y runs from the
// opponent goal (0) back to our own goal (100).
const GK_X: f32 = 50.0;
const GK_Y: f32 = 92.0;
const DEFENCE_Y: f32 = 76.0;
const ATTACK_Y: f32 = 26.0;
const WIDE_PADDING: f32 = 15.0;

// Bounds allocation for garbage such as "999999999-1"; any realistic line fits well below it.
pub const MAX_LINE_PLAYERS: usize = 1_000;
const MIN_GENERATED_SLOTS: usize = 10;
const EXTRA_ROW_WIDTH: usize = 3;
const EXTRA_ROW_TOP_Y: f32 = 18.0;
const EXTRA_ROW_STEP: f32 = 6.0;

const LINE_PREFIXES: [&str; 5] = ["DEF", "MID", "MID2", "AM", "FWD"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationSlot {
    pub slot: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub row: Option<u8>,
}

impl FormationSlot {
    fn new(slot: impl Into<String>, x: f32, y: f32, row: u8) -> Self {
        Self {
            slot: slot.into(),
            x,
            y,
            row: Some(row),
        }
    }

    pub fn is_goalkeeper(&self) -> bool {
        self.slot == "GK"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    Preset,
    Generated,
    Default,
    Fallback,
}

type SlotSpec = (&'static str, f32, f32, u8);

static PRESETS: Lazy<HashMap<&'static str, &'static [SlotSpec]>> = Lazy::new(|| {
    let presets: &[(&str, &[SlotSpec])] = &[
        (
            "4-3-3",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LB", 15.0, 76.0, 1),
                ("LCB", 38.0, 78.0, 1),
                ("RCB", 62.0, 78.0, 1),
                ("RB", 85.0, 76.0, 1),
                ("LCM", 30.0, 54.0, 2),
                ("CDM", 50.0, 56.0, 2),
                ("RCM", 70.0, 54.0, 2),
                ("LW", 20.0, 30.0, 3),
                ("ST", 50.0, 26.0, 3),
                ("RW", 80.0, 30.0, 3),
            ],
        ),
        (
            "4-4-2",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LB", 15.0, 76.0, 1),
                ("LCB", 38.0, 78.0, 1),
                ("RCB", 62.0, 78.0, 1),
                ("RB", 85.0, 76.0, 1),
                ("LM", 18.0, 52.0, 2),
                ("LCM", 40.0, 54.0, 2),
                ("RCM", 60.0, 54.0, 2),
                ("RM", 82.0, 52.0, 2),
                ("LST", 40.0, 28.0, 3),
                ("RST", 60.0, 28.0, 3),
            ],
        ),
        (
            "4-2-3-1",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LB", 15.0, 76.0, 1),
                ("LCB", 38.0, 78.0, 1),
                ("RCB", 62.0, 78.0, 1),
                ("RB", 85.0, 76.0, 1),
                ("LDM", 38.0, 62.0, 2),
                ("RDM", 62.0, 62.0, 2),
                ("LAM", 22.0, 42.0, 3),
                ("CAM", 50.0, 40.0, 3),
                ("RAM", 78.0, 42.0, 3),
                ("ST", 50.0, 24.0, 4),
            ],
        ),
        (
            "3-5-2",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LCB", 30.0, 78.0, 1),
                ("CB", 50.0, 80.0, 1),
                ("RCB", 70.0, 78.0, 1),
                ("LWB", 12.0, 56.0, 2),
                ("LCM", 35.0, 54.0, 2),
                ("CDM", 50.0, 58.0, 2),
                ("RCM", 65.0, 54.0, 2),
                ("RWB", 88.0, 56.0, 2),
                ("LST", 40.0, 28.0, 3),
                ("RST", 60.0, 28.0, 3),
            ],
        ),
        (
            "3-4-3",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LCB", 30.0, 78.0, 1),
                ("CB", 50.0, 80.0, 1),
                ("RCB", 70.0, 78.0, 1),
                ("LWB", 15.0, 55.0, 2),
                ("LCM", 40.0, 54.0, 2),
                ("RCM", 60.0, 54.0, 2),
                ("RWB", 85.0, 55.0, 2),
                ("LW", 25.0, 30.0, 3),
                ("ST", 50.0, 25.0, 3),
                ("RW", 75.0, 30.0, 3),
            ],
        ),
        (
            "5-3-2",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LWB", 10.0, 72.0, 1),
                ("LCB", 30.0, 78.0, 1),
                ("CB", 50.0, 80.0, 1),
                ("RCB", 70.0, 78.0, 1),
                ("RWB", 90.0, 72.0, 1),
                ("LCM", 30.0, 52.0, 2),
                ("CDM", 50.0, 55.0, 2),
                ("RCM", 70.0, 52.0, 2),
                ("LST", 40.0, 28.0, 3),
                ("RST", 60.0, 28.0, 3),
            ],
        ),
        (
            "4-1-4-1",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LB", 15.0, 76.0, 1),
                ("LCB", 38.0, 78.0, 1),
                ("RCB", 62.0, 78.0, 1),
                ("RB", 85.0, 76.0, 1),
                ("CDM", 50.0, 62.0, 2),
                ("LM", 18.0, 45.0, 3),
                ("LCM", 40.0, 48.0, 3),
                ("RCM", 60.0, 48.0, 3),
                ("RM", 82.0, 45.0, 3),
                ("ST", 50.0, 25.0, 4),
            ],
        ),
        (
            "4-3-1-2",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LB", 15.0, 76.0, 1),
                ("LCB", 38.0, 78.0, 1),
                ("RCB", 62.0, 78.0, 1),
                ("RB", 85.0, 76.0, 1),
                ("LCM", 30.0, 58.0, 2),
                ("CDM", 50.0, 60.0, 2),
                ("RCM", 70.0, 58.0, 2),
                ("CAM", 50.0, 42.0, 3),
                ("LST", 40.0, 26.0, 4),
                ("RST", 60.0, 26.0, 4),
            ],
        ),
        (
            "5-4-1",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LWB", 10.0, 72.0, 1),
                ("LCB", 30.0, 78.0, 1),
                ("CB", 50.0, 80.0, 1),
                ("RCB", 70.0, 78.0, 1),
                ("RWB", 90.0, 72.0, 1),
                ("LM", 18.0, 50.0, 2),
                ("LCM", 40.0, 52.0, 2),
                ("RCM", 60.0, 52.0, 2),
                ("RM", 82.0, 50.0, 2),
                ("ST", 50.0, 26.0, 3),
            ],
        ),
        (
            "4-4-1-1",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LB", 15.0, 76.0, 1),
                ("LCB", 38.0, 78.0, 1),
                ("RCB", 62.0, 78.0, 1),
                ("RB", 85.0, 76.0, 1),
                ("LM", 18.0, 55.0, 2),
                ("LCM", 40.0, 57.0, 2),
                ("RCM", 60.0, 57.0, 2),
                ("RM", 82.0, 55.0, 2),
                ("CAM", 50.0, 38.0, 3),
                ("ST", 50.0, 24.0, 4),
            ],
        ),
        (
            "4-5-1",
            &[
                ("GK", 50.0, 92.0, 0),
                ("LB", 15.0, 76.0, 1),
                ("LCB", 38.0, 78.0, 1),
                ("RCB", 62.0, 78.0, 1),
                ("RB", 85.0, 76.0, 1),
                ("LM", 15.0, 52.0, 2),
                ("LCM", 35.0, 54.0, 2),
                ("CDM", 50.0, 56.0, 2),
                ("RCM", 65.0, 54.0, 2),
                ("RM", 85.0, 52.0, 2),
                ("ST", 50.0, 26.0, 3),
            ],
        ),
    ];
    presets.iter().copied().collect()
});

/// Canonical names of every predefined template, sorted.
pub fn preset_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = PRESETS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Trims and removes all internal whitespace, e.g. `" 4 - 3 - 3 "` -> `"4-3-3"`.
pub fn normalize_formation(formation: &str) -> String {
    formation.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn preset(formation: &str) -> Option<Vec<FormationSlot>> {
    let specs = PRESETS.get(normalize_formation(formation).as_str())?;
    Some(
        specs
            .iter()
            .map(|&(slot, x, y, row)| FormationSlot::new(slot, x, y, row))
            .collect(),
    )
}

/// Template for a formation string. Never fails: unknown or malformed strings get the
/// default 1-4-3-3 grid.
pub fn template_for(formation: Option<&str>) -> Vec<FormationSlot> {
    resolve_template(formation).0
}

pub fn resolve_template(formation: Option<&str>) -> (Vec<FormationSlot>, TemplateSource) {
    let normalized = formation.map(normalize_formation).unwrap_or_default();
    if !normalized.is_empty() {
        if let Some(slots) = preset(&normalized) {
            return (slots, TemplateSource::Preset);
        }
        let generated = generate_from_lines(&normalized);
        // Off-by-one line strings ("4-4-1") still produce a usable shape.
        if generated.len() >= MIN_GENERATED_SLOTS {
            return (generated, TemplateSource::Generated);
        }
    }
    (fallback_grid(11), TemplateSource::Default)
}

/// Builds a template from a dash-separated line count string such as `"4-2-2-2"`.
///
/// Returns an empty list when any segment is not a positive integer, a line exceeds
/// [`MAX_LINE_PLAYERS`], or fewer than two lines are given.
pub fn generate_from_lines(formation: &str) -> Vec<FormationSlot> {
    let Some(lines) = parse_lines(formation) else {
        return Vec::new();
    };

    let mut slots = Vec::with_capacity(1 + lines.iter().sum::<usize>());
    slots.push(FormationSlot::new("GK", GK_X, GK_Y, 0));

    let step = (DEFENCE_Y - ATTACK_Y) / (lines.len() - 1) as f32;
    for (idx, &count) in lines.iter().enumerate() {
        let y = DEFENCE_Y - idx as f32 * step;
        let prefix = match LINE_PREFIXES.get(idx) {
            Some(prefix) => (*prefix).to_string(),
            None => format!("ROW{idx}"),
        };
        let row = u8::try_from(idx + 1).unwrap_or(u8::MAX);
        slots.extend(spread_across(count, y, row, |n| format!("{prefix}{n}")));
    }
    slots
}

fn parse_lines(formation: &str) -> Option<Vec<usize>> {
    let mut lines = Vec::new();
    for part in formation.split('-') {
        let count = part.parse::<usize>().ok()?;
        if count == 0 || count > MAX_LINE_PLAYERS {
            return None;
        }
        lines.push(count);
    }
    if lines.len() < 2 { None } else { Some(lines) }
}

/// A 1-4-3-3 skeleton holding exactly `count` slots.
///
/// Smaller counts truncate the skeleton row by row; larger counts stack extra rows of up
/// to three players above the forward line.
pub fn fallback_grid(count: usize) -> Vec<FormationSlot> {
    const SKELETON: [(usize, f32, &str); 4] =
        [(1, GK_Y, "GK"), (4, 76.0, "DEF"), (3, 52.0, "MID"), (3, 28.0, "FWD")];

    let mut slots = Vec::with_capacity(count);
    let mut remaining = count;

    for (row, &(width, y, prefix)) in SKELETON.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        let take = width.min(remaining);
        if prefix == "GK" {
            slots.push(FormationSlot::new("GK", GK_X, y, 0));
        } else {
            slots.extend(spread_across(take, y, row as u8, |n| format!("{prefix}{n}")));
        }
        remaining -= take;
    }

    let extra_rows = remaining.div_ceil(EXTRA_ROW_WIDTH);
    let step = if extra_rows > 1 {
        EXTRA_ROW_STEP.min(EXTRA_ROW_TOP_Y / (extra_rows - 1) as f32)
    } else {
        EXTRA_ROW_STEP
    };
    let mut extra = 1usize;
    while remaining > 0 {
        let take = EXTRA_ROW_WIDTH.min(remaining);
        let y = (EXTRA_ROW_TOP_Y - (extra - 1) as f32 * step).max(0.0);
        let row = u8::try_from(SKELETON.len() + extra - 1).unwrap_or(u8::MAX);
        slots.extend(spread_across(take, y, row, |n| format!("EX{extra}-{n}")));
        remaining -= take;
        extra += 1;
    }

    slots.truncate(count);
    slots
}

/// Placeholder markers for a team without a lineup.
pub fn placeholder_slots() -> Vec<FormationSlot> {
    fallback_grid(11)
}

// Evenly spaced across the pitch width; a single player sits on the centre line.
fn spread_across(
    count: usize,
    y: f32,
    row: u8,
    label: impl Fn(usize) -> String,
) -> Vec<FormationSlot> {
    if count == 0 {
        return Vec::new();
    }
    let step = if count > 1 {
        (100.0 - WIDE_PADDING * 2.0) / (count - 1) as f32
    } else {
        0.0
    };
    (0..count)
        .map(|idx| {
            let x = if count == 1 {
                50.0
            } else {
                WIDE_PADDING + idx as f32 * step
            };
            FormationSlot::new(label(idx + 1), x, y, row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(slots: &[FormationSlot]) -> Vec<&str> {
        slots.iter().map(|s| s.slot.as_str()).collect()
    }

    #[test]
    fn every_preset_has_eleven_slots_and_one_keeper() {
        for name in preset_names() {
            let slots = template_for(Some(name));
            assert_eq!(slots.len(), 11, "{name}");
            assert_eq!(slots.iter().filter(|s| s.is_goalkeeper()).count(), 1, "{name}");
            assert!(
                slots
                    .iter()
                    .all(|s| (0.0..=100.0).contains(&s.x) && (0.0..=100.0).contains(&s.y)),
                "{name}"
            );
        }
    }

    #[test]
    fn preset_lookup_ignores_whitespace() {
        let (slots, source) = resolve_template(Some(" 4 - 2 - 3 - 1 "));
        assert_eq!(source, TemplateSource::Preset);
        assert_eq!(slots[10].slot, "ST");
        assert_eq!(slots[10].y, 24.0);
    }

    #[test]
    fn returned_templates_are_copies() {
        let mut first = template_for(Some("4-4-2"));
        first[0].x = 0.0;
        first.clear();
        let second = template_for(Some("4-4-2"));
        assert_eq!(second.len(), 11);
        assert_eq!(second[0].x, 50.0);
    }

    #[test]
    fn generated_template_spreads_lines_from_defence_to_attack() {
        let (slots, source) = resolve_template(Some("4-2-2-2"));
        assert_eq!(source, TemplateSource::Generated);
        assert_eq!(
            labels(&slots),
            vec!["GK", "DEF1", "DEF2", "DEF3", "DEF4", "MID1", "MID2", "MID21", "MID22", "AM1", "AM2"]
        );
        assert_eq!(slots[1].y, 76.0);
        assert_eq!(slots[1].x, 15.0);
        assert!((slots[4].x - 85.0).abs() < 1e-3);
        assert!((slots[9].y - 26.0).abs() < 1e-3);
        assert_eq!(slots[9].row, Some(4));
    }

    #[test]
    fn generated_single_player_line_is_centred() {
        let slots = generate_from_lines("3-4-2-1");
        let last = slots.last().expect("slots");
        assert_eq!(last.slot, "AM1");
        assert_eq!(last.x, 50.0);
    }

    #[test]
    fn lines_beyond_named_prefixes_use_row_labels() {
        let slots = generate_from_lines("2-2-2-2-1-1");
        assert_eq!(slots.last().map(|s| s.slot.as_str()), Some("ROW51"));
        assert_eq!(slots.len(), 11);
    }

    #[test]
    fn generation_rejects_garbage() {
        assert!(generate_from_lines("4-x-3").is_empty());
        assert!(generate_from_lines("433").is_empty());
        assert!(generate_from_lines("4--3").is_empty());
        assert!(generate_from_lines("4-0-3").is_empty());
        assert!(generate_from_lines("4-1001-3").is_empty());
        assert!(generate_from_lines("999999999-1").is_empty());
    }

    #[test]
    fn short_generated_templates_fall_back_to_default_grid() {
        // 1 + 3 + 3 + 2 = 9 slots, below the floor.
        let (slots, source) = resolve_template(Some("3-3-2"));
        assert_eq!(source, TemplateSource::Default);
        assert_eq!(slots, fallback_grid(11));
    }

    #[test]
    fn ten_slot_generation_is_accepted() {
        let (slots, source) = resolve_template(Some("4-4-1"));
        assert_eq!(source, TemplateSource::Generated);
        assert_eq!(slots.len(), 10);
    }

    #[test]
    fn oversized_numeric_formation_is_generated() {
        let (slots, source) = resolve_template(Some("99-99"));
        assert_eq!(source, TemplateSource::Generated);
        assert_eq!(slots.len(), 199);

        let (slots, source) = resolve_template(Some("100-100"));
        assert_eq!(source, TemplateSource::Generated);
        assert_eq!(slots.len(), 201);
    }

    #[test]
    fn unknown_formations_use_default_grid() {
        for formation in [None, Some(""), Some("   "), Some("abc"), Some("4-x-3")] {
            let (slots, source) = resolve_template(formation);
            assert_eq!(source, TemplateSource::Default);
            assert_eq!(slots.len(), 11);
        }
    }

    #[test]
    fn fallback_grid_has_requested_size() {
        for count in 0..=40 {
            assert_eq!(fallback_grid(count).len(), count);
        }
        assert!(fallback_grid(0).is_empty());
    }

    #[test]
    fn fallback_grid_skeleton_labels() {
        let slots = fallback_grid(11);
        assert_eq!(
            labels(&slots),
            vec!["GK", "DEF1", "DEF2", "DEF3", "DEF4", "MID1", "MID2", "MID3", "FWD1", "FWD2", "FWD3"]
        );
        assert_eq!(slots[0].y, 92.0);
        assert_eq!(slots[5].y, 52.0);
        assert_eq!(slots[8].y, 28.0);
    }

    #[test]
    fn fallback_grid_truncates_rows_and_respreads() {
        let slots = fallback_grid(3);
        assert_eq!(labels(&slots), vec!["GK", "DEF1", "DEF2"]);
        assert_eq!(slots[1].x, 15.0);
        assert_eq!(slots[2].x, 85.0);
    }

    #[test]
    fn fallback_grid_adds_extra_rows_above_forwards() {
        let slots = fallback_grid(15);
        assert_eq!(
            labels(&slots[11..]),
            vec!["EX1-1", "EX1-2", "EX1-3", "EX2-1"]
        );
        assert_eq!(slots[11].y, 18.0);
        assert_eq!(slots[14].y, 12.0);
        assert_eq!(slots[14].x, 50.0);
    }

    #[test]
    fn fallback_grid_keeps_extra_rows_on_the_pitch() {
        let slots = fallback_grid(40);
        assert!(slots.iter().all(|s| s.y >= 0.0 && s.y <= 100.0));
        let mut ys: Vec<f32> = slots[11..].iter().map(|s| s.y).collect();
        ys.dedup();
        assert!(ys.windows(2).all(|w| w[0] > w[1]));
    }
}
