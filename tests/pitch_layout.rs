use std::collections::HashSet;

use pitchside::formation::{
    TemplateSource, fallback_grid, preset, preset_names, resolve_template, template_for,
};
use pitchside::pitch_layout::{assign, assign_with_source};
use pitchside::position_map::slot_candidates;
use pitchside::state::{Player, PlayerId};

const LABELS: [Option<&str>; 8] = [
    Some("GK"),
    Some("CB"),
    Some("D"),
    Some("CM"),
    Some("M"),
    Some("ST"),
    Some("wing-back?"),
    None,
];

fn roster(positions: &[Option<&str>]) -> Vec<Player> {
    positions
        .iter()
        .enumerate()
        .map(|(idx, pos)| Player {
            id: PlayerId::Num(idx as u64 + 1),
            name: format!("Player {}", idx + 1),
            number: Some(idx as u32 + 1),
            position: pos.map(str::to_string),
            grid: None,
        })
        .collect()
}

fn mixed_roster(size: usize) -> Vec<Player> {
    let positions: Vec<Option<&str>> = (0..size).map(|i| LABELS[i % LABELS.len()]).collect();
    roster(&positions)
}

#[test]
fn every_preset_has_eleven_slots_and_one_keeper() {
    let names = preset_names();
    assert_eq!(names.len(), 11);
    for name in names {
        let slots = preset(name).expect("preset exists");
        assert_eq!(slots.len(), 11, "{name}");
        assert_eq!(slots.iter().filter(|s| s.slot == "GK").count(), 1, "{name}");
        let distinct: HashSet<&str> = slots.iter().map(|s| s.slot.as_str()).collect();
        assert_eq!(distinct.len(), 11, "{name}");
    }
}

#[test]
fn fallback_grid_matches_requested_size() {
    assert!(fallback_grid(0).is_empty());
    for n in 0..=40 {
        let grid = fallback_grid(n);
        assert_eq!(grid.len(), n);
        assert!(grid.iter().all(|s| (0.0..=100.0).contains(&s.y)));
    }
}

#[test]
fn assign_returns_one_entry_per_player() {
    let formations = [
        Some("4-3-3"),
        Some("3-5-2"),
        Some("4-2-2-2"),
        Some("abc"),
        Some(""),
        Some("4-x-3"),
        Some("99-99"),
        Some("4-4-1"),
        Some("0-0"),
        None,
    ];
    for size in 0..=30 {
        let players = mixed_roster(size);
        for formation in formations {
            let out = assign(&players, formation);
            assert_eq!(out.len(), size, "size {size} formation {formation:?}");

            let ids: HashSet<PlayerId> = out.iter().map(|p| p.player.id.clone()).collect();
            assert_eq!(ids.len(), size);
            let slots: HashSet<&str> = out.iter().map(|p| p.slot_label.as_str()).collect();
            assert_eq!(slots.len(), size, "slots reused for {formation:?}");
        }
    }
}

#[test]
fn assign_is_idempotent() {
    let players = mixed_roster(13);
    for formation in [Some("4-4-2"), Some("abc"), None] {
        assert_eq!(assign(&players, formation), assign(&players, formation));
    }
}

#[test]
fn labelled_players_land_on_a_candidate_slot() {
    let players = roster(&[
        Some("GK"),
        Some("LB"),
        Some("LCB"),
        Some("RCB"),
        Some("RB"),
        Some("LCM"),
        Some("CDM"),
        Some("RCM"),
        Some("LW"),
        Some("ST"),
        Some("RW"),
    ]);
    let out = assign(&players, Some("4-3-3"));
    for positioned in &out {
        let candidates = slot_candidates(positioned.player.position.as_deref());
        assert!(
            candidates.contains(&positioned.slot_label.as_str()),
            "{:?} placed on {}",
            positioned.player.position,
            positioned.slot_label
        );
    }
}

#[test]
fn goalkeeper_labels_are_flagged_anywhere() {
    let players = roster(&[Some("ST"), Some("goalkeeper"), Some("G"), Some("g k"), None]);
    for formation in [Some("4-3-3"), Some("abc"), None] {
        let out = assign(&players, formation);
        for positioned in out.iter().filter(|p| p.player.id != PlayerId::Num(1)) {
            if positioned.player.position.is_some() {
                assert!(positioned.is_goalkeeper, "{formation:?}");
            }
        }
    }
}

#[test]
fn four_three_three_eleven() {
    let players = roster(&[
        Some("GK"),
        Some("LB"),
        Some("CB"),
        Some("CB"),
        Some("RB"),
        Some("CM"),
        Some("CM"),
        Some("CM"),
        Some("LW"),
        Some("ST"),
        Some("RW"),
    ]);
    let (out, source) = assign_with_source(&players, Some("4-3-3"));
    assert_eq!(source, TemplateSource::Preset);
    assert_eq!(out.len(), 11);

    let keeper = out
        .iter()
        .find(|p| p.player.id == PlayerId::Num(1))
        .expect("keeper placed");
    assert_eq!(keeper.slot_label, "GK");
    assert_eq!((keeper.x, keeper.y), (50.0, 92.0));
    assert!(keeper.is_goalkeeper);

    let slots: HashSet<&str> = out.iter().map(|p| p.slot_label.as_str()).collect();
    assert_eq!(slots.len(), 11);
}

#[test]
fn unlabelled_eleven_backfills_in_template_order() {
    let players = roster(&[None; 11]);
    let out = assign(&players, Some("4-3-3"));
    let template = template_for(Some("4-3-3"));

    for (idx, positioned) in out.iter().enumerate() {
        assert_eq!(positioned.player.id, PlayerId::Num(idx as u64 + 1));
        assert_eq!(positioned.slot_label, template[idx].slot);
        assert_eq!((positioned.x, positioned.y), (template[idx].x, template[idx].y));
    }
    assert!(out[0].is_goalkeeper);
    assert!(out[1..].iter().all(|p| !p.is_goalkeeper));
}

#[test]
fn oversized_line_counts_still_generate() {
    let (template, source) = resolve_template(Some("99-99"));
    assert_eq!(source, TemplateSource::Generated);
    assert_eq!(template.len(), 1 + 99 + 99);

    let players = mixed_roster(11);
    let (out, source) = assign_with_source(&players, Some("99-99"));
    assert_eq!(source, TemplateSource::Generated);
    assert_eq!(out.len(), 11);

    let (template, source) = resolve_template(Some("100-100"));
    assert_eq!(source, TemplateSource::Generated);
    assert_eq!(template.len(), 201);
}

#[test]
fn ten_slot_template_falls_back_for_eleven_players() {
    let (template, source) = resolve_template(Some("4-4-1"));
    assert_eq!(source, TemplateSource::Generated);
    assert_eq!(template.len(), 10);

    let players = mixed_roster(11);
    let (out, source) = assign_with_source(&players, Some("4-4-1"));
    assert_eq!(source, TemplateSource::Fallback);
    assert_eq!(out.len(), 11);
    let grid = fallback_grid(11);
    for (idx, positioned) in out.iter().enumerate() {
        assert_eq!(positioned.player.id, PlayerId::Num(idx as u64 + 1));
        assert_eq!(positioned.slot_label, grid[idx].slot);
    }
}

#[test]
fn malformed_formations_use_default_grid() {
    for formation in ["abc", "4-x-3", "4", "1001-1", "1-1"] {
        let (template, source) = resolve_template(Some(formation));
        assert_eq!(source, TemplateSource::Default, "{formation}");
        assert_eq!(template.len(), 11);
    }
    let (_, source) = resolve_template(Some(" 4 - 3 - 3 "));
    assert_eq!(source, TemplateSource::Preset);
}
