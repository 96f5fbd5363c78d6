use serde::Serialize;

use crate::formation::{self, FormationSlot, TemplateSource};
use crate::position_map::{is_goalkeeper_label, slot_candidates};
use crate::state::{Player, TeamLineup};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedPlayer {
    pub player: Player,
    pub x: f32,
    pub y: f32,
    pub slot_label: String,
    pub is_goalkeeper: bool,
}

impl PositionedPlayer {
    fn bind(player: &Player, slot: &FormationSlot) -> Self {
        Self {
            player: player.clone(),
            x: slot.x,
            y: slot.y,
            slot_label: slot.slot.clone(),
            is_goalkeeper: slot.is_goalkeeper() || is_goalkeeper_label(player.position.as_deref()),
        }
    }
}

/// What the renderer draws for one side.
#[derive(Debug, Clone, PartialEq)]
pub enum PitchMarkers {
    Players(Vec<PositionedPlayer>),
    Placeholder(Vec<FormationSlot>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSummary {
    pub markers: PitchMarkers,
    pub source: TemplateSource,
    pub formation: Option<String>,
}

/// Places every player of `players` on a pitch slot.
///
/// The result always has exactly `players.len()` entries and the same inputs always give
/// the same output. Unknown formations and labels degrade to the fallback grid.
pub fn assign(players: &[Player], formation: Option<&str>) -> Vec<PositionedPlayer> {
    assign_with_source(players, formation).0
}

pub fn assign_with_source(
    players: &[Player],
    formation: Option<&str>,
) -> (Vec<PositionedPlayer>, TemplateSource) {
    if players.is_empty() {
        return (Vec::new(), TemplateSource::Fallback);
    }

    let (template, source) = match formation.filter(|f| !f.trim().is_empty()) {
        Some(formation) => formation::resolve_template(Some(formation)),
        None => (
            formation::fallback_grid(players.len()),
            TemplateSource::Fallback,
        ),
    };

    let mut placement = Placement::new(players.len(), template.len());
    placement.match_positions(players, &template);
    placement.backfill(players.len());
    if placement.placed() == players.len() {
        return (placement.into_positioned(players, &template), source);
    }

    // The template ran out of slots; every player gets a grid slot instead.
    let grid = formation::fallback_grid(players.len());
    let mut placement = Placement::new(players.len(), grid.len());
    placement.backfill(players.len());
    (
        placement.into_positioned(players, &grid),
        TemplateSource::Fallback,
    )
}

/// Layout for one team's starting eleven, or empty markers when it has none.
pub fn layout_lineup(lineup: Option<&TeamLineup>) -> LayoutSummary {
    let formation = lineup.and_then(|l| l.formation.clone());
    let starters = lineup.map(|l| l.starting_xi.as_slice()).unwrap_or(&[]);
    if starters.is_empty() {
        return LayoutSummary {
            markers: PitchMarkers::Placeholder(formation::placeholder_slots()),
            source: TemplateSource::Fallback,
            formation,
        };
    }
    let (players, source) = assign_with_source(starters, formation.as_deref());
    LayoutSummary {
        markers: PitchMarkers::Players(players),
        source,
        formation,
    }
}

// Request-scoped bookkeeping: which template slot each player holds, in binding order.
struct Placement {
    slot_of: Vec<Option<usize>>,
    used: Vec<bool>,
    order: Vec<usize>,
}

impl Placement {
    fn new(players: usize, slots: usize) -> Self {
        Self {
            slot_of: vec![None; players],
            used: vec![false; slots],
            order: Vec::with_capacity(players),
        }
    }

    fn placed(&self) -> usize {
        self.order.len()
    }

    fn bind(&mut self, player_idx: usize, slot_idx: usize) {
        self.slot_of[player_idx] = Some(slot_idx);
        self.used[slot_idx] = true;
        self.order.push(player_idx);
    }

    fn match_positions(&mut self, players: &[Player], template: &[FormationSlot]) {
        for (player_idx, player) in players.iter().enumerate() {
            if self.slot_of[player_idx].is_some() {
                continue;
            }
            let candidates = slot_candidates(player.position.as_deref());
            if candidates.is_empty() {
                continue;
            }
            let found = (0..template.len())
                .find(|&idx| !self.used[idx] && candidates.contains(&template[idx].slot.as_str()));
            if let Some(slot_idx) = found {
                self.bind(player_idx, slot_idx);
            }
        }
    }

    fn backfill(&mut self, players: usize) {
        for player_idx in 0..players {
            if self.slot_of[player_idx].is_some() {
                continue;
            }
            let Some(slot_idx) = self.used.iter().position(|used| !used) else {
                return;
            };
            self.bind(player_idx, slot_idx);
        }
    }

    fn into_positioned(
        self,
        players: &[Player],
        template: &[FormationSlot],
    ) -> Vec<PositionedPlayer> {
        self.order
            .into_iter()
            .filter_map(|player_idx| {
                let slot_idx = self.slot_of[player_idx]?;
                Some(PositionedPlayer::bind(&players[player_idx], &template[slot_idx]))
            })
            .collect()
    }
}
