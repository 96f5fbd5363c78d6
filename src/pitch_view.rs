use crate::pitch_layout::{PitchMarkers, PositionedPlayer};

const GRASS: char = ' ';
const HALFWAY: char = '-';
const SPOT: char = '+';
const NUDGE: usize = 4;

/// Text marker for a positioned player: jersey number, else initials; keepers in brackets.
pub fn player_marker(player: &PositionedPlayer) -> String {
    let core = match player.player.number {
        Some(number) => number.to_string(),
        None => initials(&player.player.name),
    };
    if player.is_goalkeeper {
        format!("[{core}]")
    } else {
        core
    }
}

fn initials(name: &str) -> String {
    let out: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().find(|c| c.is_alphabetic()))
        .take(2)
        .collect();
    if out.is_empty() {
        "?".to_string()
    } else {
        out.to_uppercase()
    }
}

/// Rasterizes markers onto a `width` x `height` character grid.
///
/// Our goal is at the bottom row. Overlapping labels are nudged sideways when there is
/// room, otherwise the later label wins.
pub fn render_pitch_rows(markers: &PitchMarkers, width: usize, height: usize) -> Vec<String> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut grid = vec![vec![GRASS; width]; height];
    let mid = height / 2;
    for cell in grid[mid].iter_mut() {
        *cell = HALFWAY;
    }
    grid[mid][width / 2] = SPOT;

    let mut occupied = vec![vec![false; width]; height];
    let labels: Vec<(f32, f32, String)> = match markers {
        PitchMarkers::Players(players) => players
            .iter()
            .map(|p| (p.x, p.y, player_marker(p)))
            .collect(),
        PitchMarkers::Placeholder(slots) => slots
            .iter()
            .map(|s| (s.x, s.y, s.slot.chars().take(4).collect()))
            .collect(),
    };

    for (x, y, label) in labels {
        let chars: Vec<char> = label.chars().take(width).collect();
        let row = scale(y, height);
        let col = scale(x, width);
        let start = place_label(&occupied[row], col, chars.len());
        for (offset, ch) in chars.into_iter().enumerate() {
            grid[row][start + offset] = ch;
            occupied[row][start + offset] = true;
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect())
        .collect()
}

fn scale(value: f32, cells: usize) -> usize {
    let max = (cells - 1) as f32;
    let pos = (value.clamp(0.0, 100.0) / 100.0 * max).round();
    (pos as usize).min(cells - 1)
}

// Leftmost start column for a label centred on `col`, shifted to a free run if possible.
fn place_label(occupied: &[bool], col: usize, len: usize) -> usize {
    let width = occupied.len();
    let max_start = width.saturating_sub(len);
    let centred = col.saturating_sub(len / 2).min(max_start);
    let is_free = |start: usize| occupied[start..start + len].iter().all(|taken| !taken);

    if is_free(centred) {
        return centred;
    }
    for shift in 1..=NUDGE {
        let right = centred + shift;
        if right <= max_start && is_free(right) {
            return right;
        }
        if let Some(left) = centred.checked_sub(shift)
            && is_free(left)
        {
            return left;
        }
    }
    centred
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::placeholder_slots;
    use crate::pitch_layout::assign;
    use crate::state::{Player, PlayerId};

    fn player(id: u64, number: Option<u32>, name: &str, pos: &str) -> Player {
        Player {
            id: PlayerId::Num(id),
            name: name.to_string(),
            number,
            position: Some(pos.to_string()),
            grid: None,
        }
    }

    #[test]
    fn zero_sized_grid_is_empty() {
        let markers = PitchMarkers::Placeholder(placeholder_slots());
        assert!(render_pitch_rows(&markers, 0, 10).is_empty());
        assert!(render_pitch_rows(&markers, 10, 0).is_empty());
    }

    #[test]
    fn rows_have_requested_width() {
        let markers = PitchMarkers::Placeholder(placeholder_slots());
        let rows = render_pitch_rows(&markers, 40, 15);
        assert_eq!(rows.len(), 15);
        assert!(rows.iter().all(|r| r.chars().count() == 40));
    }

    #[test]
    fn empty_pitch_shows_halfway_line() {
        let rows = render_pitch_rows(&PitchMarkers::Players(Vec::new()), 21, 9);
        assert_eq!(rows[4], format!("{}+{}", "-".repeat(10), "-".repeat(10)));
        assert!(rows[0].trim().is_empty());
    }

    #[test]
    fn keeper_is_drawn_near_our_goal() {
        let players = vec![
            player(1, Some(1), "A. Stone", "G"),
            player(2, Some(9), "K. Rook", "ST"),
        ];
        let markers = PitchMarkers::Players(assign(&players, Some("4-3-3")));
        let rows = render_pitch_rows(&markers, 40, 20);
        let keeper_row = rows.iter().position(|r| r.contains("[1]")).expect("keeper drawn");
        let striker_row = rows.iter().position(|r| r.contains('9')).expect("striker drawn");
        assert!(keeper_row > striker_row);
        assert!(keeper_row >= 15);
    }

    #[test]
    fn markers_fall_back_to_initials() {
        let players = vec![player(3, None, "Bukayo Saka", "RW")];
        let positioned = assign(&players, Some("4-3-3"));
        assert_eq!(player_marker(&positioned[0]), "BS");
    }

    #[test]
    fn crowded_labels_are_nudged_apart() {
        let occupied = [false, false, true, true, false, false, false, false];
        assert_eq!(place_label(&occupied, 3, 2), 4);
        let free = [false; 8];
        assert_eq!(place_label(&free, 0, 3), 0);
        assert_eq!(place_label(&free, 7, 3), 5);
    }
}
