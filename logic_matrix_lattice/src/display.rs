// Lattice display state.
//
// Shows a GRID_SIZE x GRID_SIZE patch of the lattice: the plane spanned by
// the first two accumulator axes, with every further axis at 0. Each cell
// holds a note name and one light per accumulator.
//
// `update` consumes one `LatticeMessage` per tick and only does work when
// something moved. Names are recomputed when any axis interval changes.
// Each accumulator's light is moved when its position changes. Positions
// that fall outside the patch turn the old light off and light nothing.
// All lights start off, so an accumulator that never leaves the origin
// stays dark.

use logic_matrix_engine::NUM_ACCUMULATORS;
use logic_matrix_engine::message::LatticeMessage;
use tracing::debug;

use crate::note::{NoteName, spell};

pub const GRID_SIZE: usize = 6;

/// What an `update` touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayChange {
    pub names: bool,
    pub moved: [bool; NUM_ACCUMULATORS],
}

impl DisplayChange {
    pub fn any(&self) -> bool {
        self.names || self.moved.iter().any(|&m| m)
    }
}

#[derive(Debug, Clone)]
pub struct LatticeDisplay {
    prev: LatticeMessage,
    names: [[NoteName; GRID_SIZE]; GRID_SIZE],
    lights: [[[bool; NUM_ACCUMULATORS]; GRID_SIZE]; GRID_SIZE],
}

impl Default for LatticeDisplay {
    fn default() -> Self {
        LatticeDisplay::new()
    }
}

/// Grid cell `(x, y)` for a lattice position, if it lies on the displayed
/// plane.
pub fn grid_cell(position: &[i32; NUM_ACCUMULATORS]) -> Option<(usize, usize)> {
    let on_axis = |v: i32| usize::try_from(v).ok().filter(|&v| v < GRID_SIZE);
    if position[2..].iter().any(|&v| v != 0) {
        return None;
    }
    Some((on_axis(position[0])?, on_axis(position[1])?))
}

impl LatticeDisplay {
    /// Names for a zeroed message, every light off.
    pub fn new() -> Self {
        let prev = LatticeMessage::default();
        LatticeDisplay {
            names: compute_names(&prev.interval_semitones),
            prev,
            lights: [[[false; NUM_ACCUMULATORS]; GRID_SIZE]; GRID_SIZE],
        }
    }

    pub fn update(&mut self, msg: &LatticeMessage) -> DisplayChange {
        let mut change = DisplayChange::default();

        if msg.interval_semitones != self.prev.interval_semitones {
            self.names = compute_names(&msg.interval_semitones);
            change.names = true;
            debug!(intervals = ?msg.interval_semitones, "lattice names recomputed");
        }

        for acc in 0..NUM_ACCUMULATORS {
            let old = self.prev.position[acc];
            let new = msg.position[acc];
            if old == new {
                continue;
            }
            if let Some((x, y)) = grid_cell(&old) {
                self.lights[x][y][acc] = false;
            }
            if let Some((x, y)) = grid_cell(&new) {
                self.lights[x][y][acc] = true;
            }
            change.moved[acc] = true;
        }

        self.prev = *msg;
        change
    }

    pub fn name(&self, x: usize, y: usize) -> NoteName {
        self.names[x][y]
    }

    pub fn light(&self, x: usize, y: usize, accumulator: usize) -> bool {
        self.lights[x][y][accumulator]
    }

    /// Cell currently lit for `accumulator`, if any.
    pub fn lit_cell(&self, accumulator: usize) -> Option<(usize, usize)> {
        (0..GRID_SIZE)
            .flat_map(|x| (0..GRID_SIZE).map(move |y| (x, y)))
            .find(|&(x, y)| self.lights[x][y][accumulator])
    }
}

fn compute_names(intervals: &[i32; NUM_ACCUMULATORS]) -> [[NoteName; GRID_SIZE]; GRID_SIZE] {
    std::array::from_fn(|x| {
        std::array::from_fn(|y| {
            let mut position = [0; NUM_ACCUMULATORS];
            position[0] = x as i32;
            position[1] = y as i32;
            spell(&position, intervals)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(intervals: [i32; 3], positions: [[i32; 3]; 3]) -> LatticeMessage {
        LatticeMessage {
            interval_semitones: intervals,
            position: positions,
            ..LatticeMessage::default()
        }
    }

    fn lit_count(display: &LatticeDisplay, acc: usize) -> usize {
        (0..GRID_SIZE)
            .flat_map(|x| (0..GRID_SIZE).map(move |y| (x, y)))
            .filter(|&(x, y)| display.light(x, y, acc))
            .count()
    }

    #[test]
    fn test_grid_cell_bounds() {
        assert_eq!(grid_cell(&[0, 0, 0]), Some((0, 0)));
        assert_eq!(grid_cell(&[5, 3, 0]), Some((5, 3)));
        assert_eq!(grid_cell(&[6, 0, 0]), None);
        assert_eq!(grid_cell(&[-1, 0, 0]), None);
        assert_eq!(grid_cell(&[1, 1, 1]), None);
    }

    #[test]
    fn test_names_follow_intervals() {
        let mut display = LatticeDisplay::new();
        assert_eq!(display.name(3, 2).to_string(), "C");

        let change = display.update(&message([7, 4, 0], [[0; 3]; 3]));
        assert!(change.names);
        assert_eq!(display.name(1, 0).to_string(), "G");
        assert_eq!(display.name(0, 1).to_string(), "E");
        assert_eq!(display.name(1, 1).to_string(), "B");

        // Same intervals again: nothing recomputed.
        let change = display.update(&message([7, 4, 0], [[0; 3]; 3]));
        assert!(!change.any());
    }

    #[test]
    fn test_starts_dark_until_a_position_changes() {
        let mut display = LatticeDisplay::new();
        for acc in 0..NUM_ACCUMULATORS {
            assert_eq!(lit_count(&display, acc), 0);
            assert_eq!(display.lit_cell(acc), None);
        }

        // Origin positions match the power-on state: nothing moves or lights.
        let change = display.update(&message([7, 4, 0], [[0; 3]; 3]));
        assert_eq!(change.moved, [false; NUM_ACCUMULATORS]);
        assert!(!display.light(0, 0, 0));
    }

    #[test]
    fn test_lights_move_with_position() {
        let mut display = LatticeDisplay::new();
        let change = display.update(&message([7, 4, 0], [[0; 3], [2, 1, 0], [0; 3]]));
        assert_eq!(change.moved, [false, true, false]);
        assert!(display.light(2, 1, 1));
        assert!(!display.light(0, 0, 0));
        assert_eq!(display.lit_cell(1), Some((2, 1)));
        assert_eq!(lit_count(&display, 1), 1);

        // Back to the origin: the light follows.
        display.update(&message([7, 4, 0], [[0; 3], [0; 3], [0; 3]]));
        assert!(!display.light(2, 1, 1));
        assert_eq!(display.lit_cell(1), Some((0, 0)));
    }

    #[test]
    fn test_off_grid_position_turns_light_off() {
        let mut display = LatticeDisplay::new();
        display.update(&message([7, 4, 0], [[1, 1, 0], [0; 3], [0; 3]]));
        assert!(display.light(1, 1, 0));

        display.update(&message([7, 4, 0], [[1, 1, 2], [0; 3], [0; 3]]));
        assert_eq!(lit_count(&display, 0), 0);
        assert_eq!(display.lit_cell(0), None);

        // Back on the grid.
        display.update(&message([7, 4, 0], [[4, 0, 0], [0; 3], [0; 3]]));
        assert!(display.light(4, 0, 0));
        assert_eq!(lit_count(&display, 0), 1);
    }

    #[test]
    fn test_shared_cell_keeps_each_light() {
        let mut display = LatticeDisplay::new();
        display.update(&message([7, 4, 0], [[1, 0, 0], [1, 0, 0], [0; 3]]));
        assert!(display.light(1, 0, 0));
        assert!(display.light(1, 0, 1));

        display.update(&message([7, 4, 0], [[2, 0, 0], [1, 0, 0], [0; 3]]));
        assert!(!display.light(1, 0, 0));
        assert!(display.light(1, 0, 1));
    }
}
