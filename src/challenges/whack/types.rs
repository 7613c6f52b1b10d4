//! Whack-a-Word data structures: the cell grid and the hammer.

use crate::animation::{Direction, FrameStep, FrameTimer};
use crate::challenges::completion::Completion;
use crate::core::constants::{HAMMER_HEIGHT_RATIO, WHACKED_REVERT_MS, WHACK_CELL_RATIO};
use crate::core::geometry::{Bounds, Rect, Size};
use crate::core::input::{KeyDetector, Point};
use crate::resources::rescale::Rescaler;
use crate::resources::sound::SoundTrigger;
use crate::resources::sprite::{Drawable, Sprite, SpriteSheet};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::sync::Arc;

/// Tuning for the whack game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhackConfig {
    pub columns: usize,
    pub rows: usize,
    /// Average seconds between surfacing moles across the whole grid.
    pub spawn_chance: f64,
    /// How long rising (and sinking) takes.
    pub rise_ms: u64,
    /// How long a mole stays fully up.
    pub stay_ms: u64,
    pub points_per_whack: i64,
}

impl Default for WhackConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            rows: 3,
            spawn_chance: 0.5,
            rise_ms: 500,
            stay_ms: 200,
            points_per_whack: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhackTheme {
    pub name: &'static str,
    /// Empty hole first, fully surfaced last.
    pub mole_sheet: SpriteSheet,
    pub whacked_sheet: SpriteSheet,
    /// Raised first, striking last.
    pub hammer_sheet: SpriteSheet,
    pub whack_sounds: Vec<String>,
}

/// The scaled sprites currently used for drawing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhackSheets {
    pub mole: SpriteSheet,
    pub whacked: SpriteSheet,
    pub hammer: SpriteSheet,
}

impl WhackSheets {
    pub fn original(theme: &WhackTheme) -> Self {
        Self {
            mole: theme.mole_sheet.clone(),
            whacked: theme.whacked_sheet.clone(),
            hammer: theme.hammer_sheet.clone(),
        }
    }
}

/// Cell and hammer geometry for one play-field size.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhackLayout {
    pub field: Size,
    pub cell: Size,
    pub hammer: Size,
    /// Row-major cell boxes in play-field coordinates.
    pub cells: Vec<Rect>,
}

impl WhackLayout {
    /// Cells evenly spaced on a `(columns + 1) x (rows + 1)` lattice, each
    /// centred on a lattice point.
    pub fn compute(field: Size, columns: usize, rows: usize) -> Self {
        let gap_w = field.width as f64 / (columns + 1) as f64;
        let gap_h = field.height as f64 / (rows + 1) as f64;
        let cell = Size::new(
            (WHACK_CELL_RATIO * gap_w) as u16,
            (WHACK_CELL_RATIO * gap_h) as u16,
        );
        let hammer = Size::new(
            (WHACK_CELL_RATIO * gap_w) as u16,
            (HAMMER_HEIGHT_RATIO * gap_h) as u16,
        );

        let (w, h) = (cell.width as i32, cell.height as i32);
        let mut cells = Vec::with_capacity(columns * rows);
        for j in 0..rows {
            for i in 0..columns {
                let cx = ((i + 1) as f64 * gap_w) as i32;
                let cy = ((j + 1) as f64 * gap_h) as i32;
                cells.push(Rect::new(cx - w / 2, cy - h / 2, w, h));
            }
        }
        Self {
            field,
            cell,
            hammer,
            cells,
        }
    }

    /// Index of the cell containing field point `(x, y)`.
    pub fn cell_at(&self, x: i32, y: i32) -> Option<usize> {
        self.cells.iter().position(|r| r.contains(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Idle,
    Rising,
    Surfaced,
    Sinking,
    Whacked,
}

/// One hole in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WhackCell {
    pub column: usize,
    pub row: usize,
    state: CellState,
    shown_at: u64,
    whacked_at: u64,
    move_ms: u64,
    stay_ms: u64,
    anim: FrameTimer,
}

impl WhackCell {
    pub fn new(column: usize, row: usize) -> Self {
        Self {
            column,
            row,
            state: CellState::Idle,
            shown_at: 0,
            whacked_at: 0,
            move_ms: 0,
            stay_ms: 0,
            anim: FrameTimer::looping(0, 0),
        }
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn is_whackable(&self) -> bool {
        matches!(
            self.state,
            CellState::Rising | CellState::Surfaced | CellState::Sinking
        )
    }

    /// Start rising. Only an idle cell can be shown.
    pub fn show_whackable(&mut self, move_ms: u64, stay_ms: u64, timestamp_ms: u64) -> bool {
        if self.state != CellState::Idle {
            return false;
        }
        self.state = CellState::Rising;
        self.shown_at = timestamp_ms;
        self.move_ms = move_ms;
        self.stay_ms = stay_ms;
        self.anim = FrameTimer::sequence(move_ms, 0, Direction::Forward, timestamp_ms);
        true
    }

    /// Register a hit. Accepted once while rising, surfaced or sinking.
    pub fn whack(&mut self, timestamp_ms: u64) -> bool {
        if !self.is_whackable() {
            return false;
        }
        self.state = CellState::Whacked;
        self.whacked_at = timestamp_ms;
        self.anim = FrameTimer::sequence(WHACKED_REVERT_MS, 0, Direction::Forward, timestamp_ms);
        true
    }

    /// Advance the state machine. `frame_count` is the length of the sheet
    /// for the current state.
    pub fn update(&mut self, timestamp_ms: u64, frame_count: usize) {
        let elapsed = timestamp_ms.saturating_sub(self.shown_at);
        match self.state {
            CellState::Idle => {}
            CellState::Rising => {
                if self.anim.tick(timestamp_ms, frame_count) == FrameStep::Finished {
                    self.state = CellState::Surfaced;
                }
            }
            CellState::Surfaced => {
                if elapsed.saturating_sub(self.move_ms) > self.stay_ms {
                    self.state = CellState::Sinking;
                    self.anim = FrameTimer::sequence(
                        self.move_ms,
                        frame_count,
                        Direction::Backward,
                        self.shown_at + self.move_ms + self.stay_ms,
                    );
                }
            }
            CellState::Sinking => {
                if self.anim.tick(timestamp_ms, frame_count) == FrameStep::Finished {
                    self.state = CellState::Idle;
                }
            }
            CellState::Whacked => {
                self.anim.tick(timestamp_ms, frame_count);
                if timestamp_ms.saturating_sub(self.whacked_at) > WHACKED_REVERT_MS {
                    self.state = CellState::Idle;
                }
            }
        }
    }
}

impl Drawable<WhackSheets> for WhackCell {
    fn sheet<'a>(&self, sheets: &'a WhackSheets) -> &'a [Sprite] {
        match self.state {
            CellState::Whacked => &sheets.whacked,
            _ => &sheets.mole,
        }
    }

    fn frame(&self) -> usize {
        match self.state {
            CellState::Idle => 0,
            _ => self.anim.frame(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HammerState {
    Idle,
    Swinging,
    Recovering,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hammer {
    state: HammerState,
    swing_started: u64,
    move_ms: u64,
    wait_ms: u64,
    anim: FrameTimer,
    /// Top-left corner in play-field coordinates.
    pub position: Point,
    pub size: Size,
}

impl Default for Hammer {
    fn default() -> Self {
        Self {
            state: HammerState::Idle,
            swing_started: 0,
            move_ms: 0,
            wait_ms: 0,
            anim: FrameTimer::looping(0, 0),
            position: Point::default(),
            size: Size::default(),
        }
    }
}

impl Hammer {
    pub fn state(&self) -> HammerState {
        self.state
    }

    pub fn can_whack(&self) -> bool {
        self.state == HammerState::Idle
    }

    /// Swing down over `move_ms`, then rest `wait_ms`. Rejected unless idle.
    pub fn whack(&mut self, move_ms: u64, wait_ms: u64, timestamp_ms: u64) -> bool {
        if !self.can_whack() {
            return false;
        }
        self.state = HammerState::Swinging;
        self.swing_started = timestamp_ms;
        self.move_ms = move_ms;
        self.wait_ms = wait_ms;
        self.anim = FrameTimer::sequence(move_ms, 0, Direction::Forward, timestamp_ms);
        true
    }

    pub fn update(&mut self, timestamp_ms: u64, frame_count: usize) {
        match self.state {
            HammerState::Idle => {}
            HammerState::Swinging => {
                if self.anim.tick(timestamp_ms, frame_count) == FrameStep::Finished {
                    self.state = HammerState::Recovering;
                }
            }
            HammerState::Recovering => {
                let elapsed = timestamp_ms.saturating_sub(self.swing_started);
                if elapsed > self.move_ms + self.wait_ms {
                    self.state = HammerState::Idle;
                }
            }
        }
    }

    /// Place the hammer so its head sits under `pointer`.
    pub fn track(&mut self, pointer: Point) {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        self.position = Point::new(pointer.x - w / 3, pointer.y - 2 * h / 3);
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.size.width as i32,
            self.size.height as i32,
        )
    }
}

impl Drawable<WhackSheets> for Hammer {
    fn sheet<'a>(&self, sheets: &'a WhackSheets) -> &'a [Sprite] {
        &sheets.hammer
    }

    fn frame(&self) -> usize {
        match self.state {
            HammerState::Idle => 0,
            _ => self.anim.frame(),
        }
    }
}

/// Main game state.
pub struct WhackGame {
    pub config: WhackConfig,
    pub fps: u32,
    pub theme: Arc<WhackTheme>,

    // -- Drawing --
    pub sheets: WhackSheets,
    /// Geometry matching the sprites in `sheets`.
    pub layout: WhackLayout,
    pub rescaler: Rescaler<(WhackLayout, WhackSheets)>,
    pub bounds: Bounds,
    pub redraw_requested: bool,

    // -- World --
    /// Row-major, `columns * rows` long.
    pub cells: Vec<WhackCell>,
    pub hammer: Hammer,
    pub tick_count: u64,
    pub last_update_ms: u64,

    // -- Scoring --
    pub points: i64,
    pub hits: u32,
    pub misses: u32,

    // -- Lifecycle --
    pub started: bool,
    pub forfeit_pending: bool,
    pub completion: Completion,
    pub detector: Option<Rc<KeyDetector>>,
    pub sound: Rc<dyn SoundTrigger>,
    pub rng: Box<dyn RngCore>,
}

impl WhackGame {
    pub fn new(
        config: WhackConfig,
        fps: u32,
        theme: WhackTheme,
        sound: Rc<dyn SoundTrigger>,
        completion: Completion,
        rng: Box<dyn RngCore>,
    ) -> Self {
        let cells = (0..config.rows)
            .flat_map(|row| (0..config.columns).map(move |column| WhackCell::new(column, row)))
            .collect();
        Self {
            sheets: WhackSheets::original(&theme),
            theme: Arc::new(theme),
            config,
            fps: fps.max(1),
            layout: WhackLayout::default(),
            rescaler: Rescaler::new("whack"),
            bounds: Bounds::default(),
            redraw_requested: true,
            cells,
            hammer: Hammer::default(),
            tick_count: 0,
            last_update_ms: 0,
            points: 0,
            hits: 0,
            misses: 0,
            started: false,
            forfeit_pending: false,
            completion,
            detector: None,
            sound,
            rng,
        }
    }

    /// Box of cell `index` in play-field coordinates, once laid out.
    pub fn cell_rect(&self, index: usize) -> Option<Rect> {
        self.layout.cells.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_even_grid() {
        let layout = WhackLayout::compute(Size::new(80, 40), 3, 3);
        // Lattice gaps of 20 x 10
        assert_eq!(layout.cell, Size::new(13, 6));
        assert_eq!(layout.hammer, Size::new(13, 13));
        assert_eq!(layout.cells.len(), 9);
        assert_eq!(layout.cells[0], Rect::new(14, 7, 13, 6));
        assert_eq!(layout.cells[4], Rect::new(34, 17, 13, 6));
        assert_eq!(layout.cells[8], Rect::new(54, 27, 13, 6));
        assert_eq!(layout.cell_at(40, 20), Some(4));
        assert_eq!(layout.cell_at(1, 1), None);
    }

    #[test]
    fn test_cell_only_shows_from_idle() {
        let mut cell = WhackCell::new(0, 0);
        assert!(cell.show_whackable(500, 200, 0));
        assert_eq!(cell.state(), CellState::Rising);
        assert!(!cell.show_whackable(500, 200, 10));
    }

    #[test]
    fn test_cell_full_cycle() {
        let mut cell = WhackCell::new(0, 0);
        cell.show_whackable(400, 200, 1_000);
        // 4 frames over 400ms: the last frame lands after 300ms
        cell.update(1_101, 4);
        cell.update(1_201, 4);
        assert_eq!(cell.state(), CellState::Rising);
        cell.update(1_301, 4);
        assert_eq!(cell.state(), CellState::Surfaced);
        assert_eq!(cell.frame(), 3);

        cell.update(1_600, 4);
        assert_eq!(cell.state(), CellState::Surfaced);
        cell.update(1_601, 4);
        assert_eq!(cell.state(), CellState::Sinking);
        assert_eq!(cell.frame(), 3);

        for ts in [1_701, 1_801, 1_901] {
            cell.update(ts, 4);
        }
        assert_eq!(cell.state(), CellState::Idle);
        assert_eq!(cell.frame(), 0);
    }

    #[test]
    fn test_whack_rejected_when_idle_or_whacked() {
        let mut cell = WhackCell::new(0, 0);
        assert!(!cell.whack(0));
        cell.show_whackable(500, 200, 0);
        assert!(cell.whack(10));
        assert_eq!(cell.state(), CellState::Whacked);
        assert!(!cell.whack(20));
    }

    #[test]
    fn test_whacked_reverts_after_fixed_delay() {
        let mut cell = WhackCell::new(0, 0);
        cell.show_whackable(500, 200, 0);
        cell.whack(100);
        cell.update(850, 2);
        assert_eq!(cell.state(), CellState::Whacked);
        cell.update(851, 2);
        assert_eq!(cell.state(), CellState::Idle);
        assert!(cell.show_whackable(500, 200, 900));
    }

    #[test]
    fn test_hammer_rejects_second_swing() {
        let mut hammer = Hammer::default();
        assert!(hammer.whack(175, 25, 0));
        assert!(!hammer.whack(175, 25, 50));
        assert_eq!(hammer.state(), HammerState::Swinging);
    }

    #[test]
    fn test_hammer_swing_and_recover() {
        let mut hammer = Hammer::default();
        hammer.whack(200, 25, 0);
        hammer.update(101, 2);
        assert_eq!(hammer.state(), HammerState::Recovering);
        assert_eq!(hammer.frame(), 1);
        hammer.update(225, 2);
        assert_eq!(hammer.state(), HammerState::Recovering);
        hammer.update(226, 2);
        assert_eq!(hammer.state(), HammerState::Idle);
        assert_eq!(hammer.frame(), 0);
        assert!(hammer.whack(175, 25, 300));
    }

    #[test]
    fn test_hammer_head_tracks_pointer() {
        let mut hammer = Hammer {
            size: Size::new(9, 12),
            ..Hammer::default()
        };
        hammer.track(Point::new(30, 20));
        assert_eq!(hammer.position, Point::new(27, 12));
    }
}
