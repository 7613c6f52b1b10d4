//! River Run data structures.
//!
//! A top-down scroller: the player slides left and right along the bottom
//! edge while obstacles and collectables drift down the field.

use crate::animation::FrameTimer;
use crate::challenges::completion::Completion;
use crate::core::constants::{PLAYER_SIZE_RATIO, SPAWNABLE_SIZE_RATIO};
use crate::core::geometry::{Bounds, Rect, Size};
use crate::core::input::KeyDetector;
use crate::resources::rescale::Rescaler;
use crate::resources::sound::SoundTrigger;
use crate::resources::sprite::{Drawable, Sprite, SpriteSheet};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::sync::Arc;

/// Fallback cadence for types the theme gives no cadence for.
pub const DEFAULT_CADENCE_MS: u64 = 150;

/// Tuning for the scroller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollerConfig {
    /// Full screens scrolled per second.
    pub scroll_speed: f64,
    /// Obstacles spawned per second. Zero or below spawns none.
    pub obstacles_per_second: f64,
    /// Collectables spawned per second. Zero or below spawns none.
    pub collectables_per_second: f64,
    /// Lane widths moved per second while a direction is held.
    pub player_speed: f64,
    pub lives: u32,
    pub damage_flash_ms: u64,
    pub collect_points: i64,
    pub damage_penalty: i64,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            scroll_speed: 0.67,
            obstacles_per_second: 1.0,
            collectables_per_second: 0.5,
            player_speed: 1.3,
            lives: 3,
            damage_flash_ms: 400,
            collect_points: 10,
            damage_penalty: 5,
        }
    }
}

/// Art, timing and sound identifiers for one scroller variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollerTheme {
    pub name: &'static str,
    pub obstacle_sheets: Vec<SpriteSheet>,
    pub collectable_sheets: Vec<SpriteSheet>,
    pub player_sheet: SpriteSheet,
    pub obstacle_cadence_ms: Vec<u64>,
    pub collectable_cadence_ms: Vec<u64>,
    pub player_cadence_ms: u64,
    pub damaged_sounds: Vec<String>,
    pub collected_sounds: Vec<String>,
    pub background_music: Option<String>,
    /// Background rows, tiled vertically and scrolled.
    pub background: Vec<&'static str>,
}

impl ScrollerTheme {
    pub fn cadence(&self, kind: SpawnKind, type_id: usize) -> u64 {
        let table = match kind {
            SpawnKind::Obstacle => &self.obstacle_cadence_ms,
            SpawnKind::Collectable => &self.collectable_cadence_ms,
        };
        table.get(type_id).copied().unwrap_or(DEFAULT_CADENCE_MS)
    }

    /// Highest type id of `kind`, `None` if the theme has no such entities.
    pub fn max_type(&self, kind: SpawnKind) -> Option<usize> {
        let count = match kind {
            SpawnKind::Obstacle => self.obstacle_sheets.len(),
            SpawnKind::Collectable => self.collectable_sheets.len(),
        };
        count.checked_sub(1)
    }

    /// Sound for running into / picking up `type_id`, falling back to the
    /// first one listed.
    pub fn sound(&self, kind: SpawnKind, type_id: usize) -> Option<&str> {
        let table = match kind {
            SpawnKind::Obstacle => &self.damaged_sounds,
            SpawnKind::Collectable => &self.collected_sounds,
        };
        table.get(type_id).or_else(|| table.first()).map(|s| s.as_str())
    }
}

/// On-screen sizes for every entity at one play-field size.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollerLayout {
    pub field: Size,
    pub obstacles: Vec<Size>,
    pub collectables: Vec<Size>,
    pub player: Size,
}

impl ScrollerLayout {
    pub fn compute(field: Size, theme: &ScrollerTheme) -> Self {
        let spawnable = field.scaled(SPAWNABLE_SIZE_RATIO, SPAWNABLE_SIZE_RATIO);
        Self {
            field,
            obstacles: vec![spawnable; theme.obstacle_sheets.len()],
            collectables: vec![spawnable; theme.collectable_sheets.len()],
            player: field.scaled(PLAYER_SIZE_RATIO, PLAYER_SIZE_RATIO),
        }
    }

    pub fn spawnable(&self, kind: SpawnKind, type_id: usize) -> Size {
        let table = match kind {
            SpawnKind::Obstacle => &self.obstacles,
            SpawnKind::Collectable => &self.collectables,
        };
        table.get(type_id).copied().unwrap_or_default()
    }
}

/// The scaled sprites currently used for drawing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollerSheets {
    pub obstacles: Vec<SpriteSheet>,
    pub collectables: Vec<SpriteSheet>,
    pub player: SpriteSheet,
}

impl ScrollerSheets {
    /// Unscaled copies of the theme's art, used until the first rescale lands.
    pub fn original(theme: &ScrollerTheme) -> Self {
        Self {
            obstacles: theme.obstacle_sheets.clone(),
            collectables: theme.collectable_sheets.clone(),
            player: theme.player_sheet.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Obstacle,
    Collectable,
}

/// An obstacle or collectable drifting down the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Spawnable {
    pub kind: SpawnKind,
    pub type_id: usize,
    /// Horizontal position in `[0, 1]` across the free width.
    pub x_ratio: f64,
    /// Vertical progress: 0 = just above the top edge, 1 = just below the
    /// bottom edge.
    pub progress: f64,
    pub anim: FrameTimer,
    pub size: Size,
}

impl Spawnable {
    pub fn new(
        kind: SpawnKind,
        type_id: usize,
        x_ratio: f64,
        cadence_ms: u64,
        size: Size,
        now_ms: u64,
    ) -> Self {
        debug_assert!((0.0..=1.0).contains(&x_ratio), "x_ratio out of range: {}", x_ratio);
        Self {
            kind,
            type_id,
            x_ratio: x_ratio.clamp(0.0, 1.0),
            progress: 0.0,
            anim: FrameTimer::looping(cadence_ms, now_ms),
            size,
        }
    }

    /// Bounding box in play-field coordinates.
    pub fn rect(&self, field: Size) -> Rect {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        let free_width = (field.width as i32 - w).max(0) as f64;
        Rect::new(
            (self.x_ratio * free_width) as i32,
            (self.progress * (field.height as i32 + h) as f64) as i32 - h,
            w,
            h,
        )
    }
}

impl Drawable<ScrollerSheets> for Spawnable {
    fn sheet<'a>(&self, sheets: &'a ScrollerSheets) -> &'a [Sprite] {
        let table = match self.kind {
            SpawnKind::Obstacle => &sheets.obstacles,
            SpawnKind::Collectable => &sheets.collectables,
        };
        table.get(self.type_id).map_or(&[], |s| s.as_slice())
    }

    fn frame(&self) -> usize {
        self.anim.frame()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Forward,
    Left,
    Right,
    Damaged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Lane position in `[0, 1]`.
    pub x_ratio: f64,
    pub facing: Facing,
    pub anim: FrameTimer,
    pub size: Size,
    /// Shows `Damaged` until this timestamp.
    pub damaged_until: Option<u64>,
}

impl Player {
    pub fn new(cadence_ms: u64, size: Size, now_ms: u64) -> Self {
        Self {
            x_ratio: 0.5,
            facing: Facing::Forward,
            anim: FrameTimer::looping(cadence_ms, now_ms),
            size,
            damaged_until: None,
        }
    }

    /// Bounding box in play-field coordinates; sits on the bottom edge.
    pub fn rect(&self, field: Size) -> Rect {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        let free_width = (field.width as i32 - w).max(0) as f64;
        Rect::new(
            (self.x_ratio * free_width) as i32,
            field.height as i32 - h,
            w,
            h,
        )
    }
}

impl Drawable<ScrollerSheets> for Player {
    fn sheet<'a>(&self, sheets: &'a ScrollerSheets) -> &'a [Sprite] {
        &sheets.player
    }

    fn frame(&self) -> usize {
        self.anim.frame()
    }
}

/// Main game state.
pub struct ScrollerGame {
    pub config: ScrollerConfig,
    pub fps: u32,
    pub theme: Arc<ScrollerTheme>,

    // -- Drawing --
    /// Sprites currently drawn. Swapped whole when a rescale lands.
    pub sheets: ScrollerSheets,
    /// Layout of the sprite set currently in `sheets`. New spawns use it.
    pub applied_layout: ScrollerLayout,
    pub rescaler: Rescaler<(ScrollerLayout, ScrollerSheets)>,
    pub bounds: Bounds,
    pub redraw_requested: bool,

    // -- World --
    pub spawnables: Vec<Spawnable>,
    pub player: Player,
    /// Background scroll offset, always in `[0, 1)`.
    pub background_pos: f64,
    pub tick_count: u64,
    pub last_update_ms: u64,

    // -- Scoring --
    pub points: i64,
    pub hits: u32,
    pub damage: u32,
    pub lives: u32,

    // -- Lifecycle --
    pub started: bool,
    pub forfeit_pending: bool,
    pub completion: Completion,
    pub detector: Option<Rc<KeyDetector>>,
    pub sound: Rc<dyn SoundTrigger>,
    pub rng: Box<dyn RngCore>,
}

impl ScrollerGame {
    pub fn new(
        config: ScrollerConfig,
        fps: u32,
        theme: ScrollerTheme,
        sound: Rc<dyn SoundTrigger>,
        completion: Completion,
        rng: Box<dyn RngCore>,
    ) -> Self {
        let sheets = ScrollerSheets::original(&theme);
        let player = Player::new(theme.player_cadence_ms, Size::default(), 0);
        let lives = config.lives;
        Self {
            config,
            fps: fps.max(1),
            theme: Arc::new(theme),
            sheets,
            applied_layout: ScrollerLayout::default(),
            rescaler: Rescaler::new("scroller"),
            bounds: Bounds::default(),
            redraw_requested: true,
            spawnables: Vec::new(),
            player,
            background_pos: 0.0,
            tick_count: 0,
            last_update_ms: 0,
            points: 0,
            hits: 0,
            damage: 0,
            lives,
            started: false,
            forfeit_pending: false,
            completion,
            detector: None,
            sound,
            rng,
        }
    }

    /// Current play-field size.
    pub fn field(&self) -> Size {
        self.bounds.size()
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Spawnable> {
        self.spawnables
            .iter()
            .filter(|s| s.kind == SpawnKind::Obstacle)
    }

    pub fn collectables(&self) -> impl Iterator<Item = &Spawnable> {
        self.spawnables
            .iter()
            .filter(|s| s.kind == SpawnKind::Collectable)
    }

    /// Add an entity of `kind` at horizontal ratio `x_ratio`, sized to match
    /// the sprites currently drawn.
    pub fn spawn(&mut self, kind: SpawnKind, type_id: usize, x_ratio: f64, now_ms: u64) {
        let size = self.applied_layout.spawnable(kind, type_id);
        let cadence = self.theme.cadence(kind, type_id);
        self.spawnables
            .push(Spawnable::new(kind, type_id, x_ratio, cadence, size, now_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::sprite::sheet;

    fn theme() -> ScrollerTheme {
        ScrollerTheme {
            name: "test",
            obstacle_sheets: vec![sheet(&["#"]), sheet(&["@", "O"])],
            collectable_sheets: vec![sheet(&["$"])],
            player_sheet: sheet(&["^"]),
            obstacle_cadence_ms: vec![100],
            collectable_cadence_ms: vec![],
            player_cadence_ms: 200,
            damaged_sounds: vec!["hit.wav".into()],
            collected_sounds: vec![],
            background_music: None,
            background: vec!["~"],
        }
    }

    #[test]
    fn test_theme_lookups_fall_back() {
        let theme = theme();
        assert_eq!(theme.cadence(SpawnKind::Obstacle, 0), 100);
        assert_eq!(theme.cadence(SpawnKind::Obstacle, 1), DEFAULT_CADENCE_MS);
        assert_eq!(theme.max_type(SpawnKind::Obstacle), Some(1));
        assert_eq!(theme.max_type(SpawnKind::Collectable), Some(0));
        assert_eq!(theme.sound(SpawnKind::Obstacle, 1), Some("hit.wav"));
        assert_eq!(theme.sound(SpawnKind::Collectable, 0), None);
    }

    #[test]
    fn test_layout_ratios() {
        let layout = ScrollerLayout::compute(Size::new(80, 40), &theme());
        assert_eq!(layout.obstacles, vec![Size::new(10, 5); 2]);
        assert_eq!(layout.collectables, vec![Size::new(10, 5)]);
        assert_eq!(layout.player, Size::new(16, 8));
    }

    #[test]
    fn test_spawnable_enters_above_and_leaves_below() {
        let field = Size::new(100, 50);
        let mut s = Spawnable::new(SpawnKind::Obstacle, 0, 1.0, 100, Size::new(10, 5), 0);
        assert_eq!(s.rect(field), Rect::new(90, -5, 10, 5));
        s.progress = 1.0;
        assert_eq!(s.rect(field).y, 50);
    }

    #[test]
    fn test_player_sits_on_bottom_edge() {
        let field = Size::new(100, 50);
        let mut player = Player::new(100, Size::new(20, 10), 0);
        assert_eq!(player.rect(field), Rect::new(40, 40, 20, 10));
        player.x_ratio = 0.0;
        assert_eq!(player.rect(field).x, 0);
    }

    #[test]
    fn test_drawable_lookup() {
        let sheets = ScrollerSheets::original(&theme());
        let s = Spawnable::new(SpawnKind::Obstacle, 1, 0.5, 100, Size::new(1, 1), 0);
        assert_eq!(s.frame_count(&sheets), 2);
        assert_eq!(s.draw_sprite(&sheets), Some(&Sprite::from_art("@")));

        let missing = Spawnable::new(SpawnKind::Collectable, 7, 0.5, 100, Size::new(1, 1), 0);
        assert_eq!(missing.frame_count(&sheets), 0);
        assert!(missing.draw_sprite(&sheets).is_none());
    }
}
