//! Whack-a-Word game logic: surfacing, hit resolution, animation.

use super::types::*;
use crate::challenges::{process_forfeit, MiniGameType, Outcome, Score};
use crate::core::constants::{HAMMER_MOVE_MS, HAMMER_WAIT_MS};
use crate::core::geometry::Size;
use crate::core::input::{InputFrame, Point};
use crate::resources::sprite::{scale_sheet, Drawable};
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Chance per idle cell per frame that a mole surfaces.
///
/// Normalised over the grid and frame rate so the whole board surfaces one
/// mole every `spawn_chance` seconds on average.
pub fn spawn_probability(spawn_chance: f64, fps: u32, rows: usize, columns: usize) -> f64 {
    let denominator = spawn_chance * fps as f64 * (rows * columns) as f64;
    if denominator <= 0.0 {
        0.0
    } else {
        (1.0 / denominator).min(1.0)
    }
}

pub fn start(game: &mut WhackGame) {
    if game.started {
        return;
    }
    info!(
        "starting {} ({}x{})",
        game.theme.name, game.config.columns, game.config.rows
    );
    game.started = true;
    game.redraw_requested = true;
}

pub fn update(game: &mut WhackGame, input: &InputFrame, timestamp_ms: u64) {
    if !game.started {
        return;
    }
    game.completion.observe(timestamp_ms);
    game.last_update_ms = timestamp_ms;
    apply_rescaled(game);

    if let Some(pointer) = input.pointer {
        track_pointer(game, pointer);
    }

    if game.completion.is_finished() {
        game.completion.poll(timestamp_ms);
        return;
    }

    if process_forfeit(&mut game.forfeit_pending, input) {
        finish(game, Outcome::Forfeited, timestamp_ms);
        return;
    }
    if game.completion.timed_out(timestamp_ms) {
        finish(game, Outcome::TimedOut, timestamp_ms);
        return;
    }
    if game.forfeit_pending {
        game.redraw_requested = true;
        return;
    }

    step(game, input, timestamp_ms);
}

/// One frame of play.
pub fn step(game: &mut WhackGame, input: &InputFrame, timestamp_ms: u64) {
    game.tick_count += 1;

    // 1. Surface moles
    let chance = spawn_probability(
        game.config.spawn_chance,
        game.fps,
        game.config.rows,
        game.config.columns,
    );
    let (rise, stay) = (game.config.rise_ms, game.config.stay_ms);
    for cell in &mut game.cells {
        if cell.state() == CellState::Idle && chance > game.rng.gen::<f64>() {
            cell.show_whackable(rise, stay, timestamp_ms);
        }
    }

    // 2. Hits
    for &click in &input.clicks {
        let local = Point::new(click.x - game.bounds.x, click.y - game.bounds.y);
        if !try_whack(game, local, timestamp_ms) {
            game.misses += 1;
        }
    }

    // 3. Animation
    for cell in &mut game.cells {
        let frames = cell.frame_count(&game.sheets);
        cell.update(timestamp_ms, frames);
    }
    let frames = game.hammer.frame_count(&game.sheets);
    game.hammer.update(timestamp_ms, frames);

    game.redraw_requested = true;
}

/// Swing at field point `at`. A hit needs an idle hammer and a whackable
/// cell under the point.
pub fn try_whack(game: &mut WhackGame, at: Point, timestamp_ms: u64) -> bool {
    if !game.hammer.can_whack() {
        return false;
    }
    let Some(index) = game.layout.cell_at(at.x, at.y) else {
        return false;
    };
    let Some(cell) = game.cells.get_mut(index) else {
        return false;
    };
    if !cell.whack(timestamp_ms)
        || !game.hammer.whack(HAMMER_MOVE_MS, HAMMER_WAIT_MS, timestamp_ms)
    {
        return false;
    }

    debug!("whacked cell {} at {}ms", index, timestamp_ms);
    game.hits += 1;
    game.points += game.config.points_per_whack;
    let sounds = &game.theme.whack_sounds;
    if !sounds.is_empty() {
        let sound = &sounds[(game.hits as usize - 1) % sounds.len()];
        game.sound.play(sound);
    }
    true
}

/// Follow the pointer, given in screen coordinates.
pub fn track_pointer(game: &mut WhackGame, pointer: Point) {
    let local = Point::new(pointer.x - game.bounds.x, pointer.y - game.bounds.y);
    if local != game.hammer.position {
        game.hammer.track(local);
        game.redraw_requested = true;
    }
}

pub fn finish(game: &mut WhackGame, outcome: Outcome, timestamp_ms: u64) {
    if !game.completion.finish(outcome, timestamp_ms) {
        return;
    }
    info!(
        "{} over ({:?}): {} points, {} hits, {} misses",
        game.theme.name, outcome, game.points, game.hits, game.misses
    );
    game.forfeit_pending = false;
    game.sound.stop_all();
    game.redraw_requested = true;
    game.completion.poll(timestamp_ms);
}

pub fn score(game: &WhackGame) -> Option<Score> {
    let outcome = game.completion.outcome()?;
    let mut score = Score::new(MiniGameType::Whack, outcome);
    score.points = game.points;
    score.hits = game.hits;
    score.misses = game.misses;
    score.duration_ms = game.completion.elapsed(game.last_update_ms);
    Some(score)
}

/// Start rescaling for a `width` x `height` field, superseding any rescale
/// in flight. The grid moves when the new sprites land.
pub fn request_rescale(game: &mut WhackGame, width: u16, height: u16) {
    let layout = WhackLayout::compute(
        Size::new(width, height),
        game.config.columns,
        game.config.rows,
    );
    if layout.cell.is_empty() {
        warn!("{}: field {}x{} too small to draw, keeping old sprites", game.theme.name, width, height);
        game.rescaler.cancel();
        return;
    }
    debug!("{}: rescaling for {}x{}", game.theme.name, width, height);

    let theme = Arc::clone(&game.theme);
    game.rescaler.request(move |cancel| {
        let mole = scale_sheet(&theme.mole_sheet, layout.cell, cancel)?;
        let whacked = scale_sheet(&theme.whacked_sheet, layout.cell, cancel)?;
        let hammer = scale_sheet(&theme.hammer_sheet, layout.hammer, cancel)?;
        Some((
            layout,
            WhackSheets {
                mole,
                whacked,
                hammer,
            },
        ))
    });
}

pub fn apply_rescaled(game: &mut WhackGame) -> bool {
    match game.rescaler.poll() {
        Some((layout, sheets)) => {
            install(game, layout, sheets);
            true
        }
        None => false,
    }
}

pub fn wait_for_sprites(game: &mut WhackGame, timeout: Duration) -> bool {
    match game.rescaler.wait(timeout) {
        Some((layout, sheets)) => {
            install(game, layout, sheets);
            true
        }
        None => false,
    }
}

fn install(game: &mut WhackGame, layout: WhackLayout, sheets: WhackSheets) {
    game.hammer.size = layout.hammer;
    game.sheets = sheets;
    game.layout = layout;
    game.redraw_requested = true;
}
