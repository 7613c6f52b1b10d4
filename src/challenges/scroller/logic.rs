//! River Run game logic: spawning, movement, input, collision, animation.

use super::types::*;
use crate::challenges::{process_forfeit, MiniGameType, Outcome, Score};
use crate::core::geometry::{Rect, Size};
use crate::core::input::{InputFrame, Key};
use crate::resources::sprite::{scale_sheet, Drawable, SpriteSheet};
use log::{debug, info, warn};
use rand::{Rng, RngCore};
use std::sync::Arc;
use std::time::Duration;

/// How many entities to spawn this frame for a rate of `rate` per second.
///
/// The whole part of `rate / fps` always spawns; the remainder becomes one
/// extra spawn with matching probability, so the long-run mean is exactly
/// `rate / fps` per frame.
pub fn spawn_count(rate: f64, fps: u32, rng: &mut dyn RngCore) -> u32 {
    if rate <= 0.0 || fps == 0 {
        return 0;
    }
    let fps = fps as f64;
    let whole = (rate / fps).floor() as u32;
    let fraction = (rate % fps) / fps;
    if fraction > rng.gen::<f64>() {
        whole + 1
    } else {
        whole
    }
}

/// Remove every entity overlapping `player` and return them in the order
/// they were stored.
pub fn take_collisions(player: Rect, spawnables: &mut Vec<Spawnable>, field: Size) -> Vec<Spawnable> {
    let mut hit = Vec::new();
    spawnables.retain(|s| {
        if s.rect(field).intersects(&player) {
            hit.push(s.clone());
            false
        } else {
            true
        }
    });
    hit
}

/// Arm the game and start the background music.
pub fn start(game: &mut ScrollerGame) {
    if game.started {
        return;
    }
    info!("starting {}", game.theme.name);
    game.started = true;
    game.redraw_requested = true;
    if let Some(music) = game.theme.background_music.as_deref() {
        game.sound.play_looped(music);
    }
}

/// Per-frame entry point.
pub fn update(game: &mut ScrollerGame, input: &InputFrame, timestamp_ms: u64) {
    if !game.started {
        return;
    }
    game.completion.observe(timestamp_ms);
    game.last_update_ms = timestamp_ms;
    apply_rescaled(game);

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
    // Frozen while the forfeit prompt is showing
    if game.forfeit_pending {
        game.redraw_requested = true;
        return;
    }

    step(game, input, timestamp_ms);
}

/// One frame of play.
pub fn step(game: &mut ScrollerGame, input: &InputFrame, timestamp_ms: u64) {
    game.tick_count += 1;

    // 1. Spawn
    for kind in [SpawnKind::Obstacle, SpawnKind::Collectable] {
        spawn_step(game, kind, timestamp_ms);
    }

    // 2. Movement
    let delta = game.config.scroll_speed / game.fps as f64;
    game.background_pos = (game.background_pos + delta).rem_euclid(1.0);
    for s in &mut game.spawnables {
        s.progress += delta;
    }
    game.spawnables.retain(|s| s.progress <= 1.0);

    // 3. Input
    move_player(game, input, timestamp_ms);

    // 4. Collision
    let field = game.field();
    let player_rect = game.player.rect(field);
    for hit in take_collisions(player_rect, &mut game.spawnables, field) {
        resolve_collision(game, &hit, timestamp_ms);
    }
    if game.lives == 0 {
        finish(game, Outcome::Completed, timestamp_ms);
        return;
    }

    // 5. Animation
    for s in &mut game.spawnables {
        let frames = s.frame_count(&game.sheets);
        s.anim.tick(timestamp_ms, frames);
    }
    let frames = game.player.frame_count(&game.sheets);
    game.player.anim.tick(timestamp_ms, frames);

    game.redraw_requested = true;
}

fn spawn_step(game: &mut ScrollerGame, kind: SpawnKind, timestamp_ms: u64) {
    let Some(max_type) = game.theme.max_type(kind) else {
        return;
    };
    let rate = match kind {
        SpawnKind::Obstacle => game.config.obstacles_per_second,
        SpawnKind::Collectable => game.config.collectables_per_second,
    };
    for _ in 0..spawn_count(rate, game.fps, game.rng.as_mut()) {
        let type_id = game.rng.gen_range(0..=max_type);
        let x_ratio = game.rng.gen::<f64>();
        game.spawn(kind, type_id, x_ratio, timestamp_ms);
    }
}

fn move_player(game: &mut ScrollerGame, input: &InputFrame, timestamp_ms: u64) {
    let delta = game.config.player_speed / game.fps as f64;
    let player = &mut game.player;

    let facing = if input.is_held(Key::Left) {
        player.x_ratio -= delta;
        Facing::Left
    } else if input.is_held(Key::Right) {
        player.x_ratio += delta;
        Facing::Right
    } else {
        Facing::Forward
    };
    player.x_ratio = player.x_ratio.clamp(0.0, 1.0);

    match player.damaged_until {
        Some(until) if timestamp_ms < until => player.facing = Facing::Damaged,
        _ => {
            player.damaged_until = None;
            player.facing = facing;
        }
    }
}

fn resolve_collision(game: &mut ScrollerGame, hit: &Spawnable, timestamp_ms: u64) {
    let sound = game.theme.sound(hit.kind, hit.type_id).map(str::to_owned);
    match hit.kind {
        SpawnKind::Obstacle => {
            debug!("hit obstacle {}", hit.type_id);
            game.damage += 1;
            game.lives = game.lives.saturating_sub(1);
            game.points = (game.points - game.config.damage_penalty).max(0);
            game.player.damaged_until = Some(timestamp_ms + game.config.damage_flash_ms);
            game.player.facing = Facing::Damaged;
        }
        SpawnKind::Collectable => {
            debug!("collected {}", hit.type_id);
            game.hits += 1;
            game.points += game.config.collect_points;
        }
    }
    if let Some(sound) = sound {
        game.sound.play(&sound);
    }
}

/// End play. The completion callback fires after the settle delay.
pub fn finish(game: &mut ScrollerGame, outcome: Outcome, timestamp_ms: u64) {
    if !game.completion.finish(outcome, timestamp_ms) {
        return;
    }
    info!(
        "{} over ({:?}): {} points, {} lives left",
        game.theme.name, outcome, game.points, game.lives
    );
    game.forfeit_pending = false;
    game.sound.stop_all();
    game.redraw_requested = true;
    game.completion.poll(timestamp_ms);
}

pub fn score(game: &ScrollerGame) -> Option<Score> {
    let outcome = game.completion.outcome()?;
    let mut score = Score::new(MiniGameType::Scroller, outcome);
    score.points = game.points;
    score.hits = game.hits;
    score.damage = game.damage;
    score.duration_ms = game.completion.elapsed(game.last_update_ms);
    Some(score)
}

/// Start rescaling every sheet for a `width` x `height` field. Any rescale
/// still running is cancelled.
pub fn request_rescale(game: &mut ScrollerGame, width: u16, height: u16) {
    let field = Size::new(width, height);
    let layout = ScrollerLayout::compute(field, &game.theme);
    if layout.player.is_empty() {
        warn!("{}: field {}x{} too small to draw, keeping old sprites", game.theme.name, width, height);
        game.rescaler.cancel();
        return;
    }
    debug!("{}: rescaling for {}x{}", game.theme.name, width, height);

    let theme = Arc::clone(&game.theme);
    game.rescaler.request(move |cancel| {
        let scale_all = |sheets: &[SpriteSheet], sizes: &[Size]| -> Option<Vec<SpriteSheet>> {
            sheets
                .iter()
                .zip(sizes)
                .map(|(sheet, &size)| scale_sheet(sheet, size, cancel))
                .collect()
        };
        let obstacles = scale_all(&theme.obstacle_sheets, &layout.obstacles)?;
        let collectables = scale_all(&theme.collectable_sheets, &layout.collectables)?;
        let player = scale_sheet(&theme.player_sheet, layout.player, cancel)?;
        Some((
            layout,
            ScrollerSheets {
                obstacles,
                collectables,
                player,
            },
        ))
    });
}

/// Swap in a finished rescale, if any. Returns true if one landed.
pub fn apply_rescaled(game: &mut ScrollerGame) -> bool {
    match game.rescaler.poll() {
        Some((layout, sheets)) => {
            install(game, layout, sheets);
            true
        }
        None => false,
    }
}

/// Block until the pending rescale lands or `timeout` passes.
pub fn wait_for_sprites(game: &mut ScrollerGame, timeout: Duration) -> bool {
    match game.rescaler.wait(timeout) {
        Some((layout, sheets)) => {
            install(game, layout, sheets);
            true
        }
        None => false,
    }
}

fn install(game: &mut ScrollerGame, layout: ScrollerLayout, sheets: ScrollerSheets) {
    for s in &mut game.spawnables {
        s.size = layout.spawnable(s.kind, s.type_id);
    }
    game.player.size = layout.player;
    game.sheets = sheets;
    game.applied_layout = layout;
    game.redraw_requested = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::completion::Completion;
    use crate::core::geometry::Bounds;
    use crate::resources::sound::SoundTrigger;
    use crate::resources::sprite::sheet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct Recorder {
        played: RefCell<Vec<String>>,
        looped: RefCell<Vec<String>>,
        stops: RefCell<u32>,
    }

    impl SoundTrigger for Recorder {
        fn play(&self, id: &str) {
            self.played.borrow_mut().push(id.to_string());
        }
        fn play_looped(&self, id: &str) {
            self.looped.borrow_mut().push(id.to_string());
        }
        fn stop_all(&self) {
            *self.stops.borrow_mut() += 1;
        }
    }

    fn theme() -> ScrollerTheme {
        ScrollerTheme {
            name: "test river",
            obstacle_sheets: vec![sheet(&["##\n##", "%%\n%%"])],
            collectable_sheets: vec![sheet(&["$"])],
            player_sheet: sheet(&["^^\n^^"]),
            obstacle_cadence_ms: vec![100],
            collectable_cadence_ms: vec![100],
            player_cadence_ms: 100,
            damaged_sounds: vec!["crash.wav".into()],
            collected_sounds: vec!["coin.wav".into()],
            background_music: Some("river.ogg".into()),
            background: vec!["~ ~"],
        }
    }

    fn quiet_config() -> ScrollerConfig {
        ScrollerConfig {
            obstacles_per_second: 0.0,
            collectables_per_second: 0.0,
            ..ScrollerConfig::default()
        }
    }

    fn game(config: ScrollerConfig, settle_ms: u64) -> (ScrollerGame, Rc<Recorder>, Arc<AtomicU32>) {
        let sound = Rc::new(Recorder::default());
        let fired = Arc::new(AtomicU32::new(0));
        let f = fired.clone();
        let completion = Completion::new(
            Box::new(move || {
                f.fetch_add(1, Ordering::SeqCst);
            }),
            0,
            settle_ms,
        );
        let mut game = ScrollerGame::new(
            config,
            60,
            theme(),
            sound.clone(),
            completion,
            Box::new(StdRng::seed_from_u64(7)),
        );
        game.bounds = Bounds::new(0, 0, 80, 40);
        request_rescale(&mut game, 80, 40);
        assert!(wait_for_sprites(&mut game, Duration::from_secs(5)));
        start(&mut game);
        (game, sound, fired)
    }

    /// An obstacle placed right over the player.
    fn obstacle_on_player(game: &mut ScrollerGame) {
        game.spawn(SpawnKind::Obstacle, 0, game.player.x_ratio, 0);
        if let Some(s) = game.spawnables.last_mut() {
            s.progress = 0.9;
        }
    }

    #[test]
    fn test_spawn_count_zero_rate() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(spawn_count(0.0, 60, &mut rng), 0);
        assert_eq!(spawn_count(-3.0, 60, &mut rng), 0);
    }

    #[test]
    fn test_spawn_count_whole_multiple_of_fps() {
        // Exactly one per frame, never zero and never two
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1_000 {
            assert_eq!(spawn_count(60.0, 60, &mut rng), 1);
        }
    }

    #[test]
    fn test_spawn_count_above_fps() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            let n = spawn_count(90.0, 60, &mut rng);
            assert!(n == 1 || n == 2);
        }
    }

    #[test]
    fn test_start_loops_music_once() {
        let (mut game, sound, _) = game(quiet_config(), 0);
        start(&mut game);
        assert_eq!(*sound.looped.borrow(), vec!["river.ogg".to_string()]);
    }

    #[test]
    fn test_update_ignored_before_start() {
        let sound = Rc::new(Recorder::default());
        let mut game = ScrollerGame::new(
            ScrollerConfig::default(),
            60,
            theme(),
            sound,
            Completion::new(Box::new(|| {}), 0, 0),
            Box::new(StdRng::seed_from_u64(1)),
        );
        update(&mut game, &InputFrame::default(), 100);
        assert_eq!(game.tick_count, 0);
        assert_eq!(game.completion.started_at(), None);
    }

    #[test]
    fn test_background_wraps() {
        let (mut game, _, _) = game(quiet_config(), 0);
        game.background_pos = 0.995;
        step(&mut game, &InputFrame::default(), 16);
        assert!(game.background_pos >= 0.0 && game.background_pos < 1.0);
        assert!(game.background_pos < 0.01);
    }

    #[test]
    fn test_player_moves_and_clamps() {
        let (mut game, _, _) = game(quiet_config(), 0);
        let left = InputFrame {
            keys: vec![Key::Left, Key::Right],
            ..InputFrame::default()
        };
        step(&mut game, &left, 16);
        assert!(game.player.x_ratio < 0.5);
        assert_eq!(game.player.facing, Facing::Left);

        for i in 0..200 {
            step(&mut game, &left, 32 + i);
        }
        assert_eq!(game.player.x_ratio, 0.0);

        step(&mut game, &InputFrame::default(), 1_000);
        assert_eq!(game.player.facing, Facing::Forward);
    }

    #[test]
    fn test_obstacle_costs_life_and_flashes() {
        let (mut game, sound, _) = game(quiet_config(), 0);
        game.points = 20;
        obstacle_on_player(&mut game);

        step(&mut game, &InputFrame::default(), 1_000);
        assert!(game.spawnables.is_empty());
        assert_eq!(game.lives, 2);
        assert_eq!(game.damage, 1);
        assert_eq!(game.points, 15);
        assert_eq!(game.player.facing, Facing::Damaged);
        assert_eq!(*sound.played.borrow(), vec!["crash.wav".to_string()]);

        // Flash ends after damage_flash_ms
        step(&mut game, &InputFrame::default(), 1_399);
        assert_eq!(game.player.facing, Facing::Damaged);
        step(&mut game, &InputFrame::default(), 1_400);
        assert_eq!(game.player.facing, Facing::Forward);
    }

    #[test]
    fn test_collectable_scores() {
        let (mut game, sound, _) = game(quiet_config(), 0);
        game.spawn(SpawnKind::Collectable, 0, game.player.x_ratio, 0);
        game.spawnables[0].progress = 0.95;
        step(&mut game, &InputFrame::default(), 16);
        assert_eq!(game.hits, 1);
        assert_eq!(game.points, 10);
        assert_eq!(game.lives, 3);
        assert_eq!(*sound.played.borrow(), vec!["coin.wav".to_string()]);
    }

    #[test]
    fn test_simultaneous_collisions_resolve_in_order() {
        let (mut game, sound, _) = game(quiet_config(), 0);
        obstacle_on_player(&mut game);
        game.spawn(SpawnKind::Collectable, 0, game.player.x_ratio, 0);
        game.spawnables[1].progress = 0.95;
        obstacle_on_player(&mut game);

        step(&mut game, &InputFrame::default(), 16);
        assert!(game.spawnables.is_empty());
        assert_eq!(game.lives, 1);
        assert_eq!(game.hits, 1);
        assert_eq!(
            *sound.played.borrow(),
            vec!["crash.wav".to_string(), "coin.wav".to_string(), "crash.wav".to_string()]
        );
    }

    #[test]
    fn test_last_life_finishes_and_fires_once() {
        let (mut game, sound, fired) = game(quiet_config(), 1_000);
        game.lives = 1;
        obstacle_on_player(&mut game);

        update(&mut game, &InputFrame::default(), 5_000);
        assert_eq!(game.completion.outcome(), Some(Outcome::Completed));
        assert_eq!(*sound.stops.borrow(), 1);
        assert_eq!(score(&game).map(|s| s.damage), Some(1));

        update(&mut game, &InputFrame::default(), 5_999);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        update(&mut game, &InputFrame::default(), 6_000);
        update(&mut game, &InputFrame::default(), 7_000);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_forfeit_pauses_then_ends() {
        let (mut game, _, _) = game(quiet_config(), 0);
        let escape = InputFrame {
            pressed: vec![Key::Escape],
            ..InputFrame::default()
        };
        update(&mut game, &InputFrame::default(), 0);
        let ticks = game.tick_count;

        update(&mut game, &escape, 16);
        assert!(game.forfeit_pending);
        update(&mut game, &InputFrame::default(), 32);
        assert_eq!(game.tick_count, ticks);

        update(&mut game, &escape, 48);
        assert_eq!(score(&game).map(|s| s.outcome), Some(Outcome::Forfeited));
    }

    #[test]
    fn test_timeout_still_scores() {
        let sound = Rc::new(Recorder::default());
        let mut game = ScrollerGame::new(
            quiet_config(),
            60,
            theme(),
            sound,
            Completion::new(Box::new(|| {}), 500, 0),
            Box::new(StdRng::seed_from_u64(1)),
        );
        start(&mut game);
        update(&mut game, &InputFrame::default(), 1_000);
        assert!(score(&game).is_none());
        update(&mut game, &InputFrame::default(), 1_500);
        let score = score(&game);
        assert_eq!(score.as_ref().map(|s| s.outcome), Some(Outcome::TimedOut));
        assert_eq!(score.map(|s| s.duration_ms), Some(500));
    }

    #[test]
    fn test_rescale_resizes_live_entities() {
        let (mut game, _, _) = game(quiet_config(), 0);
        game.spawn(SpawnKind::Obstacle, 0, 0.2, 0);
        assert_eq!(game.spawnables[0].size, Size::new(10, 5));

        request_rescale(&mut game, 160, 80);
        assert!(wait_for_sprites(&mut game, Duration::from_secs(5)));
        assert_eq!(game.spawnables[0].size, Size::new(20, 10));
        assert_eq!(game.player.size, Size::new(32, 16));
        assert_eq!(game.sheets.player[0].size(), Size::new(32, 16));
        assert_eq!(game.sheets.obstacles[0].len(), 2);
    }

    #[test]
    fn test_tiny_field_keeps_sprites() {
        let (mut game, _, _) = game(quiet_config(), 0);
        request_rescale(&mut game, 3, 2);
        assert!(!game.rescaler.is_pending());
        assert_eq!(game.player.size, Size::new(16, 8));
    }

    #[test]
    fn test_entities_animate_on_cadence() {
        let (mut game, _, _) = game(quiet_config(), 0);
        game.spawn(SpawnKind::Obstacle, 0, 0.0, 0);
        step(&mut game, &InputFrame::default(), 50);
        assert_eq!(game.spawnables[0].anim.frame(), 0);
        step(&mut game, &InputFrame::default(), 101);
        assert_eq!(game.spawnables[0].anim.frame(), 1);
        step(&mut game, &InputFrame::default(), 150);
        assert_eq!(game.spawnables[0].anim.frame(), 1);
    }
}
