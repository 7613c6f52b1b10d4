// Frame driver
pub const FPS: u32 = 60;

// Mini-game lifecycle
pub const SETTLE_DELAY_MS: u64 = 1000;
pub const DEFAULT_MINI_GAME_TIMEOUT_MS: u64 = 30_000;

// Terminals only report presses (and repeats), so a key counts as held for
// this long after its last event.
pub const KEY_HOLD_WINDOW_MS: u64 = 120;

// Whack mini-game
pub const WHACKED_REVERT_MS: u64 = 750;
pub const HAMMER_MOVE_MS: u64 = 175;
pub const HAMMER_WAIT_MS: u64 = 25;

// Scroller layout, as fractions of the play field
pub const SPAWNABLE_SIZE_RATIO: f64 = 1.0 / 8.0;
pub const PLAYER_SIZE_RATIO: f64 = 1.0 / 5.0;

// Whack layout, as fractions of one grid slot
pub const WHACK_CELL_RATIO: f64 = 2.0 / 3.0;
pub const HAMMER_HEIGHT_RATIO: f64 = 4.0 / 3.0;
