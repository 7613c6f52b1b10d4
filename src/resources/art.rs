//! Built-in sprite art and sound identifiers for the two mini-games.

use super::sprite::sheet;
use crate::challenges::scroller::ScrollerTheme;
use crate::challenges::whack::WhackTheme;

// ── River Run ───────────────────────────────────────────────────────

const ROCK_A: &str = r" ▄██▄
▐████▌
 ▀██▀";
const ROCK_B: &str = r" ▄▓▓▄
▐▓██▓▌
 ▀▓▓▀";

const LOG_A: &str = r"╔════╗
║○○○○║
╚════╝";
const LOG_B: &str = r"╔════╗
║○ ○○║
╚════╝";

const COIN_A: &str = r" ╭─╮
 │$│
 ╰─╯";
const COIN_B: &str = r"  │
 │$│
  │";

const CANOE_A: &str = r"  ▲
 ╱█╲
 █▓█
 ╲█╱";
const CANOE_B: &str = r"  ▲
 ╱█╲
 █░█
 ╲█╱";

pub fn river_theme() -> ScrollerTheme {
    ScrollerTheme {
        name: "River Run",
        obstacle_sheets: vec![sheet(&[ROCK_A, ROCK_B]), sheet(&[LOG_A, LOG_B])],
        collectable_sheets: vec![sheet(&[COIN_A, COIN_B])],
        player_sheet: sheet(&[CANOE_A, CANOE_B]),
        obstacle_cadence_ms: vec![400, 250],
        collectable_cadence_ms: vec![150],
        player_cadence_ms: 300,
        damaged_sounds: vec!["crash.wav".into(), "splash.wav".into()],
        collected_sounds: vec!["coin.wav".into()],
        background_music: Some("river.wav".into()),
        background: vec![
            "  ~      ~~       ~     ",
            "     ~~       ~      ~  ",
            " ~        ~      ~~     ",
            "    ~   ~~    ~      ~  ",
        ],
    }
}

// ── Whack-a-Word ────────────────────────────────────────────────────

const HOLE: &str = r"

 ▁▁▁▁▁▁
(______)";
const MOLE_PEEK: &str = r"

 ▄████▄
(█▀▀▀▀█)";
const MOLE_HALF: &str = r"
 ▄████▄
 █ ●● █
(██▼▼██)";
const MOLE_UP: &str = r" ▄████▄
 █ ●● █
 █ ▼▼ █
(██████)";

const MOLE_WHACKED: &str = r" ★ ✶ ★
 ▄████▄
 █ ×× █
(██████)";

const HAMMER_UP: &str = r"▐██▌
▐██▌
 ││
 ││
 ││";
const HAMMER_DOWN: &str = r"
▄▄▄▄
████
 ││
 ││";

pub fn mole_theme() -> WhackTheme {
    WhackTheme {
        name: "Whack-a-Word",
        mole_sheet: sheet(&[HOLE, MOLE_PEEK, MOLE_HALF, MOLE_UP]),
        whacked_sheet: sheet(&[MOLE_WHACKED]),
        hammer_sheet: sheet(&[HAMMER_UP, HAMMER_DOWN]),
        whack_sounds: vec!["bonk.wav".into(), "squeak.wav".into()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_river_tables_line_up() {
        let theme = river_theme();
        assert_eq!(theme.obstacle_sheets.len(), theme.obstacle_cadence_ms.len());
        assert_eq!(theme.collectable_sheets.len(), theme.collectable_cadence_ms.len());
        assert!(theme.obstacle_sheets.iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn test_mole_frames_same_height() {
        let theme = mole_theme();
        let heights: Vec<usize> = theme.mole_sheet.iter().map(|s| s.height()).collect();
        assert_eq!(heights, vec![4; 4]);
    }
}
