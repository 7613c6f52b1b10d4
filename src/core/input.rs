//! Key-input source.
//!
//! The frame driver pushes raw terminal events into a [`KeyDetector`]; once
//! per tick the handler takes an [`InputFrame`] snapshot and passes it to
//! whichever screen is active.

use std::cell::RefCell;
use std::collections::HashMap;

/// UI-agnostic keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Enter,
    Space,
    Escape,
    Char(char),
}

impl Key {
    /// Keys that advance the word and score screens.
    pub fn is_confirm(self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// A position in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Everything a screen may read during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    /// Keys currently held.
    pub keys: Vec<Key>,
    /// Keys pressed since the previous snapshot, in arrival order.
    pub pressed: Vec<Key>,
    /// Last known pointer position, in screen coordinates.
    pub pointer: Option<Point>,
    /// Primary-button presses since the previous snapshot.
    pub clicks: Vec<Point>,
}

impl InputFrame {
    pub fn is_held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

#[derive(Debug, Default)]
struct DetectorState {
    last_seen: HashMap<Key, u64>,
    pressed: Vec<Key>,
    pointer: Option<Point>,
    clicks: Vec<Point>,
}

/// Collects input between ticks. Shared between the driver and the active
/// screen via `Rc`; all access happens on the frame loop thread.
#[derive(Debug)]
pub struct KeyDetector {
    hold_window_ms: u64,
    state: RefCell<DetectorState>,
}

impl KeyDetector {
    pub fn new(hold_window_ms: u64) -> Self {
        Self {
            hold_window_ms,
            state: RefCell::new(DetectorState::default()),
        }
    }

    /// Record a press (or auto-repeat) of `key` at `timestamp_ms`.
    pub fn press(&self, key: Key, timestamp_ms: u64) {
        let mut state = self.state.borrow_mut();
        state.last_seen.insert(key, timestamp_ms);
        state.pressed.push(key);
    }

    /// Record an explicit release, for terminals that report one.
    pub fn release(&self, key: Key) {
        self.state.borrow_mut().last_seen.remove(&key);
    }

    pub fn move_pointer(&self, point: Point) {
        self.state.borrow_mut().pointer = Some(point);
    }

    pub fn click(&self, point: Point) {
        let mut state = self.state.borrow_mut();
        state.pointer = Some(point);
        state.clicks.push(point);
    }

    /// Keys held at `timestamp_ms`, without consuming anything.
    pub fn active_keys(&self, timestamp_ms: u64) -> Vec<Key> {
        let state = self.state.borrow();
        let mut keys: Vec<Key> = state
            .last_seen
            .iter()
            .filter(|(_, &seen)| timestamp_ms.saturating_sub(seen) <= self.hold_window_ms)
            .map(|(&key, _)| key)
            .collect();
        keys.sort();
        keys
    }

    /// Take this tick's snapshot. Presses and clicks are drained; held keys
    /// and the pointer persist.
    pub fn snapshot(&self, timestamp_ms: u64) -> InputFrame {
        let keys = self.active_keys(timestamp_ms);
        let mut state = self.state.borrow_mut();
        let hold = self.hold_window_ms;
        state
            .last_seen
            .retain(|_, seen| timestamp_ms.saturating_sub(*seen) <= hold);
        InputFrame {
            keys,
            pressed: std::mem::take(&mut state.pressed),
            pointer: state.pointer,
            clicks: std::mem::take(&mut state.clicks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_held_within_window() {
        let detector = KeyDetector::new(100);
        detector.press(Key::Left, 1_000);

        assert_eq!(detector.active_keys(1_050), vec![Key::Left]);
        assert_eq!(detector.active_keys(1_100), vec![Key::Left]);
        assert!(detector.active_keys(1_101).is_empty());
    }

    #[test]
    fn test_release_clears_hold() {
        let detector = KeyDetector::new(100);
        detector.press(Key::Right, 0);
        detector.release(Key::Right);
        assert!(detector.active_keys(10).is_empty());
    }

    #[test]
    fn test_snapshot_drains_presses_and_clicks() {
        let detector = KeyDetector::new(100);
        detector.press(Key::Enter, 0);
        detector.click(Point::new(3, 4));

        let first = detector.snapshot(10);
        assert_eq!(first.pressed, vec![Key::Enter]);
        assert_eq!(first.clicks, vec![Point::new(3, 4)]);
        assert!(first.is_held(Key::Enter));
        assert_eq!(first.pointer, Some(Point::new(3, 4)));

        let second = detector.snapshot(20);
        assert!(second.pressed.is_empty());
        assert!(second.clicks.is_empty());
        assert!(second.is_held(Key::Enter));
        assert_eq!(second.pointer, Some(Point::new(3, 4)));
    }

    #[test]
    fn test_confirm_keys() {
        assert!(Key::Enter.is_confirm());
        assert!(Key::Space.is_confirm());
        assert!(!Key::Escape.is_confirm());
        assert!(!Key::Char('a').is_confirm());
    }
}
