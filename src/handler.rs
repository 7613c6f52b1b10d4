//! The play-through orchestrator.
//!
//! One [`MiniGameHandler`] runs one word: the word prompt, its mini-game,
//! then the score screen. The order is fixed and every transition checks
//! that it comes from the state immediately before it:
//!
//! ```text
//! None -> ShowWord -> EndWord -> ShowGame -> EndGame -> ShowScore -> EndScore -> Finished
//! ```
//!
//! Screens report completion through callbacks that post a [`HandlerEvent`];
//! the handler drains those at the end of [`MiniGameHandler::update`] and
//! performs the matching transition, so a screen never re-enters the
//! handler while it is being updated.

use crate::challenges::{Callback, MiniGame, MiniGameKind, Score};
use crate::core::config::GameConfig;
use crate::core::error::HandlerError;
use crate::core::geometry::Bounds;
use crate::core::input::{InputFrame, KeyDetector};
use crate::resources::sound::SoundTrigger;
use crate::screens::{CursorStyle, Screen, ScreenKind, ScoreScreen, WordScreen};
use crate::word::Word;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{error, info};
use rand::RngCore;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    None,
    ShowWord,
    EndWord,
    ShowGame,
    EndGame,
    ShowScore,
    EndScore,
    Finished,
}

/// What the handler needs from the application around it.
pub trait Host {
    fn add_screen(&mut self, kind: ScreenKind);
    fn remove_screen(&mut self, kind: ScreenKind);
    fn set_cursor(&mut self, cursor: CursorStyle);
    fn config(&self) -> &GameConfig;
    fn sound(&self) -> Rc<dyn SoundTrigger>;
    /// Random source for the next mini-game.
    fn rng(&mut self) -> Box<dyn RngCore>;
}

/// Completion notices posted by screen callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerEvent {
    WordDone,
    GameDone,
    ScoreDone,
}

/// The one screen currently shown.
pub enum ActiveScreen {
    Word(WordScreen),
    Game(MiniGameKind),
    Score(ScoreScreen),
}

impl ActiveScreen {
    pub fn kind(&self) -> ScreenKind {
        match self {
            ActiveScreen::Word(_) => ScreenKind::Word,
            ActiveScreen::Game(_) => ScreenKind::MiniGame,
            ActiveScreen::Score(_) => ScreenKind::Score,
        }
    }
}

pub struct MiniGameHandler<H: Host> {
    host: H,
    word: Word,
    question_language: String,
    answer_language: String,
    timeout_ms: u64,
    state: State,
    active: Option<ActiveScreen>,
    bounds: Bounds,
    detector: Option<Rc<KeyDetector>>,
    score: Option<Score>,
    on_finished: Option<Callback>,
    events_tx: Sender<HandlerEvent>,
    events_rx: Receiver<HandlerEvent>,
}

impl<H: Host> MiniGameHandler<H> {
    pub fn new(
        host: H,
        word: Word,
        question_language: &str,
        answer_language: &str,
        on_finished: Callback,
        timeout_ms: u64,
    ) -> Result<Self, HandlerError> {
        if question_language.is_empty() {
            return Err(HandlerError::MissingLanguage("question"));
        }
        if answer_language.is_empty() {
            return Err(HandlerError::MissingLanguage("answer"));
        }
        let (events_tx, events_rx) = unbounded();
        Ok(Self {
            host,
            word,
            question_language: question_language.to_string(),
            answer_language: answer_language.to_string(),
            timeout_ms,
            state: State::None,
            active: None,
            bounds: Bounds::default(),
            detector: None,
            score: None,
            on_finished: Some(on_finished),
            events_tx,
            events_rx,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn word(&self) -> &Word {
        &self.word
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The mini-game's result once it has ended.
    pub fn score(&self) -> Option<&Score> {
        self.score.as_ref()
    }

    pub fn active(&self) -> Option<&ActiveScreen> {
        self.active.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    fn check_state(&self, expected: State) -> Result<(), HandlerError> {
        if self.state == expected {
            return Ok(());
        }
        let err = HandlerError::IllegalState {
            expected,
            found: self.state,
        };
        error!("{}", err);
        Err(err)
    }

    fn notify(&self, event: HandlerEvent) -> Callback {
        let tx = self.events_tx.clone();
        Box::new(move || {
            // Receiver gone means the handler was dropped
            let _ = tx.send(event);
        })
    }

    /// Show the word prompt.
    pub fn begin(&mut self) -> Result<(), HandlerError> {
        self.check_state(State::None)?;
        info!("showing word '{}'", self.word.question);
        let mut screen = WordScreen::new(
            &self.word.question,
            &self.word.answer,
            &self.question_language,
            &self.answer_language,
            self.notify(HandlerEvent::WordDone),
        );
        screen.set_bounds(self.bounds);
        self.active = Some(ActiveScreen::Word(screen));
        self.host.add_screen(ScreenKind::Word);
        self.state = State::ShowWord;
        Ok(())
    }

    pub fn end_word_screen(&mut self) -> Result<(), HandlerError> {
        self.check_state(State::ShowWord)?;
        self.state = State::EndWord;
        self.dismiss(ScreenKind::Word);
        self.start_mini_game()
    }

    fn start_mini_game(&mut self) -> Result<(), HandlerError> {
        self.check_state(State::EndWord)?;
        let on_done = self.notify(HandlerEvent::GameDone);
        let sound = self.host.sound();
        let rng = self.host.rng();
        let mut game =
            self.word
                .create_mini_game(self.host.config(), sound, rng, on_done, self.timeout_ms);
        info!("starting mini-game {}", game.game_type().name());

        game.use_key_detector(self.detector.clone());
        game.set_bounds(self.bounds);
        self.host.set_cursor(game.cursor());
        self.host.add_screen(ScreenKind::MiniGame);
        game.start();
        self.active = Some(ActiveScreen::Game(game));
        self.state = State::ShowGame;
        Ok(())
    }

    /// The mini-game finished; collect its score and move on.
    pub fn mini_game_ended(&mut self) -> Result<(), HandlerError> {
        self.check_state(State::ShowGame)?;
        self.state = State::EndGame;
        if let Some(ActiveScreen::Game(game)) = &self.active {
            self.score = game.score();
        }
        self.dismiss(ScreenKind::MiniGame);
        self.start_score_screen()
    }

    fn start_score_screen(&mut self) -> Result<(), HandlerError> {
        self.check_state(State::EndGame)?;
        let Some(score) = self.score.clone() else {
            error!("mini-game ended without a score, skipping score screen");
            self.clean_up();
            return Ok(());
        };
        info!("showing score: {} points", score.points);
        let mut screen = ScoreScreen::new(score, self.notify(HandlerEvent::ScoreDone));
        screen.set_bounds(self.bounds);
        self.host.add_screen(ScreenKind::Score);
        screen.begin();
        self.active = Some(ActiveScreen::Score(screen));
        self.state = State::ShowScore;
        Ok(())
    }

    pub fn end_score_screen(&mut self) -> Result<(), HandlerError> {
        self.check_state(State::ShowScore)?;
        self.state = State::EndScore;
        self.dismiss(ScreenKind::Score);
        self.clean_up();
        Ok(())
    }

    fn dismiss(&mut self, kind: ScreenKind) {
        self.active = None;
        self.host.remove_screen(kind);
        self.host.set_cursor(CursorStyle::Default);
    }

    /// Release every screen and report the end of the play-through. The
    /// finished callback runs at most once.
    fn clean_up(&mut self) {
        self.active = None;
        self.state = State::Finished;
        info!("play-through of '{}' finished", self.word.question);
        if let Some(callback) = self.on_finished.take() {
            callback();
        }
    }

    /// The screen that should be showing in the current state. Logs when
    /// it is unexpectedly missing.
    fn active_screen(&mut self) -> Option<&mut dyn Screen> {
        let expected = match self.state {
            State::ShowWord => ScreenKind::Word,
            State::ShowGame => ScreenKind::MiniGame,
            State::ShowScore => ScreenKind::Score,
            _ => return None,
        };
        let have = self.active.as_ref().map(ActiveScreen::kind);
        if have != Some(expected) {
            error!(
                "no {:?} screen in state {:?} (have {:?})",
                expected, self.state, have
            );
            return None;
        }
        match self.active.as_mut() {
            Some(ActiveScreen::Word(s)) => Some(s),
            Some(ActiveScreen::Game(g)) => Some(g),
            Some(ActiveScreen::Score(s)) => Some(s),
            None => None,
        }
    }

    /// One frame: update the active screen with this tick's input, then
    /// act on any completions it reported.
    pub fn update(&mut self, timestamp_ms: u64) -> Result<(), HandlerError> {
        let input = self
            .detector
            .as_ref()
            .map(|d| d.snapshot(timestamp_ms))
            .unwrap_or_default();
        self.update_with(&input, timestamp_ms)
    }

    /// Like [`update`](Self::update) with an explicit input frame.
    pub fn update_with(&mut self, input: &InputFrame, timestamp_ms: u64) -> Result<(), HandlerError> {
        if let Some(screen) = self.active_screen() {
            screen.update(input, timestamp_ms);
        }
        self.process_events()
    }

    fn process_events(&mut self) -> Result<(), HandlerError> {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                HandlerEvent::WordDone => self.end_word_screen()?,
                HandlerEvent::GameDone => self.mini_game_ended()?,
                HandlerEvent::ScoreDone => self.end_score_screen()?,
            }
        }
        Ok(())
    }

    pub fn set_bounds(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.bounds = Bounds::new(x, y, width, height);
        let bounds = self.bounds;
        if let Some(screen) = self.active_screen() {
            screen.set_bounds(bounds);
        }
    }

    pub fn set_location(&mut self, x: i32, y: i32) {
        self.set_bounds(x, y, self.bounds.width, self.bounds.height);
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.set_bounds(self.bounds.x, self.bounds.y, width, height);
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn repaint(&mut self) {
        if let Some(screen) = self.active_screen() {
            screen.repaint();
        }
    }

    pub fn take_redraw(&mut self) -> bool {
        self.active_screen().is_some_and(|s| s.take_redraw())
    }

    /// Input source for every later screen, handed on to the running
    /// mini-game too.
    pub fn use_key_detector(&mut self, detector: Option<Rc<KeyDetector>>) {
        if let Some(ActiveScreen::Game(game)) = self.active.as_mut() {
            game.use_key_detector(detector.clone());
        }
        self.detector = detector;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::MiniGameType;
    use crate::core::input::Key;
    use crate::resources::sound::Silence;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct TestHost {
        config: GameConfig,
        mounted: Vec<ScreenKind>,
        cursor: CursorStyle,
    }

    impl Host for TestHost {
        fn add_screen(&mut self, kind: ScreenKind) {
            self.mounted.push(kind);
        }
        fn remove_screen(&mut self, kind: ScreenKind) {
            self.mounted.retain(|k| *k != kind);
        }
        fn set_cursor(&mut self, cursor: CursorStyle) {
            self.cursor = cursor;
        }
        fn config(&self) -> &GameConfig {
            &self.config
        }
        fn sound(&self) -> Rc<dyn SoundTrigger> {
            Rc::new(Silence)
        }
        fn rng(&mut self) -> Box<dyn RngCore> {
            Box::new(StdRng::seed_from_u64(3))
        }
    }

    fn handler(game: MiniGameType) -> (MiniGameHandler<TestHost>, Arc<AtomicU32>) {
        let mut config = GameConfig::default();
        config.settle_delay_ms = 0;
        let host = TestHost {
            config,
            mounted: Vec::new(),
            cursor: CursorStyle::Default,
        };
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let handler = MiniGameHandler::new(
            host,
            Word::new("tree", "Baum", game),
            "English",
            "German",
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }),
            100,
        )
        .unwrap();
        (handler, count)
    }

    fn confirm() -> InputFrame {
        InputFrame {
            pressed: vec![Key::Enter],
            ..InputFrame::default()
        }
    }

    #[test]
    fn test_rejects_empty_language() {
        let host = TestHost {
            config: GameConfig::default(),
            mounted: Vec::new(),
            cursor: CursorStyle::Default,
        };
        let result = MiniGameHandler::new(
            host,
            Word::new("a", "b", MiniGameType::Whack),
            "",
            "German",
            Box::new(|| {}),
            0,
        );
        assert!(matches!(result, Err(HandlerError::MissingLanguage("question"))));
    }

    #[test]
    fn test_begin_twice_is_illegal() {
        let (mut handler, _) = handler(MiniGameType::Whack);
        handler.begin().unwrap();
        assert_eq!(
            handler.begin(),
            Err(HandlerError::IllegalState {
                expected: State::None,
                found: State::ShowWord,
            })
        );
        assert_eq!(handler.state(), State::ShowWord);
    }

    #[test]
    fn test_whack_hides_cursor_until_it_ends() {
        let (mut handler, _) = handler(MiniGameType::Whack);
        handler.begin().unwrap();
        handler.end_word_screen().unwrap();
        assert_eq!(handler.state(), State::ShowGame);
        assert_eq!(handler.host().cursor, CursorStyle::Hidden);
        assert_eq!(handler.host().mounted, vec![ScreenKind::MiniGame]);

        handler.update_with(&InputFrame::default(), 0).unwrap();
        handler.update_with(&InputFrame::default(), 100).unwrap();
        assert_eq!(handler.state(), State::ShowScore);
        assert_eq!(handler.host().cursor, CursorStyle::Default);
        assert_eq!(handler.host().mounted, vec![ScreenKind::Score]);
    }

    #[test]
    fn test_full_run_through_callbacks() {
        let (mut handler, count) = handler(MiniGameType::Scroller);
        handler.set_bounds(0, 0, 80, 40);
        handler.begin().unwrap();

        handler.update_with(&confirm(), 0).unwrap();
        handler.update_with(&confirm(), 16).unwrap();
        assert_eq!(handler.state(), State::ShowGame);

        handler.update_with(&InputFrame::default(), 32).unwrap();
        handler.update_with(&InputFrame::default(), 200).unwrap();
        assert_eq!(handler.state(), State::ShowScore);
        assert!(handler.score().is_some());

        handler.update_with(&confirm(), 300).unwrap();
        assert_eq!(handler.state(), State::Finished);
        assert!(handler.active().is_none());
        assert!(handler.host().mounted.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Finished swallows further frames
        handler.update_with(&confirm(), 400).unwrap();
        handler.repaint();
        assert!(!handler.take_redraw());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bounds_forward_to_active_screen() {
        let (mut handler, _) = handler(MiniGameType::Whack);
        handler.set_bounds(1, 2, 30, 20);
        handler.begin().unwrap();
        handler.set_location(5, 6);
        handler.set_size(60, 30);
        match handler.active() {
            Some(ActiveScreen::Word(s)) => assert_eq!(s.bounds(), Bounds::new(5, 6, 60, 30)),
            _ => panic!("word screen should be active"),
        }
    }

    #[test]
    fn test_frame_calls_without_active_screen_are_no_ops() {
        let (mut handler, _) = handler(MiniGameType::Scroller);
        handler.set_bounds(3, 4, 50, 25);
        handler.repaint();
        handler.update_with(&confirm(), 0).unwrap();
        assert!(!handler.take_redraw());
        assert_eq!(handler.state(), State::None);

        handler.begin().unwrap();
        match handler.active() {
            Some(ActiveScreen::Word(s)) => assert_eq!(s.bounds(), Bounds::new(3, 4, 50, 25)),
            _ => panic!("word screen should be active"),
        }
        handler.update_with(&confirm(), 16).unwrap();
        handler.update_with(&confirm(), 32).unwrap();
        assert!(matches!(handler.active(), Some(ActiveScreen::Game(_))));
    }

    #[test]
    fn test_mini_game_ended_out_of_order() {
        let (mut handler, count) = handler(MiniGameType::Whack);
        assert!(handler.mini_game_ended().is_err());
        assert!(handler.end_score_screen().is_err());
        assert!(handler.end_word_screen().is_err());
        assert_eq!(handler.state(), State::None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
