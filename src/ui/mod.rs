pub mod game_common;
pub mod score_scene;
pub mod scroller_scene;
pub mod whack_scene;
pub mod word_scene;

use lexiplay::challenges::MiniGameKind;
use lexiplay::{ActiveScreen, Host, MiniGameHandler};
use ratatui::Frame;

/// Draw whichever screen the handler is showing.
pub fn draw<H: Host>(frame: &mut Frame, handler: &MiniGameHandler<H>) {
    let area = frame.size();
    match handler.active() {
        Some(ActiveScreen::Word(screen)) => word_scene::render_word_scene(frame, area, screen),
        Some(ActiveScreen::Game(MiniGameKind::Scroller(game))) => {
            scroller_scene::render_scroller_scene(frame, area, game)
        }
        Some(ActiveScreen::Game(MiniGameKind::Whack(game))) => {
            whack_scene::render_whack_scene(frame, area, game)
        }
        Some(ActiveScreen::Score(screen)) => score_scene::render_score_scene(frame, area, screen),
        None => {}
    }
}
