//! Whack-a-Word rendering.

use super::game_common::{
    format_duration, render_forfeit_status_bar, render_game_frame, render_info_panel_frame,
    render_status_bar, stamp_sprite,
};
use lexiplay::challenges::whack::{CellState, HammerState, WhackGame};
use lexiplay::resources::sprite::Drawable;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const SOIL: Color = Color::Rgb(120, 80, 40);
const MOLE: Color = Color::Rgb(170, 120, 90);

pub fn render_whack_scene(frame: &mut Frame, area: Rect, game: &WhackGame) {
    let layout = render_game_frame(frame, area, " Whack-a-Word ", Color::LightMagenta);

    render_grid(frame, layout.content, game);
    render_status_bar_content(frame, layout.status_bar, game);
    render_info_panel(frame, layout.info_panel, game);
}

fn render_grid(frame: &mut Frame, field: Rect, game: &WhackGame) {
    let buf = frame.buffer_mut();

    for (index, cell) in game.cells.iter().enumerate() {
        let (Some(rect), Some(sprite)) = (game.cell_rect(index), cell.draw_sprite(&game.sheets))
        else {
            continue;
        };
        let style = match cell.state() {
            CellState::Idle => Style::default().fg(SOIL),
            CellState::Whacked => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            _ => Style::default().fg(MOLE),
        };
        stamp_sprite(buf, field, rect.x, rect.y, sprite, style);
    }

    if let Some(sprite) = game.hammer.draw_sprite(&game.sheets) {
        let style = match game.hammer.state() {
            HammerState::Idle => Style::default().fg(Color::Gray),
            _ => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        };
        let r = game.hammer.rect();
        stamp_sprite(buf, field, r.x, r.y, sprite, style);
    }
}

fn render_status_bar_content(frame: &mut Frame, area: Rect, game: &WhackGame) {
    if render_forfeit_status_bar(frame, area, game.forfeit_pending) {
        return;
    }
    if game.completion.is_finished() {
        render_status_bar(frame, area, "Moles retreat!", Color::Yellow, &[]);
        return;
    }
    render_status_bar(
        frame,
        area,
        "Whack the moles as they pop up",
        Color::White,
        &[("[Click]", "Whack"), ("[Esc]", "Forfeit")],
    );
}

fn render_info_panel(frame: &mut Frame, area: Rect, game: &WhackGame) {
    let inner = render_info_panel_frame(frame, area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Points: ", Style::default().fg(Color::Gray)),
            Span::styled(game.points.to_string(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(format!("Hits:   {}", game.hits)),
        Line::from(format!("Misses: {}", game.misses)),
    ];
    if let Some(remaining) = game.completion.remaining(game.last_update_ms) {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Time:   {}", format_duration(remaining))));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}
