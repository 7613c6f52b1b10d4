//! River Run rendering.
//!
//! The background pattern is drawn twice, one field height apart, and
//! shifted down by the scroll position so it loops seamlessly.

use super::game_common::{
    format_duration, render_forfeit_status_bar, render_game_frame, render_info_panel_frame,
    render_status_bar, stamp_sprite,
};
use lexiplay::challenges::scroller::{Facing, ScrollerGame, SpawnKind};
use lexiplay::resources::sprite::Drawable;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const WATER: Color = Color::Rgb(40, 90, 160);
const ROCK: Color = Color::Rgb(150, 140, 130);
const COIN: Color = Color::Rgb(255, 215, 0);

pub fn render_scroller_scene(frame: &mut Frame, area: Rect, game: &ScrollerGame) {
    let layout = render_game_frame(frame, area, " River Run ", Color::LightBlue);

    render_river(frame, layout.content, game);
    render_status_bar_content(frame, layout.status_bar, game);
    render_info_panel(frame, layout.info_panel, game);
}

fn render_river(frame: &mut Frame, field: Rect, game: &ScrollerGame) {
    if field.width == 0 || field.height == 0 {
        return;
    }
    let buf = frame.buffer_mut();

    let background = &game.theme.background;
    if !background.is_empty() {
        let height = field.height as i32;
        let offset = (game.background_pos * height as f64) as i32;
        let style = Style::default().fg(WATER);
        for copy_y in [offset - height, offset] {
            for row in 0..height {
                let y = copy_y + row;
                if y < 0 || y >= height {
                    continue;
                }
                let pattern: Vec<char> = background[row as usize % background.len()].chars().collect();
                if pattern.is_empty() {
                    continue;
                }
                for x in 0..field.width {
                    let ch = pattern[x as usize % pattern.len()];
                    buf.get_mut(field.x + x, field.y + y as u16)
                        .set_char(ch)
                        .set_style(style);
                }
            }
        }
    }

    let field_size = game.field();
    for s in &game.spawnables {
        let Some(sprite) = s.draw_sprite(&game.sheets) else {
            continue;
        };
        let style = match s.kind {
            SpawnKind::Obstacle => Style::default().fg(ROCK),
            SpawnKind::Collectable => Style::default().fg(COIN).add_modifier(Modifier::BOLD),
        };
        let r = s.rect(field_size);
        stamp_sprite(buf, field, r.x, r.y, sprite, style);
    }

    if let Some(sprite) = game.player.draw_sprite(&game.sheets) {
        let style = match game.player.facing {
            Facing::Damaged => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            _ => Style::default().fg(Color::White),
        };
        let r = game.player.rect(field_size);
        // Steering leans the canoe into the turn
        let leaned = match game.player.facing {
            Facing::Left => Some(sprite.leaned(false)),
            Facing::Right => Some(sprite.leaned(true)),
            _ => None,
        };
        match &leaned {
            Some(lean) => {
                let x = r.x - (sprite.lean_extra() / 2) as i32;
                stamp_sprite(buf, field, x, r.y, lean, style);
            }
            None => stamp_sprite(buf, field, r.x, r.y, sprite, style),
        }
    }
}

fn render_status_bar_content(frame: &mut Frame, area: Rect, game: &ScrollerGame) {
    if render_forfeit_status_bar(frame, area, game.forfeit_pending) {
        return;
    }
    if game.completion.is_finished() {
        render_status_bar(frame, area, "Ashore!", Color::Yellow, &[]);
        return;
    }
    render_status_bar(
        frame,
        area,
        "Dodge the rocks, grab the coins",
        Color::White,
        &[("[←/→]", "Steer"), ("[Esc]", "Forfeit")],
    );
}

fn render_info_panel(frame: &mut Frame, area: Rect, game: &ScrollerGame) {
    let inner = render_info_panel_frame(frame, area);

    let hearts = "♥".repeat(game.lives as usize);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Points: ", Style::default().fg(Color::Gray)),
            Span::styled(game.points.to_string(), Style::default().fg(COIN)),
        ]),
        Line::from(vec![
            Span::styled("Lives:  ", Style::default().fg(Color::Gray)),
            Span::styled(hearts, Style::default().fg(Color::Red)),
        ]),
        Line::from(format!("Coins:  {}", game.hits)),
    ];
    if let Some(remaining) = game.completion.remaining(game.last_update_ms) {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Time:   {}", format_duration(remaining))));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}
