//! Score screen rendering.

use super::game_common::{format_duration, render_game_frame, render_info_panel_frame, render_status_bar};
use lexiplay::challenges::Outcome;
use lexiplay::screens::ScoreScreen;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

fn outcome_text(outcome: Outcome) -> (&'static str, Color) {
    match outcome {
        Outcome::Completed => ("Well played!", Color::Green),
        Outcome::TimedOut => ("Time's up!", Color::Yellow),
        Outcome::Forfeited => ("Forfeited", Color::Gray),
    }
}

pub fn render_score_scene(frame: &mut Frame, area: Rect, screen: &ScoreScreen) {
    let score = &screen.score;
    let (title, color) = outcome_text(score.outcome);
    let layout = render_game_frame(frame, area, " Score ", color);

    let mut lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} points", score.points),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Hits: {}", score.hits)),
    ];
    if score.misses > 0 {
        lines.push(Line::from(format!("Misses: {}", score.misses)));
    }
    if score.damage > 0 {
        lines.push(Line::from(format!("Crashes: {}", score.damage)));
    }
    if let Some(accuracy) = score.accuracy() {
        lines.push(Line::from(format!("Accuracy: {}%", accuracy)));
    }

    let content = layout.content;
    let height = (lines.len() as u16).min(content.height);
    let y = content.y + content.height.saturating_sub(height) / 2;
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        Rect::new(content.x, y, content.width, height),
    );

    render_status_bar(
        frame,
        layout.status_bar,
        "",
        Color::White,
        &[("[Enter]", "Continue")],
    );

    let info = render_info_panel_frame(frame, layout.info_panel);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(score.game.name()),
            Line::from(format!("Time: {}", format_duration(score.duration_ms))),
        ]),
        info,
    );
}
