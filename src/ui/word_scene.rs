//! Word prompt rendering.

use super::game_common::{render_game_frame, render_info_panel_frame, render_status_bar};
use lexiplay::screens::{WordPhase, WordScreen};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render_word_scene(frame: &mut Frame, area: Rect, screen: &WordScreen) {
    let layout = render_game_frame(frame, area, " Word ", Color::LightCyan);

    let mut lines = vec![
        Line::from(Span::styled(
            screen.question_language.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            screen.question.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if screen.phase() != WordPhase::Question {
        lines.push(Line::from(Span::styled(
            screen.answer_language.as_str(),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            screen.answer.as_str(),
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )));
    }

    let content = layout.content;
    let height = lines.len() as u16;
    let y = content.y + content.height.saturating_sub(height) / 2;
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        Rect::new(content.x, y, content.width, height.min(content.height)),
    );

    let (status, action) = match screen.phase() {
        WordPhase::Question => ("Do you know it?", "Reveal"),
        _ => ("Remember it!", "Play"),
    };
    render_status_bar(
        frame,
        layout.status_bar,
        status,
        Color::Yellow,
        &[("[Enter]", action)],
    );

    let info = render_info_panel_frame(frame, layout.info_panel);
    let text = vec![
        Line::from(format!(
            "{} → {}",
            screen.question_language, screen.answer_language
        )),
        Line::from(""),
        Line::from(Span::styled(
            "A mini-game follows",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(text), info);
}
