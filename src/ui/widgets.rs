use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub const BLOCK_CHAR: &str = "██";
pub const EMPTY_CHAR: &str = "  ";

pub fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

/// Screen frame: a body area above a one-line status and a hint line.
pub fn split_screen(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);
    (rows[0], rows[1], rows[2])
}

pub fn render_status(frame: &mut Frame, status: &str, area: Rect) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        status.to_string(),
        Style::default().fg(Color::Yellow),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

pub fn render_hints(frame: &mut Frame, hints: &str, area: Rect) {
    let paragraph = Paragraph::new(Line::from(hints.to_string()))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Label/value pairs stacked in a bordered panel.
pub fn render_info(frame: &mut Frame, title: &str, rows: &[(&str, String)], area: Rect) {
    let mut lines = Vec::with_capacity(rows.len() * 3);
    for (label, value) in rows {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(value.clone()));
    }
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(titled_block(title));
    frame.render_widget(paragraph, area);
}

/// Overlay a centered popup with a heading and body lines.
pub fn render_popup(frame: &mut Frame, title: &str, heading: (&str, Color), body: &[String]) {
    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled(
            heading.0.to_string(),
            Style::default().fg(heading.1),
        )),
        Line::from(""),
    ];
    text.extend(body.iter().map(|l| Line::from(l.clone())));

    let width = body
        .iter()
        .map(|l| l.chars().count())
        .chain([heading.0.chars().count(), title.chars().count()])
        .max()
        .unwrap_or(0) as u16
        + 6;
    let height = text.len() as u16 + 3;

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        titled_block(title).style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(width.max(24), height, frame.size());
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}
