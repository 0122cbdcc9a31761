use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use substance_sense_core::{Sender, Transcript};
use crate::app::{App, InputMode};
use crate::markdown::render_markdown;

const PLACEHOLDER: &str = "Ask Substance Sense something! (e.g. \"What is the overdose probability for a 23 year old male in Downtown Winnipeg?\")";
const PENDING_TEXT: &str = "Grabbing information";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Substance Sense ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        Span::styled(app.client.base_url().to_string(), Style::default().fg(Color::Gray)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INPUT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Editing => &[("Enter", "send"), ("PgUp/PgDn", "scroll"), ("Esc", "done")],
        InputMode::Normal => &[
            ("i", "type"),
            ("j/k", "scroll"),
            ("g/G", "top/bottom"),
            ("q", "quit"),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {key} "), key_style));
        spans.push(Span::styled(format!(" {label} "), label_style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Build the transcript text: every message in order, then the pending
/// indicator if a request is in flight.
fn transcript_text(transcript: &Transcript, pending: bool, animation_frame: u8) -> Text<'static> {
    if transcript.is_empty() && !pending {
        return Text::from(
            Line::from(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
                .alignment(Alignment::Center),
        );
    }

    let mut lines: Vec<Line> = Vec::new();

    for message in transcript {
        match message.sender() {
            Sender::User => {
                lines.push(
                    Line::from(Span::styled(
                        "You",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ))
                    .alignment(Alignment::Right),
                );
                for line in message.text().lines() {
                    lines.push(
                        Line::from(Span::styled(line.to_string(), Style::default().fg(Color::Cyan)))
                            .alignment(Alignment::Right),
                    );
                }
            }
            Sender::Reply => {
                lines.push(reply_label());
                lines.extend(render_markdown(message.text()));
            }
        }
        lines.push(Line::default());
    }

    if pending {
        lines.push(reply_label());
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("{PENDING_TEXT}{dots}"),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Text::from(lines)
}

fn reply_label() -> Line<'static> {
    Line::from(Span::styled(
        "Substance Sense",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let pending = app.session.is_pending();
    let text = transcript_text(app.session.transcript(), pending, app.animation_frame);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    let inner_width = chat_area.width.saturating_sub(2);
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);

    let wrapped_lines = Paragraph::new(text.clone())
        .wrap(Wrap { trim: false })
        .line_count(inner_width);
    app.chat_total_lines = u16::try_from(wrapped_lines).unwrap_or(u16::MAX);

    if app.follow_bottom {
        app.scroll = app.max_scroll();
    } else {
        app.scroll = app.scroll.min(app.max_scroll());
    }

    let chat_focused = app.input_mode == InputMode::Normal;
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if chat_focused { Color::Cyan } else { Color::DarkGray }))
        .title(" Conversation ");

    let chat = Paragraph::new(text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(chat, chat_area);

    render_input(app, frame, input_area, pending);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, pending: bool) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if pending {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };
    let title = if pending {
        " Waiting for reply... "
    } else {
        " Type a message... "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
