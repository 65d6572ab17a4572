use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::App;
use crate::state::Sender;

const PLACEHOLDER: &str = "Ask for a recipe...";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let key_warning = if app.has_api_key {
        String::new()
    } else {
        " [no API key: set SPOONACULAR_API_KEY]".to_string()
    };

    let title = Line::from(vec![
        Span::styled(" 🍳 Recipe Chatbot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(key_warning, Style::default().fg(Color::Red)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, used by the scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let transcript = app.session.transcript();
    let chat_text = if transcript.is_empty() && !app.is_waiting() {
        Text::from(Span::styled(
            "Tell me a dish or an ingredient and I'll find a recipe.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript {
            let (label, color) = match msg.sender {
                Sender::User => ("You:", Color::Cyan),
                Sender::Bot => ("Bot:", Color::Yellow),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for line in msg.text.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if app.is_waiting() {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Bot is typing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let disabled = app.is_waiting();
    let border_color = if disabled { Color::DarkGray } else { Color::Yellow };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ask ");

    let input = &app.session.pending_input;
    let cursor_pos = app.session.input_cursor;

    // Horizontal scroll that keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let paragraph = if input.is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let visible_text: String = input.chars().skip(scroll_offset).take(inner_width).collect();
        let color = if disabled { Color::DarkGray } else { Color::Cyan };
        Paragraph::new(visible_text).style(Style::default().fg(color))
    };

    frame.render_widget(paragraph.block(input_block), area);

    if !disabled {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let can_send = !app.session.pending_input.is_empty() && !app.is_waiting();
    let send_style = if can_send {
        Style::default().bg(Color::Blue).fg(Color::White).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let help = Line::from(vec![
        Span::styled(" Enter ", send_style),
        Span::raw(" Send  "),
        Span::styled("↑↓/PgUp/PgDn", Style::default().fg(Color::Cyan)),
        Span::raw(" Scroll  "),
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::raw(" Quit"),
    ]);

    frame.render_widget(Paragraph::new(help), area);
}
