use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use stylist_core::session::{EXAMPLE_PROMPTS, Phase};

use crate::app::{App, Focus};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Original / Styled
            Constraint::Length(3), // Prompt
            Constraint::Length(3), // Examples
            Constraint::Length(2), // Message
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    render_header(frame, chunks[0]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_original(frame, app, panels[0]);
    render_styled(frame, app, panels[1]);

    render_prompt(frame, app, chunks[2]);
    render_examples(frame, app, chunks[3]);
    render_message(frame, app, chunks[4]);

    render_hints(frame, app, chunks[5]);
}

fn render_hints(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let generate = if app.session.can_generate() {
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
    } else {
        dim
    };
    let hints = Line::from(vec![
        Span::styled("Tab: Focus | Enter: Load/Generate | ", dim),
        Span::styled("Ctrl+G: Generate", generate),
        Span::styled(
            " | Ctrl+E: Example | Ctrl+S: Download | Ctrl+R: Start over | Esc: Quit",
            dim,
        ),
    ]);
    frame.render_widget(Paragraph::new(hints), area);
}

/// Column just past `text` typed after `offset` columns inside a bordered block
fn cursor_column(area: Rect, offset: u16, text: &str) -> u16 {
    let typed = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    area.x.saturating_add(1).saturating_add(offset).saturating_add(typed)
}

fn focused_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "AI Fashion Stylist",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Upload a photo, describe an outfit, and let AI create your new look!"),
    ])])
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_original(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::ImagePath;
    let mut lines = vec![Line::from(vec![
        Span::styled("Path: ", Style::default().fg(Color::Gray)),
        Span::raw(app.path_input.as_str()),
    ])];
    lines.push(Line::raw(""));

    match app.session.image() {
        Some(image) => {
            lines.push(Line::raw(format!(
                "Loaded: {}",
                image.name().unwrap_or("(unnamed)")
            )));
            lines.push(Line::raw(format!("Type: {}", image.mime_type())));
            lines.push(Line::raw(format!("Size: {}", human_bytes(image.size_bytes()))));
            if let Some((w, h)) = image.dimensions() {
                lines.push(Line::raw(format!("Dimensions: {}x{}", w, h)));
            }
        }
        None => {
            lines.push(Line::styled(
                "Type the path to a PNG, JPEG or WEBP photo and press Enter.",
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(focused_block("Original", focused));
    frame.render_widget(panel, area);

    if focused {
        let x = cursor_column(area, 6, &app.path_input);
        let y = area.y + 1;
        if x < area.right().saturating_sub(1) {
            frame.set_cursor_position((x, y));
        }
    }
}

fn render_styled(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.session.phase() {
        Phase::Generating => vec![
            Line::styled(
                format!(
                    "{} {}",
                    SPINNER[app.spinner_frame % SPINNER.len()],
                    app.carousel.message()
                ),
                Style::default().fg(Color::Magenta),
            ),
            Line::raw(""),
            Line::styled(
                format!("\"{}\"", app.session.prompt()),
                Style::default().fg(Color::Gray),
            ),
        ],
        Phase::Succeeded => {
            let mut lines = vec![Line::styled(
                "Your new look is ready!",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )];
            if let Some(result) = app.session.result() {
                lines.push(Line::raw(format!("Type: {}", result.mime_type)));
            }
            if let Some(bytes) = app.result_bytes {
                lines.push(Line::raw(format!("Size: {}", human_bytes(bytes))));
            }
            if let Some(name) = app.download_name() {
                lines.push(Line::raw(""));
                lines.push(Line::raw(format!("Ctrl+S saves it as {}", name)));
            }
            lines
        }
        _ => vec![Line::styled(
            "Your styled image will appear here.",
            Style::default().fg(Color::DarkGray),
        )],
    };

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Styled"));
    frame.render_widget(panel, area);
}

fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Prompt;
    let prompt = app.session.prompt();

    let title = if app.session.is_generating() {
        "Outfit (Styling...)"
    } else {
        "Outfit"
    };

    let content = if prompt.is_empty() {
        Line::styled(
            "Describe the new outfit, e.g. 'a formal blue evening gown'",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Line::raw(prompt)
    };

    frame.render_widget(
        Paragraph::new(content).block(focused_block(title, focused)),
        area,
    );

    if focused && !app.session.is_generating() {
        let x = cursor_column(area, 0, prompt);
        if x < area.right().saturating_sub(1) {
            frame.set_cursor_position((x, area.y + 1));
        }
    }
}

fn render_examples(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.session.is_generating() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Gray)
    };
    let examples = Paragraph::new(Line::styled(EXAMPLE_PROMPTS.join(" | "), style))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Or try an example (Ctrl+E)"),
        );
    frame.render_widget(examples, area);
}

fn render_message(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(error) = app.session.error() {
        Line::styled(error, Style::default().fg(Color::Red))
    } else if let Some(status) = &app.status {
        Line::styled(status.as_str(), Style::default().fg(Color::Green))
    } else {
        Line::raw("")
    };
    frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
}

fn human_bytes(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}
