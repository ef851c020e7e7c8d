//! Per-screen rendering. Every function draws into the full content area;
//! overlays (help, feedback modal) are layered on top by the caller.

use super::state::UiState;
use crate::model::{GeneratedLogo, InputKind, Screen};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn draw_welcome(area: Rect, f: &mut Frame) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(6),
            Constraint::Length(3),
        ])
        .split(area);

    let title = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Logo Studio",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Answer five questions about your business and get"),
        Line::from("AI-generated logo concepts you can refine and keep."),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, rows[0]);

    let actions = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("  s", key_style()),
            Span::raw("  Start designing"),
        ]),
        Line::from(vec![
            Span::styled("  v", key_style()),
            Span::raw("  View saved logos"),
        ]),
        Line::from(vec![Span::styled("  q", key_style()), Span::raw("  Quit")]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Actions"));
    f.render_widget(actions, rows[1]);

    draw_status(rows[2], f, "Press ? for help");
}

pub fn draw_questionnaire(area: Rect, f: &mut Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(4),
            Constraint::Length(3),
        ])
        .split(area);

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Question {} of {}",
            state.flow.cursor() + 1,
            state.flow.len()
        )))
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(state.flow.progress() as u16);
    f.render_widget(progress, rows[0]);

    let q = state.flow.current();
    let question = Paragraph::new(vec![
        Line::from(Span::styled(
            q.text,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            q.placeholder,
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(question, rows[1]);

    let shown = if state.flow.input.is_empty() {
        Span::styled("(type your answer)", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(state.flow.input.as_str())
    };
    let input_title = match q.input {
        InputKind::Line => "Answer",
        InputKind::Paragraph => "Answer (free text)",
    };
    let input = Paragraph::new(Line::from(shown))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(input_title));
    f.render_widget(input, rows[2]);

    let hint = if state.flow.is_last() {
        "Enter: generate logos   Esc: previous question"
    } else {
        "Enter: next question   Esc: previous question"
    };
    draw_status(rows[3], f, hint);
}

pub fn draw_loading(area: Rect, f: &mut Frame, state: &UiState) {
    let spinner = SPINNER[(state.loading_since.elapsed().as_millis() / 120) as usize % SPINNER.len()];
    let p = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{spinner}  {}", state.loading_message()),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "This can take a little while.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Working"));
    f.render_widget(p, area);
}

pub fn draw_gallery(area: Rect, f: &mut Frame, state: &UiState) {
    let (title, empty_text, hint) = match state.screen {
        Screen::Saved => (
            "Your Saved Logos",
            "You haven't saved any logos yet. Start designing to create your first one!",
            "e: edit  x: delete  d: download  y: copy prompt  b: back  ?: help",
        ),
        _ => (
            "Your Logo Concepts",
            "No logos were generated. Please try starting over.",
            "r: refine  s: save  d: download  y: copy prompt  o: start over  ?: help",
        ),
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(3)])
        .split(area);

    let logos = state.displayed();
    if logos.is_empty() {
        let p = Paragraph::new(empty_text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(p, rows[0]);
    } else {
        let items: Vec<ListItem> = logos
            .iter()
            .enumerate()
            .map(|(i, logo)| gallery_item(i == state.selected, logo))
            .collect();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{title} ({})", logos.len())),
        );
        f.render_widget(list, rows[0]);
    }

    let status = if state.info.is_empty() {
        hint
    } else {
        state.info.as_str()
    };
    draw_status(rows[1], f, status);
}

fn gallery_item<'a>(selected: bool, logo: &'a GeneratedLogo) -> ListItem<'a> {
    let marker = if selected { "▶ " } else { "  " };
    let base = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mut excerpt: String = logo.prompt.chars().take(100).collect();
    if excerpt.len() < logo.prompt.len() {
        excerpt.push('…');
    }
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(marker, base),
            Span::styled(
                format!("[{}] ", logo.style),
                base.fg(Color::Cyan),
            ),
            Span::styled(
                format!("{} KiB png", logo.image_data.len() * 3 / 4 / 1024),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![Span::raw("    "), Span::styled(excerpt, base)]),
        Line::from(""),
    ])
}

pub fn draw_error(area: Rect, f: &mut Frame, state: &UiState) {
    let p = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Something went wrong",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(state.error.as_str()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: go back   r: start over",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title("Error"),
    );
    f.render_widget(p, area);
}

/// Feedback entry modal for refine/edit, centered over the gallery.
pub fn draw_feedback_modal(area: Rect, f: &mut Frame, state: &UiState) {
    let modal = centered_rect(60, 9, area);
    f.render_widget(Clear, modal);

    let shown = if state.feedback.is_empty() {
        Span::styled(
            "e.g., 'Make the star more prominent', 'Use a darker shade of blue'",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(state.feedback.as_str())
    };
    let title = match state.screen {
        Screen::Saved => "Edit Your Logo",
        _ => "Refine Your Logo",
    };
    let p = Paragraph::new(vec![
        Line::from("What would you like to change?"),
        Line::from(""),
        Line::from(shown),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: submit (requires feedback)   Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, modal);
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let modal = centered_rect(50, 16, area);
    f.render_widget(Clear, modal);
    let p = Paragraph::new(vec![
        Line::from("Global:"),
        help_line("q / Ctrl-C", "Quit (q types on input screens)"),
        help_line("?", "Toggle this help"),
        Line::from(""),
        Line::from("Welcome:"),
        help_line("s / v", "Start designing / view saved"),
        Line::from(""),
        Line::from("Questionnaire:"),
        help_line("Enter / Esc", "Next (submit on last) / previous"),
        Line::from(""),
        Line::from("Results & Saved:"),
        help_line("↑/↓ or j/k", "Select logo"),
        help_line("r / e", "Refine result / edit saved"),
        help_line("s / x", "Save result / delete saved"),
        help_line("d / y", "Download PNG / copy prompt"),
        help_line("o / b", "Start over / back to welcome"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, modal);
}

fn help_line(keys: &str, what: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{keys:<12}"), key_style()),
        Span::raw(what.to_string()),
    ])
}

fn draw_status(area: Rect, f: &mut Frame, text: &str) {
    let p = Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Gray),
    )))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn key_style() -> Style {
    Style::default().fg(Color::Magenta)
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(area.height),
    }
}
