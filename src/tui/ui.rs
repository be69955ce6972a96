use crate::tui::{
    state::{AppState, Status},
    widgets::{LookupSummary, StatusLegend},
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Render the TUI (Elm Architecture - View)
pub fn render(frame: &mut Frame, state: &AppState) {
    // Clear the frame to prevent ghost characters
    frame.render_widget(
        Block::default().style(Style::default().bg(Color::Reset)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Tracks + details
            Constraint::Length(4), // Cover lookups
            Constraint::Length(1), // Status Legend
            Constraint::Length(6), // Logs
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_header(frame, chunks[0], state);
    render_tracks(frame, body[0], state);
    render_details(frame, body[1], state);
    LookupSummary::new(state.found, state.cached, state.missing, state.tracks.len())
        .render(frame, chunks[2]);
    StatusLegend::render(frame, chunks[3]);
    render_logs(frame, chunks[4], state);
    render_footer(frame, chunks[5], state);
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match &state.status {
        Status::Idle => "musicdom".to_string(),
        Status::Scanning => "musicdom - Scanning...".to_string(),
        Status::Browsing => format!("musicdom - {}", state.music_dir.display()),
        Status::Error(e) => return render_error(frame, area, e),
    };

    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let error_text = format!("Error: {}", error);
    let widget = Paragraph::new(error_text)
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_tracks(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Tracks ({})", state.tracks.len()));

    let items: Vec<ListItem> = state
        .tracks
        .iter()
        .map(|track| {
            ListItem::new(Line::from(vec![
                Span::raw(track.file_stem()),
                Span::styled(
                    format!("  {}", track.display_artist()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    if !state.tracks.is_empty() {
        list_state.select(Some(state.selected));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_details(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().borders(Borders::ALL).title("Details");

    let Some(track) = state.selected_track() else {
        let empty = Paragraph::new("No audio files found").block(block);
        frame.render_widget(empty, area);
        return;
    };

    let label = Style::default().fg(Color::Yellow);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{:<9}", name), label), Span::raw(value)])
    };

    let lines = vec![
        Line::from(Span::styled(
            track.display_title(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        field("Artist", track.display_artist().to_string()),
        field("Album", track.album.clone()),
        field(
            "Year",
            track.year.map(|y| y.to_string()).unwrap_or_default(),
        ),
        field("Genre", track.genre.clone()),
        field("Length", track.display_duration()),
        Line::raw(""),
        field("Cover", state.cover_label(&track.path)),
    ];

    let details = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(details, area);
}

fn render_logs(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().borders(Borders::ALL).title("Logs");
    let inner = block.inner(area);

    // Calculate max width for log entries (account for borders and padding)
    let max_width = inner.width.saturating_sub(2) as usize;

    // Take only the most recent entries that fit in the visible area
    let visible_lines = inner.height as usize;
    let start_index = state.logs.len().saturating_sub(visible_lines);

    let items: Vec<ListItem> = state
        .logs
        .iter()
        .skip(start_index)
        .map(|log| {
            let truncated = if log.chars().count() > max_width {
                let kept: String = log.chars().take(max_width.saturating_sub(3)).collect();
                format!("{}...", kept)
            } else {
                log.clone()
            };
            ListItem::new(truncated)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(list, area);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let key = |k: &'static str, color: Color| {
        Span::styled(
            k,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )
    };

    let mut spans = vec![
        key("q", Color::Yellow),
        Span::raw(" Quit | "),
        key("↑/↓", Color::Yellow),
        Span::raw(" Select | "),
        key("Enter", Color::Yellow),
        Span::raw(" Cover | "),
        key("a", Color::Yellow),
        Span::raw(" All covers | "),
    ];

    // Add Pause/Resume control based on state
    if state.paused {
        spans.push(key("r", Color::Green));
        spans.push(Span::raw(" Resume"));
    } else {
        spans.push(key("p", Color::Cyan));
        spans.push(Span::raw(" Pause"));
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
