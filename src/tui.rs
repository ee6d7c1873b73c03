// TUI module for rendering the terminal interface
pub mod input;

pub use input::{handle_confirm_input, handle_key_event, KeyAction};

use crate::domain::SessionState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph},
    Frame,
};

const ACCENT_KEEP: Color = Color::Green;
const ACCENT_TRASH: Color = Color::Red;
const ACCENT_HIGHLIGHT: Color = Color::Cyan;
const TEXT_SECONDARY: Color = Color::DarkGray;
const BG_DARK: Color = Color::Black;

/// UI view state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Main triage view
    Browsing,
    /// Help overlay visible
    Help,
    /// Pending-items review overlay
    Review,
    /// Confirmation dialog before committing deletions
    ConfirmDelete,
    /// Summary screen at end
    Summary,
    /// Welcome screen shown on first launch
    Welcome,
}

/// Counts shown on the summary screen; maintained by the event loop
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionTally {
    pub kept: usize,
    pub trashed: usize,
    pub deleted: usize,
}

/// Renders the main triage screen
pub fn render(frame: &mut Frame, state: &SessionState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header with progress
            Constraint::Min(0),    // Current item card
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], state);
    render_card(frame, chunks[1], state);
    render_footer(frame, chunks[2]);
}

fn render_header(frame: &mut Frame, area: Rect, state: &SessionState) {
    let position = if state.is_empty() {
        "0 / 0".to_string()
    } else {
        format!("{} / {}", state.cursor() + 1, state.len())
    };

    let title = Line::from(vec![
        Span::styled(
            " picsweep ",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  [{}]  ", state.filter.as_str())),
        Span::raw(position),
        Span::styled(
            format!("   pending: {}", state.pending_trash.len()),
            Style::default().fg(ACCENT_TRASH),
        ),
    ]);

    let ratio = if state.is_empty() {
        0.0
    } else {
        (state.cursor() + 1) as f64 / state.len() as f64
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    frame.render_widget(Paragraph::new(title), rows[0]);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(ACCENT_HIGHLIGHT))
            .ratio(ratio)
            .label(""),
        rows[1],
    );
}

fn render_card(frame: &mut Frame, area: Rect, state: &SessionState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(TEXT_SECONDARY));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(item) = state.current_item() else {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("No media matches the current filter."),
            Line::from(""),
            Line::from(Span::styled(
                "Press f to change filter or q to quit",
                Style::default().fg(TEXT_SECONDARY),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    };

    let marked = state.pending_trash.contains(&item.locator);
    let kind = if item.is_video { "video" } else { "photo" };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            item.id.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("{} · {}", kind, item.mime_type)),
        Line::from(format!("taken  {}", item.taken_at.format("%Y-%m-%d %H:%M"))),
        Line::from(format!("size   {}", format_size(item.size_bytes))),
    ];

    if marked {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "✗ marked for deletion",
            Style::default().fg(ACCENT_TRASH).add_modifier(Modifier::BOLD),
        )));
    }

    let card = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(card, inner);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Line::from(vec![
        Span::styled(" ← / t ", Style::default().fg(ACCENT_TRASH)),
        Span::raw("trash  "),
        Span::styled("→ / k ", Style::default().fg(ACCENT_KEEP)),
        Span::raw("keep  "),
        Span::styled("u ", Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::raw("undo  "),
        Span::styled("d ", Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::raw("delete pending  "),
        Span::styled("r ", Style::default().fg(TEXT_SECONDARY)),
        Span::raw("review  "),
        Span::styled("f ", Style::default().fg(TEXT_SECONDARY)),
        Span::raw("filter  "),
        Span::styled("? ", Style::default().fg(TEXT_SECONDARY)),
        Span::raw("help"),
    ]);

    let block = Block::default().borders(Borders::TOP);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(footer), inner);
}

/// Renders the confirmation dialog before a deletion batch is committed
pub fn render_confirm_delete_overlay(frame: &mut Frame, pending: usize) {
    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Confirm Deletion ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_TRASH))
        .style(Style::default().bg(BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(format!("Move {} item(s) to the trash?", pending)),
        Line::from(""),
        Line::from(vec![
            Span::styled("y / Enter ", Style::default().fg(ACCENT_TRASH)),
            Span::raw("confirm   "),
            Span::styled("n / Esc ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("cancel"),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

/// Renders the pending-review overlay listing items not yet looked over
pub fn render_review_overlay(frame: &mut Frame, state: &SessionState) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Pending Deletions ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from("")];
    if state.pending_trash.is_empty() {
        lines.push(Line::from("Nothing is marked for deletion."));
    } else {
        for locator in state.pending_trash.iter().take(inner.height as usize) {
            let staged = state.staged_for_review.contains(locator);
            let bullet = if staged { "  • " } else { "  ○ " };
            lines.push(Line::from(vec![
                Span::styled(bullet, Style::default().fg(ACCENT_TRASH)),
                Span::raw(locator.to_string()),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(TEXT_SECONDARY),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Renders the summary screen shown before exit
pub fn render_summary(frame: &mut Frame, tally: &SessionTally, pending: usize) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Session Complete ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("   ✓ ", Style::default().fg(ACCENT_KEEP)),
            Span::raw("Kept:     "),
            Span::styled(
                format!("{}", tally.kept),
                Style::default().fg(ACCENT_KEEP).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("   ✗ ", Style::default().fg(ACCENT_TRASH)),
            Span::raw("Deleted:  "),
            Span::styled(
                format!("{}", tally.deleted),
                Style::default().fg(ACCENT_TRASH).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("   ○ ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Still pending:  "),
            Span::styled(format!("{}", pending), Style::default().fg(TEXT_SECONDARY)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to exit",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(50, 70, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  → / k  ", Style::default().fg(ACCENT_KEEP)),
            Span::raw("Keep item"),
        ]),
        Line::from(vec![
            Span::styled("  ← / t  ", Style::default().fg(ACCENT_TRASH)),
            Span::raw("Mark item for deletion"),
        ]),
        Line::from(vec![
            Span::styled("  ↑↓ i/j ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Navigate without deciding"),
        ]),
        Line::from(vec![
            Span::styled("  u      ", Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::raw("Undo last decision"),
        ]),
        Line::from(vec![
            Span::styled("  d      ", Style::default().fg(ACCENT_TRASH)),
            Span::raw("Delete everything marked"),
        ]),
        Line::from(vec![
            Span::styled("  r      ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Review marked items"),
        ]),
        Line::from(vec![
            Span::styled("  f      ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Cycle filter (all/images/videos)"),
        ]),
        Line::from(vec![
            Span::styled("  q / Esc", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Quit"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

/// Renders the welcome dialog overlay
pub fn render_welcome_overlay(frame: &mut Frame) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to picsweep!",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Swipe through your media library one item at a time."),
        Line::from("Nothing is removed until you confirm the whole batch,"),
        Line::from("and confirmed items go to the system trash."),
        Line::from(""),
        Line::from(vec![
            Span::styled("→", Style::default().fg(ACCENT_KEEP)),
            Span::raw(" keep   "),
            Span::styled("←", Style::default().fg(ACCENT_TRASH)),
            Span::raw(" trash   "),
            Span::styled("u", Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::raw(" undo   "),
            Span::styled("d", Style::default().fg(ACCENT_TRASH)),
            Span::raw(" delete pending"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to start",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

/// Formats a byte count for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Centers a percentage-sized rectangle inside `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
