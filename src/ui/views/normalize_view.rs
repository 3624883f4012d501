use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, NormStatus};
use crate::ui::theme;
use crate::ui::views::View;

pub struct NormalizeView;

impl View for NormalizeView {
    fn render(&self, state: &AppState, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Progress line
                Constraint::Length(1), // Bar
                Constraint::Length(1),
                Constraint::Min(4), // Per-track status
            ])
            .split(area);

        let total = state.queue.len();
        let done = state.norm_done_count();
        frame.render_widget(
            Paragraph::new(format!(
                "  Normalizing {done}/{total} ({})",
                state.config.normalization.label()
            ))
            .style(Style::default().fg(theme::ACCENT)),
            chunks[0],
        );

        render_bar(frame, chunks[1], done, total);
        render_track_list(state, frame, chunks[3]);
    }
}

fn render_bar(frame: &mut Frame, area: Rect, done: usize, total: usize) {
    let width = area.width.saturating_sub(4) as usize;
    if width == 0 {
        return;
    }
    let filled = if total == 0 { 0 } else { width * done / total };
    let bar: String = "█".repeat(filled) + &"░".repeat(width - filled);
    frame.render_widget(
        Paragraph::new(format!("  {bar}")).style(Style::default().fg(theme::PLAYING_GREEN)),
        area,
    );
}

fn render_track_list(state: &AppState, frame: &mut Frame, area: Rect) {
    // Keep the track being worked on in view as the list scrolls.
    let visible = area.height as usize;
    let first_open = state
        .norm_status
        .iter()
        .position(|s| matches!(s, NormStatus::Pending | NormStatus::Working))
        .unwrap_or(state.queue.len());
    let offset = first_open
        .saturating_sub(visible / 2)
        .min(state.queue.len().saturating_sub(visible));

    let mut lines = Vec::new();
    for (track, status) in state.queue.iter().zip(&state.norm_status).skip(offset) {
        let (color, note) = match status {
            NormStatus::Pending => (theme::DIM, String::new()),
            NormStatus::Working => (theme::ACCENT, "working".to_string()),
            NormStatus::Done => (theme::PLAYING_GREEN, String::new()),
            NormStatus::Failed(e) => (theme::RECORD_RED, e.clone()),
        };
        let mut spans = vec![
            Span::styled(
                format!("  {} {:<40}", status.glyph(), track.name),
                Style::default().fg(color),
            ),
        ];
        if !note.is_empty() {
            spans.push(Span::styled(note, Style::default().fg(theme::DIM)));
        }
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines), area);
}
