use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::audio::normalize::NormalizedTrack;
use crate::counter::format_counter;
use crate::deck::format_duration;
use crate::ui::theme;
use crate::ui::views::View;

pub struct SummaryView;

fn level_note(track: &NormalizedTrack) -> String {
    if let Some(lufs) = track.loudness {
        format!("{lufs:+.1} LUFS")
    } else if let Some(gain) = track.gain_db {
        format!("{gain:+.1} dB gain")
    } else {
        format!("peak {:.1} / rms {:.1} dB", track.peak_db, track.rms_db)
    }
}

impl View for SummaryView {
    fn render(&self, state: &AppState, frame: &mut Frame, area: Rect) {
        let Some(plan) = &state.plan else {
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled("  TAPE PLAN", Style::default().fg(theme::DIM))),
            Line::default(),
            Line::from(Span::styled(
                format!(
                    "   #  {:<34} {:>6} {:>6}  {:<11} LEVEL",
                    "TRACK", "START", "END", "COUNTER"
                ),
                Style::default().fg(theme::DIM),
            )),
        ];

        for (i, track) in plan.tracks.iter().enumerate() {
            let counters = state
                .stamps
                .get(i)
                .map(|(a, b)| format!("{} - {}", format_counter(*a), format_counter(*b)))
                .unwrap_or_default();
            let level = state
                .tape_tracks
                .get(i)
                .map(level_note)
                .unwrap_or_default();
            let name: String = track.name.chars().take(34).collect();
            lines.push(Line::from(Span::styled(
                format!(
                    "  {:>2}. {:<34} {:>6} {:>6}  {:<11} {}",
                    i + 1,
                    name,
                    format_duration(track.start),
                    format_duration(track.end()),
                    counters,
                    level
                ),
                Style::default().fg(theme::FG),
            )));
        }

        lines.push(Line::default());
        let leader_counter = state
            .session
            .counter_at(state.config.leader_gap)
            .unwrap_or(0.0);
        lines.push(Line::from(Span::styled(
            format!(
                "  Leader: {:.0}s (counter 0000 - {})",
                state.config.leader_gap,
                format_counter(leader_counter)
            ),
            Style::default().fg(theme::DIM),
        )));

        let tape_duration = state.config.tape_duration;
        let fit_line = if plan.fits_on(tape_duration) {
            Span::styled(
                format!(
                    "  Total {} of {}, {} to spare",
                    format_duration(plan.total_time()),
                    format_duration(tape_duration),
                    format_duration(tape_duration - plan.total_time())
                ),
                Style::default().fg(theme::PLAYING_GREEN),
            )
        } else {
            Span::styled(
                format!(
                    "  Total {} of {}, over by {}",
                    format_duration(plan.total_time()),
                    format_duration(tape_duration),
                    format_duration(plan.overrun(tape_duration))
                ),
                Style::default().fg(theme::RECORD_RED),
            )
        };
        lines.push(Line::from(fit_line));

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "  Enter writes the tracklist and starts the take. Press record",
            Style::default().fg(theme::ACCENT),
        )));
        lines.push(Line::from(Span::styled(
            "  on the deck when the leader countdown begins.",
            Style::default().fg(theme::ACCENT),
        )));

        frame.render_widget(Paragraph::new(lines), area);
    }
}
