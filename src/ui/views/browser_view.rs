use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::counter::CounterMode;
use crate::deck::format_duration;
use crate::ui::layout::BrowserLayout;
use crate::ui::theme;
use crate::ui::views::View;
use crate::ui::widgets::track_table::TrackTableWidget;

pub struct BrowserView;

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {label:<11}"), Style::default().fg(theme::DIM)),
        Span::styled(value, Style::default().fg(theme::FG)),
    ])
}

impl View for BrowserView {
    fn render(&self, state: &AppState, frame: &mut Frame, area: Rect) {
        let layout = BrowserLayout::new(area);

        frame.render_widget(
            TrackTableWidget {
                tracks: &state.library,
                selected: &state.selected,
                cursor: state.cursor,
            },
            layout.tracks,
        );

        render_deck_panel(state, frame, layout.config);
        render_selection_panel(state, frame, layout.selection);
    }
}

fn render_deck_panel(state: &AppState, frame: &mut Frame, area: Rect) {
    let cfg = &state.config;
    let tape = cfg.tape_type.info();

    let mut lines = vec![
        Line::from(Span::styled("  DECK", Style::default().fg(theme::DIM))),
        Line::default(),
        field(
            "Deck:",
            cfg.deck_model.clone().unwrap_or_else(|| "(generic)".to_string()),
        ),
        field("Tape:", format!("{} {}", cfg.tape_type.label(), tape.name)),
        field("Bias:", tape.bias.to_string()),
        field(
            "Side:",
            format!(
                "{:.0} min, leader {:.0}s, gap {:.0}s",
                cfg.duration_minutes(),
                cfg.leader_gap,
                cfg.track_gap
            ),
        ),
    ];

    let counter_value = match cfg.counter_mode {
        CounterMode::Manual => state
            .calibration
            .as_ref()
            .map(|c| format!("{} ({} checkpoints)", state.session.mode().label(), c.checkpoints.len()))
            .unwrap_or_else(|| state.session.mode().label().to_string()),
        _ => format!(
            "{} at {} counts/s",
            state.session.mode().label(),
            cfg.counter_rate
        ),
    };
    lines.push(field("Counter:", counter_value));

    let norm_value = match cfg.normalization {
        crate::config::Normalization::Lufs => {
            format!("{} to {:+.1} LUFS", cfg.normalization.label(), cfg.target_lufs)
        }
        crate::config::Normalization::Peak => cfg.normalization.label().to_string(),
    };
    lines.push(field("Level:", norm_value));

    for warning in cfg.warnings() {
        lines.push(Line::from(Span::styled(
            format!("  ! {warning}"),
            Style::default().fg(theme::WARN_YELLOW),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_selection_panel(state: &AppState, frame: &mut Frame, area: Rect) {
    let plan = state.projected_plan();
    let tape_duration = state.config.tape_duration;

    let mut lines = vec![
        Line::from(Span::styled("  SELECTION", Style::default().fg(theme::DIM))),
        Line::default(),
        field(
            "Tracks:",
            format!("{} of {}", state.selected_count(), state.library.len()),
        ),
        field(
            "Runtime:",
            format!(
                "{} of {} with gaps",
                format_duration(plan.total_time()),
                format_duration(tape_duration)
            ),
        ),
    ];

    if plan.is_empty() {
        lines.push(Line::from(Span::styled(
            "  pick tracks with Space, then Enter",
            Style::default().fg(theme::DIM),
        )));
    } else if plan.fits_on(tape_duration) {
        lines.push(Line::from(Span::styled(
            format!(
                "  fits with {} to spare",
                format_duration(tape_duration - plan.total_time())
            ),
            Style::default().fg(theme::PLAYING_GREEN),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!(
                "  over by {}, the tape will run out",
                format_duration(plan.overrun(tape_duration))
            ),
            Style::default().fg(theme::RECORD_RED),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}
