use ratatui::layout::Rect;
use ratatui::Frame;

use crate::app::{AppState, RecordPhase};
use crate::deck::format_duration;
use crate::ui::layout::RecordingLayout;
use crate::ui::views::View;
use crate::ui::widgets::cassette::CassetteWidget;
use crate::ui::widgets::counter_window::CounterWindowWidget;
use crate::ui::widgets::transport_bar::TransportBarWidget;
use crate::ui::widgets::vu_meter::StereoVuWidget;
use crate::ui::widgets::waveform::WaveformWidget;

pub struct RecordingView;

impl View for RecordingView {
    fn render(&self, state: &AppState, frame: &mut Frame, area: Rect) {
        let layout = RecordingLayout::new(area);
        let elapsed = state.session_elapsed();
        let total = state.tape_tracks.len();

        let rolling = state.phase != RecordPhase::Done;
        let label = state
            .config
            .deck_model
            .clone()
            .unwrap_or_else(|| "COMPACT CASSETTE".to_string());
        frame.render_widget(
            CassetteWidget {
                side_position: state.side_progress(),
                spinning: rolling,
                recording: rolling,
                frame: state.frame,
                label,
            },
            layout.cassette,
        );

        let detail = match state.phase {
            RecordPhase::Leader => format!(
                "LEADER  first track in {:.0}s",
                (state.config.leader_gap - elapsed).max(0.0).ceil()
            ),
            RecordPhase::Playing => format!(
                "TRK {:02}/{:02}  {}",
                state.track_index + 1,
                total,
                state.current_track().map(|t| t.name.as_str()).unwrap_or("")
            ),
            RecordPhase::Gap { until } => {
                format!("GAP  next track in {:.0}s", (until - elapsed).max(0.0).ceil())
            }
            RecordPhase::Done => "side complete, stop the deck".to_string(),
        };
        frame.render_widget(
            CounterWindowWidget {
                counter: state.counter_display(),
                elapsed: format_duration(elapsed),
                total: format_duration(state.config.tape_duration),
                mode_label: state.session.mode().label(),
                detail,
            },
            layout.readout,
        );

        frame.render_widget(
            WaveformWidget {
                strip: state
                    .current_track()
                    .map(|t| t.waveform.clone())
                    .unwrap_or_default(),
                progress: state.track_progress(),
            },
            layout.waveform,
        );

        frame.render_widget(
            StereoVuWidget {
                levels: state.levels,
                peaks: state.peaks,
            },
            layout.meters,
        );

        frame.render_widget(
            TransportBarWidget {
                phase: state.phase,
                track_label: format!("TRK {:02}/{:02}", state.track_index + 1, total),
                track_name: state
                    .current_track()
                    .map(|t| t.name.clone())
                    .unwrap_or_default(),
            },
            layout.transport,
        );
    }
}
