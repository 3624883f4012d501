use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::app::RecordPhase;
use crate::ui::theme;

pub struct TransportBarWidget {
    pub phase: RecordPhase,
    pub track_label: String,
    pub track_name: String,
}

impl Widget for TransportBarWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let y = area.y;
        let (icon, icon_color) = match self.phase {
            RecordPhase::Leader => ("● REC  LEADER", theme::RECORD_RED),
            RecordPhase::Playing => ("● REC  TRACK ", theme::RECORD_RED),
            RecordPhase::Gap { .. } => ("● REC  GAP   ", theme::RECORD_RED),
            RecordPhase::Done => ("■ SIDE DONE  ", theme::PLAYING_GREEN),
        };
        buf.set_string(area.x + 1, y, icon, Style::default().fg(icon_color));

        buf.set_string(
            area.x + 16,
            y,
            &self.track_label,
            Style::default().fg(theme::ACCENT),
        );

        let name_x = area.x + 16 + self.track_label.len() as u16 + 2;
        if name_x < area.x + area.width {
            let room = (area.x + area.width - name_x) as usize;
            let name: String = self.track_name.chars().take(room).collect();
            buf.set_string(name_x, y, name, Style::default().fg(theme::FG));
        }
    }
}
