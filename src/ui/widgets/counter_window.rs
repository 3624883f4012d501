use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::ui::theme;

/// The deck's mechanical counter window: four digits behind glass, with
/// tape clock and mode readouts beside it.
pub struct CounterWindowWidget {
    pub counter: String,
    pub elapsed: String,
    pub total: String,
    pub mode_label: &'static str,
    pub detail: String,
}

impl Widget for CounterWindowWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 3 {
            return;
        }

        let x = area.x + 1;
        let digits = format!("{:>4}", self.counter);

        buf.set_string(x, area.y, "┌──────┐", Style::default().fg(theme::DIM));
        buf.set_string(x, area.y + 1, "│      │", Style::default().fg(theme::DIM));
        buf.set_string(
            x + 2,
            area.y + 1,
            &digits,
            Style::default().fg(theme::COUNTER_GREEN),
        );
        buf.set_string(x, area.y + 2, "└──────┘", Style::default().fg(theme::DIM));

        let info_x = x + 10;
        buf.set_string(
            info_x,
            area.y,
            format!("TAPE {} / {}", self.elapsed, self.total),
            Style::default().fg(theme::FG),
        );
        buf.set_string(
            info_x,
            area.y + 1,
            &self.detail,
            Style::default().fg(theme::ACCENT),
        );
        buf.set_string(
            info_x,
            area.y + 2,
            format!("COUNTER {}", self.mode_label),
            Style::default().fg(theme::DIM),
        );
    }
}
