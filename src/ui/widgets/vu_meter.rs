use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

use crate::ui::theme;

/// Stereo level pair with peak-hold ticks, one row per channel.
pub struct StereoVuWidget {
    pub levels: (f32, f32),
    pub peaks: (f32, f32),
}

fn draw_bar(buf: &mut Buffer, x: u16, y: u16, width: u16, level: f32, peak: f32) {
    for col in 0..width {
        buf.set_string(x + col, y, "░", Style::default().fg(theme::DIM));
    }

    let lit = ((level.clamp(0.0, 1.0)) * width as f32) as u16;
    for col in 0..lit.min(width) {
        let frac = col as f32 / width as f32;
        let color = if frac < 0.6 {
            theme::VU_GREEN
        } else if frac < 0.85 {
            theme::VU_YELLOW
        } else {
            theme::VU_RED
        };
        buf.set_string(x + col, y, "█", Style::default().fg(color));
    }

    let hold = ((peak.clamp(0.0, 1.0)) * width as f32) as u16;
    if hold > 0 && hold <= width {
        buf.set_string(x + hold - 1, y, "│", Style::default().fg(Color::White));
    }
}

impl Widget for StereoVuWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 6 || area.height < 1 {
            return;
        }

        let bar_x = area.x + 3;
        let bar_width = area.width.saturating_sub(4);

        buf.set_string(area.x + 1, area.y, "L", Style::default().fg(theme::FG));
        draw_bar(buf, bar_x, area.y, bar_width, self.levels.0, self.peaks.0);

        if area.height > 1 {
            buf.set_string(area.x + 1, area.y + 1, "R", Style::default().fg(theme::FG));
            draw_bar(buf, bar_x, area.y + 1, bar_width, self.levels.1, self.peaks.1);
        }
    }
}
