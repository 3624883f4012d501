use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

use crate::ui::theme;

/// Level strip of the current track, mirrored around the midline. The part
/// already on tape glows green; the rest waits in the dark.
pub struct WaveformWidget {
    pub strip: Vec<f32>,
    pub progress: f64,
}

impl Widget for WaveformWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 8 || area.height < 2 {
            return;
        }

        let width = area.width.saturating_sub(2) as usize;
        let x0 = area.x + 1;
        let mid_y = area.y + area.height / 2;
        let half_h = (area.height / 2) as f32;

        if self.strip.is_empty() {
            for x in x0..x0 + width as u16 {
                buf.set_string(x, mid_y, "─", Style::default().fg(theme::DIM));
            }
            return;
        }

        let cursor_col = ((self.progress.clamp(0.0, 1.0)) * width as f64) as usize;

        for col in 0..width {
            let idx = col * self.strip.len() / width;
            let value = self.strip[idx.min(self.strip.len() - 1)].clamp(0.0, 1.0);
            let rise = (value * half_h) as u16;

            let color = if col == cursor_col {
                Color::White
            } else if col < cursor_col {
                theme::PLAYING_GREEN
            } else {
                theme::DIM
            };

            let x = x0 + col as u16;
            if rise == 0 {
                buf.set_string(x, mid_y, "·", Style::default().fg(color));
                continue;
            }
            for dy in 0..=rise {
                if mid_y >= dy && mid_y - dy >= area.y {
                    buf.set_string(x, mid_y - dy, "│", Style::default().fg(color));
                }
                let below = mid_y + dy;
                if below < area.y + area.height {
                    buf.set_string(x, below, "│", Style::default().fg(color));
                }
            }
        }
    }
}
