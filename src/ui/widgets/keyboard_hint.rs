use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::ui::theme;

/// Footer: key hints on the first row, transient status line on the second.
pub struct KeyboardHintWidget {
    pub hints: Vec<(&'static str, &'static str)>,
    pub status: String,
}

impl Widget for KeyboardHintWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let mut x = area.x + 1;
        let y = area.y;
        for (key, desc) in &self.hints {
            let needed = (key.len() + desc.len() + 4) as u16;
            if x + needed > area.x + area.width {
                break;
            }
            buf.set_string(x, y, format!("[{key}]"), Style::default().fg(theme::ACCENT));
            x += key.len() as u16 + 3;
            buf.set_string(x, y, *desc, Style::default().fg(theme::FG));
            x += desc.len() as u16 + 2;
        }

        if area.height > 1 && !self.status.is_empty() {
            let room = area.width.saturating_sub(2) as usize;
            let status: String = self.status.chars().take(room).collect();
            buf.set_string(
                area.x + 1,
                y + 1,
                status,
                Style::default().fg(theme::WARN_YELLOW),
            );
        }
    }
}
