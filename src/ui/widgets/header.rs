use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::app::Screen;
use crate::ui::theme;

/// Top bar: deck identity on the left, the session's stations on the right.
pub struct HeaderWidget {
    pub screen: Screen,
    pub deck_model: String,
    pub tape_label: &'static str,
    pub side_minutes: f64,
}

impl Widget for HeaderWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 40 || area.height < 2 {
            return;
        }
        let y = area.y + 1;

        for x in area.x..area.x + area.width {
            buf.set_string(x, y, " ", Style::default().bg(theme::HEADER_BG));
        }

        let mut x = area.x + 1;
        buf.set_string(
            x,
            y,
            "DECKREC",
            Style::default().fg(theme::ACCENT).bg(theme::HEADER_BG),
        );
        x += 9;
        let identity = format!(
            "{}  {}  {:.0} min/side",
            self.deck_model, self.tape_label, self.side_minutes
        );
        buf.set_string(
            x,
            y,
            &identity,
            Style::default().fg(theme::FG).bg(theme::HEADER_BG),
        );

        let screens = [
            Screen::Browser,
            Screen::Normalizing,
            Screen::Summary,
            Screen::Recording,
        ];
        let tabs_width: u16 = screens
            .iter()
            .map(|s| s.label().len() as u16 + 3)
            .sum();
        let mut tab_x = area.x + area.width.saturating_sub(tabs_width + 1);
        for screen in screens {
            let label = format!(" {} ", screen.label());
            let style = if screen == self.screen {
                Style::default().fg(theme::BG).bg(theme::ACCENT)
            } else {
                Style::default().fg(theme::DIM).bg(theme::HEADER_BG)
            };
            buf.set_string(tab_x, y, &label, style);
            tab_x += label.len() as u16 + 1;
        }
    }
}
