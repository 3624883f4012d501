use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::deck::format_duration;
use crate::library::TrackInfo;
use crate::ui::theme;

/// Scrollable source-track list with checkboxes for the tape selection.
pub struct TrackTableWidget<'a> {
    pub tracks: &'a [TrackInfo],
    pub selected: &'a [bool],
    pub cursor: usize,
}

fn scroll_offset(cursor: usize, len: usize, visible: usize) -> usize {
    if len <= visible {
        return 0;
    }
    cursor.saturating_sub(visible / 2).min(len - visible)
}

impl Widget for TrackTableWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 30 || area.height < 2 {
            return;
        }

        buf.set_string(
            area.x + 5,
            area.y,
            "TRACK",
            Style::default().fg(theme::DIM),
        );
        buf.set_string(
            area.x + area.width.saturating_sub(17),
            area.y,
            "LENGTH  FORMAT",
            Style::default().fg(theme::DIM),
        );

        if self.tracks.is_empty() {
            buf.set_string(
                area.x + 2,
                area.y + 2,
                "no audio files found in the track folder",
                Style::default().fg(theme::WARN_YELLOW),
            );
            return;
        }

        let visible = area.height.saturating_sub(1) as usize;
        let offset = scroll_offset(self.cursor, self.tracks.len(), visible);
        let name_width = area.width.saturating_sub(29) as usize;

        for (row, index) in (offset..self.tracks.len().min(offset + visible)).enumerate() {
            let track = &self.tracks[index];
            let y = area.y + 1 + row as u16;
            let at_cursor = index == self.cursor;
            let picked = self.selected.get(index).copied().unwrap_or(false);

            if at_cursor {
                for x in area.x..area.x + area.width {
                    buf.set_string(x, y, " ", Style::default().bg(theme::SELECTED_BG));
                }
            }
            let row_style = |color| {
                if at_cursor {
                    Style::default().fg(color).bg(theme::SELECTED_BG)
                } else {
                    Style::default().fg(color)
                }
            };

            let marker = if at_cursor { "▸" } else { " " };
            buf.set_string(area.x, y, marker, row_style(theme::ACCENT));

            let tick = if picked { "[x]" } else { "[ ]" };
            let tick_color = if picked { theme::ACCENT } else { theme::DIM };
            buf.set_string(area.x + 1, y, tick, row_style(tick_color));

            buf.set_string(
                area.x + 5,
                y,
                format!("{:>2}.", index + 1),
                row_style(theme::DIM),
            );

            let name: String = track.name.chars().take(name_width).collect();
            let name_color = if picked { theme::ACCENT } else { theme::FG };
            buf.set_string(area.x + 9, y, name, row_style(name_color));

            buf.set_string(
                area.x + area.width.saturating_sub(19),
                y,
                format!("{:>6}", format_duration(track.duration)),
                row_style(theme::FG),
            );
            buf.set_string(
                area.x + area.width.saturating_sub(11),
                y,
                format!("{} {}", track.codec, track.bitrate_label()),
                row_style(theme::DIM),
            );
        }
    }
}
