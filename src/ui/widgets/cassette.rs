use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line};
use ratatui::widgets::Widget;

use crate::ui::theme;

pub struct CassetteWidget {
    /// Fraction of the side wound onto the take-up reel, 0.0 - 1.0
    pub side_position: f64,
    /// Reels turn while the deck is rolling
    pub spinning: bool,
    /// Red reels while tape is being laid down
    pub recording: bool,
    /// Animation frame counter (reel rotation)
    pub frame: u64,
    /// Text on the shell label
    pub label: String,
}

fn draw_reel(ctx: &mut Context, x: f64, y: f64, radius: f64, angle: f64, color: Color) {
    ctx.draw(&Circle {
        x,
        y,
        radius,
        color,
    });
    // Hub with four drive teeth
    ctx.draw(&Circle {
        x,
        y,
        radius: 2.2,
        color,
    });
    for i in 0..4 {
        let spoke = angle + (i as f64) * std::f64::consts::TAU / 4.0;
        ctx.draw(&Line {
            x1: x + spoke.cos() * 2.2,
            y1: y + spoke.sin() * 2.2,
            x2: x + spoke.cos() * radius * 0.85,
            y2: y + spoke.sin() * radius * 0.85,
            color,
        });
    }
}

impl Widget for CassetteWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let pos = self.side_position.clamp(0.0, 1.0);

        // Supply reel pays out as the take-up reel fills
        let max_radius = 12.0;
        let min_radius = 4.5;
        let swing = max_radius - min_radius;
        let supply_radius = max_radius - pos * swing;
        let takeup_radius = min_radius + pos * swing;

        let cx = area.width as f64;
        let cy = area.height as f64 * 2.0; // braille doubles vertical res

        let supply_cx = cx * 0.32;
        let takeup_cx = cx * 0.68;
        let reel_cy = cy * 0.50;

        let angle = if self.spinning {
            (self.frame as f64) * 0.15
        } else {
            0.0
        };

        let reel_color = if self.recording {
            theme::RECORD_RED
        } else {
            theme::DIM
        };
        let tape_color = theme::TAPE_BROWN;
        let label = self.label;

        let canvas = Canvas::default()
            .x_bounds([0.0, cx])
            .y_bounds([0.0, cy])
            .marker(ratatui::symbols::Marker::Braille)
            .paint(move |ctx| {
                // Shell outline
                let x1 = cx * 0.08;
                let x2 = cx * 0.92;
                let y1 = cy * 0.08;
                let y2 = cy * 0.88;
                ctx.draw(&Line { x1, y1: y2, x2, y2, color: theme::DIM });
                ctx.draw(&Line { x1, y1, x2, y2: y1, color: theme::DIM });
                ctx.draw(&Line { x1, y1, x2: x1, y2, color: theme::DIM });
                ctx.draw(&Line { x1: x2, y1, x2, y2, color: theme::DIM });

                draw_reel(ctx, supply_cx, reel_cy, supply_radius, angle, reel_color);
                draw_reel(ctx, takeup_cx, reel_cy, takeup_radius, -angle, reel_color);

                // Tape path: down from the supply reel, across the head
                // opening at the bottom of the shell, up to the take-up reel
                let head_y = cy * 0.16;
                ctx.draw(&Line {
                    x1: supply_cx,
                    y1: reel_cy - supply_radius,
                    x2: cx * 0.26,
                    y2: head_y,
                    color: tape_color,
                });
                ctx.draw(&Line {
                    x1: cx * 0.26,
                    y1: head_y,
                    x2: cx * 0.74,
                    y2: head_y,
                    color: tape_color,
                });
                ctx.draw(&Line {
                    x1: cx * 0.74,
                    y1: head_y,
                    x2: takeup_cx,
                    y2: reel_cy - takeup_radius,
                    color: tape_color,
                });

                // Record head pressed against the tape
                let head_x = cx * 0.50;
                ctx.draw(&Line {
                    x1: head_x - 1.5,
                    y1: head_y - 2.0,
                    x2: head_x + 1.5,
                    y2: head_y - 2.0,
                    color: theme::ACCENT,
                });
                ctx.draw(&Line {
                    x1: head_x,
                    y1: head_y - 2.0,
                    x2: head_x,
                    y2: head_y - 3.5,
                    color: theme::ACCENT,
                });

                // Shell label
                ctx.print(
                    cx * 0.5 - label.len() as f64 * 0.5,
                    cy * 0.92,
                    ratatui::text::Line::from(label.clone())
                        .style(ratatui::style::Style::default().fg(theme::ACCENT)),
                );
            });

        canvas.render(area, buf);
    }
}
