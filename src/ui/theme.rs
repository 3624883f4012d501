use ratatui::style::Color;

/// Late-70s deck faceplate palette: warm amber on near-black, with a
/// fluorescent green counter window.
pub const BG: Color = Color::Rgb(18, 16, 12);
pub const FG: Color = Color::Rgb(210, 200, 180);
pub const DIM: Color = Color::Rgb(96, 86, 68);
pub const ACCENT: Color = Color::Rgb(255, 176, 48);       // Faceplate amber
pub const RECORD_RED: Color = Color::Rgb(225, 55, 50);
pub const PLAYING_GREEN: Color = Color::Rgb(80, 220, 120);
pub const WARN_YELLOW: Color = Color::Rgb(225, 200, 60);
pub const COUNTER_GREEN: Color = Color::Rgb(130, 255, 160);
pub const TAPE_BROWN: Color = Color::Rgb(125, 88, 58);
pub const VU_GREEN: Color = Color::Rgb(50, 220, 80);
pub const VU_YELLOW: Color = Color::Rgb(220, 220, 50);
pub const VU_RED: Color = Color::Rgb(220, 50, 50);
pub const HEADER_BG: Color = Color::Rgb(34, 30, 23);
pub const SELECTED_BG: Color = Color::Rgb(48, 42, 30);
