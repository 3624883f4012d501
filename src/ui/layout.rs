use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main screen layout regions
pub struct ScreenLayout {
    pub header: Rect,
    pub main: Rect,
    pub footer: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header (brand + screen tabs)
                Constraint::Min(10),   // Main content area
                Constraint::Length(2), // Footer (key hints + status)
            ])
            .split(area);

        Self {
            header: chunks[0],
            main: chunks[1],
            footer: chunks[2],
        }
    }
}

/// Browser layout: track list on the left, deck settings and the selection
/// summary stacked on the right
pub struct BrowserLayout {
    pub tracks: Rect,
    pub config: Rect,
    pub selection: Rect,
}

impl BrowserLayout {
    pub fn new(area: Rect) -> Self {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(8)])
            .split(columns[1]);

        Self {
            tracks: columns[0],
            config: side[0],
            selection: side[1],
        }
    }
}

/// Recording layout: cassette animation on top, counter window, the current
/// track's waveform, VU meters, transport line
pub struct RecordingLayout {
    pub cassette: Rect,
    pub readout: Rect,
    pub waveform: Rect,
    pub meters: Rect,
    pub transport: Rect,
}

impl RecordingLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),   // Cassette animation
                Constraint::Length(3), // Counter window + clocks
                Constraint::Length(4), // Waveform strip
                Constraint::Length(2), // VU meters L/R
                Constraint::Length(1), // Transport line
            ])
            .split(area);

        Self {
            cassette: chunks[0],
            readout: chunks[1],
            waveform: chunks[2],
            meters: chunks[3],
            transport: chunks[4],
        }
    }
}
