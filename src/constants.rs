pub const SAMPLE_RATE: u32 = 44_100;
/// UI refresh rate target
pub const UI_FPS: u64 = 60;
/// Channel capacity for inter-thread messages
pub const CHANNEL_CAPACITY: usize = 1024;
/// Compact cassette tape speed, 1 7/8 ips in mm/s
pub const TAPE_SPEED_MM_S: f64 = 47.625;
/// Takeup hub radius of a standard C-shell in mm
pub const HUB_RADIUS_MM: f64 = 10.0;
/// Tape stock thickness for a C60/C90 class tape in mm
pub const TAPE_THICKNESS_MM: f64 = 0.016;
/// Bars in a track's waveform strip
pub const WAVEFORM_WIDTH: usize = 200;
