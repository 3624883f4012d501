pub mod cassette;
pub mod counter_window;
pub mod header;
pub mod keyboard_hint;
pub mod track_table;
pub mod transport_bar;
pub mod vu_meter;
pub mod waveform;
