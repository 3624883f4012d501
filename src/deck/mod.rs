pub mod profiles;
pub mod tapes;
pub mod tracklist;

pub use profiles::{write_sample_profiles, DeckProfile};
pub use tapes::TapeType;
pub use tracklist::{format_duration, write_tracklist};
