pub mod engine;
pub mod normalize;
pub mod preview;
pub mod wav;
