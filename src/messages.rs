use crate::audio::normalize::NormalizedTrack;

/// Messages from UI thread → Audio callback
#[derive(Debug, Clone)]
pub enum AudioCmd {
    /// Start playing a track, handed over as interleaved stereo samples.
    Play(Vec<f32>),
    /// Drop whatever is playing and go silent.
    Stop,
}

/// Messages from Audio callback → UI thread
#[derive(Debug, Clone)]
pub enum AudioMsg {
    /// Seconds into the currently playing track.
    Position(f64),
    /// Stereo RMS levels (left, right).
    Levels(f32, f32),
    /// Stereo peak holds (left, right).
    Peaks(f32, f32),
    /// The current track played out to its last sample.
    Finished,
}

/// Messages from Normalization worker → UI thread
#[derive(Debug, Clone)]
pub enum NormalizeMsg {
    /// Work on track `index` has begun.
    Started { index: usize, name: String },
    /// Track `index` is normalized and analyzed.
    Done {
        index: usize,
        track: Box<NormalizedTrack>,
    },
    /// Track `index` could not be processed.
    Failed {
        index: usize,
        name: String,
        error: String,
    },
    /// The whole batch is finished, successfully or not.
    Finished,
}

/// Semantic key events, resolved against the active screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    CursorUp,
    CursorDown,
    ToggleSelect,
    SelectAll,
    ClearSelection,
    /// Audition the track under the cursor through ffplay.
    Preview,
    StopPreview,
    /// Normalize the selection and move toward recording.
    BeginRecording,
    /// Accept the plan on the summary screen and roll tape.
    Confirm,
    Back,
    Quit,
}
