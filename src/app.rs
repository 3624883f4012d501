use std::path::PathBuf;
use std::time::Instant;

use crate::audio::normalize::NormalizedTrack;
use crate::config::DeckConfig;
use crate::counter::{format_counter, CalibrationSet, CounterSession};
use crate::library::TrackInfo;
use crate::plan::RecordingPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Browser,
    Normalizing,
    Summary,
    Recording,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Screen::Browser => "BROWSE",
            Screen::Normalizing => "NORMALIZE",
            Screen::Summary => "CONFIRM",
            Screen::Recording => "RECORD",
        }
    }
}

/// Where the live session is along the tape side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordPhase {
    /// Blank leader running past the head before the first track.
    Leader,
    /// A track is going to tape.
    Playing,
    /// Silence between tracks; `until` is session time when the next starts.
    Gap { until: f64 },
    /// The whole side has been recorded.
    Done,
}

#[derive(Debug, Clone)]
pub enum NormStatus {
    Pending,
    Working,
    Done,
    Failed(String),
}

impl NormStatus {
    pub fn glyph(&self) -> &'static str {
        match self {
            NormStatus::Pending => "·",
            NormStatus::Working => "▶",
            NormStatus::Done => "✔",
            NormStatus::Failed(_) => "✘",
        }
    }
}

pub struct AppState {
    pub screen: Screen,
    pub config: DeckConfig,
    pub session: CounterSession,
    pub calibration: Option<CalibrationSet>,

    // Browser
    pub library: Vec<TrackInfo>,
    pub cursor: usize,
    pub selected: Vec<bool>,

    // Normalization batch, in tape order
    pub queue: Vec<TrackInfo>,
    pub norm_status: Vec<NormStatus>,
    pub slots: Vec<Option<NormalizedTrack>>,

    // Confirmed side
    pub tape_tracks: Vec<NormalizedTrack>,
    pub plan: Option<RecordingPlan>,
    pub stamps: Vec<(f64, f64)>,
    pub tracklist_path: Option<PathBuf>,

    // Live recording
    pub phase: RecordPhase,
    pub track_index: usize,
    pub track_pos: f64,
    pub started: Option<Instant>,
    pub levels: (f32, f32),
    pub peaks: (f32, f32),

    pub status: String,
    pub audio_ready: bool,
    pub should_quit: bool,
    pub frame: u64,
}

impl AppState {
    pub fn new(
        config: DeckConfig,
        session: CounterSession,
        calibration: Option<CalibrationSet>,
        library: Vec<TrackInfo>,
    ) -> Self {
        let selected = vec![false; library.len()];
        Self {
            screen: Screen::Browser,
            config,
            session,
            calibration,
            library,
            cursor: 0,
            selected,
            queue: Vec::new(),
            norm_status: Vec::new(),
            slots: Vec::new(),
            tape_tracks: Vec::new(),
            plan: None,
            stamps: Vec::new(),
            tracklist_path: None,
            phase: RecordPhase::Leader,
            track_index: 0,
            track_pos: 0.0,
            started: None,
            levels: (0.0, 0.0),
            peaks: (0.0, 0.0),
            status: String::new(),
            audio_ready: false,
            should_quit: false,
            frame: 0,
        }
    }

    // --- Browser ---

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.library.len() {
            self.cursor += 1;
        }
    }

    pub fn toggle_selected(&mut self) {
        if let Some(slot) = self.selected.get_mut(self.cursor) {
            *slot = !*slot;
        }
    }

    pub fn select_all(&mut self) {
        self.selected.fill(true);
    }

    pub fn clear_selection(&mut self) {
        self.selected.fill(false);
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|s| **s).count()
    }

    /// Tracks going to tape, in list order.
    pub fn selected_tracks(&self) -> Vec<TrackInfo> {
        self.library
            .iter()
            .zip(&self.selected)
            .filter(|(_, sel)| **sel)
            .map(|(t, _)| t.clone())
            .collect()
    }

    /// Projected side length from the source durations. Normalization can
    /// shift these slightly; the confirmed plan uses the rendered files.
    pub fn projected_plan(&self) -> RecordingPlan {
        RecordingPlan::build(
            self.config.leader_gap,
            self.config.track_gap,
            self.selected_tracks()
                .into_iter()
                .map(|t| (t.name, t.duration)),
        )
    }

    // --- Normalization ---

    pub fn begin_normalizing(&mut self) -> Vec<TrackInfo> {
        self.queue = self.selected_tracks();
        self.norm_status = vec![NormStatus::Pending; self.queue.len()];
        self.slots = vec![None; self.queue.len()];
        self.screen = Screen::Normalizing;
        self.status.clear();
        self.queue.clone()
    }

    pub fn note_norm_started(&mut self, index: usize) {
        if let Some(slot) = self.norm_status.get_mut(index) {
            *slot = NormStatus::Working;
        }
    }

    pub fn note_norm_done(&mut self, index: usize, track: NormalizedTrack) {
        if let Some(slot) = self.norm_status.get_mut(index) {
            *slot = NormStatus::Done;
        }
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(track);
        }
    }

    pub fn note_norm_failed(&mut self, index: usize, error: String) {
        if let Some(slot) = self.norm_status.get_mut(index) {
            *slot = NormStatus::Failed(error);
        }
    }

    pub fn norm_done_count(&self) -> usize {
        self.norm_status
            .iter()
            .filter(|s| matches!(s, NormStatus::Done | NormStatus::Failed(_)))
            .count()
    }

    /// Settles the batch: failed tracks drop off the side, the rest become
    /// the confirmed plan. Returns false when nothing survived.
    pub fn finish_normalizing(&mut self) -> bool {
        let failed = self
            .norm_status
            .iter()
            .filter(|s| matches!(s, NormStatus::Failed(_)))
            .count();
        self.tape_tracks = self.slots.iter().flatten().cloned().collect();
        if self.tape_tracks.is_empty() {
            self.screen = Screen::Browser;
            self.status = "no tracks survived normalization".to_string();
            return false;
        }
        if failed > 0 {
            self.status = format!("{failed} track(s) failed normalization and were dropped");
        }
        let plan = RecordingPlan::build(
            self.config.leader_gap,
            self.config.track_gap,
            self.tape_tracks
                .iter()
                .map(|t| (t.name.clone(), t.duration)),
        );
        self.stamps = plan.counter_stamps(&self.session).unwrap_or_default();
        self.plan = Some(plan);
        self.screen = Screen::Summary;
        true
    }

    // --- Recording ---

    pub fn start_recording(&mut self) {
        self.screen = Screen::Recording;
        self.phase = RecordPhase::Leader;
        self.track_index = 0;
        self.track_pos = 0.0;
        self.started = Some(Instant::now());
    }

    pub fn abort_recording(&mut self) {
        self.screen = Screen::Browser;
        self.phase = RecordPhase::Leader;
        self.started = None;
        self.status = "recording aborted".to_string();
    }

    /// Back to the browser after a finished side, ready for the flip.
    pub fn finish_side(&mut self) {
        self.screen = Screen::Browser;
        self.phase = RecordPhase::Leader;
        self.started = None;
        self.status = match &self.tracklist_path {
            Some(path) => format!("side recorded, tracklist at {}", path.display()),
            None => "side recorded".to_string(),
        };
    }

    /// Seconds since the leader started rolling.
    pub fn session_elapsed(&self) -> f64 {
        match self.started {
            Some(at) => at.elapsed().as_secs_f64(),
            None => 0.0,
        }
    }

    /// The track now playing, or about to play during a gap.
    pub fn current_track(&self) -> Option<&NormalizedTrack> {
        self.tape_tracks.get(self.track_index)
    }

    pub fn track_progress(&self) -> f64 {
        match self.current_track() {
            Some(t) if t.duration > 0.0 => (self.track_pos / t.duration).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Fraction of the side wound onto the take-up reel.
    pub fn side_progress(&self) -> f64 {
        if self.started.is_none() {
            return 0.0;
        }
        (self.session_elapsed() / self.config.tape_duration).clamp(0.0, 1.0)
    }

    pub fn counter_now(&self) -> f64 {
        self.session
            .counter_at(self.session_elapsed())
            .unwrap_or(0.0)
    }

    pub fn counter_display(&self) -> String {
        format_counter(self.counter_now())
    }

    pub fn recording_done(&self) -> bool {
        self.screen == Screen::Recording && self.phase == RecordPhase::Done
    }

    /// Called when the engine reports the current track has played out.
    pub fn on_track_finished(&mut self) {
        let next = self.track_index + 1;
        if next >= self.tape_tracks.len() {
            self.phase = RecordPhase::Done;
            return;
        }
        // Hold the gap until the planned start so the printed counters stay
        // honest; if playback ran long, start straight away.
        let planned = self
            .plan
            .as_ref()
            .and_then(|p| p.tracks.get(next))
            .map(|t| t.start)
            .unwrap_or_else(|| self.session_elapsed() + self.config.track_gap);
        self.phase = RecordPhase::Gap {
            until: planned.max(self.session_elapsed()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn state_with_library(names: &[&str]) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let args = crate::config::CliArgs::try_parse_from([
            "deckrec",
            "--folder",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let config = DeckConfig::from_args(&args).unwrap();
        let (session, calibration) = config.build_counter().unwrap();
        let library = names
            .iter()
            .enumerate()
            .map(|(i, name)| TrackInfo {
                name: name.to_string(),
                path: PathBuf::from(format!("/tracks/{name}")),
                duration: 60.0 + i as f64 * 30.0,
                codec: "MP3".to_string(),
                bitrate_kbps: Some(320),
            })
            .collect();
        AppState::new(config, session, calibration, library)
    }

    fn rendered(name: &str, duration: f64) -> NormalizedTrack {
        NormalizedTrack {
            name: name.to_string(),
            path: PathBuf::from(format!("/tracks/normalized/{name}.wav")),
            duration,
            peak_db: -0.1,
            rms_db: -14.0,
            loudness: Some(-14.0),
            gain_db: None,
            waveform: vec![0.5; 8],
        }
    }

    #[test]
    fn cursor_stays_inside_the_list() {
        let mut state = state_with_library(&["a.mp3", "b.mp3"]);
        state.cursor_up();
        assert_eq!(state.cursor, 0);
        state.cursor_down();
        state.cursor_down();
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn selection_round_trip() {
        let mut state = state_with_library(&["a.mp3", "b.mp3", "c.mp3"]);
        state.toggle_selected();
        state.cursor_down();
        state.cursor_down();
        state.toggle_selected();
        assert_eq!(state.selected_count(), 2);
        let names: Vec<_> = state
            .selected_tracks()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["a.mp3", "c.mp3"]);

        state.select_all();
        assert_eq!(state.selected_count(), 3);
        state.clear_selection();
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn failed_tracks_drop_out_of_the_plan() {
        let mut state = state_with_library(&["a.mp3", "b.mp3", "c.mp3"]);
        state.select_all();
        let queue = state.begin_normalizing();
        assert_eq!(queue.len(), 3);
        assert_eq!(state.screen, Screen::Normalizing);

        state.note_norm_done(0, rendered("a.mp3", 61.0));
        state.note_norm_failed(1, "no audio stream".to_string());
        state.note_norm_done(2, rendered("c.mp3", 121.0));
        assert_eq!(state.norm_done_count(), 3);

        assert!(state.finish_normalizing());
        assert_eq!(state.screen, Screen::Summary);
        assert_eq!(state.tape_tracks.len(), 2);
        let plan = state.plan.as_ref().unwrap();
        assert_eq!(plan.tracks[0].name, "a.mp3");
        assert_eq!(plan.tracks[1].name, "c.mp3");
        assert_eq!(plan.tracks[1].start, 10.0 + 61.0 + 5.0);
        assert_eq!(state.stamps.len(), 2);
    }

    #[test]
    fn all_failures_fall_back_to_the_browser() {
        let mut state = state_with_library(&["a.mp3"]);
        state.select_all();
        state.begin_normalizing();
        state.note_norm_failed(0, "boom".to_string());
        assert!(!state.finish_normalizing());
        assert_eq!(state.screen, Screen::Browser);
        assert!(state.plan.is_none());
    }

    #[test]
    fn gaps_hold_until_the_planned_start() {
        let mut state = state_with_library(&["a.mp3", "b.mp3"]);
        state.select_all();
        state.begin_normalizing();
        state.note_norm_done(0, rendered("a.mp3", 60.0));
        state.note_norm_done(1, rendered("b.mp3", 90.0));
        assert!(state.finish_normalizing());
        state.start_recording();

        state.track_index = 0;
        state.on_track_finished();
        // Second track is planned at leader 10 + 60 + gap 5.
        assert_eq!(state.phase, RecordPhase::Gap { until: 75.0 });

        state.track_index = 1;
        state.on_track_finished();
        assert_eq!(state.phase, RecordPhase::Done);
        assert!(state.recording_done());
    }

    #[test]
    fn counter_ticks_with_the_static_session() {
        let state = state_with_library(&[]);
        assert_eq!(state.counter_display(), "0000");
        assert_eq!(state.session_elapsed(), 0.0);
    }
}
