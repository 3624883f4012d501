use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::constants::{HUB_RADIUS_MM, TAPE_SPEED_MM_S, TAPE_THICKNESS_MM};
use crate::counter::{
    CalibrationSet, CalibrationStore, CounterMode, CounterSession, CounterSetup, PhysicsParams,
};
use crate::deck::{DeckProfile, TapeType};
use crate::error::{DeckError, Result};

#[derive(Debug, Parser)]
#[command(name = "deckrec", version, about = "Cassette recording assistant with a modeled tape counter")]
pub struct CliArgs {
    /// Folder with audio tracks
    #[arg(long, default_value = "./tracks")]
    pub folder: PathBuf,

    /// Tape duration per side in minutes
    #[arg(long, default_value_t = 30.0)]
    pub duration: f64,

    /// Gap between tracks in seconds
    #[arg(long, default_value_t = 5.0)]
    pub track_gap: f64,

    /// Leader gap before the first track in seconds
    #[arg(long, default_value_t = 10.0)]
    pub leader_gap: f64,

    /// Normalization method
    #[arg(long, value_enum, default_value = "lufs")]
    pub normalization: Normalization,

    /// Target level for LUFS normalization
    #[arg(long, default_value_t = -14.0, allow_negative_numbers = true)]
    pub target_lufs: f64,

    /// Counter readout mode
    #[arg(long, value_enum, default_value = "static")]
    pub counter_mode: CounterMode,

    /// Counts per second for the static counter, mid-tape pace for physics
    #[arg(long, default_value_t = 1.0)]
    pub counter_rate: f64,

    /// Calibration file for the manual counter, relative to the track folder
    #[arg(long, default_value = "counter_calibration.json")]
    pub counter_config: PathBuf,

    /// Run the interactive counter calibration wizard and exit
    #[arg(long)]
    pub calibrate_counter: bool,

    /// Cassette tape type
    #[arg(long, value_enum, default_value = "type-i")]
    pub tape_type: TapeType,

    /// Deck profile preset JSON; its values override the other options
    #[arg(long)]
    pub deck_profile: Option<PathBuf>,

    /// Path to the ffmpeg binary; ffprobe and ffplay are expected beside it
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg_path: PathBuf,

    /// Write sample deck profiles under ./deck_profiles and exit
    #[arg(long)]
    pub init_profiles: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Two-pass loudness normalization to a LUFS target.
    Lufs,
    /// Gain to bring the loudest sample just under full scale.
    Peak,
}

impl Normalization {
    pub fn label(self) -> &'static str {
        match self {
            Normalization::Lufs => "LUFS Loudness",
            Normalization::Peak => "Peak",
        }
    }
}

/// Resolved settings for one recording session. Durations and gaps are in
/// seconds; the CLI takes tape duration in minutes like cassette labels do.
#[derive(Debug, Clone)]
pub struct DeckConfig {
    pub folder: PathBuf,
    pub tape_duration: f64,
    pub track_gap: f64,
    pub leader_gap: f64,
    pub normalization: Normalization,
    pub target_lufs: f64,
    pub counter_mode: CounterMode,
    pub counter_rate: f64,
    pub counter_config: PathBuf,
    pub tape_type: TapeType,
    pub deck_model: Option<String>,
    pub ffmpeg_path: PathBuf,
}

impl DeckConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let mut cfg = Self {
            folder: args.folder.clone(),
            tape_duration: args.duration * 60.0,
            track_gap: args.track_gap,
            leader_gap: args.leader_gap,
            normalization: args.normalization,
            target_lufs: args.target_lufs,
            counter_mode: args.counter_mode,
            counter_rate: args.counter_rate,
            counter_config: args.counter_config.clone(),
            tape_type: args.tape_type,
            deck_model: None,
            ffmpeg_path: args.ffmpeg_path.clone(),
        };
        if let Some(path) = &args.deck_profile {
            let profile = DeckProfile::load(path)?;
            tracing::info!(profile = %path.display(), "applying deck profile");
            profile.apply(&mut cfg);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if !self.folder.is_dir() {
            return Err(DeckError::Config(format!(
                "track folder {} does not exist",
                self.folder.display()
            )));
        }
        if !self.tape_duration.is_finite() || self.tape_duration <= 0.0 {
            return Err(DeckError::Config(format!(
                "tape duration must be positive (got {} minutes)",
                self.duration_minutes()
            )));
        }
        if self.track_gap < 0.0 || self.leader_gap < 0.0 {
            return Err(DeckError::Config(
                "track and leader gaps cannot be negative".to_string(),
            ));
        }
        if self.counter_mode != CounterMode::Manual
            && (!self.counter_rate.is_finite() || self.counter_rate <= 0.0)
        {
            return Err(DeckError::Config(format!(
                "counter rate must be positive (got {})",
                self.counter_rate
            )));
        }
        Ok(())
    }

    /// Soft advice for settings that are legal but probably typos.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let minutes = self.duration_minutes();
        if ![30.0, 45.0, 60.0].contains(&minutes) {
            warnings.push(format!(
                "unusual tape duration: {minutes} minutes per side (C60/C90/C120 sides are 30, 45, 60)"
            ));
        }
        if self.counter_mode == CounterMode::Static
            && !(0.5..=5.0).contains(&self.counter_rate)
        {
            warnings.push(format!(
                "unusual counter rate: {} (most decks land between 0.8 and 2.0 counts/second)",
                self.counter_rate
            ));
        }
        if self.normalization == Normalization::Lufs
            && !(-30.0..=-6.0).contains(&self.target_lufs)
        {
            warnings.push(format!(
                "unusual LUFS target: {} (broadcast is -23, streaming is -14)",
                self.target_lufs
            ));
        }
        warnings
    }

    pub fn duration_minutes(&self) -> f64 {
        self.tape_duration / 60.0
    }

    /// Absolute calibration paths are used as given, relative ones live in
    /// the track folder next to the audio they were measured with.
    pub fn calibration_path(&self) -> PathBuf {
        if self.counter_config.is_absolute() {
            self.counter_config.clone()
        } else {
            self.folder.join(&self.counter_config)
        }
    }

    pub fn physics_params(&self) -> PhysicsParams {
        PhysicsParams {
            linear_speed: TAPE_SPEED_MM_S,
            hub_radius: HUB_RADIUS_MM,
            tape_thickness: TAPE_THICKNESS_MM,
            reference_rate: self.counter_rate,
            total_duration: self.tape_duration,
        }
    }

    /// Resolves a sibling of the configured ffmpeg binary, so `ffprobe`
    /// and `ffplay` come from the same install.
    pub fn tool(&self, name: &str) -> PathBuf {
        match self.ffmpeg_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
            _ => PathBuf::from(name),
        }
    }

    /// Builds the counter session for this config. Manual mode loads the
    /// calibration file here, before the session freezes; the loaded set is
    /// returned as well so the UI can show its provenance.
    pub fn build_counter(&self) -> Result<(CounterSession, Option<CalibrationSet>)> {
        match self.counter_mode {
            CounterMode::Static => {
                let session = CounterSession::new(CounterSetup::Static {
                    rate: self.counter_rate,
                })?;
                Ok((session, None))
            }
            CounterMode::Manual => {
                let store = CalibrationStore::new(self.calibration_path());
                let calibration = store.load()?;
                let session = CounterSession::new(CounterSetup::Manual {
                    calibration: calibration.clone(),
                })?;
                Ok((session, Some(calibration)))
            }
            CounterMode::Physics => {
                let session =
                    CounterSession::new(CounterSetup::Physics(self.physics_params()))?;
                Ok((session, None))
            }
        }
    }
}
