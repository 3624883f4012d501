use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{DeckConfig, Normalization};
use crate::counter::CounterMode;
use crate::deck::tapes::TapeType;
use crate::error::{DeckError, Result};

/// A saved preset for one physical deck. Every field is optional; absent
/// fields leave the command-line value alone, present fields win.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deck_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tape_type: Option<TapeType>,
    /// Minutes per side. Accepts the older `duration` key as well.
    #[serde(rename = "tape_duration", alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_mode: Option<CounterMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_config: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalization: Option<Normalization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_lufs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<PathBuf>,
}

impl DeckProfile {
    /// Unknown keys are ignored, so profiles written for other builds of
    /// this tool still load.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            DeckError::Config(format!("deck profile {}: {e}", path.display()))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            DeckError::Config(format!("deck profile {}: {e}", path.display()))
        })
    }

    pub fn apply(&self, cfg: &mut DeckConfig) {
        if let Some(v) = &self.deck_model {
            cfg.deck_model = Some(v.clone());
        }
        if let Some(v) = self.tape_type {
            cfg.tape_type = v;
        }
        if let Some(v) = self.duration {
            cfg.tape_duration = v * 60.0;
        }
        if let Some(v) = self.counter_mode {
            cfg.counter_mode = v;
        }
        if let Some(v) = self.counter_rate {
            cfg.counter_rate = v;
        }
        if let Some(v) = &self.counter_config {
            cfg.counter_config = v.clone();
        }
        if let Some(v) = self.leader_gap {
            cfg.leader_gap = v;
        }
        if let Some(v) = self.track_gap {
            cfg.track_gap = v;
        }
        if let Some(v) = self.normalization {
            cfg.normalization = v;
        }
        if let Some(v) = self.target_lufs {
            cfg.target_lufs = v;
        }
        if let Some(v) = &self.folder {
            cfg.folder = v.clone();
        }
        if let Some(v) = &self.ffmpeg_path {
            cfg.ffmpeg_path = v.clone();
        }
    }
}

fn sample_profiles() -> Vec<(&'static str, DeckProfile)> {
    vec![
        (
            "aiwa_adf780.json",
            DeckProfile {
                deck_model: Some("AIWA AD-F780".to_string()),
                tape_type: Some(TapeType::TypeII),
                duration: Some(45.0),
                counter_mode: Some(CounterMode::Manual),
                counter_config: Some(PathBuf::from("counter_calibration_aiwa.json")),
                leader_gap: Some(10.0),
                track_gap: Some(5.0),
                normalization: Some(Normalization::Lufs),
                target_lufs: Some(-14.0),
                ..DeckProfile::default()
            },
        ),
        (
            "sony_tcwe475.json",
            DeckProfile {
                deck_model: Some("Sony TC-WE475".to_string()),
                tape_type: Some(TapeType::TypeI),
                duration: Some(30.0),
                counter_mode: Some(CounterMode::Static),
                counter_rate: Some(1.42),
                leader_gap: Some(8.0),
                track_gap: Some(4.0),
                normalization: Some(Normalization::Peak),
                ..DeckProfile::default()
            },
        ),
        (
            "pioneer_ctr305.json",
            DeckProfile {
                deck_model: Some("Pioneer CT-R305".to_string()),
                tape_type: Some(TapeType::TypeI),
                duration: Some(30.0),
                counter_mode: Some(CounterMode::Static),
                counter_rate: Some(1.35),
                leader_gap: Some(8.0),
                track_gap: Some(4.0),
                normalization: Some(Normalization::Peak),
                ..DeckProfile::default()
            },
        ),
        (
            "technics_rsx205.json",
            DeckProfile {
                deck_model: Some("Technics RS-X205".to_string()),
                tape_type: Some(TapeType::TypeIV),
                duration: Some(45.0),
                counter_mode: Some(CounterMode::Physics),
                counter_rate: Some(1.5),
                leader_gap: Some(12.0),
                track_gap: Some(6.0),
                normalization: Some(Normalization::Lufs),
                target_lufs: Some(-12.0),
                ..DeckProfile::default()
            },
        ),
    ]
}

/// Writes starter profiles for a few well-known decks. Files that already
/// exist are left untouched; returns the paths actually created.
pub fn write_sample_profiles(dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut created = Vec::new();
    for (filename, profile) in sample_profiles() {
        let path = dir.join(filename);
        if path.exists() {
            continue;
        }
        let json = serde_json::to_string_pretty(&profile)?;
        std::fs::write(&path, json)?;
        created.push(path);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliArgs;
    use clap::Parser;

    fn base_config() -> DeckConfig {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs::try_parse_from([
            "deckrec",
            "--folder",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        DeckConfig::from_args(&args).unwrap()
    }

    #[test]
    fn absent_fields_leave_the_config_alone() {
        let mut cfg = base_config();
        let profile = DeckProfile {
            counter_rate: Some(1.42),
            ..DeckProfile::default()
        };
        profile.apply(&mut cfg);
        assert_eq!(cfg.counter_rate, 1.42);
        assert_eq!(cfg.tape_duration, 1800.0);
        assert_eq!(cfg.normalization, Normalization::Lufs);
    }

    #[test]
    fn accepts_both_duration_spellings() {
        let a: DeckProfile = serde_json::from_str(r#"{"tape_duration": 45}"#).unwrap();
        let b: DeckProfile = serde_json::from_str(r#"{"duration": 45}"#).unwrap();
        assert_eq!(a.duration, Some(45.0));
        assert_eq!(b.duration, Some(45.0));
    }

    #[test]
    fn accepts_the_old_auto_mode_name() {
        let profile: DeckProfile =
            serde_json::from_str(r#"{"counter_mode": "auto"}"#).unwrap();
        assert_eq!(profile.counter_mode, Some(CounterMode::Physics));
    }

    #[test]
    fn ignores_keys_from_other_builds() {
        let profile: DeckProfile =
            serde_json::from_str(r#"{"counter_rate": 1.2, "audio_latency": 0.3}"#).unwrap();
        assert_eq!(profile.counter_rate, Some(1.2));
    }

    #[test]
    fn sample_profiles_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let created = write_sample_profiles(dir.path()).unwrap();
        assert_eq!(created.len(), 4);

        let technics = DeckProfile::load(&dir.path().join("technics_rsx205.json")).unwrap();
        assert_eq!(technics.counter_mode, Some(CounterMode::Physics));
        assert_eq!(technics.tape_type, Some(TapeType::TypeIV));
        assert_eq!(technics.duration, Some(45.0));
    }

    #[test]
    fn existing_profiles_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sony_tcwe475.json");
        std::fs::write(&path, r#"{"counter_rate": 9.9}"#).unwrap();

        let created = write_sample_profiles(dir.path()).unwrap();
        assert_eq!(created.len(), 3);
        let kept = DeckProfile::load(&path).unwrap();
        assert_eq!(kept.counter_rate, Some(9.9));
    }
}
