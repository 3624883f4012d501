use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::Local;

use crate::config::{DeckConfig, Normalization};
use crate::counter::{format_counter, CalibrationSet, CounterMode, CounterSession};
use crate::error::Result;
use crate::plan::RecordingPlan;

/// M:SS with the minutes uncapped, the way deck counters and liner notes
/// write times.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as i64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Writes the reference sheet for one recorded side next to the audio.
/// The filename carries a timestamp and the normalization setting, so
/// successive takes never overwrite each other.
pub fn write_tracklist(
    cfg: &DeckConfig,
    plan: &RecordingPlan,
    session: &CounterSession,
    calibration: Option<&CalibrationSet>,
) -> Result<PathBuf> {
    let now = Local::now();
    let norm_tag = match cfg.normalization {
        Normalization::Lufs => format!("lufs{:+.1}", cfg.target_lufs),
        Normalization::Peak => "peak".to_string(),
    };
    let filename = format!(
        "deck_tracklist_{}_{}.txt",
        now.format("%Y%m%d_%H%M%S"),
        norm_tag
    );
    let path = cfg.folder.join(filename);

    let mut out = String::new();
    let _ = writeln!(out, "Tape Deck Tracklist Reference");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Session: {}", now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out);

    let info = cfg.tape_type.info();
    let _ = writeln!(out, "TAPE INFORMATION:");
    let _ = writeln!(out, "{}", "-".repeat(17));
    let _ = writeln!(out, "Tape Type: {} - {}", cfg.tape_type.label(), info.name);
    let _ = writeln!(out, "Material: {}", info.material);
    let _ = writeln!(out, "Bias Setting: {}", info.bias);
    let _ = writeln!(out, "Sound Character: {}", info.sound);
    let _ = writeln!(out, "Physical Notes: {}", info.notches);
    let _ = writeln!(out);

    let _ = writeln!(out, "TAPE COUNTER CONFIGURATION:");
    let _ = writeln!(out, "{}", "-".repeat(30));
    let _ = writeln!(out, "Counter Mode: {}", session.mode().label());
    match session.mode() {
        CounterMode::Static => {
            let _ = writeln!(
                out,
                "Counter Rate: {} counts/second (constant)",
                cfg.counter_rate
            );
        }
        CounterMode::Manual => {
            let _ = writeln!(
                out,
                "Calibration Source: {}",
                cfg.calibration_path().display()
            );
            if let Some(cal) = calibration {
                let _ = writeln!(
                    out,
                    "Deck Model: {}",
                    cal.deck_model.as_deref().unwrap_or("Unknown")
                );
                let _ = writeln!(
                    out,
                    "Tape Type: {}",
                    cal.tape_type.as_deref().unwrap_or("Unknown")
                );
                let _ = writeln!(
                    out,
                    "Calibration Date: {}",
                    cal.calibration_date.as_deref().unwrap_or("Unknown")
                );
                let _ = writeln!(
                    out,
                    "Calibration Points: {} measured checkpoints",
                    cal.checkpoints.len()
                );
            }
        }
        CounterMode::Physics => {
            let _ = writeln!(out, "Physics Simulation: Reel-based calculation");
            let _ = writeln!(
                out,
                "Base Rate: {} counts/second (at tape midpoint)",
                cfg.counter_rate
            );
        }
    }
    let _ = writeln!(
        out,
        "Leader Gap: {}s (Counter: 0000 - {})",
        plan.leader_gap,
        format_counter(session.counter_at(plan.leader_gap)?)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "AUDIO CONFIGURATION:");
    let _ = writeln!(out, "{}", "-".repeat(20));
    match cfg.normalization {
        Normalization::Lufs => {
            let _ = writeln!(
                out,
                "Normalization: LUFS (target: {:+.1} LUFS)",
                cfg.target_lufs
            );
        }
        Normalization::Peak => {
            let _ = writeln!(out, "Normalization: PEAK (peak normalization)");
        }
    }
    let _ = writeln!(out, "Track Gap: {}s between tracks", plan.track_gap);
    let _ = writeln!(
        out,
        "Tape Duration: {} minutes per side",
        cfg.duration_minutes()
    );
    let _ = writeln!(out, "Total Tracks: {}", plan.len());
    let _ = writeln!(
        out,
        "Total Recording Time: {} (including gaps)",
        format_duration(plan.total_time())
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "TRACK LIST:");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let stamps = plan.counter_stamps(session)?;
    for (idx, (track, (c_start, c_end))) in plan.tracks.iter().zip(stamps).enumerate() {
        let _ = writeln!(out, "{:02}. {}", idx + 1, track.name);
        let _ = writeln!(
            out,
            "    Start: {}   End: {}   Duration: {}",
            format_duration(track.start),
            format_duration(track.end()),
            format_duration(track.duration)
        );
        let _ = writeln!(
            out,
            "    Counter: {} - {}",
            format_counter(c_start),
            format_counter(c_end)
        );
    }

    std::fs::write(&path, out)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliArgs;
    use crate::counter::{CalibrationSet, CounterSetup};
    use clap::Parser;

    fn config_in(dir: &tempfile::TempDir, extra: &[&str]) -> DeckConfig {
        let mut argv = vec!["deckrec", "--folder", dir.path().to_str().unwrap()];
        argv.extend_from_slice(extra);
        let args = CliArgs::try_parse_from(argv).unwrap();
        DeckConfig::from_args(&args).unwrap()
    }

    fn two_track_plan() -> RecordingPlan {
        RecordingPlan::build(
            10.0,
            5.0,
            [
                ("Blue Monday".to_string(), 60.0),
                ("Bizarre Love Triangle".to_string(), 120.0),
            ],
        )
    }

    #[test]
    fn minutes_roll_past_fifty_nine() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(59.0), "0:59");
        assert_eq!(format_duration(60.0), "1:00");
        assert_eq!(format_duration(185.4), "3:05");
        assert_eq!(format_duration(4500.0), "75:00");
    }

    #[test]
    fn static_sheet_carries_layout_and_counter_stamps() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir, &[]);
        let session = CounterSession::new(CounterSetup::Static { rate: 1.0 }).unwrap();

        let path = write_tracklist(&cfg, &two_track_plan(), &session, None).unwrap();
        let sheet = std::fs::read_to_string(&path).unwrap();

        assert!(sheet.starts_with("Tape Deck Tracklist Reference\n"));
        assert!(sheet.contains("Tape Type: Type I - Normal (Ferric Oxide)"));
        assert!(sheet.contains("Counter Mode: Static Linear"));
        assert!(sheet.contains("Leader Gap: 10s (Counter: 0000 - 0010)"));
        assert!(sheet.contains("Normalization: LUFS (target: -14.0 LUFS)"));
        assert!(sheet.contains("Tape Duration: 30 minutes per side"));
        assert!(sheet.contains("Total Tracks: 2"));
        assert!(sheet.contains("Total Recording Time: 3:15 (including gaps)"));
        assert!(sheet.contains("01. Blue Monday"));
        assert!(sheet.contains("    Start: 0:10   End: 1:10   Duration: 1:00"));
        assert!(sheet.contains("    Counter: 0010 - 0070"));
        assert!(sheet.contains("02. Bizarre Love Triangle"));
        assert!(sheet.contains("    Start: 1:15   End: 3:15   Duration: 2:00"));
        assert!(sheet.contains("    Counter: 0075 - 0195"));

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("deck_tracklist_"));
        assert!(name.ends_with("_lufs-14.0.txt"));
    }

    #[test]
    fn peak_sheet_is_tagged_peak() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir, &["--normalization", "peak"]);
        let session = CounterSession::new(CounterSetup::Static { rate: 1.42 }).unwrap();

        let path = write_tracklist(&cfg, &two_track_plan(), &session, None).unwrap();
        let sheet = std::fs::read_to_string(&path).unwrap();

        assert!(sheet.contains("Normalization: PEAK (peak normalization)"));
        assert!(path.file_name().unwrap().to_str().unwrap().ends_with("_peak.txt"));
    }

    #[test]
    fn manual_sheet_names_the_calibration() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir, &["--counter-mode", "manual"]);
        let mut cal = CalibrationSet::from_points(&[
            (60.0, 85.0),
            (300.0, 422.0),
            (1200.0, 1690.0),
            (1800.0, 2534.0),
        ]);
        cal.deck_model = Some("AIWA AD-F780".to_string());
        cal.calibration_date = Some("2026-08-01 10:15:00".to_string());
        let session = CounterSession::new(CounterSetup::Manual {
            calibration: cal.clone(),
        })
        .unwrap();

        let path = write_tracklist(&cfg, &two_track_plan(), &session, Some(&cal)).unwrap();
        let sheet = std::fs::read_to_string(&path).unwrap();

        assert!(sheet.contains("Counter Mode: Manual Calibrated"));
        assert!(sheet.contains("Calibration Source:"));
        assert!(sheet.contains("Deck Model: AIWA AD-F780"));
        assert!(sheet.contains("Calibration Date: 2026-08-01 10:15:00"));
        assert!(sheet.contains("Calibration Points: 4 measured checkpoints"));
        // 10s into the origin segment reads 85/60ths of ten seconds.
        assert!(sheet.contains("Leader Gap: 10s (Counter: 0000 - 0014)"));
    }
}
