use std::path::{Path, PathBuf};
use std::process::Command;

use crossbeam_channel::Sender;
use serde::Deserialize;

use crate::audio::wav::read_stereo_f32;
use crate::config::{DeckConfig, Normalization};
use crate::constants::{SAMPLE_RATE, WAVEFORM_WIDTH};
use crate::error::{DeckError, Result};
use crate::library::TrackInfo;
use crate::messages::NormalizeMsg;

/// A track rendered to the deck's wire format (44.1 kHz stereo WAV) at its
/// target level, plus everything the screens show about it.
#[derive(Debug, Clone)]
pub struct NormalizedTrack {
    pub name: String,
    pub path: PathBuf,
    pub duration: f64,
    pub peak_db: f64,
    pub rms_db: f64,
    /// Integrated loudness of the rendered file, LUFS mode only.
    pub loudness: Option<f64>,
    /// Gain applied by peak normalization, peak mode only.
    pub gain_db: Option<f64>,
    /// Fixed-width level strip for the recording screen.
    pub waveform: Vec<f32>,
}

/// The numbers ffmpeg's loudnorm filter reports after a measurement pass.
/// Values stay as the strings ffmpeg printed; the second pass wants them
/// passed back verbatim.
#[derive(Debug, Deserialize)]
pub struct LoudnormStats {
    pub input_i: String,
    pub input_tp: String,
    pub input_lra: String,
    pub input_thresh: String,
    #[serde(default)]
    pub output_i: Option<String>,
    pub target_offset: String,
}

pub fn parse_db(s: &str) -> Option<f64> {
    s.trim().parse().ok()
}

/// Extracts the JSON block loudnorm appends to stderr.
pub fn loudnorm_stats(stderr: &str) -> Result<LoudnormStats> {
    let start = stderr
        .rfind('{')
        .ok_or_else(|| DeckError::tool("ffmpeg", "no loudnorm report in output"))?;
    let end = stderr[start..]
        .find('}')
        .map(|e| start + e + 1)
        .ok_or_else(|| DeckError::tool("ffmpeg", "unterminated loudnorm report"))?;
    serde_json::from_str(&stderr[start..end])
        .map_err(|e| DeckError::tool("ffmpeg", format!("bad loudnorm report: {e}")))
}

/// Finds the peak volumedetect reports, e.g. `max_volume: -6.3 dB`.
pub fn max_volume_db(stderr: &str) -> Option<f64> {
    for line in stderr.lines() {
        if let Some(rest) = line.split("max_volume:").nth(1) {
            return rest.trim().split_whitespace().next()?.parse().ok();
        }
    }
    None
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .rev()
        .filter(|l| !l.trim().is_empty())
        .take(3)
        .collect();
    lines.into_iter().rev().collect::<Vec<_>>().join(" | ")
}

pub struct Normalizer {
    ffmpeg: PathBuf,
    method: Normalization,
    target_lufs: f64,
    out_dir: PathBuf,
}

impl Normalizer {
    pub fn new(cfg: &DeckConfig) -> Self {
        Self {
            ffmpeg: cfg.ffmpeg_path.clone(),
            method: cfg.normalization,
            target_lufs: cfg.target_lufs,
            out_dir: cfg.folder.join("normalized"),
        }
    }

    /// Cache filename carries the method and target so renormalizing at a
    /// different setting never reuses stale audio.
    pub fn normalized_name(&self, track_name: &str) -> String {
        match self.method {
            Normalization::Lufs => {
                format!("{track_name}.lufs{:+.1}.normalized.wav", self.target_lufs)
            }
            Normalization::Peak => format!("{track_name}.peak.normalized.wav"),
        }
    }

    pub fn output_path(&self, track_name: &str) -> PathBuf {
        self.out_dir.join(self.normalized_name(track_name))
    }

    fn run(&self, configure: impl FnOnce(&mut Command)) -> Result<String> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-hide_banner", "-nostdin"]);
        configure(&mut cmd);
        let output = cmd
            .output()
            .map_err(|e| DeckError::tool("ffmpeg", e.to_string()))?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(DeckError::tool("ffmpeg", stderr_tail(&stderr)));
        }
        Ok(stderr)
    }

    fn measure_loudness(&self, input: &Path) -> Result<LoudnormStats> {
        let filter = format!(
            "loudnorm=I={}:TP=-1.5:LRA=11:print_format=json",
            self.target_lufs
        );
        let stderr = self.run(|cmd| {
            cmd.arg("-i")
                .arg(input)
                .args(["-af", &filter, "-f", "null", "-"]);
        })?;
        loudnorm_stats(&stderr)
    }

    /// Two-pass loudness normalization: measure, then render linearly with
    /// the measured values. Returns the loudness of the rendered file.
    fn normalize_lufs(&self, input: &Path, output: &Path) -> Result<Option<f64>> {
        let stats = self.measure_loudness(input)?;
        let filter = format!(
            "loudnorm=I={}:TP=-1.5:LRA=11:measured_I={}:measured_TP={}:measured_LRA={}:measured_thresh={}:offset={}:linear=true:print_format=json",
            self.target_lufs,
            stats.input_i,
            stats.input_tp,
            stats.input_lra,
            stats.input_thresh,
            stats.target_offset
        );
        let stderr = self.run(|cmd| {
            cmd.arg("-y")
                .arg("-i")
                .arg(input)
                .args(["-af", &filter, "-ar", "44100", "-ac", "2"])
                .arg(output);
        })?;
        let rendered = loudnorm_stats(&stderr)?;
        Ok(rendered.output_i.as_deref().and_then(parse_db))
    }

    /// Gain to put the loudest sample 0.1 dB under full scale. Returns the
    /// gain applied.
    fn normalize_peak(&self, input: &Path, output: &Path) -> Result<f64> {
        let stderr = self.run(|cmd| {
            cmd.arg("-i")
                .arg(input)
                .args(["-af", "volumedetect", "-f", "null", "-"]);
        })?;
        let max = max_volume_db(&stderr)
            .ok_or_else(|| DeckError::tool("ffmpeg", "volumedetect reported no max_volume"))?;
        let gain = -max - 0.1;
        let filter = format!("volume={gain:.2}dB");
        self.run(|cmd| {
            cmd.arg("-y")
                .arg("-i")
                .arg(input)
                .args(["-af", &filter, "-ar", "44100", "-ac", "2"])
                .arg(output);
        })?;
        Ok(gain)
    }

    /// Normalizes one track, reusing a cached rendering when the same
    /// method and target produced it before.
    pub fn normalize_one(&self, track: &TrackInfo) -> Result<NormalizedTrack> {
        std::fs::create_dir_all(&self.out_dir)?;
        let out_path = self.output_path(&track.name);
        let mut loudness = None;
        let mut gain_db = None;

        if out_path.exists() {
            tracing::debug!(track = %track.name, "using cached rendering");
            if self.method == Normalization::Lufs {
                loudness = self
                    .measure_loudness(&out_path)
                    .ok()
                    .and_then(|s| parse_db(&s.input_i));
            }
        } else {
            match self.method {
                Normalization::Lufs => loudness = self.normalize_lufs(&track.path, &out_path)?,
                Normalization::Peak => {
                    gain_db = Some(self.normalize_peak(&track.path, &out_path)?)
                }
            }
        }

        let samples = read_stereo_f32(&out_path)?;
        let duration = samples.len() as f64 / 2.0 / SAMPLE_RATE as f64;
        let (peak_db, rms_db) = levels_db(&samples);
        let waveform = waveform_strip(&samples, WAVEFORM_WIDTH);
        Ok(NormalizedTrack {
            name: track.name.clone(),
            path: out_path,
            duration,
            peak_db,
            rms_db,
            loudness,
            gain_db,
            waveform,
        })
    }
}

/// Runs the whole batch on a worker thread, reporting through the channel.
pub fn spawn_worker(cfg: &DeckConfig, tracks: Vec<TrackInfo>, tx: Sender<NormalizeMsg>) {
    let normalizer = Normalizer::new(cfg);
    std::thread::spawn(move || {
        for (index, track) in tracks.iter().enumerate() {
            let _ = tx.send(NormalizeMsg::Started {
                index,
                name: track.name.clone(),
            });
            match normalizer.normalize_one(track) {
                Ok(done) => {
                    tracing::info!(track = %track.name, "normalized");
                    let _ = tx.send(NormalizeMsg::Done {
                        index,
                        track: Box::new(done),
                    });
                }
                Err(e) => {
                    tracing::warn!(track = %track.name, error = %e, "normalization failed");
                    let _ = tx.send(NormalizeMsg::Failed {
                        index,
                        name: track.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        let _ = tx.send(NormalizeMsg::Finished);
    });
}

pub(crate) fn levels_db(samples: &[f32]) -> (f64, f64) {
    if samples.is_empty() {
        return (-120.0, -120.0);
    }
    let mut peak = 0.0f64;
    let mut sum_sq = 0.0f64;
    for &s in samples {
        let s = s as f64;
        peak = peak.max(s.abs());
        sum_sq += s * s;
    }
    let rms = (sum_sq / samples.len() as f64).sqrt();
    (db_floor(peak), db_floor(rms))
}

fn db_floor(x: f64) -> f64 {
    if x <= 0.0 {
        -120.0
    } else {
        (20.0 * x.log10()).max(-120.0)
    }
}

/// Per-bucket RMS of the mono mix, scaled against the 95th percentile so a
/// single hot hit does not flatten the rest of the strip. Square-root
/// shaping keeps quiet passages visible.
pub(crate) fn waveform_strip(samples: &[f32], width: usize) -> Vec<f32> {
    let frames = samples.len() / 2;
    if frames == 0 || width == 0 {
        return vec![0.0; width];
    }
    let bucket_len = (frames / width).max(1);
    let mut rms = Vec::with_capacity(width);
    for b in 0..width {
        let start = b * bucket_len;
        if start >= frames {
            rms.push(0.0);
            continue;
        }
        let end = ((b + 1) * bucket_len).min(frames);
        let mut sum_sq = 0.0f32;
        for f in start..end {
            let mono = (samples[f * 2] + samples[f * 2 + 1]) * 0.5;
            sum_sq += mono * mono;
        }
        rms.push((sum_sq / (end - start) as f32).sqrt());
    }
    let mut sorted = rms.clone();
    sorted.sort_by(f32::total_cmp);
    let p95 = sorted[(sorted.len() * 95 / 100).min(sorted.len() - 1)];
    let scale = (p95 * 1.2).max(0.03);
    rms.iter().map(|&v| (v / scale).sqrt().min(1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn normalizer(dir: &tempfile::TempDir, extra: &[&str]) -> Normalizer {
        let mut argv = vec!["deckrec", "--folder", dir.path().to_str().unwrap()];
        argv.extend_from_slice(extra);
        let args = crate::config::CliArgs::try_parse_from(argv).unwrap();
        Normalizer::new(&DeckConfig::from_args(&args).unwrap())
    }

    const MEASURE_STDERR: &str = "\
Input #0, mp3, from 'song.mp3':\n\
  Duration: 00:03:05.43, start: 0.025057, bitrate: 320 kb/s\n\
[Parsed_loudnorm_0 @ 0x5555] \n\
{\n\
\t\"input_i\" : \"-23.41\",\n\
\t\"input_tp\" : \"-5.12\",\n\
\t\"input_lra\" : \"8.30\",\n\
\t\"input_thresh\" : \"-33.95\",\n\
\t\"output_i\" : \"-14.02\",\n\
\t\"output_tp\" : \"-1.50\",\n\
\t\"output_lra\" : \"7.10\",\n\
\t\"output_thresh\" : \"-24.51\",\n\
\t\"normalization_type\" : \"dynamic\",\n\
\t\"target_offset\" : \"0.02\"\n\
}\n";

    #[test]
    fn loudnorm_report_parses_from_noisy_stderr() {
        let stats = loudnorm_stats(MEASURE_STDERR).unwrap();
        assert_eq!(stats.input_i, "-23.41");
        assert_eq!(stats.input_tp, "-5.12");
        assert_eq!(stats.target_offset, "0.02");
        assert_eq!(stats.output_i.as_deref().and_then(parse_db), Some(-14.02));
    }

    #[test]
    fn silence_measures_as_negative_infinity() {
        let stderr = "{\"input_i\" : \"-inf\", \"input_tp\" : \"-inf\", \
            \"input_lra\" : \"0.00\", \"input_thresh\" : \"-70.00\", \
            \"target_offset\" : \"0.00\"}";
        let stats = loudnorm_stats(stderr).unwrap();
        assert_eq!(parse_db(&stats.input_i), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn missing_report_is_an_error() {
        assert!(loudnorm_stats("frame=  100 fps=0.0 size=N/A").is_err());
    }

    #[test]
    fn volumedetect_peak_parses() {
        let stderr = "\
[Parsed_volumedetect_0 @ 0x55c9] n_samples: 16326912\n\
[Parsed_volumedetect_0 @ 0x55c9] mean_volume: -17.8 dB\n\
[Parsed_volumedetect_0 @ 0x55c9] max_volume: -6.3 dB\n\
[Parsed_volumedetect_0 @ 0x55c9] histogram_6db: 37\n";
        assert_eq!(max_volume_db(stderr), Some(-6.3));
        assert_eq!(max_volume_db("no such line"), None);
    }

    #[test]
    fn cache_names_encode_method_and_target() {
        let dir = tempfile::tempdir().unwrap();
        let lufs = normalizer(&dir, &[]);
        assert_eq!(
            lufs.normalized_name("Song.mp3"),
            "Song.mp3.lufs-14.0.normalized.wav"
        );
        let hot = normalizer(&dir, &["--target-lufs", "-9.5"]);
        assert_eq!(
            hot.normalized_name("Song.mp3"),
            "Song.mp3.lufs-9.5.normalized.wav"
        );
        let peak = normalizer(&dir, &["--normalization", "peak"]);
        assert_eq!(
            peak.normalized_name("Song.mp3"),
            "Song.mp3.peak.normalized.wav"
        );
    }

    #[test]
    fn strip_tracks_where_the_energy_is() {
        // One second of quiet, one second loud, one second quiet.
        let mut samples = Vec::new();
        for section in [0.05f32, 0.8, 0.05] {
            for i in 0..SAMPLE_RATE {
                let v = section * ((i % 100) as f32 / 100.0 - 0.5);
                samples.push(v);
                samples.push(v);
            }
        }
        let strip = waveform_strip(&samples, 30);
        assert_eq!(strip.len(), 30);
        let edge = strip[..10].iter().sum::<f32>() / 10.0;
        let middle = strip[10..20].iter().sum::<f32>() / 10.0;
        assert!(middle > edge * 2.0);
        assert!(strip.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn silent_strip_stays_dark() {
        let samples = vec![0.0f32; SAMPLE_RATE as usize * 2];
        let strip = waveform_strip(&samples, 40);
        assert!(strip.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn level_floors_bottom_out() {
        let (peak, rms) = levels_db(&[]);
        assert_eq!(peak, -120.0);
        assert_eq!(rms, -120.0);

        let (peak, rms) = levels_db(&[1.0, -1.0, 1.0, -1.0]);
        assert!(peak.abs() < 1e-9);
        assert!(rms.abs() < 1e-9);
    }
}
