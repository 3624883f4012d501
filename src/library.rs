use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::config::DeckConfig;
use crate::error::{DeckError, Result};

/// Formats ffmpeg can decode that are worth putting on tape.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "webm", "m4a", "aac", "ogg"];

/// One file in the track folder, as found on disk before normalization.
#[derive(Debug, Clone)]
pub struct TrackInfo {
    pub name: String,
    pub path: PathBuf,
    /// Seconds; zero when ffprobe could not read the file.
    pub duration: f64,
    pub codec: String,
    pub bitrate_kbps: Option<u32>,
}

impl TrackInfo {
    pub fn bitrate_label(&self) -> String {
        match self.bitrate_kbps {
            Some(kbps) => format!("{kbps}k"),
            None => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    bit_rate: Option<String>,
}

/// Pulls duration, first audio codec, and bitrate out of `ffprobe -of json`
/// output. Anything missing or garbled degrades to unknown rather than
/// failing the scan.
pub fn parse_probe(json: &str) -> (Option<f64>, String, Option<u32>) {
    let parsed: ProbeOutput = match serde_json::from_str(json) {
        Ok(p) => p,
        Err(_) => return (None, "Unknown".to_string(), None),
    };
    let duration = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok());
    let mut codec = "Unknown".to_string();
    let mut bitrate_kbps = None;
    for stream in &parsed.streams {
        if stream.codec_type.as_deref() == Some("audio") {
            if let Some(name) = &stream.codec_name {
                codec = name.to_uppercase();
            }
            if let Some(rate) = stream.bit_rate.as_deref().and_then(|b| b.parse::<u64>().ok()) {
                bitrate_kbps = Some((rate / 1000) as u32);
            }
            break;
        }
    }
    (duration, codec, bitrate_kbps)
}

fn probe_file(ffprobe: &Path, file: &Path) -> (Option<f64>, String, Option<u32>) {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-show_streams",
            "-of",
            "json",
        ])
        .arg(file)
        .output();
    match output {
        Ok(out) => parse_probe(&String::from_utf8_lossy(&out.stdout)),
        Err(e) => {
            tracing::warn!(file = %file.display(), error = %e, "ffprobe failed");
            (None, "Unknown".to_string(), None)
        }
    }
}

/// Audio files directly inside `folder`, sorted by name. A missing or
/// unreadable folder is an error; startup validation should have caught it.
pub fn collect_audio_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Scans the track folder and probes every candidate file.
pub fn scan_folder(cfg: &DeckConfig) -> Result<Vec<TrackInfo>> {
    let ffprobe = cfg.tool("ffprobe");
    let mut tracks = Vec::new();
    for path in collect_audio_files(&cfg.folder)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (duration, codec, bitrate_kbps) = probe_file(&ffprobe, &path);
        if duration.is_none() {
            tracing::warn!(track = %name, "could not read duration");
        }
        tracks.push(TrackInfo {
            name,
            path,
            duration: duration.unwrap_or(0.0),
            codec,
            bitrate_kbps,
        });
    }
    tracing::info!(folder = %cfg.folder.display(), tracks = tracks.len(), "library scanned");
    Ok(tracks)
}

/// Confirms the ffmpeg toolchain is runnable before any screen opens.
pub fn check_tools(cfg: &DeckConfig) -> Result<()> {
    let mut missing = Vec::new();
    for name in ["ffmpeg", "ffprobe", "ffplay"] {
        let runnable = Command::new(cfg.tool(name))
            .arg("-version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        if !runnable {
            missing.push(name);
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DeckError::tool(
            "toolchain",
            format!(
                "missing or not runnable: {} (see --ffmpeg-path)",
                missing.join(", ")
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_probe_report() {
        let json = r#"{
            "streams": [
                {"codec_type": "video", "codec_name": "mjpeg"},
                {"codec_type": "audio", "codec_name": "mp3", "bit_rate": "320000"}
            ],
            "format": {"duration": "185.432000"}
        }"#;
        let (duration, codec, bitrate_kbps) = parse_probe(json);
        assert_eq!(duration, Some(185.432));
        assert_eq!(codec, "MP3");
        assert_eq!(bitrate_kbps, Some(320));
    }

    #[test]
    fn degrades_to_unknown_on_sparse_output() {
        assert_eq!(parse_probe("{}"), (None, "Unknown".to_string(), None));
        assert_eq!(
            parse_probe("not json at all"),
            (None, "Unknown".to_string(), None)
        );
        let (duration, codec, bitrate_kbps) = parse_probe(
            r#"{"streams": [{"codec_type": "audio", "codec_name": "flac"}],
                "format": {"duration": "N/A"}}"#,
        );
        assert_eq!(duration, None);
        assert_eq!(codec, "FLAC");
        assert_eq!(bitrate_kbps, None);
    }

    #[test]
    fn collects_only_audio_files_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp3", "a.FLAC", "notes.txt", "c.ogg", "cover.jpg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.mp3")).unwrap();

        let files = collect_audio_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.FLAC", "b.mp3", "c.ogg"]);
    }

    #[test]
    fn missing_folder_is_an_error() {
        assert!(collect_audio_files(Path::new("/no/such/folder")).is_err());
    }

    #[test]
    fn bitrate_label_formats_known_and_unknown_rates() {
        let mut track = TrackInfo {
            name: "a.mp3".to_string(),
            path: PathBuf::from("a.mp3"),
            duration: 0.0,
            codec: "MP3".to_string(),
            bitrate_kbps: Some(320),
        };
        assert_eq!(track.bitrate_label(), "320k");
        track.bitrate_kbps = None;
        assert_eq!(track.bitrate_label(), "");
    }
}
