use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::error::{DeckError, Result};

/// Plays source files through ffplay before they are committed to the tape
/// plan. One preview at a time; starting a new one stops the old one.
pub struct PreviewPlayer {
    ffplay: PathBuf,
    child: Option<Child>,
}

impl PreviewPlayer {
    pub fn new(ffplay: PathBuf) -> Self {
        Self {
            ffplay,
            child: None,
        }
    }

    pub fn play(&mut self, path: &Path) -> Result<()> {
        self.stop();
        let child = Command::new(&self.ffplay)
            .args(["-nodisp", "-autoexit", "-loglevel", "quiet"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DeckError::tool("ffplay", e.to_string()))?;
        self.child = Some(child);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// True while the preview process is still running. Reaps it when it
    /// has exited on its own.
    pub fn is_playing(&mut self) -> bool {
        match &mut self.child {
            Some(child) => match child.try_wait() {
                Ok(None) => true,
                _ => {
                    self.child = None;
                    false
                }
            },
            None => false,
        }
    }
}

impl Drop for PreviewPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_reports_tool_error() {
        let mut player = PreviewPlayer::new(PathBuf::from("/nonexistent/ffplay"));
        let err = player.play(Path::new("track.mp3")).unwrap_err();
        assert!(matches!(err, DeckError::Tool { tool: "ffplay", .. }));
        assert!(!player.is_playing());
    }

    #[test]
    fn stop_without_play_is_quiet() {
        let mut player = PreviewPlayer::new(PathBuf::from("ffplay"));
        player.stop();
        assert!(!player.is_playing());
    }
}
