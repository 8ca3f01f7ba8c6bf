use std::process::{Child, Command, Stdio};

use crate::errors::HudError;
use crate::theme::ThemeAssets;

const MAX_VOLUME: u8 = 100;

/// Plays alert sounds through an external `ffplay` process. At most one
/// sound plays at a time; a new alert replaces whatever is still playing.
pub struct SoundPlayer {
    assets: ThemeAssets,
    current: Option<Child>,
}

impl SoundPlayer {
    pub fn new(assets: ThemeAssets) -> Self {
        Self {
            assets,
            current: None,
        }
    }

    /// Play the named alert at the given volume (0 to 100). A volume of zero
    /// mutes the alert; a missing sound file is logged and skipped so a
    /// sparse theme cannot break alerting.
    pub fn play(&mut self, alert: &str, volume: u8) -> Result<(), HudError> {
        if volume == 0 {
            return Ok(());
        }
        let Some(path) = self.assets.sound(alert) else {
            log::warn!("no sound file for alert {alert}");
            return Ok(());
        };
        self.stop();
        let child = Command::new("ffplay")
            .args(["-nodisp", "-autoexit", "-loglevel", "quiet", "-volume"])
            .arg(volume.min(MAX_VOLUME).to_string())
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| HudError::SoundPlayerError { source })?;
        self.current = Some(child);
        Ok(())
    }

    /// Stop the currently playing sound, if any.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.current.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for SoundPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_zero_volume_skips_playback() {
        let root = tempdir().unwrap();
        let mut player = SoundPlayer::new(ThemeAssets::new(root.path(), "stock"));
        player.play("engage", 0).unwrap();
        assert!(player.current.is_none());
    }

    #[test]
    fn test_missing_sound_is_not_an_error() {
        let root = tempdir().unwrap();
        let mut player = SoundPlayer::new(ThemeAssets::new(root.path(), "stock"));
        player.play("no_such_alert", 80).unwrap();
        assert!(player.current.is_none());
    }
}
