use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use itertools::Itertools;

use crate::errors::HudError;

/// Name of the fallback theme every install ships with.
pub const STOCK_THEME: &str = "stock";

/// Resolves asset paths for the active theme, falling back to the stock
/// theme for any file the active theme does not provide.
#[derive(Clone, Debug)]
pub struct ThemeAssets {
    root: PathBuf,
    theme: String,
}

impl ThemeAssets {
    pub fn new(root: impl Into<PathBuf>, theme: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            theme: theme.into(),
        }
    }

    /// Resolve one asset. Looks in the active theme first, then stock.
    /// Returns `None` when neither theme ships the file.
    pub fn resolve(&self, kind: &str, file: &str) -> Option<PathBuf> {
        for theme in [self.theme.as_str(), STOCK_THEME] {
            let candidate = self.root.join(theme).join(kind).join(file);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    pub fn sound(&self, name: &str) -> Option<PathBuf> {
        self.resolve("sounds", &format!("{name}.wav"))
    }

    pub fn icon(&self, name: &str) -> Option<PathBuf> {
        self.resolve("icons", &format!("{name}.png"))
    }

    /// Discover the turn-signal sprite set of the active theme. Falls back
    /// to the stock signals directory when the theme has none.
    pub fn signal_sprites(&self) -> Result<Option<SpriteSet>, HudError> {
        for theme in [self.theme.as_str(), STOCK_THEME] {
            let dir = self.root.join(theme).join("signals");
            if dir.is_dir() {
                return SpriteSet::discover(&dir);
            }
        }
        Ok(None)
    }
}

/// One directory of turn-signal animation frames. The directory declares its
/// own playback style with a bare marker file named `<style>_<interval_ms>`,
/// so themes control their blink speed without a config entry.
#[derive(Clone, Debug)]
pub struct SpriteSet {
    /// Frames in filename order
    pub frames: Vec<PathBuf>,
    /// Variant frames shown while a blind-spot warning is active; empty
    /// when the theme ships none
    pub blindspot_frames: Vec<PathBuf>,
    pub style: SpriteStyle,
    pub interval: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteStyle {
    /// One sprite pinned to the signal slot
    Static,
    /// Frames cycle at the declared interval
    Animated,
}

impl SpriteSet {
    /// Scan a signals directory. Returns `None` (animation disabled) when
    /// the directory has no usable marker or no frames; a missing marker is
    /// a theme-authoring mistake worth a warning, not an error.
    pub fn discover(dir: &Path) -> Result<Option<SpriteSet>, HudError> {
        let mut frames = Vec::new();
        let mut blindspot_frames = Vec::new();
        let mut marker = None;

        let scan_error = |source| HudError::ThemeScanError {
            path: dir.display().to_string(),
            source,
        };
        let entries = fs::read_dir(dir).map_err(scan_error)?;
        for entry in entries {
            let entry = entry.map_err(scan_error)?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if path.extension().is_some_and(|ext| ext == "png") {
                if name.contains("blindspot") {
                    blindspot_frames.push(path);
                } else {
                    frames.push(path);
                }
            } else if let Some(parsed) = parse_marker(name) {
                marker = Some(parsed);
            }
        }

        let Some((style, interval)) = marker else {
            log::warn!(
                "no playback marker in {}, turn signal animation disabled",
                dir.display()
            );
            return Ok(None);
        };
        if frames.is_empty() {
            log::warn!(
                "no sprite frames in {}, turn signal animation disabled",
                dir.display()
            );
            return Ok(None);
        }
        Ok(Some(SpriteSet {
            frames: frames.into_iter().sorted().collect(),
            blindspot_frames: blindspot_frames.into_iter().sorted().collect(),
            style,
            interval,
        }))
    }

    /// Frames for the current blind-spot state.
    pub fn frames_for(&self, blind_spot: bool) -> &[PathBuf] {
        if blind_spot && !self.blindspot_frames.is_empty() {
            &self.blindspot_frames
        } else {
            &self.frames
        }
    }
}

fn parse_marker(name: &str) -> Option<(SpriteStyle, Duration)> {
    let (style, interval) = name.rsplit_once('_')?;
    let style = match style {
        "static" => SpriteStyle::Static,
        "animated" => SpriteStyle::Animated,
        _ => return None,
    };
    let millis: u64 = interval.parse().ok()?;
    Some((style, Duration::from_millis(millis)))
}

#[cfg(test)]
mod tests {
    use std::fs::{File, create_dir_all};

    use tempfile::tempdir;

    use super::*;

    fn touch(path: PathBuf) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_resolve_prefers_theme_then_stock() {
        let root = tempdir().unwrap();
        create_dir_all(root.path().join("neon/icons")).unwrap();
        create_dir_all(root.path().join("stock/icons")).unwrap();
        touch(root.path().join("neon/icons/wheel.png"));
        touch(root.path().join("stock/icons/wheel.png"));
        touch(root.path().join("stock/icons/driver.png"));

        let assets = ThemeAssets::new(root.path(), "neon");
        assert_eq!(
            assets.icon("wheel").unwrap(),
            root.path().join("neon/icons/wheel.png")
        );
        assert_eq!(
            assets.icon("driver").unwrap(),
            root.path().join("stock/icons/driver.png")
        );
        assert!(assets.icon("missing").is_none());
    }

    #[test]
    fn test_sprite_discovery_sorts_and_splits_variants() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("frame_02.png"));
        touch(dir.path().join("frame_01.png"));
        touch(dir.path().join("frame_03.png"));
        touch(dir.path().join("frame_01_blindspot.png"));
        touch(dir.path().join("animated_100"));

        let set = SpriteSet::discover(dir.path()).unwrap().unwrap();
        assert_eq!(set.style, SpriteStyle::Animated);
        assert_eq!(set.interval, Duration::from_millis(100));
        assert_eq!(set.frames.len(), 3);
        assert!(set.frames[0].ends_with("frame_01.png"));
        assert!(set.frames[2].ends_with("frame_03.png"));
        assert_eq!(set.blindspot_frames.len(), 1);
        assert_eq!(set.frames_for(true).len(), 1);
        assert_eq!(set.frames_for(false).len(), 3);
    }

    #[test]
    fn test_missing_or_bad_marker_disables_animation() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("frame_01.png"));
        assert!(SpriteSet::discover(dir.path()).unwrap().is_none());

        touch(dir.path().join("animated_fast"));
        assert!(SpriteSet::discover(dir.path()).unwrap().is_none());

        touch(dir.path().join("wobbly_100"));
        assert!(SpriteSet::discover(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_marker_without_frames_disables_animation() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("static_250"));
        assert!(SpriteSet::discover(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_blindspot_fallback_to_regular_frames() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("frame_01.png"));
        touch(dir.path().join("static_250"));
        let set = SpriteSet::discover(dir.path()).unwrap().unwrap();
        assert_eq!(set.frames_for(true).len(), 1);
    }
}
