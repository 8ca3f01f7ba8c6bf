use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::HudError;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_NAME: &str = "roadhud";

pub const DEFAULT_REFRESH_RATE_MS: u64 = 50;

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct WindowPosition {
    pub x: f32,
    pub y: f32,
}

impl Default for WindowPosition {
    fn default() -> Self {
        Self { x: 0., y: 0. }
    }
}

impl From<WindowPosition> for Pos2 {
    fn from(value: WindowPosition) -> Self {
        Pos2::new(value.x, value.y)
    }
}

impl From<Pos2> for WindowPosition {
    fn from(value: Pos2) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

/// The per-frame feature toggles, loaded as one cohesive snapshot at the top
/// of every paint pass instead of dozens of independently cached fields.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HudToggles {
    /// Metric locale; selects km/h and the unit tables
    pub is_metric: bool,
    /// Map hidden layout mode; relocates nearly every HUD element
    pub hide_map: bool,

    pub show_speed_limits: bool,
    /// Show the speed-limit-controller offset row on the sign
    pub show_slc_offset: bool,
    pub hide_max_speed: bool,
    pub hide_speed: bool,
    pub hide_speed_limit: bool,

    /// Lead distance/speed labels under the chevrons
    pub lead_metrics: bool,
    pub standstill_timer: bool,

    pub use_stock_colors: bool,
    pub rainbow_path: bool,
    pub acceleration_path: bool,
    /// Custom path fill when no mode takes priority, RGB
    pub path_color: [u8; 3],

    pub show_fps: bool,
    pub signal_border: bool,
    pub blindspot_border: bool,

    /// Road name pill at the bottom of the camera view
    pub road_name: bool,
    /// Raw radar returns drawn as red dots, debugging aid
    pub radar_tracks: bool,
}

impl Default for HudToggles {
    fn default() -> Self {
        Self {
            is_metric: true,
            hide_map: false,
            show_speed_limits: true,
            show_slc_offset: false,
            hide_max_speed: false,
            hide_speed: false,
            hide_speed_limit: false,
            lead_metrics: false,
            standstill_timer: true,
            use_stock_colors: true,
            rainbow_path: false,
            acceleration_path: false,
            path_color: [0x17, 0x86, 0x44],
            show_fps: false,
            signal_border: true,
            blindspot_border: true,
            road_name: true,
            radar_tracks: false,
        }
    }
}

impl HudToggles {
    pub fn path_color32(&self) -> Color32 {
        Color32::from_rgb(self.path_color[0], self.path_color[1], self.path_color[2])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub refresh_rate_ms: u64,
    pub window_position: WindowPosition,
    pub toggles: HudToggles,
    /// Active visual/sound theme name, resolved under the assets root
    pub theme: String,
    /// Per-alert volume, 0 = muted .. 100
    pub sound_volumes: HashMap<String, i32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut sound_volumes = HashMap::new();
        for alert in [
            "engage",
            "disengage",
            "prompt",
            "prompt_distracted",
            "refuse",
            "warning_soft",
            "warning_immediate",
        ] {
            sound_volumes.insert(alert.to_string(), 100);
        }
        Self {
            refresh_rate_ms: DEFAULT_REFRESH_RATE_MS,
            window_position: WindowPosition::default(),
            toggles: HudToggles::default(),
            theme: "stock".to_string(),
            sound_volumes,
        }
    }
}

impl AppConfig {
    pub fn from_local_file() -> Option<Self> {
        let config_path = dirs::config_dir()?.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let file = std::fs::File::open(config_path).ok()?;
            serde_json::from_reader(file).ok()
        } else {
            None
        }
    }

    pub fn save(&self) -> Result<(), HudError> {
        let config_path = dirs::config_dir()
            .ok_or(HudError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            std::fs::create_dir_all(config_path.parent().expect("config path has a parent"))
                .map_err(|e| HudError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| HudError::ConfigIOError { source: e })?;
        serde_json::to_writer(file, self).map_err(|e| HudError::ConfigSerializeError { source: e })
    }

    pub fn volume_for(&self, alert: &str) -> i32 {
        self.sound_volumes.get(alert).copied().unwrap_or(100)
    }
}
