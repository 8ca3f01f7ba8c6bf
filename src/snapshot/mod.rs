pub mod collector;
pub mod producer;

use std::sync::{Arc, Mutex};

pub use collector::collect_snapshots;
use serde::{Deserialize, Serialize};

use crate::hud::Status;

/// Cruise set speed placeholder published by controls when no value is
/// available, in km/h before any locale conversion.
pub const SET_SPEED_NA: f32 = 255.0;

/// Region of the active speed limit, which selects the sign shape drawn by
/// the HUD: MUTCD rectangle for US, Vienna circle for EU.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedLimitRegion {
    #[default]
    None,
    Us,
    Eu,
}

/// One radar lead as projected by the external perception stack. Screen
/// coordinates are normalized to the camera frame (0..1 on both axes).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Lead {
    /// Longitudinal distance to the lead, meters
    pub d_rel: f32,
    /// Lateral offset from the ego path, meters
    pub y_rel: f32,
    /// Relative velocity, m/s (negative when closing)
    pub v_rel: f32,
    pub screen_x: f32,
    pub screen_y: f32,
}

/// One station of the model's predicted path in the model frame (x forward,
/// y lateral, meters), with the planner's acceleration at that point.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f32,
    pub y: f32,
    pub accel: f32,
}

/// A lane line or road edge polygon with its model confidence.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LanePolygon {
    pub points: Vec<[f32; 2]>,
    pub prob: f32,
}

/// Driver head pose from the monitoring camera, already reduced to the
/// sines and frame-to-frame deltas the tracking arcs are drawn from.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct DriverPose {
    pub pitch_sin: f32,
    pub yaw_sin: f32,
    pub pitch_diff: f32,
    pub yaw_diff: f32,
}

/// One per-tick bundle of vehicle, model, radar, and driver state. Produced
/// by external perception/control processes; the HUD consumes it read-only
/// and derives every display field of a paint pass from a single snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub frame_no: u64,
    /// Whether the controls process is publishing; when false every speed
    /// field falls back to its sentinel.
    pub controls_alive: bool,
    pub status: Status,

    /// Ego speed, m/s
    pub v_ego: f32,
    /// Cruise set speed, km/h ([`SET_SPEED_NA`] when unset)
    pub v_cruise_kph: f32,
    /// Instantaneous longitudinal acceleration, m/s^2
    pub acceleration: f32,
    pub standstill: bool,
    /// Seconds since the drive started, gates the standstill timer
    pub drive_time_s: f32,

    /// Posted speed limit, m/s (0 when unavailable)
    pub speed_limit: f32,
    pub speed_limit_region: SpeedLimitRegion,
    pub speed_limit_source: String,
    /// Offset applied on top of the posted limit, m/s
    pub speed_limit_offset: f32,
    pub speed_limit_overridden: bool,
    /// A new limit is pending driver confirmation
    pub speed_limit_changed: bool,
    /// The unconfirmed limit shown on the pending sign, m/s
    pub unconfirmed_speed_limit: f32,

    pub turn_signal_left: bool,
    pub turn_signal_right: bool,
    pub blind_spot_left: bool,
    pub blind_spot_right: bool,

    pub dm_active: bool,
    pub right_hand_drive: bool,
    pub driver_pose: DriverPose,

    pub experimental_mode: bool,
    pub traffic_mode: bool,

    /// Name of the road being driven, empty when the map has none
    #[serde(default)]
    pub road_name: String,

    pub path: Vec<PathPoint>,
    pub lane_lines: Vec<LanePolygon>,
    pub road_edges: Vec<LanePolygon>,

    pub lead_one: Option<Lead>,
    pub lead_two: Option<Lead>,
    pub lead_left: Option<Lead>,
    pub lead_right: Option<Lead>,

    /// Raw radar returns in the model frame, for the debug overlay
    #[serde(default)]
    pub radar_points: Vec<PathPoint>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            frame_no: 0,
            controls_alive: false,
            status: Status::Disengaged,
            v_ego: 0.,
            v_cruise_kph: SET_SPEED_NA,
            acceleration: 0.,
            standstill: false,
            drive_time_s: 0.,
            speed_limit: 0.,
            speed_limit_region: SpeedLimitRegion::None,
            speed_limit_source: String::new(),
            speed_limit_offset: 0.,
            speed_limit_overridden: false,
            speed_limit_changed: false,
            unconfirmed_speed_limit: 0.,
            turn_signal_left: false,
            turn_signal_right: false,
            blind_spot_left: false,
            blind_spot_right: false,
            dm_active: false,
            right_hand_drive: false,
            driver_pose: DriverPose::default(),
            experimental_mode: false,
            traffic_mode: false,
            road_name: String::new(),
            path: Vec::new(),
            lane_lines: Vec::new(),
            road_edges: Vec::new(),
            lead_one: None,
            lead_two: None,
            lead_left: None,
            lead_right: None,
            radar_points: Vec::new(),
        }
    }
}

/// Messages delivered on the snapshot channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SnapshotOutput {
    DataPoint(Box<Snapshot>),
    /// The replay file wrapped around or the feed restarted; cross-frame
    /// state (timers, caches) must be reset.
    SessionRestart,
}

/// Debug telemetry published by the HUD once per paint cycle.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct UiDebug {
    pub frame_no: u64,
    pub draw_time_ms: f32,
    pub fps: f32,
}

/// The single write-back the HUD performs: accepting a pending speed limit
/// by tapping its sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HudCommand {
    AcceptSpeedLimit,
}

/// Most recent decoded camera frame, shared between the producer thread and
/// the paint path. This is the only lock in the system.
pub type SharedCameraFrame = Arc<Mutex<Option<egui::ColorImage>>>;
