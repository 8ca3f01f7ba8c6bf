use uom::si::f32::Velocity;
use uom::si::velocity::{kilometer_per_hour, meter_per_second, mile_per_hour};

use crate::snapshot::{DriverPose, Snapshot, SpeedLimitRegion, SET_SPEED_NA};
use crate::ui::config::HudToggles;

use super::Status;

/// Placeholder glyph rendered for any value that is not available.
pub const PLACEHOLDER: &str = "–";

/// Per-tick fade step of the driver-monitoring icon (0 = fully active).
const DM_FADE_STEP: f32 = 0.2;

/// Display-ready fields derived once per frame from a single snapshot plus
/// the config toggles. Recomputed wholesale each tick; the only cross-frame
/// carryover is the driver-monitor fade filter, seeded from the previous
/// state.
#[derive(Clone, Debug)]
pub struct DisplayState {
    pub status: Status,
    pub is_metric: bool,

    pub is_cruise_set: bool,
    /// Cruise set speed in display units
    pub set_speed: f32,
    /// Ego speed in display units
    pub speed: f32,
    pub speed_str: String,
    pub set_speed_str: String,
    pub speed_unit: &'static str,

    /// Active speed limit in display units, offset folded in unless the
    /// offset row is shown separately
    pub speed_limit: f32,
    pub speed_limit_str: String,
    pub speed_limit_offset_str: String,
    pub pending_limit_str: String,
    pub speed_limit_source: String,
    pub has_us_sign: bool,
    pub has_eu_sign: bool,
    pub show_slc_offset: bool,
    pub slc_overridden: bool,
    pub speed_limit_changed: bool,

    pub dm_active: bool,
    pub right_hand_dm: bool,
    /// 0 = active and opaque, 1 = fully faded
    pub dm_fade: f32,
    pub driver_pose: DriverPose,

    pub standstill: bool,
    /// Running standstill timer value, filled in by the app from its timer
    pub standstill_secs: f32,

    pub turn_signal_left: bool,
    pub turn_signal_right: bool,
    pub blind_spot_left: bool,
    pub blind_spot_right: bool,

    pub experimental_mode: bool,
    pub traffic_mode: bool,
    pub acceleration: f32,
    /// Ego speed in m/s, kept for the path hue and lead math
    pub v_ego: f32,

    /// Meters to display distance units
    pub distance_conversion: f32,
    /// m/s to display speed units
    pub speed_conversion: f32,
    pub lead_distance_unit: &'static str,
    pub lead_speed_unit: &'static str,

    pub hide_speed: bool,
    pub hide_max_speed: bool,
    pub lead_metrics: bool,

    /// Road name for the bottom pill, empty when unknown or toggled off
    pub road_name: String,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            status: Status::Disengaged,
            is_metric: true,
            is_cruise_set: false,
            set_speed: SET_SPEED_NA,
            speed: 0.,
            speed_str: "0".to_string(),
            set_speed_str: PLACEHOLDER.to_string(),
            speed_unit: "km/h",
            speed_limit: 0.,
            speed_limit_str: PLACEHOLDER.to_string(),
            speed_limit_offset_str: PLACEHOLDER.to_string(),
            pending_limit_str: PLACEHOLDER.to_string(),
            speed_limit_source: String::new(),
            has_us_sign: false,
            has_eu_sign: false,
            show_slc_offset: false,
            slc_overridden: false,
            speed_limit_changed: false,
            dm_active: false,
            right_hand_dm: false,
            dm_fade: 1.,
            driver_pose: DriverPose::default(),
            standstill: false,
            standstill_secs: 0.,
            turn_signal_left: false,
            turn_signal_right: false,
            blind_spot_left: false,
            blind_spot_right: false,
            experimental_mode: false,
            traffic_mode: false,
            acceleration: 0.,
            v_ego: 0.,
            distance_conversion: 1.,
            speed_conversion: 3.6,
            lead_distance_unit: "m",
            lead_speed_unit: "km/h",
            hide_speed: false,
            hide_max_speed: false,
            lead_metrics: false,
            road_name: String::new(),
        }
    }
}

/// m/s to km/h or mph depending on the locale flag.
pub fn ms_to_display(v: f32, metric: bool) -> f32 {
    let v = Velocity::new::<meter_per_second>(v);
    if metric {
        v.get::<kilometer_per_hour>()
    } else {
        v.get::<mile_per_hour>()
    }
}

fn kph_to_display(v: f32, metric: bool) -> f32 {
    if metric {
        v
    } else {
        Velocity::new::<kilometer_per_hour>(v).get::<mile_per_hour>()
    }
}

fn round_str(v: f32) -> String {
    (v.round() as i32).to_string()
}

/// Format a speed value, falling back to the placeholder glyph when the
/// upstream field carries its "unavailable" sentinel.
fn speed_or_placeholder(v: f32) -> String {
    if v > 1. {
        round_str(v)
    } else {
        PLACEHOLDER.to_string()
    }
}

impl DisplayState {
    /// Derive a new display state from one snapshot. Pure except for the
    /// one-pole driver-monitor fade carried over from `prev`.
    pub fn reduce(prev: &DisplayState, snapshot: &Snapshot, toggles: &HudToggles) -> DisplayState {
        let metric = toggles.is_metric;

        let set_speed_kph = if snapshot.controls_alive {
            snapshot.v_cruise_kph
        } else {
            SET_SPEED_NA
        };
        let is_cruise_set = set_speed_kph > 0. && set_speed_kph as i32 != SET_SPEED_NA as i32;
        let set_speed = if is_cruise_set {
            kph_to_display(set_speed_kph, metric)
        } else {
            set_speed_kph
        };

        let v_ego = if snapshot.controls_alive {
            snapshot.v_ego.max(0.)
        } else {
            0.
        };
        let speed = ms_to_display(v_ego, metric);

        let show_sign = toggles.show_speed_limits && !toggles.hide_speed_limit;
        let has_us_sign = show_sign && snapshot.speed_limit_region == SpeedLimitRegion::Us;
        let has_eu_sign = show_sign && snapshot.speed_limit_region == SpeedLimitRegion::Eu;

        let offset = ms_to_display(snapshot.speed_limit_offset, metric);
        let mut speed_limit = ms_to_display(snapshot.speed_limit, metric);
        if !toggles.show_slc_offset && !snapshot.speed_limit_overridden && speed_limit > 1. {
            speed_limit += offset;
        }
        let speed_limit_offset_str = if offset == 0. {
            PLACEHOLDER.to_string()
        } else if offset > 0. {
            format!("+{}", round_str(offset))
        } else {
            round_str(offset)
        };

        let dm_adjust = DM_FADE_STEP * (0.5 - if snapshot.dm_active { 1. } else { 0. });
        let dm_fade = (prev.dm_fade + dm_adjust).clamp(0., 1.);

        DisplayState {
            status: snapshot.status,
            is_metric: metric,
            is_cruise_set,
            set_speed,
            speed,
            speed_str: round_str(speed),
            set_speed_str: if is_cruise_set {
                round_str(set_speed)
            } else {
                PLACEHOLDER.to_string()
            },
            speed_unit: if metric { "km/h" } else { "mph" },
            speed_limit,
            speed_limit_str: speed_or_placeholder(speed_limit),
            speed_limit_offset_str,
            pending_limit_str: speed_or_placeholder(ms_to_display(
                snapshot.unconfirmed_speed_limit,
                metric,
            )),
            speed_limit_source: snapshot.speed_limit_source.clone(),
            has_us_sign,
            has_eu_sign,
            show_slc_offset: toggles.show_slc_offset,
            slc_overridden: snapshot.speed_limit_overridden,
            speed_limit_changed: snapshot.speed_limit_changed,
            dm_active: snapshot.dm_active,
            right_hand_dm: snapshot.right_hand_drive,
            dm_fade,
            driver_pose: snapshot.driver_pose,
            standstill: snapshot.standstill,
            standstill_secs: prev.standstill_secs,
            turn_signal_left: snapshot.turn_signal_left,
            turn_signal_right: snapshot.turn_signal_right,
            blind_spot_left: snapshot.blind_spot_left,
            blind_spot_right: snapshot.blind_spot_right,
            experimental_mode: snapshot.experimental_mode,
            traffic_mode: snapshot.traffic_mode,
            acceleration: snapshot.acceleration,
            v_ego,
            distance_conversion: if metric { 1. } else { 3.28084 },
            speed_conversion: ms_to_display(1., metric),
            lead_distance_unit: if metric { "m" } else { "ft" },
            lead_speed_unit: if metric { "km/h" } else { "mph" },
            hide_speed: toggles.hide_speed,
            hide_max_speed: toggles.hide_max_speed,
            lead_metrics: toggles.lead_metrics,
            road_name: if toggles.road_name {
                snapshot.road_name.clone()
            } else {
                String::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_snapshot() -> Snapshot {
        Snapshot {
            controls_alive: true,
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_metric_speed_string() {
        let snapshot = Snapshot {
            v_ego: 15.,
            ..live_snapshot()
        };
        let state = DisplayState::reduce(
            &DisplayState::default(),
            &snapshot,
            &HudToggles::default(),
        );
        assert_eq!(state.speed_str, "54");
        assert_eq!(state.speed_unit, "km/h");
    }

    #[test]
    fn test_imperial_speed_string() {
        let snapshot = Snapshot {
            v_ego: 15.,
            ..live_snapshot()
        };
        let toggles = HudToggles {
            is_metric: false,
            ..HudToggles::default()
        };
        let state = DisplayState::reduce(&DisplayState::default(), &snapshot, &toggles);
        assert_eq!(state.speed_str, "34");
        assert_eq!(state.speed_unit, "mph");
        assert_eq!(state.lead_distance_unit, "ft");
    }

    #[test]
    fn test_unset_cruise_renders_placeholder() {
        let state = DisplayState::reduce(
            &DisplayState::default(),
            &live_snapshot(),
            &HudToggles::default(),
        );
        assert!(!state.is_cruise_set);
        assert_eq!(state.set_speed_str, PLACEHOLDER);
    }

    #[test]
    fn test_dead_controls_zero_speed_and_na_cruise() {
        let snapshot = Snapshot {
            controls_alive: false,
            v_ego: 20.,
            v_cruise_kph: 100.,
            ..Snapshot::default()
        };
        let state = DisplayState::reduce(
            &DisplayState::default(),
            &snapshot,
            &HudToggles::default(),
        );
        assert_eq!(state.speed_str, "0");
        assert_eq!(state.set_speed_str, PLACEHOLDER);
    }

    #[test]
    fn test_us_sign_flag_follows_region_and_toggles() {
        let snapshot = Snapshot {
            speed_limit_region: SpeedLimitRegion::Us,
            speed_limit: 20.1168, // 45 mph
            ..live_snapshot()
        };
        let toggles = HudToggles {
            is_metric: false,
            ..HudToggles::default()
        };
        let state = DisplayState::reduce(&DisplayState::default(), &snapshot, &toggles);
        assert!(state.has_us_sign);
        assert!(!state.has_eu_sign);
        assert_eq!(state.speed_limit_str, "45");

        let hidden = HudToggles {
            is_metric: false,
            hide_speed_limit: true,
            ..HudToggles::default()
        };
        let state = DisplayState::reduce(&DisplayState::default(), &snapshot, &hidden);
        assert!(!state.has_us_sign);
    }

    #[test]
    fn test_offset_folded_in_unless_shown() {
        let snapshot = Snapshot {
            speed_limit_region: SpeedLimitRegion::Eu,
            speed_limit: 13.888889,      // 50 km/h
            speed_limit_offset: 1.388889, // +5 km/h
            ..live_snapshot()
        };
        let folded = DisplayState::reduce(
            &DisplayState::default(),
            &snapshot,
            &HudToggles::default(),
        );
        assert_eq!(folded.speed_limit_str, "55");

        let toggles = HudToggles {
            show_slc_offset: true,
            ..HudToggles::default()
        };
        let shown = DisplayState::reduce(&DisplayState::default(), &snapshot, &toggles);
        assert_eq!(shown.speed_limit_str, "50");
        assert_eq!(shown.speed_limit_offset_str, "+5");
    }

    #[test]
    fn test_road_name_cleared_by_toggle() {
        let snapshot = Snapshot {
            road_name: "Market Street".to_string(),
            ..live_snapshot()
        };
        let shown = DisplayState::reduce(
            &DisplayState::default(),
            &snapshot,
            &HudToggles::default(),
        );
        assert_eq!(shown.road_name, "Market Street");

        let toggles = HudToggles {
            road_name: false,
            ..HudToggles::default()
        };
        let hidden = DisplayState::reduce(&DisplayState::default(), &snapshot, &toggles);
        assert!(hidden.road_name.is_empty());
    }

    #[test]
    fn test_dm_fade_converges() {
        let snapshot = Snapshot {
            dm_active: true,
            ..live_snapshot()
        };
        let mut state = DisplayState::default();
        assert_eq!(state.dm_fade, 1.);
        for _ in 0..20 {
            state = DisplayState::reduce(&state, &snapshot, &HudToggles::default());
        }
        assert_eq!(state.dm_fade, 0.);

        let inactive = Snapshot {
            dm_active: false,
            ..live_snapshot()
        };
        for _ in 0..20 {
            state = DisplayState::reduce(&state, &inactive, &HudToggles::default());
        }
        assert_eq!(state.dm_fade, 1.);
    }
}
