use egui::Color32;

use super::hsl_color;
use super::reducer::DisplayState;
use crate::ui::config::HudToggles;

/// How the driving-path polygon gets colored this frame. Exactly one mode
/// wins; the selection order is fixed so stacked toggles stay predictable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathColorMode {
    Traffic,
    Rainbow,
    /// Hue tracks longitudinal acceleration
    Acceleration,
    Custom(Color32),
    Stock,
}

/// Pick the path color mode. Traffic mode always wins, then the rainbow
/// toggle, then acceleration coloring (also implied by experimental mode),
/// then a custom solid color, and finally the stock gradient.
pub fn select_mode(display: &DisplayState, toggles: &HudToggles) -> PathColorMode {
    if display.traffic_mode {
        PathColorMode::Traffic
    } else if toggles.rainbow_path {
        PathColorMode::Rainbow
    } else if toggles.acceleration_path || display.experimental_mode {
        PathColorMode::Acceleration
    } else if !toggles.use_stock_colors {
        PathColorMode::Custom(toggles.path_color32())
    } else {
        PathColorMode::Stock
    }
}

/// Acceleration hue in degrees: 60 (yellow) at zero, toward 120 (green)
/// when accelerating, toward 0 (red) when braking.
pub fn acceleration_hue(accel: f32) -> f32 {
    (60. + 35. * accel).clamp(0., 120.)
}

/// Advance the rainbow phase. Faster driving cycles the hue faster; the
/// phase wraps so it never grows unbounded.
pub fn advance_rainbow_phase(phase: f32, v_ego: f32) -> f32 {
    (phase + v_ego / 10. + 0.5).rem_euclid(360.)
}

/// Color for one path vertex. `t` runs 0 at the vehicle to 1 at the far end
/// of the path; alpha fades out toward the far end for every mode.
pub fn vertex_color(mode: PathColorMode, t: f32, accel: f32, rainbow_phase: f32) -> Color32 {
    let alpha = (0.7 * (1. - t) + 0.1).clamp(0., 1.);
    match mode {
        PathColorMode::Traffic => hsl_color(0., 0.9, 0.5, alpha),
        PathColorMode::Rainbow => {
            hsl_color((rainbow_phase + t * 360.).rem_euclid(360.), 0.94, 0.51, alpha)
        }
        PathColorMode::Acceleration => hsl_color(acceleration_hue(accel), 0.94, 0.51, alpha),
        PathColorMode::Custom(color) => {
            Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (alpha * 255.) as u8)
        }
        PathColorMode::Stock => {
            Color32::from_rgba_unmultiplied(255, 255, 255, (alpha * 255.) as u8)
        }
    }
}
