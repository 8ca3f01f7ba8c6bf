pub mod animation;
pub mod border;
pub mod layout;
pub mod path;
pub mod reducer;

use egui::Color32;
use serde::{Deserialize, Serialize};

/// Engagement status published by controls. Every status maps to one base
/// color in the [`StyleTable`]; the border, path edges, and standstill timer
/// all key off it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Disengaged,
    Engaged,
    Override,
    Experimental,
    TrafficMode,
    ConditionalOverridden,
    AlwaysOnLateral,
    NavigationActive,
}

/// Immutable style table indexed by [`Status`]. Threaded through the layout
/// and paint stages by parameter instead of living in ambient globals.
#[derive(Clone, Copy, Debug)]
pub struct StyleTable {
    disengaged: Color32,
    engaged: Color32,
    override_: Color32,
    experimental: Color32,
    traffic_mode: Color32,
    conditional_overridden: Color32,
    always_on_lateral: Color32,
    navigation_active: Color32,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            disengaged: Color32::from_rgb(0x17, 0x33, 0x49),
            engaged: Color32::from_rgb(0x17, 0x86, 0x44),
            override_: Color32::from_rgb(0x91, 0x9b, 0x95),
            experimental: Color32::from_rgb(0xda, 0x6f, 0x25),
            traffic_mode: Color32::from_rgb(0xc9, 0x22, 0x31),
            conditional_overridden: Color32::from_rgb(0xff, 0xe4, 0x36),
            always_on_lateral: Color32::from_rgb(0x42, 0x85, 0xf4),
            navigation_active: Color32::from_rgb(0x31, 0xa1, 0xee),
        }
    }
}

impl StyleTable {
    pub fn color(&self, status: Status) -> Color32 {
        match status {
            Status::Disengaged => self.disengaged,
            Status::Engaged => self.engaged,
            Status::Override => self.override_,
            Status::Experimental => self.experimental,
            Status::TrafficMode => self.traffic_mode,
            Status::ConditionalOverridden => self.conditional_overridden,
            Status::AlwaysOnLateral => self.always_on_lateral,
            Status::NavigationActive => self.navigation_active,
        }
    }
}

/// Linear interpolation between two colors, `y` clamped to 0..1.
pub fn stroke_shade(start: Color32, end: Color32, y: f32) -> Color32 {
    let y = y.clamp(0., 1.);
    let channel = |a: u8, b: u8| (a as f32 + y * (b as f32 - a as f32)).clamp(0., 255.) as u8;
    Color32::from_rgb(
        channel(start.r(), end.r()),
        channel(start.g(), end.g()),
        channel(start.b(), end.b()),
    )
}

/// HSL to RGB conversion used by the path gradients (hue in degrees,
/// saturation/lightness in 0..1).
pub fn hsl_color(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Color32 {
    let hue = hue.rem_euclid(360.);
    let c = (1. - (2. * lightness - 1.).abs()) * saturation;
    let x = c * (1. - ((hue / 60.).rem_euclid(2.) - 1.).abs());
    let m = lightness - c / 2.;
    let (r, g, b) = match hue {
        h if h < 60. => (c, x, 0.),
        h if h < 120. => (x, c, 0.),
        h if h < 180. => (0., c, x),
        h if h < 240. => (0., x, c),
        h if h < 300. => (x, 0., c),
        _ => (c, 0., x),
    };
    Color32::from_rgba_unmultiplied(
        ((r + m) * 255.) as u8,
        ((g + m) * 255.) as u8,
        ((b + m) * 255.) as u8,
        (alpha.clamp(0., 1.) * 255.) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_shade_endpoints() {
        let start = Color32::from_rgb(0, 0, 0);
        let end = Color32::from_rgb(200, 100, 50);
        assert_eq!(stroke_shade(start, end, 0.), start);
        assert_eq!(stroke_shade(start, end, 1.), end);
        assert_eq!(stroke_shade(start, end, 0.5), Color32::from_rgb(100, 50, 25));
    }

    #[test]
    fn test_stroke_shade_clamps() {
        let start = Color32::from_rgb(10, 10, 10);
        let end = Color32::from_rgb(20, 20, 20);
        assert_eq!(stroke_shade(start, end, -1.), start);
        assert_eq!(stroke_shade(start, end, 2.), end);
    }

    #[test]
    fn test_hsl_primary_hues() {
        assert_eq!(hsl_color(0., 1., 0.5, 1.), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl_color(120., 1., 0.5, 1.), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl_color(240., 1., 0.5, 1.), Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn test_every_status_has_a_color() {
        let style = StyleTable::default();
        let statuses = [
            Status::Disengaged,
            Status::Engaged,
            Status::Override,
            Status::Experimental,
            Status::TrafficMode,
            Status::ConditionalOverridden,
            Status::AlwaysOnLateral,
            Status::NavigationActive,
        ];
        for status in statuses {
            assert_ne!(style.color(status), Color32::TRANSPARENT);
        }
    }
}
