use std::time::Duration;

use egui::Color32;

use super::reducer::DisplayState;
use super::{Status, StyleTable};
use crate::ui::config::HudToggles;

/// Flicker half-period for an active turn signal.
const SIGNAL_FLICKER_MS: u128 = 250;
/// Faster half-period when a blind-spot warning overlaps the signal.
const SIGNAL_BLINDSPOT_FLICKER_MS: u128 = 100;

/// Border colors for one frame, computed per side. The top and bottom
/// stripes always carry the plain status color; the left and right stripes
/// add the signal and blind-spot treatments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderColors {
    pub base: Color32,
    pub left: Color32,
    pub right: Color32,
}

/// Compute the border for this frame. `now` is time since app start; the
/// flicker phase derives from it directly so the border needs no state of
/// its own.
pub fn border_colors(
    display: &DisplayState,
    toggles: &HudToggles,
    style: &StyleTable,
    now: Duration,
) -> BorderColors {
    let base = style.color(display.status);
    BorderColors {
        base,
        left: side_color(
            base,
            display.turn_signal_left,
            display.blind_spot_left,
            toggles,
            style,
            now,
        ),
        right: side_color(
            base,
            display.turn_signal_right,
            display.blind_spot_right,
            toggles,
            style,
            now,
        ),
    }
}

fn side_color(
    base: Color32,
    signal: bool,
    blind_spot: bool,
    toggles: &HudToggles,
    style: &StyleTable,
    now: Duration,
) -> Color32 {
    let blind_spot = blind_spot && toggles.blindspot_border;
    if signal && toggles.signal_border {
        let amber = style.color(Status::ConditionalOverridden);
        let (half_period, highlight, rest) = if blind_spot {
            // warning flicker alternates red and amber, never the plain status
            (
                SIGNAL_BLINDSPOT_FLICKER_MS,
                style.color(Status::TrafficMode),
                amber,
            )
        } else {
            (SIGNAL_FLICKER_MS, amber, base)
        };
        if (now.as_millis() / half_period) % 2 == 0 {
            highlight
        } else {
            rest
        }
    } else if blind_spot {
        style.color(Status::TrafficMode)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_plain_status_border() {
        let display = DisplayState {
            status: Status::Engaged,
            ..DisplayState::default()
        };
        let colors = border_colors(&display, &HudToggles::default(), &StyleTable::default(), ms(0));
        let engaged = StyleTable::default().color(Status::Engaged);
        assert_eq!(colors.base, engaged);
        assert_eq!(colors.left, engaged);
        assert_eq!(colors.right, engaged);
    }

    #[test]
    fn test_signal_flickers_at_quarter_second() {
        let style = StyleTable::default();
        let display = DisplayState {
            turn_signal_left: true,
            ..DisplayState::default()
        };
        let toggles = HudToggles::default();
        let amber = style.color(Status::ConditionalOverridden);

        let on = border_colors(&display, &toggles, &style, ms(0));
        assert_eq!(on.left, amber);
        assert_eq!(on.right, on.base);

        let off = border_colors(&display, &toggles, &style, ms(250));
        assert_eq!(off.left, off.base);

        let on_again = border_colors(&display, &toggles, &style, ms(500));
        assert_eq!(on_again.left, amber);
    }

    #[test]
    fn test_signal_with_blindspot_flickers_faster_in_red() {
        let style = StyleTable::default();
        let display = DisplayState {
            turn_signal_right: true,
            blind_spot_right: true,
            ..DisplayState::default()
        };
        let toggles = HudToggles::default();
        let red = style.color(Status::TrafficMode);
        let amber = style.color(Status::ConditionalOverridden);

        assert_eq!(border_colors(&display, &toggles, &style, ms(0)).right, red);
        assert_eq!(border_colors(&display, &toggles, &style, ms(100)).right, amber);
        assert_eq!(border_colors(&display, &toggles, &style, ms(200)).right, red);
    }

    #[test]
    fn test_blindspot_off_phase_never_shows_plain_status() {
        let style = StyleTable::default();
        let display = DisplayState {
            status: Status::Engaged,
            turn_signal_right: true,
            blind_spot_right: true,
            ..DisplayState::default()
        };
        let toggles = HudToggles::default();
        let engaged = style.color(Status::Engaged);
        for t in (0..1000).step_by(50) {
            let colors = border_colors(&display, &toggles, &style, ms(t));
            assert_ne!(colors.right, engaged);
        }
    }

    #[test]
    fn test_blindspot_alone_is_solid_red() {
        let style = StyleTable::default();
        let display = DisplayState {
            blind_spot_left: true,
            ..DisplayState::default()
        };
        let red = style.color(Status::TrafficMode);
        for t in [0, 100, 250, 999] {
            assert_eq!(
                border_colors(&display, &HudToggles::default(), &style, ms(t)).left,
                red
            );
        }
    }

    #[test]
    fn test_toggles_disable_the_treatments() {
        let style = StyleTable::default();
        let display = DisplayState {
            turn_signal_left: true,
            blind_spot_right: true,
            ..DisplayState::default()
        };
        let toggles = HudToggles {
            signal_border: false,
            blindspot_border: false,
            ..HudToggles::default()
        };
        let colors = border_colors(&display, &toggles, &style, ms(0));
        assert_eq!(colors.left, colors.base);
        assert_eq!(colors.right, colors.base);
    }
}
