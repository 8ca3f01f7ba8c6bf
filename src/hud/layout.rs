use std::time::Duration;

use egui::{Pos2, Rect, Vec2, pos2, vec2};

use super::reducer::DisplayState;

/// Border painted around the camera view, also the base margin for HUD
/// elements.
pub const UI_BORDER_SIZE: f32 = 30.;
/// Height of the header gradient band at the top of the camera view.
pub const UI_HEADER_HEIGHT: f32 = 420.;
/// Bottom-corner button footprint (driver-monitor icon anchor).
pub const BTN_SIZE: f32 = 192.;
/// Icon edge used by the status badges next to the driver-monitor icon.
pub const IMG_SIZE: f32 = 144.;

const SIGN_MARGIN: f32 = 12.;
const US_SIGN_HEIGHT: f32 = 186.;
const EU_SIGN_SIZE: f32 = 176.;

const SET_SPEED_BASE: Vec2 = vec2(172., 204.);
/// Value box widens for metric locales and EU signs.
const SET_SPEED_WIDE: f32 = 200.;
/// Value box widens further for a 3-digit US limit.
const SET_SPEED_US_THREE_DIGIT: f32 = 223.;

/// US sign width table for the map-hidden mode, keyed by digit count.
const US_SIGN_WIDTH: f32 = 120.;
const US_SIGN_WIDTH_THREE_DIGIT: f32 = 150.;

const PENDING_SIGN_GAP: f32 = 25.;
const PENDING_SIGN_WIDTH: f32 = 175.;
const PENDING_SIGN_WIDTH_THREE_DIGIT: f32 = 200.;

const CLUSTER_TOP_MAP_VISIBLE: f32 = 45.;
const SPEED_TEXT_CENTER_Y: f32 = 210.;
const SPEED_UNIT_CENTER_Y: f32 = 290.;

/// Half-period of the pending speed-limit border strobe.
pub const PENDING_STROBE_MS: u128 = 500;

/// The two layout modes. Map hidden relocates nearly every element, so the
/// calculator branches wholesale on this variant instead of patching
/// individual offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutMode {
    MapVisible,
    MapHidden { hud_offset: f32 },
}

impl LayoutMode {
    pub fn from_hide_map(hide_map: bool) -> Self {
        if hide_map {
            // Shift the whole HUD band down by a tenth of the header when
            // the camera view collapses.
            LayoutMode::MapHidden {
                hud_offset: UI_HEADER_HEIGHT * 0.1,
            }
        } else {
            LayoutMode::MapVisible
        }
    }

    pub fn map_hidden(&self) -> bool {
        matches!(self, LayoutMode::MapHidden { .. })
    }
}

/// The fixed set of named rectangles one paint pass draws into. Computed
/// fresh from display state and container size every frame; nothing here is
/// cached.
#[derive(Clone, Debug)]
pub struct HudLayout {
    /// Outer box containing the set-speed value and the speed-limit sign
    pub cluster: Rect,
    pub set_speed_value: Rect,
    pub speed_limit_sign: Option<Rect>,
    pub pending_sign: Option<Rect>,
    pub speed_text_center: Pos2,
    pub speed_unit_center: Pos2,
    /// Header gradient band, only in map-visible mode
    pub header: Option<Rect>,
    pub dm_icon_center: Pos2,
    /// Status badge anchored next to the driver-monitor icon; drawn over it
    pub status_badge: Rect,
    /// Second badge slot (pause indicators), one step further out
    pub paused_badge: Rect,
}

fn three_digit(value: &str) -> bool {
    value.chars().count() >= 3
}

fn set_speed_value_size(display: &DisplayState) -> Vec2 {
    let mut size = SET_SPEED_BASE;
    if display.is_metric || display.has_eu_sign {
        size.x = SET_SPEED_WIDE;
    }
    if display.has_us_sign && three_digit(&display.speed_limit_str) {
        size.x = SET_SPEED_US_THREE_DIGIT;
    }
    size
}

fn sign_size(display: &DisplayState, value_width: f32, mode: LayoutMode) -> Option<Vec2> {
    if display.has_us_sign {
        let width = if mode.map_hidden() {
            if three_digit(&display.speed_limit_str) {
                US_SIGN_WIDTH_THREE_DIGIT
            } else {
                US_SIGN_WIDTH
            }
        } else {
            value_width - 2. * SIGN_MARGIN
        };
        Some(vec2(width, US_SIGN_HEIGHT))
    } else if display.has_eu_sign {
        Some(vec2(EU_SIGN_SIZE, EU_SIGN_SIZE))
    } else {
        None
    }
}

/// Pending sign border strobe: on for the first half of every second,
/// counted from the moment the limit change appeared.
pub fn pending_strobe_on(pending_for: Duration) -> bool {
    pending_for.as_millis() % (2 * PENDING_STROBE_MS) < PENDING_STROBE_MS
}

pub const ROAD_NAME_HEIGHT: f32 = 60.;
const ROAD_NAME_PAD_X: f32 = 50.;
const ROAD_NAME_BOTTOM_MARGIN: f32 = 10.;

/// Pill holding the current road name, centered over the bottom edge of the
/// camera view. `text_width` is the measured width of the name.
pub fn road_name_pill(inner: Rect, text_width: f32) -> Rect {
    let width = (text_width + 2. * ROAD_NAME_PAD_X).min(inner.width());
    Rect::from_center_size(
        pos2(
            inner.center().x,
            inner.bottom() - ROAD_NAME_BOTTOM_MARGIN - ROAD_NAME_HEIGHT / 2.,
        ),
        vec2(width, ROAD_NAME_HEIGHT),
    )
}

impl HudLayout {
    /// Compute every HUD rectangle for one frame.
    ///
    /// `speed_text_width` is the measured width of the current-speed text
    /// (the layout stays font-agnostic); `buttons_width` is the width of the
    /// top-right button group the cluster right-aligns against when the map
    /// is hidden.
    pub fn compute(
        display: &DisplayState,
        mode: LayoutMode,
        container: Rect,
        speed_text_width: f32,
        buttons_width: f32,
    ) -> HudLayout {
        let value_size = set_speed_value_size(display);
        let sign = sign_size(display, value_size.x, mode);

        // Cluster size: side-by-side when the map is hidden, stacked when
        // visible.
        let cluster_size = match (mode.map_hidden(), sign) {
            (true, Some(sign)) => vec2(
                value_size.x + SIGN_MARGIN + sign.x,
                value_size.y.max(sign.y),
            ),
            (false, Some(sign)) => {
                let width = value_size.x.max(sign.x + 2. * SIGN_MARGIN);
                vec2(width, value_size.y + SIGN_MARGIN + sign.y)
            }
            (_, None) => value_size,
        };

        let (cluster_top, speed_text_y, speed_unit_y) = match mode {
            LayoutMode::MapVisible => {
                (CLUSTER_TOP_MAP_VISIBLE, SPEED_TEXT_CENTER_Y, SPEED_UNIT_CENTER_Y)
            }
            LayoutMode::MapHidden { hud_offset } => {
                // All three share one top reference and keep their original
                // vertical spacing.
                let top = UI_BORDER_SIZE + hud_offset;
                let text = top + (SPEED_TEXT_CENTER_Y - CLUSTER_TOP_MAP_VISIBLE);
                let unit = text + (SPEED_UNIT_CENTER_Y - SPEED_TEXT_CENTER_Y);
                (top, text, unit)
            }
        };

        let cluster_x = if mode.map_hidden() {
            // Right-aligned: screen edge, border, button group, cluster.
            (container.width() - UI_BORDER_SIZE) - buttons_width - cluster_size.x
        } else {
            let x = 60. + (SET_SPEED_BASE.x - cluster_size.x) / 2.;
            x.max(UI_BORDER_SIZE)
        };

        let cluster = Rect::from_min_size(
            container.min + vec2(cluster_x, cluster_top),
            cluster_size,
        );

        let (set_speed_value, speed_limit_sign) = match (mode.map_hidden(), sign) {
            (true, Some(sign)) => {
                let value = Rect::from_min_size(cluster.min, value_size);
                let sign_rect = Rect::from_min_size(
                    pos2(
                        cluster.min.x + value_size.x + SIGN_MARGIN,
                        cluster.min.y + (cluster.height() - sign.y) / 2.,
                    ),
                    sign,
                );
                (value, Some(sign_rect))
            }
            (false, Some(sign)) => {
                let value = Rect::from_min_size(
                    cluster.min + vec2((cluster.width() - value_size.x) / 2., 0.),
                    value_size,
                );
                let sign_rect = Rect::from_min_size(
                    pos2(
                        cluster.min.x + (cluster.width() - sign.x) / 2.,
                        value.max.y + SIGN_MARGIN,
                    ),
                    sign,
                );
                (value, Some(sign_rect))
            }
            (_, None) => (cluster, None),
        };

        let pending_sign = speed_limit_sign.filter(|_| display.speed_limit_changed).map(|sign| {
            let width = if display.has_us_sign {
                if three_digit(&display.pending_limit_str) {
                    PENDING_SIGN_WIDTH_THREE_DIGIT
                } else {
                    PENDING_SIGN_WIDTH
                }
            } else {
                sign.width()
            };
            Rect::from_min_size(
                pos2(sign.max.x + PENDING_SIGN_GAP, sign.min.y),
                vec2(width, sign.height()),
            )
        });

        // The current-speed text rides immediately left of the cluster when
        // the map is hidden; it may legitimately extend off-screen-left.
        let speed_text_x = if mode.map_hidden() {
            cluster.min.x - container.min.x - speed_text_width / 2.
        } else {
            container.width() / 2.
        };
        let speed_text_center = container.min + vec2(speed_text_x, speed_text_y);
        let speed_unit_center = container.min + vec2(speed_text_x, speed_unit_y);

        let header = (!mode.map_hidden()).then(|| {
            Rect::from_min_size(container.min, vec2(container.width(), UI_HEADER_HEIGHT))
        });

        let dm_offset = UI_BORDER_SIZE + BTN_SIZE / 2.;
        let dm_x = if display.right_hand_dm {
            container.width() - dm_offset
        } else {
            dm_offset
        };
        let dm_icon_center = container.min + vec2(dm_x, container.height() - dm_offset);

        // Badges step outward from the icon, mirrored for right-hand drive.
        let badge_dir = if display.right_hand_dm { -1. } else { 1. };
        let badge_anchor = dm_icon_center + vec2(badge_dir * IMG_SIZE, -IMG_SIZE / 2.);
        let status_badge =
            Rect::from_min_size(badge_anchor - vec2(IMG_SIZE / 2., 0.), vec2(IMG_SIZE, IMG_SIZE));
        let paused_badge = status_badge.translate(vec2(badge_dir * IMG_SIZE * 1.5, 0.));

        HudLayout {
            cluster,
            set_speed_value,
            speed_limit_sign,
            pending_sign,
            speed_text_center,
            speed_unit_center,
            header,
            dm_icon_center,
            status_badge,
            paused_badge,
        }
    }
}

/// Turn-signal sprite slot for the active side.
pub fn signal_slot(container: Rect, left: bool, sprite: Vec2) -> Rect {
    let x = if left {
        container.center().x * 0.75 - sprite.x
    } else {
        container.center().x * 1.25
    };
    Rect::from_min_size(container.min + vec2(x, sprite.y / 2.), sprite)
}
