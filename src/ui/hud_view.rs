use std::time::Duration;

use simple_moving_average::SMA;

use egui::{
    Align2, Color32, CornerRadius, FontId, Frame, Id, Mesh, Pos2, Rect, Sense, Shape, Stroke,
    StrokeKind, TextureOptions, Vec2, ViewportCommand, pos2, vec2,
};

use crate::hud::animation::standstill_color;
use crate::hud::border::border_colors;
use crate::hud::layout::{self, HudLayout, LayoutMode, UI_BORDER_SIZE, pending_strobe_on};
use crate::hud::path;
use crate::hud::reducer::PLACEHOLDER;
use crate::hud::{Status, stroke_shade};
use crate::snapshot::{HudCommand, LanePolygon, Lead, PathPoint};

use super::{CAMERA_SKIP_FRAMES, HudApp};

/// Furthest model point the scene projection draws.
const MAX_DRAW_DISTANCE_M: f32 = 100.;

const SIGNAL_SPRITE_SIZE: Vec2 = vec2(300., 200.);

const CLUSTER_BG: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 166);
const CLUSTER_STROKE: Color32 = Color32::from_rgba_premultiplied(75, 75, 75, 75);

/// Project a model-frame point (x forward, y lateral, meters) into the
/// camera rect. Lateral scale shrinks with distance for a rough perspective.
fn project(inner: Rect, x_forward: f32, y_lateral: f32) -> Pos2 {
    let t = (x_forward / MAX_DRAW_DISTANCE_M).clamp(0., 1.);
    let horizon = inner.top() + inner.height() * 0.5;
    let y = inner.bottom() - (inner.bottom() - horizon) * t.sqrt();
    let px_per_m = inner.width() * 0.04 / (1. + 0.06 * x_forward.max(0.));
    pos2(inner.center().x - y_lateral * px_per_m, y)
}

impl HudApp {
    pub(super) fn hud_view(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(Frame::new())
            .show(ctx, |ui| {
                let container = ui.max_rect();
                let inner = container.shrink(UI_BORDER_SIZE);
                let now = self.elapsed();

                self.paint_border(ui, container, now);
                self.paint_camera(ctx, ui, inner);

                let mode = LayoutMode::from_hide_map(self.app_config.toggles.hide_map);
                if let Some(snapshot) = self.latest.clone() {
                    self.paint_scene(ui, inner, &snapshot.path, &snapshot.lane_lines, &snapshot.road_edges);
                    self.paint_leads(ui, inner, &snapshot);
                    self.paint_radar_tracks(ui, inner, &snapshot.radar_points);
                }

                let speed_font = FontId::proportional(176.);
                let speed_text_width = ctx.fonts_mut(|f| {
                    f.layout_no_wrap(self.display.speed_str.clone(), speed_font.clone(), Color32::WHITE)
                        .size()
                        .x
                });
                let hud = HudLayout::compute(&self.display, mode, container, speed_text_width, 0.);

                if let Some(header) = hud.header {
                    paint_header_gradient(ui, header);
                }

                self.paint_dm_icon(ui, &hud);
                self.paint_badges(ui, &hud);
                self.paint_cluster(ui, &hud);
                self.paint_current_speed(ui, &hud, speed_font);
                self.paint_road_name(ctx, ui, inner);
                self.paint_signals(ui, inner);

                if self.app_config.toggles.show_fps {
                    ui.painter().text(
                        inner.left_bottom() + vec2(10., -10.),
                        Align2::LEFT_BOTTOM,
                        format!("{:.1} fps", self.fps_filter.get_average()),
                        FontId::monospace(28.),
                        Color32::WHITE,
                    );
                }

                self.handle_window_drag(ui, container);
            });
    }

    /// The four border stripes. Top and bottom carry the plain status color,
    /// the sides add the turn-signal and blind-spot treatments.
    fn paint_border(&self, ui: &egui::Ui, container: Rect, now: Duration) {
        let colors = border_colors(&self.display, &self.app_config.toggles, &self.style, now);
        let painter = ui.painter();
        let w = container.width();
        let h = container.height();
        let top = Rect::from_min_size(container.min, vec2(w, UI_BORDER_SIZE));
        let bottom = Rect::from_min_size(
            container.min + vec2(0., h - UI_BORDER_SIZE),
            vec2(w, UI_BORDER_SIZE),
        );
        let left = Rect::from_min_size(
            container.min + vec2(0., UI_BORDER_SIZE),
            vec2(UI_BORDER_SIZE, h - 2. * UI_BORDER_SIZE),
        );
        let right = Rect::from_min_size(
            container.min + vec2(w - UI_BORDER_SIZE, UI_BORDER_SIZE),
            vec2(UI_BORDER_SIZE, h - 2. * UI_BORDER_SIZE),
        );
        painter.rect_filled(top, CornerRadius::ZERO, colors.base);
        painter.rect_filled(bottom, CornerRadius::ZERO, colors.base);
        painter.rect_filled(left, CornerRadius::ZERO, colors.left);
        painter.rect_filled(right, CornerRadius::ZERO, colors.right);
    }

    /// Latest camera frame, or a sky gradient while no frame has arrived.
    /// Texture uploads are throttled so a fast camera cannot starve painting.
    fn paint_camera(&mut self, ctx: &egui::Context, ui: &egui::Ui, inner: Rect) {
        self.paints_since_upload += 1;
        if self.camera_texture.is_none() || self.paints_since_upload >= CAMERA_SKIP_FRAMES {
            if let Ok(mut slot) = self.camera_frame.lock() {
                if let Some(image) = slot.take() {
                    self.camera_texture =
                        Some(ctx.load_texture("road-camera", image, TextureOptions::LINEAR));
                    self.paints_since_upload = 0;
                }
            }
        }
        match &self.camera_texture {
            Some(texture) => {
                ui.painter().image(
                    texture.id(),
                    inner,
                    Rect::from_min_max(pos2(0., 0.), pos2(1., 1.)),
                    Color32::WHITE,
                );
            }
            None => {
                let mut mesh = Mesh::default();
                let top_color = Color32::from_rgb(18, 26, 48);
                let bottom_color = Color32::from_rgb(8, 10, 14);
                mesh.colored_vertex(inner.left_top(), top_color);
                mesh.colored_vertex(inner.right_top(), top_color);
                mesh.colored_vertex(inner.right_bottom(), bottom_color);
                mesh.colored_vertex(inner.left_bottom(), bottom_color);
                mesh.add_triangle(0, 1, 2);
                mesh.add_triangle(0, 2, 3);
                ui.painter().add(Shape::mesh(mesh));
            }
        }
    }

    /// Lane lines, road edges, and the driving path, painted in that order
    /// so the path sits on top.
    fn paint_scene(
        &self,
        ui: &egui::Ui,
        inner: Rect,
        path_points: &[PathPoint],
        lane_lines: &[LanePolygon],
        road_edges: &[LanePolygon],
    ) {
        for lane in lane_lines {
            let alpha = (lane.prob.clamp(0., 1.) * 255.) as u8;
            paint_strip(ui, inner, &lane.points, |_| {
                Color32::from_rgba_unmultiplied(255, 255, 255, alpha)
            });
        }
        for edge in road_edges {
            let alpha = (edge.prob.clamp(0., 1.) * 255.) as u8;
            paint_strip(ui, inner, &edge.points, |_| {
                Color32::from_rgba_unmultiplied(255, 60, 60, alpha)
            });
        }
        self.paint_path(ui, inner, path_points);
    }

    fn paint_path(&self, ui: &egui::Ui, inner: Rect, points: &[PathPoint]) {
        if points.len() < 2 {
            return;
        }
        let mode = path::select_mode(&self.display, &self.app_config.toggles);
        let mut mesh = Mesh::default();
        let last = (points.len() - 1) as f32;
        for (i, point) in points.iter().enumerate() {
            let t = i as f32 / last;
            // Path narrows with distance.
            let half_width = 0.9 * (1. - t) + 0.25;
            let color = path::vertex_color(mode, t, point.accel, self.rainbow_phase);
            mesh.colored_vertex(project(inner, point.x, point.y + half_width), color);
            mesh.colored_vertex(project(inner, point.x, point.y - half_width), color);
        }
        for i in 0..points.len() as u32 - 1 {
            let base = i * 2;
            mesh.add_triangle(base, base + 1, base + 2);
            mesh.add_triangle(base + 1, base + 3, base + 2);
        }
        ui.painter().add(Shape::mesh(mesh));
    }

    /// Lead vehicle chevrons with optional distance and speed readouts.
    /// Labels skip drawing when they would overlap one already painted.
    fn paint_leads(&self, ui: &egui::Ui, inner: Rect, snapshot: &crate::snapshot::Snapshot) {
        let mut label_rects: Vec<Rect> = Vec::new();
        let leads = [
            &snapshot.lead_one,
            &snapshot.lead_two,
            &snapshot.lead_left,
            &snapshot.lead_right,
        ];
        for lead in leads.into_iter().flatten() {
            self.paint_lead(ui, inner, lead, &mut label_rects);
        }
    }

    fn paint_lead(&self, ui: &egui::Ui, inner: Rect, lead: &Lead, label_rects: &mut Vec<Rect>) {
        let painter = ui.painter();
        let x = inner.left() + lead.screen_x.clamp(0., 1.) * inner.width();
        let y = inner.top() + lead.screen_y.clamp(0., 1.) * inner.height();
        // Marker shrinks with distance.
        let sz = ((25. * 30.) / (lead.d_rel / 3. + 30.)).clamp(15., 30.) * 2.35;

        // Glow behind the chevron, red when closing fast.
        let glow_color = if lead.v_rel < -2. {
            Color32::from_rgba_unmultiplied(201, 34, 49, 200)
        } else {
            Color32::from_rgba_unmultiplied(218, 111, 37, 200)
        };
        painter.add(Shape::convex_polygon(
            vec![
                pos2(x + sz * 1.35, y + sz),
                pos2(x, y - sz * 0.1),
                pos2(x - sz * 1.35, y + sz),
            ],
            glow_color,
            Stroke::NONE,
        ));
        painter.add(Shape::convex_polygon(
            vec![
                pos2(x + sz * 1.25, y + sz),
                pos2(x, y),
                pos2(x - sz * 1.25, y + sz),
            ],
            Color32::from_rgba_unmultiplied(218, 202, 37, 255),
            Stroke::NONE,
        ));

        if !self.display.lead_metrics {
            return;
        }
        let distance = lead.d_rel * self.display.distance_conversion;
        let speed = ((self.display.v_ego + lead.v_rel) * self.display.speed_conversion).max(0.);
        let text = format!(
            "{:.1} {} | {:.0} {}",
            distance,
            self.display.lead_distance_unit,
            speed,
            self.display.lead_speed_unit
        );
        let font = FontId::proportional(32.);
        let galley = painter.layout_no_wrap(text, font, Color32::WHITE);
        let label_rect = Rect::from_min_size(
            pos2(x - galley.size().x / 2., y + sz + 6.),
            galley.size(),
        );
        if label_rects.iter().any(|r| r.intersects(label_rect)) {
            return;
        }
        painter.galley(label_rect.min, galley, Color32::WHITE);
        label_rects.push(label_rect);
    }

    /// Raw radar returns as red dots, a debugging overlay.
    fn paint_radar_tracks(&self, ui: &egui::Ui, inner: Rect, points: &[PathPoint]) {
        if !self.app_config.toggles.radar_tracks {
            return;
        }
        let painter = ui.painter();
        for point in points {
            if point.x > MAX_DRAW_DISTANCE_M {
                continue;
            }
            painter.circle_filled(project(inner, point.x, point.y), 5., Color32::RED);
        }
    }

    /// Road name pill over the bottom edge of the camera view.
    fn paint_road_name(&self, ctx: &egui::Context, ui: &egui::Ui, inner: Rect) {
        if self.display.road_name.is_empty() {
            return;
        }
        let font = FontId::proportional(40.);
        let text_width = ctx.fonts_mut(|f| {
            f.layout_no_wrap(self.display.road_name.clone(), font.clone(), Color32::WHITE)
                .size()
                .x
        });
        let pill = layout::road_name_pill(inner, text_width);
        let painter = ui.painter();
        painter.rect_filled(
            pill,
            CornerRadius::same(24),
            Color32::from_rgba_unmultiplied(0, 0, 0, 150),
        );
        painter.text(
            pill.center(),
            Align2::CENTER_CENTER,
            &self.display.road_name,
            font,
            Color32::WHITE,
        );
    }

    /// Driver-monitoring face icon. Fades while monitoring is inactive; the
    /// pose arcs lean with the driver's head.
    fn paint_dm_icon(&self, ui: &egui::Ui, hud: &HudLayout) {
        let painter = ui.painter();
        let center = hud.dm_icon_center;
        let radius = layout::BTN_SIZE / 2.;
        let opacity = 0.2 + 0.45 * (1. - self.display.dm_fade);
        let alpha = |a: f32| (a * opacity * 255.) as u8;

        painter.circle_filled(
            center,
            radius,
            Color32::from_rgba_unmultiplied(0, 0, 0, alpha(0.7)),
        );
        painter.circle_stroke(
            center,
            radius - 6.,
            Stroke::new(4., Color32::from_rgba_unmultiplied(255, 255, 255, alpha(1.))),
        );

        let pose = &self.display.driver_pose;
        let face = center + vec2(pose.yaw_sin * radius * 0.6, -pose.pitch_sin * radius * 0.6);
        painter.circle_filled(
            face,
            radius * 0.35,
            Color32::from_rgba_unmultiplied(255, 255, 255, alpha(0.8)),
        );
        // Attention arcs widen as the pose deviates from straight ahead.
        let arc_w = 4. + 12. * pose.yaw_diff.abs().min(1.);
        painter.line_segment(
            [face + vec2(-radius * 0.5, 0.), face + vec2(-radius * 0.7, 0.)],
            Stroke::new(arc_w, Color32::from_rgba_unmultiplied(255, 255, 255, alpha(0.6))),
        );
        painter.line_segment(
            [face + vec2(radius * 0.5, 0.), face + vec2(radius * 0.7, 0.)],
            Stroke::new(arc_w, Color32::from_rgba_unmultiplied(255, 255, 255, alpha(0.6))),
        );
    }

    /// Mode badges next to the driver-monitor icon: one for any elevated
    /// status, one pause marker while stopped.
    fn paint_badges(&self, ui: &egui::Ui, hud: &HudLayout) {
        let painter = ui.painter();
        let label = match self.display.status {
            Status::Experimental => Some("EXP"),
            Status::TrafficMode => Some("TRF"),
            Status::AlwaysOnLateral => Some("AOL"),
            Status::NavigationActive => Some("NAV"),
            Status::ConditionalOverridden => Some("CND"),
            _ => None,
        };
        if let Some(label) = label {
            let color = self.style.color(self.display.status);
            painter.rect_filled(hud.status_badge, CornerRadius::same(24), color);
            painter.text(
                hud.status_badge.center(),
                Align2::CENTER_CENTER,
                label,
                FontId::proportional(44.),
                Color32::WHITE,
            );
        }
        if self.display.standstill {
            let badge = hud.paused_badge;
            painter.rect_filled(
                badge,
                CornerRadius::same(24),
                Color32::from_rgba_unmultiplied(0, 0, 0, 166),
            );
            let bar = vec2(badge.width() * 0.12, badge.height() * 0.4);
            for dx in [-0.12, 0.12] {
                painter.rect_filled(
                    Rect::from_center_size(badge.center() + vec2(badge.width() * dx, 0.), bar),
                    CornerRadius::same(3),
                    Color32::WHITE,
                );
            }
        }
    }

    /// The set-speed value box plus the regional speed limit signs.
    fn paint_cluster(&mut self, ui: &egui::Ui, hud: &HudLayout) {
        if self.display.hide_max_speed {
            return;
        }
        let painter = ui.painter().clone();
        painter.rect_filled(hud.set_speed_value, CornerRadius::same(32), CLUSTER_BG);
        painter.rect_stroke(
            hud.set_speed_value,
            CornerRadius::same(32),
            Stroke::new(6., CLUSTER_STROKE),
            StrokeKind::Inside,
        );

        let (label_color, value_color) = if self.display.is_cruise_set {
            (
                Color32::from_rgba_unmultiplied(255, 255, 255, 200),
                Color32::WHITE,
            )
        } else {
            (
                Color32::from_rgba_unmultiplied(255, 255, 255, 100),
                Color32::from_rgba_unmultiplied(255, 255, 255, 100),
            )
        };
        let value = hud.set_speed_value;
        painter.text(
            pos2(value.center().x, value.top() + 50.),
            Align2::CENTER_CENTER,
            "MAX",
            FontId::proportional(40.),
            label_color,
        );
        painter.text(
            pos2(value.center().x, value.top() + 128.),
            Align2::CENTER_CENTER,
            &self.display.set_speed_str,
            FontId::proportional(90.),
            value_color,
        );

        if let Some(sign) = hud.speed_limit_sign {
            if self.display.has_us_sign {
                self.paint_us_sign(&painter, sign, &self.display.speed_limit_str, None);
            } else {
                self.paint_eu_sign(&painter, sign, &self.display.speed_limit_str, None);
            }
            if self.display.show_slc_offset
                && self.display.speed_limit_offset_str != PLACEHOLDER
            {
                painter.text(
                    pos2(sign.center().x, sign.bottom() + 30.),
                    Align2::CENTER_CENTER,
                    &self.display.speed_limit_offset_str,
                    FontId::proportional(44.),
                    Color32::WHITE,
                );
            }
        }

        if let Some(pending) = hud.pending_sign {
            let border = if pending_strobe_on(self.pending_for) {
                Color32::from_rgb(201, 34, 49)
            } else {
                Color32::BLACK
            };
            if self.display.has_us_sign {
                self.paint_us_sign(&painter, pending, &self.display.pending_limit_str, Some(border));
            } else {
                self.paint_eu_sign(&painter, pending, &self.display.pending_limit_str, Some(border));
            }
            let response = ui.interact(pending, Id::new("pending-speed-limit"), Sense::click());
            if response.clicked() {
                let _ = self.command_sender.send(HudCommand::AcceptSpeedLimit);
            }
        }
    }

    /// MUTCD-style rectangular sign.
    fn paint_us_sign(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        value: &str,
        border_override: Option<Color32>,
    ) {
        let fill = if self.display.slc_overridden && border_override.is_none() {
            Color32::from_rgb(150, 150, 150)
        } else {
            Color32::WHITE
        };
        painter.rect_filled(rect, CornerRadius::same(24), fill);
        painter.rect_stroke(
            rect,
            CornerRadius::same(24),
            Stroke::new(6., border_override.unwrap_or(Color32::BLACK)),
            StrokeKind::Inside,
        );
        painter.text(
            pos2(rect.center().x, rect.top() + 30.),
            Align2::CENTER_CENTER,
            "SPEED",
            FontId::proportional(28.),
            Color32::BLACK,
        );
        painter.text(
            pos2(rect.center().x, rect.top() + 60.),
            Align2::CENTER_CENTER,
            "LIMIT",
            FontId::proportional(28.),
            Color32::BLACK,
        );
        painter.text(
            pos2(rect.center().x, rect.top() + 125.),
            Align2::CENTER_CENTER,
            value,
            FontId::proportional(70.),
            Color32::BLACK,
        );
    }

    /// Vienna-convention circular sign.
    fn paint_eu_sign(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        value: &str,
        border_override: Option<Color32>,
    ) {
        let center = rect.center();
        let radius = rect.width().min(rect.height()) / 2.;
        painter.circle_filled(center, radius, Color32::WHITE);
        painter.circle_stroke(
            center,
            radius - 10.,
            Stroke::new(20., border_override.unwrap_or(Color32::from_rgb(201, 34, 49))),
        );
        painter.text(
            center,
            Align2::CENTER_CENTER,
            value,
            FontId::proportional(74.),
            Color32::BLACK,
        );
    }

    /// Current speed readout, replaced by the standstill timer while the
    /// vehicle sits stopped.
    fn paint_current_speed(&self, ui: &egui::Ui, hud: &HudLayout, font: FontId) {
        let painter = ui.painter();
        let timer = self.app_config.toggles.standstill_timer
            && self.display.standstill
            && self.display.standstill_secs > 0.;
        if timer {
            let stopped_for = Duration::from_secs_f32(self.display.standstill_secs);
            let secs = stopped_for.as_secs();
            let color = standstill_color(stopped_for, &self.style);
            painter.text(
                hud.speed_text_center,
                Align2::CENTER_CENTER,
                format!("{}:{:02}", secs / 60, secs % 60),
                font,
                color,
            );
            painter.text(
                hud.speed_unit_center,
                Align2::CENTER_CENTER,
                "STOPPED",
                FontId::proportional(66.),
                stroke_shade(color, Color32::WHITE, 0.4),
            );
            return;
        }
        if self.display.hide_speed {
            return;
        }
        painter.text(
            hud.speed_text_center,
            Align2::CENTER_CENTER,
            &self.display.speed_str,
            font,
            Color32::WHITE,
        );
        painter.text(
            hud.speed_unit_center,
            Align2::CENTER_CENTER,
            self.display.speed_unit,
            FontId::proportional(66.),
            Color32::from_rgba_unmultiplied(255, 255, 255, 200),
        );
    }

    /// Themed turn-signal sprites, one per active side.
    fn paint_signals(&self, ui: &egui::Ui, inner: Rect) {
        let (Some(frame), Some(sprites)) = (self.signal_frame, &self.sprites) else {
            return;
        };
        let sides = [
            (true, self.display.turn_signal_left, self.display.blind_spot_left),
            (false, self.display.turn_signal_right, self.display.blind_spot_right),
        ];
        for (left, active, blind_spot) in sides {
            if !active {
                continue;
            }
            let frames = sprites.frames_for(blind_spot);
            let Some(path) = frames.get(frame % frames.len()) else {
                continue;
            };
            let rect = layout::signal_slot(inner, left, SIGNAL_SPRITE_SIZE);
            let image = egui::Image::from_uri(format!("file://{}", path.display()));
            image.paint_at(ui, rect);
        }
    }

    /// Drag the borderless window from its top border stripe.
    fn handle_window_drag(&mut self, ui: &egui::Ui, container: Rect) {
        let strip = Rect::from_min_size(container.min, vec2(container.width(), UI_BORDER_SIZE));
        let drag = ui.interact(strip, Id::new("window-drag"), Sense::drag());
        if drag.dragged() {
            ui.ctx().send_viewport_cmd(ViewportCommand::StartDrag);
        }
        if drag.drag_stopped() {
            if let Some(outer_rect) = ui.input(|is| is.viewport().outer_rect) {
                self.app_config.window_position = outer_rect.min.into();
            }
        }
    }
}

/// Readability gradient under the header widgets, darkest at the top.
fn paint_header_gradient(ui: &egui::Ui, header: Rect) {
    let mut mesh = Mesh::default();
    let top = Color32::from_rgba_unmultiplied(0, 0, 0, 115);
    let bottom = Color32::from_rgba_unmultiplied(0, 0, 0, 0);
    mesh.colored_vertex(header.left_top(), top);
    mesh.colored_vertex(header.right_top(), top);
    mesh.colored_vertex(header.right_bottom(), bottom);
    mesh.colored_vertex(header.left_bottom(), bottom);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    ui.painter().add(Shape::mesh(mesh));
}

/// Paint one lane or edge strip. Points come in near/far pairs per station;
/// consecutive pairs are stitched into quads.
fn paint_strip(
    ui: &egui::Ui,
    inner: Rect,
    points: &[[f32; 2]],
    color: impl Fn(usize) -> Color32,
) {
    if points.len() < 4 {
        return;
    }
    let mut mesh = Mesh::default();
    for (i, point) in points.iter().enumerate() {
        mesh.colored_vertex(project(inner, point[0], point[1]), color(i));
    }
    let pairs = points.len() as u32 / 2;
    for i in 0..pairs - 1 {
        let base = i * 2;
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base + 1, base + 3, base + 2);
    }
    ui.painter().add(Shape::mesh(mesh));
}
