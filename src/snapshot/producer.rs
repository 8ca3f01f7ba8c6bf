use std::f32::consts::TAU;
use std::path::PathBuf;

use egui::{Color32, ColorImage};

use crate::HudError;

use super::{
    DriverPose, HudCommand, LanePolygon, PathPoint, Snapshot, SnapshotOutput, SpeedLimitRegion,
};
use crate::hud::Status;

/// Source of drive-state snapshots. One producer instance feeds one
/// collector thread.
pub trait SnapshotProducer {
    /// Initialize the producer. For file-backed producers this loads and
    /// validates the recording up front.
    fn start(&mut self) -> Result<(), HudError>;

    /// Produce the next snapshot message.
    fn snapshot(&mut self) -> Result<SnapshotOutput, HudError>;

    /// A newly decoded camera frame, when the source has one. Producers
    /// without a camera return `None` and the HUD paints its background
    /// gradient instead.
    fn camera_frame(&mut self) -> Option<ColorImage>;

    /// Apply a write-back command from the HUD.
    fn handle_command(&mut self, command: HudCommand);
}

/// Replays a recorded drive from a jsonl file, wrapping around at the end
/// with a [`SnapshotOutput::SessionRestart`] marker.
pub struct ReplaySnapshotProducer {
    source_file: PathBuf,
    points: Vec<SnapshotOutput>,
    index: usize,
}

impl ReplaySnapshotProducer {
    pub fn new(source_file: PathBuf) -> Self {
        Self {
            source_file,
            points: Vec::new(),
            index: 0,
        }
    }
}

impl SnapshotProducer for ReplaySnapshotProducer {
    fn start(&mut self) -> Result<(), HudError> {
        self.points = serde_jsonlines::json_lines(&self.source_file)
            .map_err(|e| HudError::SnapshotLoaderError { source: e })?
            .collect::<Result<Vec<SnapshotOutput>, std::io::Error>>()
            .map_err(|e| HudError::SnapshotLoaderError { source: e })?;
        if self.points.is_empty() {
            return Err(HudError::InvalidSnapshotFile {
                path: self.source_file.display().to_string(),
            });
        }
        self.index = 0;
        Ok(())
    }

    fn snapshot(&mut self) -> Result<SnapshotOutput, HudError> {
        if self.points.is_empty() {
            return Err(HudError::SnapshotProducerError {
                description: "The replay file is not loaded, call start() first.".to_string(),
            });
        }
        if self.index >= self.points.len() {
            self.index = 0;
            return Ok(SnapshotOutput::SessionRestart);
        }
        let point = self.points[self.index].clone();
        self.index += 1;
        Ok(point)
    }

    fn camera_frame(&mut self) -> Option<ColorImage> {
        None
    }

    fn handle_command(&mut self, command: HudCommand) {
        // Recordings are immutable; a tap during replay changes nothing.
        log::debug!("ignoring {command:?} during replay");
    }
}

/// Length of one synthetic drive cycle.
const DEMO_CYCLE_S: f32 = 100.;
/// Simulated time step per snapshot.
const DEMO_STEP_S: f32 = 0.05;

/// Synthetic drive used by the `demo` subcommand: accelerates, cruises
/// through a speed limit change, signals, and comes to a long stop, then
/// repeats. Deterministic so demo sessions are comparable.
pub struct DemoSnapshotProducer {
    frame_no: u64,
    time_s: f32,
    prev_v: f32,
    limit: f32,
    accepted_window: Option<u64>,
    camera: Option<ColorImage>,
}

impl DemoSnapshotProducer {
    pub fn new() -> Self {
        Self {
            frame_no: 0,
            time_s: 0.,
            prev_v: 0.,
            limit: 13.41, // 30 mph
            accepted_window: None,
            camera: None,
        }
    }

    fn cycle(&self) -> f32 {
        self.time_s.rem_euclid(DEMO_CYCLE_S)
    }

    fn window(&self) -> u64 {
        (self.time_s / DEMO_CYCLE_S) as u64
    }

    fn speed(&self) -> f32 {
        let c = self.cycle();
        if c < 10. {
            1.5 * c
        } else if c < 80. {
            15. + 2. * (TAU * (c - 10.) / 20.).sin()
        } else if c < 90. {
            15. * (1. - (c - 80.) / 10.)
        } else {
            0.
        }
    }

    fn pending_limit(&self) -> f32 {
        if self.limit < 15. { 20.12 } else { 13.41 }
    }

    /// A limit change is offered in the middle of every cruise phase until
    /// the driver accepts it.
    fn limit_pending(&self) -> bool {
        let c = self.cycle();
        (40. ..60.).contains(&c) && self.accepted_window != Some(self.window())
    }

    fn path(&self) -> Vec<PathPoint> {
        let accel = self.acceleration();
        (0..33)
            .map(|i| {
                let x = i as f32 * 3.;
                PathPoint {
                    x,
                    y: 1.5 * (self.time_s / 8. + x / 60.).sin(),
                    accel,
                }
            })
            .collect()
    }

    fn acceleration(&self) -> f32 {
        (self.speed() - self.prev_v) / DEMO_STEP_S
    }

    fn lane_line(&self, offset: f32) -> LanePolygon {
        LanePolygon {
            points: (0..33)
                .flat_map(|i| {
                    let x = i as f32 * 3.;
                    let y = offset + 1.5 * (self.time_s / 8. + x / 60.).sin();
                    [[x, y - 0.05], [x, y + 0.05]]
                })
                .collect(),
            prob: 0.9,
        }
    }
}

impl SnapshotProducer for DemoSnapshotProducer {
    fn start(&mut self) -> Result<(), HudError> {
        // 160x80 vertical sky-to-asphalt gradient standing in for a camera.
        let mut card = ColorImage::filled([160, 80], Color32::BLACK);
        for (i, pixel) in card.pixels.iter_mut().enumerate() {
            let y = (i / 160) as f32 / 80.;
            *pixel = Color32::from_rgb(
                (20. + 60. * y) as u8,
                (40. + 50. * y) as u8,
                (90. - 50. * y) as u8,
            );
        }
        self.camera = Some(card);
        Ok(())
    }

    fn snapshot(&mut self) -> Result<SnapshotOutput, HudError> {
        let c = self.cycle();
        let v = self.speed();
        let snapshot = Snapshot {
            frame_no: self.frame_no,
            controls_alive: true,
            status: if v > 0.1 || c >= 90. {
                Status::Engaged
            } else {
                Status::Disengaged
            },
            v_ego: v,
            v_cruise_kph: 72.,
            acceleration: self.acceleration(),
            standstill: v < 0.1 && c >= 90.,
            drive_time_s: self.time_s,
            speed_limit: self.limit,
            speed_limit_region: SpeedLimitRegion::Us,
            speed_limit_source: "Map Data".to_string(),
            speed_limit_offset: 0.,
            speed_limit_overridden: false,
            speed_limit_changed: self.limit_pending(),
            unconfirmed_speed_limit: self.pending_limit(),
            turn_signal_left: (20. ..26.).contains(&c),
            turn_signal_right: (50. ..56.).contains(&c),
            blind_spot_left: false,
            blind_spot_right: (52. ..54.).contains(&c),
            dm_active: c.rem_euclid(30.) < 25.,
            right_hand_drive: false,
            driver_pose: DriverPose {
                pitch_sin: 0.05 * (self.time_s / 3.).sin(),
                yaw_sin: 0.1 * (self.time_s / 5.).sin(),
                pitch_diff: 0.,
                yaw_diff: 0.,
            },
            experimental_mode: false,
            traffic_mode: false,
            road_name: if c < 50. {
                "Camino Del Rio".to_string()
            } else {
                "Harbor Drive".to_string()
            },
            path: self.path(),
            lane_lines: vec![self.lane_line(-1.8), self.lane_line(1.8)],
            road_edges: vec![self.lane_line(-3.6), self.lane_line(3.6)],
            lead_one: (30. ..70.).contains(&c).then(|| super::Lead {
                d_rel: 40. + 10. * (self.time_s / 7.).sin(),
                y_rel: 0.,
                v_rel: -1.,
                screen_x: 0.5,
                screen_y: 0.55,
            }),
            lead_two: None,
            lead_left: None,
            lead_right: None,
            radar_points: (30. ..70.).contains(&c)
                .then(|| {
                    (0..4)
                        .map(|i| PathPoint {
                            x: 25. + 12. * i as f32,
                            y: if i % 2 == 0 { -2.5 } else { 2.5 },
                            accel: 0.,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        };
        self.prev_v = v;
        self.frame_no += 1;
        self.time_s += DEMO_STEP_S;
        Ok(SnapshotOutput::DataPoint(Box::new(snapshot)))
    }

    fn camera_frame(&mut self) -> Option<ColorImage> {
        // The test card never changes, hand it out once.
        self.camera.take()
    }

    fn handle_command(&mut self, command: HudCommand) {
        match command {
            HudCommand::AcceptSpeedLimit => {
                if self.limit_pending() {
                    self.limit = self.pending_limit();
                    self.accepted_window = Some(self.window());
                }
            }
        }
    }
}

impl Default for DemoSnapshotProducer {
    fn default() -> Self {
        Self::new()
    }
}
