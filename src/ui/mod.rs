use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, SystemTime};

use egui::{Color32, TextureHandle, Visuals, style::Widgets};
use log::{error, warn};
use simple_moving_average::{SMA, SumTreeSMA};

use crate::hud::animation::{PendingLimitTimer, StandstillTimer, TurnSignalAnimation};
use crate::hud::reducer::DisplayState;
use crate::hud::{StyleTable, path};
use crate::snapshot::{HudCommand, SharedCameraFrame, Snapshot, SnapshotOutput, UiDebug};
use crate::sound::SoundPlayer;
use crate::theme::{SpriteSet, SpriteStyle, ThemeAssets};

pub mod config;
mod hud_view;

use config::AppConfig;

const MAX_POINTS_PER_REFRESH: usize = 10;
const MAX_TIME_PER_REFRESH_MS: u128 = 50;

/// Upload a new camera texture at most every N paints.
const CAMERA_SKIP_FRAMES: u64 = 5;

const FPS_WINDOW: usize = 30;
const LOW_FPS_THRESHOLD: f32 = 15.;

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);

/// The on-road HUD application. Consumes the snapshot channel, reduces each
/// snapshot to display state, and repaints the full scene every frame.
pub struct HudApp {
    snapshot_receiver: Receiver<SnapshotOutput>,
    command_sender: Sender<HudCommand>,
    debug_sender: Option<Sender<UiDebug>>,
    camera_frame: SharedCameraFrame,
    app_config: AppConfig,
    style: StyleTable,

    display: DisplayState,
    /// Last raw snapshot, kept for the scene geometry the display state
    /// does not carry (path, lanes, leads)
    latest: Option<Box<Snapshot>>,

    signal_animation: TurnSignalAnimation,
    standstill_timer: StandstillTimer,
    pending_timer: PendingLimitTimer,
    /// Time the current speed-limit change has been awaiting confirmation
    pending_for: Duration,
    sounds: SoundPlayer,
    sprites: Option<SpriteSet>,
    /// Frame index into the active sprite set, `None` while signals are idle
    signal_frame: Option<usize>,
    rainbow_phase: f32,

    camera_texture: Option<TextureHandle>,
    paints_since_upload: u64,

    started_at: SystemTime,
    last_update: SystemTime,
    fps_filter: SumTreeSMA<f32, f32, FPS_WINDOW>,
    low_fps_reported: bool,
    paint_no: u64,
}

impl HudApp {
    pub fn new(
        snapshot_receiver: Receiver<SnapshotOutput>,
        command_sender: Sender<HudCommand>,
        debug_sender: Option<Sender<UiDebug>>,
        camera_frame: SharedCameraFrame,
        app_config: AppConfig,
        assets_root: PathBuf,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: true,
            panel_fill: PALETTE_BLACK,
            widgets: Widgets::dark(),
            striped: false,
            ..Default::default()
        };
        cc.egui_ctx.set_visuals(default_visuals);

        let assets = ThemeAssets::new(assets_root, app_config.theme.clone());
        let sprites = match assets.signal_sprites() {
            Ok(sprites) => sprites,
            Err(e) => {
                error!("Error scanning turn signal sprites: {e}");
                None
            }
        };
        let sounds = SoundPlayer::new(assets);

        Self {
            snapshot_receiver,
            command_sender,
            debug_sender,
            camera_frame,
            app_config,
            style: StyleTable::default(),
            display: DisplayState::default(),
            latest: None,
            signal_animation: TurnSignalAnimation::new(),
            standstill_timer: StandstillTimer::new(),
            pending_timer: PendingLimitTimer::new(),
            pending_for: Duration::ZERO,
            sounds,
            sprites,
            signal_frame: None,
            rainbow_phase: 0.,
            camera_texture: None,
            paints_since_upload: 0,
            started_at: SystemTime::now(),
            last_update: SystemTime::now(),
            fps_filter: SumTreeSMA::new(),
            low_fps_reported: false,
            paint_no: 0,
        }
    }

    fn reset_session(&mut self) {
        self.display = DisplayState::default();
        self.latest = None;
        self.signal_animation = TurnSignalAnimation::new();
        self.standstill_timer = StandstillTimer::new();
        self.pending_timer = PendingLimitTimer::new();
        self.pending_for = Duration::ZERO;
        self.signal_frame = None;
        self.rainbow_phase = 0.;
        self.camera_texture = None;
    }

    fn elapsed(&self) -> Duration {
        self.started_at.elapsed().unwrap_or_default()
    }

    fn track_frame_rate(&mut self) {
        let dt = self.last_update.elapsed().unwrap_or_default();
        self.last_update = SystemTime::now();
        if dt > Duration::ZERO {
            self.fps_filter.add_sample(1. / dt.as_secs_f32());
        }
        let fps = self.fps_filter.get_average();
        if fps > 0. && fps < LOW_FPS_THRESHOLD {
            if !self.low_fps_reported {
                warn!("HUD frame rate dropped to {fps:.1} fps");
                self.low_fps_reported = true;
            }
        } else {
            self.low_fps_reported = false;
        }
    }

    fn drain_snapshots(&mut self) {
        let start_refresh = SystemTime::now();
        let mut points_processed = 0;
        while let Ok(output) = self.snapshot_receiver.try_recv() {
            match output {
                SnapshotOutput::DataPoint(point) => {
                    self.display =
                        DisplayState::reduce(&self.display, &point, &self.app_config.toggles);
                    self.latest = Some(point);
                    points_processed += 1;
                    if points_processed > MAX_POINTS_PER_REFRESH
                        || start_refresh.elapsed().unwrap_or_default().as_millis()
                            >= MAX_TIME_PER_REFRESH_MS
                    {
                        break;
                    }
                }
                SnapshotOutput::SessionRestart => self.reset_session(),
            }
        }
    }

    fn advance_animations(&mut self) {
        let now = self.elapsed();

        let drive_time = self.latest.as_ref().map_or(0., |s| s.drive_time_s);
        self.display.standstill_secs = self
            .standstill_timer
            .tick(self.display.standstill, drive_time, now)
            .map_or(0., |d| d.as_secs_f32());

        self.pending_for = self
            .pending_timer
            .tick(self.display.speed_limit_changed, now)
            .unwrap_or_default();

        let signal_active = self.display.turn_signal_left || self.display.turn_signal_right;
        self.signal_frame = match &self.sprites {
            Some(sprites) => {
                let blind_spot = (self.display.turn_signal_left && self.display.blind_spot_left)
                    || (self.display.turn_signal_right && self.display.blind_spot_right);
                let frames = sprites.frames_for(blind_spot).len();
                let frame =
                    self.signal_animation
                        .tick(signal_active, frames, sprites.interval, now);
                match sprites.style {
                    SpriteStyle::Static => frame.map(|_| 0),
                    SpriteStyle::Animated => frame,
                }
            }
            None => None,
        };

        self.rainbow_phase = path::advance_rainbow_phase(self.rainbow_phase, self.display.v_ego);
    }

    fn play_status_sounds(&mut self, previous: &DisplayState) {
        use crate::hud::Status;
        if previous.status == self.display.status {
            return;
        }
        let alert = match self.display.status {
            Status::Disengaged => "disengage",
            _ if previous.status == Status::Disengaged => "engage",
            _ => return,
        };
        let volume = self.app_config.volume_for(alert).clamp(0, 100) as u8;
        if let Err(e) = self.sounds.play(alert, volume) {
            error!("Error playing {alert} sound: {e}");
        }
    }

    fn publish_debug(&mut self, draw_time: Duration) {
        let Some(sender) = &self.debug_sender else {
            return;
        };
        let record = UiDebug {
            frame_no: self.latest.as_ref().map_or(0, |s| s.frame_no),
            draw_time_ms: draw_time.as_secs_f32() * 1000.,
            fps: self.fps_filter.get_average(),
        };
        if sender.send(record).is_err() {
            // Writer thread is gone; stop publishing.
            self.debug_sender = None;
        }
    }
}

impl eframe::App for HudApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.app_config.save() {
            error!("Error while saving config file: {e}");
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui_extras::install_image_loaders(ctx);

        self.track_frame_rate();

        let before_drain = self.display.clone();
        self.drain_snapshots();
        self.advance_animations();
        self.play_status_sounds(&before_drain);

        let paint_start = SystemTime::now();
        self.hud_view(ctx);
        self.paint_no += 1;
        self.publish_debug(paint_start.elapsed().unwrap_or_default());

        ctx.request_repaint();
    }
}
