use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::HudError;

use super::{HudCommand, SharedCameraFrame, SnapshotOutput, producer::SnapshotProducer};

/// Drive a snapshot producer on its own thread: forward HUD commands down,
/// publish snapshots up, and keep the shared camera frame slot fresh.
/// Returns when the UI side hangs up.
pub fn collect_snapshots(
    mut producer: impl SnapshotProducer,
    snapshot_sender: Sender<SnapshotOutput>,
    camera_frame: SharedCameraFrame,
    commands: Receiver<HudCommand>,
    refresh_rate_ms: u64,
) -> Result<(), HudError> {
    producer.start()?;

    loop {
        thread::sleep(Duration::from_millis(refresh_rate_ms));

        loop {
            match commands.try_recv() {
                Ok(command) => producer.handle_command(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        let message = producer.snapshot()?;
        snapshot_sender.send(message).map_err(|e| {
            log::info!("snapshot channel closed, stopping collector: {e}");
            HudError::from(e)
        })?;

        if let Some(frame) = producer.camera_frame() {
            if let Ok(mut slot) = camera_frame.lock() {
                *slot = Some(frame);
            }
        }
    }
}
