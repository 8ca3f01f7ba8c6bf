// Error types for roadhud

use crate::snapshot::SnapshotOutput;
use snafu::Snafu;
use std::{io, sync::mpsc::SendError};

#[derive(Debug, Snafu)]
pub enum HudError {
    // Errors for the snapshot feed
    #[snafu(display("Invalid snapshot file: {path}"))]
    InvalidSnapshotFile { path: String },
    #[snafu(display("Error loading snapshot file"))]
    SnapshotLoaderError { source: io::Error },
    #[snafu(display("Snapshot producer error"))]
    SnapshotProducerError { description: String },
    #[snafu(display("Error broadcasting snapshot"))]
    SnapshotBroadcastError {
        source: Box<SendError<SnapshotOutput>>,
    },

    // Errors for the debug telemetry writer
    #[snafu(display("Error writing debug telemetry file"))]
    WriterError { source: io::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Theme and sound errors
    #[snafu(display("Error scanning theme directory: {path}"))]
    ThemeScanError { path: String, source: io::Error },
    #[snafu(display("Error launching sound player"))]
    SoundPlayerError { source: io::Error },
}

impl From<SendError<SnapshotOutput>> for HudError {
    fn from(value: SendError<SnapshotOutput>) -> Self {
        HudError::SnapshotBroadcastError {
            source: Box::new(value),
        }
    }
}
