use std::{
    path::PathBuf,
    sync::{Arc, Mutex, mpsc},
    thread,
};

use clap::{Parser, Subcommand};
use egui::Vec2;

use roadhud::{
    HudError,
    snapshot::{
        SharedCameraFrame, collect_snapshots,
        producer::{DemoSnapshotProducer, ReplaySnapshotProducer, SnapshotProducer},
    },
    ui::{HudApp, config::AppConfig},
    writer,
};

const ASSETS_ROOT: &str = "assets/themes";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded drive from a jsonl snapshot file
    Replay {
        #[arg(short, long)]
        input: PathBuf,

        /// Write per-paint debug telemetry to this jsonl file
        #[arg(short, long)]
        debug_output: Option<PathBuf>,
    },
    /// Run a synthetic drive cycle
    Demo {
        #[arg(short, long)]
        debug_output: Option<PathBuf>,
    },
}

fn run(
    producer: impl SnapshotProducer + Send + 'static,
    debug_output: Option<PathBuf>,
) -> Result<(), HudError> {
    let app_config = AppConfig::from_local_file().unwrap_or_default();

    let (snapshot_tx, snapshot_rx) = mpsc::channel();
    let (command_tx, command_rx) = mpsc::channel();
    let camera_frame: SharedCameraFrame = Arc::new(Mutex::new(None));

    let refresh_rate_ms = app_config.refresh_rate_ms;
    let collector_camera = camera_frame.clone();
    thread::spawn(move || {
        if let Err(e) = collect_snapshots(
            producer,
            snapshot_tx,
            collector_camera,
            command_rx,
            refresh_rate_ms,
        ) {
            log::error!("Snapshot collector stopped: {e}");
        }
    });

    let debug_tx = debug_output.map(|output_file| {
        let (debug_tx, debug_rx) = mpsc::channel();
        thread::spawn(move || writer::write_debug(&output_file, debug_rx));
        debug_tx
    });

    let window_position = app_config.window_position;
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_decorations(false)
        .with_inner_size(Vec2::new(1280., 720.))
        .with_position(window_position);

    eframe::run_native(
        "roadhud",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(HudApp::new(
                snapshot_rx,
                command_tx,
                debug_tx,
                camera_frame,
                app_config,
                PathBuf::from(ASSETS_ROOT),
                cc,
            )))
        }),
    )
    .expect("could not start app");
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");

    match cli.command {
        Commands::Replay {
            input,
            debug_output,
        } => {
            if !input.exists() {
                eprintln!("Snapshot file not found: {}", input.display());
                std::process::exit(1);
            }
            run(ReplaySnapshotProducer::new(input), debug_output)
                .expect("Error while replaying snapshot file");
        }
        Commands::Demo { debug_output } => {
            run(DemoSnapshotProducer::new(), debug_output).expect("Error while running demo");
        }
    };
}
