use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    sync::mpsc::Receiver,
};

use crate::{HudError, snapshot::UiDebug};

/// Drain the debug telemetry channel into a jsonl file, one record per
/// paint cycle. Runs until the HUD side hangs up.
pub fn write_debug(file: &PathBuf, debug_receiver: Receiver<UiDebug>) -> Result<(), HudError> {
    let debug_file = File::create(file).map_err(|e| HudError::WriterError { source: e })?;
    let mut debug_file_writer = BufWriter::new(debug_file);
    for record in &debug_receiver {
        match serde_json::to_string(&record) {
            Ok(line) => {
                let _ = writeln!(debug_file_writer, "{line}").map_err(|e| {
                    println!("Error while writing debug record to output file: {}", e);
                });
            }
            Err(e) => println!("Error serializing debug record: {}", e),
        }
    }
    debug_file_writer
        .flush()
        .map_err(|e| HudError::WriterError { source: e })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_writes_one_line_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("debug.jsonl");
        let (sender, receiver) = channel();
        for frame_no in 0..3u64 {
            sender
                .send(UiDebug {
                    frame_no,
                    draw_time_ms: 1.5,
                    fps: 20.,
                })
                .unwrap();
        }
        drop(sender);
        write_debug(&path, receiver).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        let first: UiDebug = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.frame_no, 0);
        assert_eq!(first.fps, 20.);
    }
}
