use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::ecs::resources::{EventLog, SettlementRegistry};

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Export the chronicle for offline inspection. Writes 2 files into `output_dir`:
/// - `events.jsonl`: one Event per line, participants inline
/// - `settlements.jsonl`: one Settlement per line, as of the export
pub fn export_chronicle(
    log: &EventLog,
    registry: &SettlementRegistry,
    output_dir: &Path,
) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;
    write_jsonl(&output_dir.join("events.jsonl"), log.events.iter())?;
    write_jsonl(&output_dir.join("settlements.jsonl"), registry.all())?;
    Ok(())
}
