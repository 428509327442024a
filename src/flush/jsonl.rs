use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::model::World;

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Flush the world state to JSONL files in the given output directory.
///
/// Creates the output directory if it does not exist. Writes 6 files:
/// - `citizens.jsonl` — one Citizen per line
/// - `buildings.jsonl` — one Building per line
/// - `resource_stacks.jsonl` — one ResourceStack per line
/// - `activities.jsonl` — one Activity per line
/// - `contracts.jsonl` — one Contract per line
/// - `stratagems.jsonl` — one Stratagem per line
pub fn flush_to_jsonl(world: &World, output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    write_jsonl(&output_dir.join("citizens.jsonl"), world.citizens.values())?;
    write_jsonl(
        &output_dir.join("buildings.jsonl"),
        world.buildings.values(),
    )?;
    write_jsonl(
        &output_dir.join("resource_stacks.jsonl"),
        world.stacks.values(),
    )?;
    write_jsonl(
        &output_dir.join("activities.jsonl"),
        world.activities.values(),
    )?;
    write_jsonl(
        &output_dir.join("contracts.jsonl"),
        world.contracts.values(),
    )?;
    write_jsonl(
        &output_dir.join("stratagems.jsonl"),
        world.stratagems.values(),
    )?;

    Ok(())
}
