//! RGB565 Calibration Stream Generator
//!
//! Writes the same picture once per packing preset so the panel's real
//! channel order can be found by eye: load each `<preset>.rgb565` on the
//! device and keep the one whose colors look right.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use puzzle_prep::batch::load_frame;
use puzzle_prep::output::{ensure_dir, write_atomic};
use puzzle_prep::pipeline::encode_rgb;
use puzzle_rgb565::{stream_checksum, PANEL_SIZE, PRESETS};

#[derive(Parser)]
#[command(name = "rgb565_formats")]
#[command(about = "Write one packed stream per RGB565 preset for panel calibration")]
struct Cli {
    /// Source picture; resized to the panel size when needed
    input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "test_formats")]
    output: PathBuf,

    /// Side of the square frame in pixels
    #[arg(short, long, default_value_t = PANEL_SIZE)]
    size: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    ensure_dir(&cli.output).with_context(|| format!("Failed to create {:?}", cli.output))?;
    let (frame, _) = load_frame(&cli.input, cli.size)
        .with_context(|| format!("Failed to load {:?}", cli.input))?;

    println!("Generating {} calibration streams from {:?}", PRESETS.len(), cli.input);

    let mut written = Vec::new();
    for preset in PRESETS {
        let output = cli.output.join(format!("{}.rgb565", preset.name));
        let bytes = encode_rgb(&frame, &preset.layout)?;
        match write_atomic(&output, &bytes) {
            Ok(()) => {
                log::info!("Saved {:?} ({} bytes)", output, bytes.len());
                written.push((preset, stream_checksum(&bytes)));
            }
            Err(e) => log::error!("{}: {}", preset.name, e),
        }
    }

    if written.is_empty() {
        anyhow::bail!("no calibration streams were written");
    }

    println!();
    println!("Generated {} formats:", written.len());
    for (i, (preset, crc)) in written.iter().enumerate() {
        println!(
            "  {:2}. {:<16} {:<26} CRC 0x{:04X}  {}",
            i + 1,
            preset.name,
            preset.layout.to_string(),
            crc,
            preset.description
        );
    }
    println!();
    println!("Load each stream on the panel and keep the preset whose colors look right;");
    println!("then pass it with `puzzle-prep convert --layout <name>`.");
    Ok(())
}
