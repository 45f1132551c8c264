use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use puzzle_rgb565::{stream_len, Channel, PackLayout, PRESETS};

use puzzle_prep::batch::{convert_set, BatchOptions, BatchSet, Manifest, SetReport};
use puzzle_prep::header::HeaderFormat;
use puzzle_prep::pipeline::{process_image, PrepareOptions, DEFAULT_GRID, DEFAULT_SIZE, DEFAULT_THRESHOLD};
use puzzle_prep::samples::write_samples;
use puzzle_prep::tiles::{TileGrid, DEFAULT_GAP, GRID_CHOICES};

#[derive(Parser)]
#[command(name = "puzzle-prep")]
#[command(about = "Prepare images for the 480x480 sliding puzzle")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trim, square and slice one image
    Prepare {
        /// Input image (PNG, JPEG, BMP, ...)
        input: PathBuf,
        /// Base name for generated files (defaults to the input file stem)
        name: Option<String>,
        /// Output directory
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
        /// Side of the square output in pixels
        #[arg(short, long, default_value_t = DEFAULT_SIZE)]
        size: u32,
        /// Puzzle grid size (3, 4, 5 or 6)
        #[arg(short, long, value_parser = parse_tiles, default_value_t = DEFAULT_GRID)]
        tiles: u32,
        /// Gap between preview tiles in pixels
        #[arg(long, default_value_t = DEFAULT_GAP)]
        gap: u32,
        /// Border uniformity threshold (0-255)
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u8,
        /// Skip the tile preview
        #[arg(long)]
        no_preview: bool,
        /// Also emit a C header
        #[arg(long)]
        header: bool,
        /// Header pixel format (rgb565 or rgb888)
        #[arg(short, long, default_value = "rgb565")]
        format: String,
        /// Packing preset or field list, e.g. `bgr565` or `r5@11,g6@5,b5@0,swap`
        #[arg(short, long, value_parser = parse_layout, default_value = "rgb565")]
        layout: PackLayout,
        /// Also emit a raw packed stream
        #[arg(short, long)]
        binary: bool,
    },
    /// Convert directories of square images into raw packed streams
    Convert {
        /// Input directory
        #[arg(short, long, requires = "output", required_unless_present = "manifest")]
        input: Option<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// JSON manifest listing several input/output sets
        #[arg(short, long, conflicts_with = "input")]
        manifest: Option<PathBuf>,
        /// Expected image side; other sizes are resized
        #[arg(short, long)]
        size: Option<u32>,
        /// Packing preset or field list
        #[arg(short, long, value_parser = parse_layout)]
        layout: Option<PackLayout>,
    },
    /// Write synthetic test images
    Samples {
        /// Output directory
        #[arg(short, long, default_value = "test_images")]
        output: PathBuf,
    },
    /// List the packing presets
    Layouts,
}

fn parse_tiles(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|e| format!("{}", e))?;
    if GRID_CHOICES.contains(&n) {
        Ok(n)
    } else {
        Err(format!("grid size must be one of {:?}", GRID_CHOICES))
    }
}

fn parse_layout(s: &str) -> Result<PackLayout, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare {
            input,
            name,
            output_dir,
            size,
            tiles,
            gap,
            threshold,
            no_preview,
            header,
            format,
            layout,
            binary,
        } => {
            let format = format.parse::<HeaderFormat>()?;
            if layout != PackLayout::RGB565 && !binary && !(header && format.uses_layout()) {
                log::warn!(
                    "--layout {} has no effect without --binary or an rgb565 --header",
                    layout
                );
            }
            let format = format.with_layout(layout);
            let options = PrepareOptions {
                output_dir,
                output_name: name,
                target_size: size,
                grid_size: tiles,
                gap,
                border_threshold: threshold,
                preview: !no_preview,
                header: header.then_some(format),
                stream: binary.then_some(layout),
            };
            run_prepare(&input, &options)?;
        }

        Commands::Convert {
            input,
            output,
            manifest,
            size,
            layout,
        } => {
            let (sets, mut options) = match (manifest, input, output) {
                (Some(path), _, _) => {
                    let manifest = Manifest::load(&path)
                        .with_context(|| format!("Failed to load manifest {:?}", path))?;
                    let options = manifest.options()?;
                    (manifest.sets, options)
                }
                (None, Some(input), Some(output)) => {
                    let set = BatchSet {
                        name: "images".to_string(),
                        input,
                        output,
                        grid: None,
                    };
                    (vec![set], BatchOptions::default())
                }
                _ => bail!("either --manifest or both --input and --output are required"),
            };
            if let Some(size) = size {
                if size == 0 {
                    bail!("--size must be positive");
                }
                options.size = size;
            }
            if let Some(layout) = layout {
                options.layout = layout;
            }
            run_convert(&sets, &options)?;
        }

        Commands::Samples { output } => {
            let written = write_samples(&output)
                .with_context(|| format!("Failed to write samples to {:?}", output))?;
            println!("✅ {} test images created in {:?}", written.len(), output);
            for path in written {
                println!("  puzzle-prep prepare {}", path.display());
            }
        }

        Commands::Layouts => {
            println!("{:<16} {:<26} {:>6} {:>6} {:>6}  description", "name", "fields", "red", "green", "blue");
            for preset in PRESETS {
                let layout = preset.layout;
                println!(
                    "{:<16} {:<26} 0x{:04X} 0x{:04X} 0x{:04X}  {}",
                    preset.name,
                    layout.to_string(),
                    layout.encode(primary(Channel::Red)),
                    layout.encode(primary(Channel::Green)),
                    layout.encode(primary(Channel::Blue)),
                    preset.description
                );
            }
        }
    }

    Ok(())
}

fn primary(channel: Channel) -> [u8; 3] {
    let mut rgb = [0u8; 3];
    rgb[channel.index()] = 0xFF;
    rgb
}

fn run_prepare(input: &std::path::Path, options: &PrepareOptions) -> Result<()> {
    let result = process_image(input, options)
        .with_context(|| format!("Failed to prepare {:?}", input))?;
    if result.is_empty() {
        bail!("no artifacts were produced for {:?}", input);
    }

    let grid = TileGrid::new(options.target_size, options.grid_size, options.gap)?;
    let border = result.border;

    println!();
    println!("✅ Prepared {}", input.display());
    if border.is_empty() {
        println!("  Border: none detected");
    } else {
        println!(
            "  Border: top {}, bottom {}, left {}, right {}",
            border.top, border.bottom, border.left, border.right
        );
    }
    println!("  Final size: {}x{}", options.target_size, options.target_size);
    println!(
        "  Grid: {}x{}, tile size {}x{}",
        options.grid_size,
        options.grid_size,
        grid.tile_size(),
        grid.tile_size()
    );
    println!("  Generated files:");
    for (kind, path) in result.artifacts() {
        println!("    {:<8} {}", kind, path.display());
    }
    if let Some(crc) = result.stream_crc {
        println!("  Stream CRC-16: 0x{:04X}", crc);
    }
    Ok(())
}

fn run_convert(sets: &[BatchSet], options: &BatchOptions) -> Result<()> {
    let started = Instant::now();
    println!(
        "Converting to {}x{} packed streams, layout {}",
        options.size, options.size, options.layout
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?,
    );

    let mut reports: Vec<SetReport> = Vec::new();
    for set in sets {
        match convert_set(set, options, &pb) {
            Ok(report) => reports.push(report),
            Err(e) => log::error!("Skipping set {}: {}", set.name, e),
        }
    }
    pb.finish_and_clear();

    let mut converted = 0;
    let mut failed = 0;
    for report in &reports {
        println!();
        match report.grid {
            Some(grid) => println!("{} ({}x{}):", report.name, grid, grid),
            None => println!("{}:", report.name),
        }
        for file in &report.converted {
            let name = file
                .input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!(
                "  {:<32} {:>9} -> {:>9} bytes ({:+.1}% saved), CRC 0x{:04X}{}",
                name,
                file.input_bytes,
                file.output_bytes,
                file.saved_percent(),
                file.crc,
                if file.resized { " [resized]" } else { "" }
            );
        }
        for (path, e) in &report.failed {
            println!("  ❌ {}: {}", path.display(), e);
        }
        converted += report.converted.len();
        failed += report.failed.len();
    }

    let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
    println!();
    println!(
        "Converted {} image(s), {} failed, in {}",
        converted,
        failed,
        humantime::format_duration(elapsed)
    );
    println!(
        "Each stream is {} bytes ({}x{} x 2)",
        stream_len(options.size, options.size),
        options.size,
        options.size
    );

    if converted == 0 {
        bail!("no images were converted");
    }
    Ok(())
}
