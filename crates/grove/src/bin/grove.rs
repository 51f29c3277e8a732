//! Command-line renderer for the Grove decorations.
//!
//! Renders the canvas effects to PNG and the corner vines to SVG, using the
//! same page orchestration as the browser build.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grove::procedural::Marginalia;
use grove::rendering::render_svg;
use grove::shared::{GroveSeed, Rect};
use grove::ui::ElementId;
use grove::{save_png, save_svg, selector, Grove, GroveConfig, MemoryPage};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "Render the Grove decorations to image files", long_about = None)]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); defaults are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured seed
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the brain cloud to PNG
    Cloud {
        /// Canvas width in CSS pixels
        #[arg(long, default_value_t = 800.0, value_parser = extent)]
        width: f32,

        /// Canvas height in CSS pixels
        #[arg(long, default_value_t = 600.0, value_parser = extent)]
        height: f32,

        /// Device pixel ratio
        #[arg(long, default_value_t = 1.0, value_parser = pixel_ratio)]
        dpr: f32,

        /// Time of the first frame (ms)
        #[arg(short, long, default_value_t = 0.0)]
        time: f64,

        /// Number of frames; more than one writes numbered files
        #[arg(short, long, default_value_t = 1)]
        frames: u32,

        /// Time between frames (ms)
        #[arg(long, default_value_t = 1000.0 / 60.0)]
        step: f64,

        /// Output file
        #[arg(short, long, default_value = "cloud.png")]
        output: PathBuf,
    },

    /// Render the constellation to PNG
    Constellation {
        /// Canvas width in CSS pixels
        #[arg(long, default_value_t = 800.0, value_parser = extent)]
        width: f32,

        /// Canvas height in CSS pixels
        #[arg(long, default_value_t = 600.0, value_parser = extent)]
        height: f32,

        /// Device pixel ratio
        #[arg(long, default_value_t = 1.0, value_parser = pixel_ratio)]
        dpr: f32,

        /// Time of the frame (ms)
        #[arg(short, long, default_value_t = 0.0)]
        time: f64,

        /// Output file
        #[arg(short, long, default_value = "constellation.png")]
        output: PathBuf,
    },

    /// Grow the corner vines and write them as SVG
    Marginalia {
        /// Page width in pixels
        #[arg(long, default_value_t = 1280.0, value_parser = extent)]
        width: f32,

        /// Page height in pixels
        #[arg(long, default_value_t = 800.0, value_parser = extent)]
        height: f32,

        /// Output file; standard output when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => GroveConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => GroveConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = GroveSeed::new(seed);
    }

    match cli.command {
        Commands::Cloud {
            width,
            height,
            dpr,
            time,
            frames,
            step,
            output,
        } => render_cloud(&config, width, height, dpr, time, frames, step, &output),
        Commands::Constellation {
            width,
            height,
            dpr,
            time,
            output,
        } => render_constellation(&config, width, height, dpr, time, &output),
        Commands::Marginalia {
            width,
            height,
            output,
        } => render_marginalia(&config, width, height, output.as_deref()),
        Commands::Config => {
            let text = config
                .to_toml_string()
                .context("Failed to serialize configuration")?;
            print!("{text}");
            Ok(())
        }
    }
}

/// Largest accepted width or height, in CSS pixels.
const MAX_EXTENT: f32 = 8_192.0;

/// Largest accepted device pixel ratio.
const MAX_PIXEL_RATIO: f32 = 4.0;

fn bounded(s: &str, max: f32) -> Result<f32, String> {
    let value: f32 = s.parse::<f32>().map_err(|e| e.to_string())?;
    if value > 0.0 && value <= max {
        Ok(value)
    } else {
        Err(format!("must be greater than 0 and at most {max}"))
    }
}

fn extent(s: &str) -> Result<f32, String> {
    bounded(s, MAX_EXTENT)
}

fn pixel_ratio(s: &str) -> Result<f32, String> {
    bounded(s, MAX_PIXEL_RATIO)
}

/// Page holding a single canvas of the given class.
fn canvas_page(class: &str, width: f32, height: f32, dpr: f32) -> (MemoryPage, ElementId) {
    let mut page = MemoryPage::new(width, height).with_device_pixel_ratio(dpr);
    let el = page.add(&[class], Rect::new(0.0, 0.0, width, height));
    (page, el)
}

#[allow(clippy::too_many_arguments)]
fn render_cloud(
    config: &GroveConfig,
    width: f32,
    height: f32,
    dpr: f32,
    time: f64,
    frames: u32,
    step: f64,
    output: &Path,
) -> Result<()> {
    let (mut page, el) = canvas_page(selector::CLOUD, width, height, dpr);
    let mut grove = Grove::init(&mut page, config).context("Failed to generate the brain cloud")?;

    for frame in 0..frames.max(1) {
        let t = time + f64::from(frame) * step;
        let report = grove.frame(&mut page, t);
        let path = if frames > 1 {
            numbered(output, frame)
        } else {
            output.to_path_buf()
        };
        let canvas = page.canvas(el).context("Cloud canvas was never drawn")?;
        save_png(canvas, &path).with_context(|| format!("Failed to write {}", path.display()))?;
        if let Some(stats) = report.cloud {
            info!(
                frame,
                t,
                particles = stats.particles,
                links = stats.links,
                path = %path.display(),
                "Cloud frame written"
            );
        }
    }
    Ok(())
}

fn render_constellation(
    config: &GroveConfig,
    width: f32,
    height: f32,
    dpr: f32,
    time: f64,
    output: &Path,
) -> Result<()> {
    let (mut page, el) = canvas_page(selector::CONSTELLATION, width, height, dpr);
    let mut grove = Grove::init(&mut page, config).context("Failed to attach the constellation")?;
    let report = grove.frame(&mut page, time);
    let canvas = page.canvas(el).context("Constellation canvas was never drawn")?;
    save_png(canvas, output).with_context(|| format!("Failed to write {}", output.display()))?;
    if let Some(stats) = report.constellation {
        info!(stars = stats.stars, links = stats.links, "Constellation written");
    }
    Ok(())
}

fn render_marginalia(
    config: &GroveConfig,
    width: f32,
    height: f32,
    output: Option<&Path>,
) -> Result<()> {
    let vines = Marginalia::grow(config.seed, width, height, &config.marginalia.growth)
        .context("Failed to grow marginalia")?;
    let svg = render_svg(&vines, &config.marginalia.svg);
    match output {
        Some(path) => {
            save_svg(&svg, path).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(branches = vines.branch_count(), path = %path.display(), "Marginalia written");
        }
        None => print!("{svg}"),
    }
    Ok(())
}

/// `out.png` becomes `out-0003.png`.
fn numbered(path: &Path, frame: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(|| "frame".into(), |s| s.to_string_lossy().into_owned());
    let ext = path
        .extension()
        .map_or_else(|| "png".into(), |e| e.to_string_lossy().into_owned());
    path.with_file_name(format!("{stem}-{frame:04}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_bounds() {
        assert_eq!(extent("640"), Ok(640.0));
        assert!(extent("0").is_err());
        assert!(extent("-5").is_err());
        assert!(extent("1e9").is_err());
        assert!(extent("NaN").is_err());
        assert!(extent("wide").is_err());
    }

    #[test]
    fn test_pixel_ratio_bounds() {
        assert_eq!(pixel_ratio("2"), Ok(2.0));
        assert!(pixel_ratio("100000").is_err());
    }

    #[test]
    fn test_cli_rejects_oversized_canvas() {
        let parsed = Cli::try_parse_from(["grove", "cloud", "--width", "100000000"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from(["grove", "cloud", "--width", "640", "--dpr", "2"]);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_numbered_frames() {
        let path = numbered(Path::new("out/cloud.png"), 3);
        assert_eq!(path, PathBuf::from("out/cloud-0003.png"));
    }
}
