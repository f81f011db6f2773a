use std::env;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use spectacle::session::{self, Session};
use spectacle::{config, source, Compositor, FrameSize};
use spectacle_vision::source::{JsonLinesSource, LandmarkSource};
use spectacle_vision::video::Camera;

#[derive(Parser)]
#[command(name = "spectacle")]
#[command(version, about = "Virtual eyeglasses try-on over a mirrored camera view")]
struct Cli {
    /// Config file (defaults to the system-wide one)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overlay glasses on live camera frames
    Run {
        /// Detector results, one JSON object per line ("-" for stdin)
        #[arg(short, long)]
        landmarks: String,
        /// Overlay image (overrides config)
        #[arg(long)]
        overlay: Option<PathBuf>,
        /// Directory the rendered frames are written to
        #[arg(short, long, default_value = "frames")]
        out: PathBuf,
        /// Stop after this many frames
        #[arg(long)]
        frames: Option<usize>,
    },
    /// Overlay glasses on a still image
    Render {
        #[arg(short, long)]
        image: PathBuf,
        /// Detector result for the image (JSON)
        #[arg(short, long)]
        landmarks: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long)]
        overlay: Option<PathBuf>,
    },
    /// Print the overlay placement for a detector result as JSON
    Place {
        #[arg(short, long)]
        landmarks: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            landmarks,
            overlay,
            out,
            frames,
        } => run(&cfg, &landmarks, overlay.as_deref(), &out, frames),
        Commands::Render {
            image,
            landmarks,
            out,
            overlay,
        } => render(&cfg, &image, &landmarks, &out, overlay.as_deref()),
        Commands::Place {
            landmarks,
            width,
            height,
        } => place(&cfg, &landmarks, FrameSize::new(width, height)),
        Commands::Config => open_config(cli.config.as_deref()),
    }
}

fn load_compositor(cfg: &config::Config, overlay: Option<&Path>) -> Result<Compositor> {
    let path = overlay.unwrap_or(&cfg.overlay);
    Compositor::load(path).with_context(|| format!("loading overlay {}", path.display()))
}

fn run(
    cfg: &config::Config,
    landmarks: &str,
    overlay: Option<&Path>,
    out: &Path,
    frames: Option<usize>,
) -> Result<()> {
    let mut renderer = Session::new(cfg, load_compositor(cfg, overlay)?);

    let mut source: Box<dyn LandmarkSource> = if landmarks == "-" {
        Box::new(JsonLinesSource::new(io::stdin().lock()))
    } else {
        Box::new(
            JsonLinesSource::open(Path::new(landmarks))
                .with_context(|| format!("opening detector results {}", landmarks))?,
        )
    };

    info!("Opening camera: {}", cfg.camera);
    let mut camera = match Camera::open(&cfg.camera) {
        Ok(camera) => camera,
        Err(e) => {
            error!("Camera start failed: {:#}", e);
            anyhow::bail!("Camera access is required. Check the device permissions.");
        }
    };

    let written = session::run(&mut renderer, &mut camera, &mut source, out, frames)?;
    info!("✓ Wrote {} frame(s) to {}", written, out.display());
    Ok(())
}

fn render(
    cfg: &config::Config,
    image_path: &Path,
    landmarks: &Path,
    out: &Path,
    overlay: Option<&Path>,
) -> Result<()> {
    let mut renderer = Session::new(cfg, load_compositor(cfg, overlay)?);
    let results = source::load_results(landmarks)
        .with_context(|| format!("loading detector result {}", landmarks.display()))?;

    let mut frame = image::open(image_path)
        .with_context(|| format!("opening {}", image_path.display()))?
        .to_rgb8();

    match renderer.process(&mut frame, &results) {
        Some(update) if update.placement.visible => info!("Placed overlay: {:?}", update.placement),
        Some(_) => info!("No face in result, overlay hidden"),
        None => anyhow::bail!("Image {} is empty", image_path.display()),
    }

    frame
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    info!("✓ Saved {}", out.display());
    Ok(())
}

fn place(cfg: &config::Config, landmarks: &Path, frame: FrameSize) -> Result<()> {
    let results = source::load_results(landmarks)
        .with_context(|| format!("loading detector result {}", landmarks.display()))?;
    let placement = session::place(&results, frame, cfg.fit_params());
    println!("{}", serde_json::to_string_pretty(&placement)?);
    Ok(())
}

fn open_config(path: Option<&Path>) -> Result<()> {
    let config_path = path.unwrap_or(&config::CONFIG_PATH);
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    if !config_path.exists() {
        config::save_config(&config::Config::default(), Some(config_path))
            .context("Failed to write default config")?;
    }

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
