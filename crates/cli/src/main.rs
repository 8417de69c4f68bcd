#![deny(unsafe_code)]
//! Headless CLI for the glyphfield particle engine.
//!
//! Subcommands:
//! - `render <mode>`: run a scene for N frames with synthetic input, write PNG
//! - `list`: print available modes
//! - `config <mode>`: print a mode's default configuration as JSON

mod driver;
mod error;

use clap::{Parser, Subcommand};
use driver::{drive, merge_params, DrivePlan, PointerPath, ResizeAt};
use error::CliError;
use glyphfield_core::{QueuedScheduler, RenderLoop};
use glyphfield_render::SceneKind;
use serde_json::Value;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "glyphfield", about = "Interactive particle field renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scene for N frames and write a PNG snapshot of the last one.
    Render {
        /// Scene mode ("text" or "cloud").
        mode: String,

        /// TrueType font used to sample and draw text.
        #[arg(long)]
        font: Option<PathBuf>,

        /// Text to sample (text mode).
        #[arg(long)]
        text: Option<String>,

        /// Font size in pixels used for sampling (text mode).
        #[arg(long)]
        font_size: Option<f64>,

        /// Asset images drawn as singleton points (cloud mode).
        #[arg(long, num_args = 1..)]
        assets: Vec<String>,

        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 640)]
        width: usize,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 360)]
        height: usize,

        /// Number of frames to run.
        #[arg(short, long, default_value_t = 240)]
        frames: u64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Synthetic pointer motion.
        #[arg(long, value_enum, default_value_t = PointerPath::Sweep)]
        pointer: PointerPath,

        /// Resize the surface before a frame, as WIDTHxHEIGHT@FRAME.
        #[arg(long)]
        resize_at: Option<ResizeAt>,

        /// JSON configuration file; --params and explicit flags override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Configuration overrides as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// List available scene modes.
    List,
    /// Print the default configuration of a mode.
    Config {
        /// Scene mode ("text" or "cloud").
        mode: String,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glyphfield=info,glyphfield_core=info,glyphfield_render=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_json(source: &str, what: &str) -> Result<Value, CliError> {
    serde_json::from_str(source).map_err(|e| CliError::Input(format!("invalid {what} JSON: {e}")))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let modes = SceneKind::list_modes();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "modes": modes }))?);
            } else {
                println!("Modes:");
                for name in modes {
                    println!("  {name}");
                }
            }
        }
        Command::Config { mode } => {
            let defaults = SceneKind::default_params(&mode)?;
            println!("{}", serde_json::to_string_pretty(&defaults)?);
        }
        Command::Render {
            mode,
            font,
            text,
            font_size,
            assets,
            width,
            height,
            frames,
            seed,
            pointer,
            resize_at,
            config,
            params,
            output,
        } => {
            let mut merged = Value::Object(Default::default());
            if let Some(path) = &config {
                let source = std::fs::read_to_string(path)
                    .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
                merged = merge_params(merged, parse_json(&source, "config file")?);
            }
            merged = merge_params(merged, parse_json(&params, "--params")?);
            let mut flags = serde_json::Map::new();
            if let Some(text) = text {
                flags.insert("text".into(), text.into());
            }
            if let Some(size) = font_size {
                flags.insert("font_size".into(), size.into());
            }
            if !assets.is_empty() {
                flags.insert("assets".into(), assets.into());
            }
            merged = merge_params(merged, Value::Object(flags));

            tracing::debug!(%merged, "effective overrides");
            let scene = SceneKind::from_name(&mode, seed, &merged, font.as_deref())?;
            let mut lp = RenderLoop::new(scene, QueuedScheduler::new());
            let plan = DrivePlan {
                frames,
                width,
                height,
                pointer,
                resize_at,
            };
            let summary = drive(&mut lp, &plan);
            tracing::info!(path = %output.display(), "writing snapshot");
            let written = glyphfield_render::snapshot::write_png(lp.scene().pixels(), &output);
            lp.stop();
            written?;

            if cli.json {
                let info = serde_json::json!({
                    "mode": mode,
                    "width": summary.width,
                    "height": summary.height,
                    "frames": summary.frames,
                    "particles": summary.particles,
                    "seed": seed,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {mode} ({}x{}, {} frames, {} particles, seed {seed}) -> {}",
                    summary.width,
                    summary.height,
                    summary.frames,
                    summary.particles,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
