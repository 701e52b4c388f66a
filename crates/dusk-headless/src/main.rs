use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dusk_headless::{init_logging, SceneOptions, SceneRunner};
use dusk_render::{FrameStats, RenderConfig};

const FRAME_DT: f32 = 1.0 / 60.0;

/// Render the demo scene offscreen and write the last frame as a PNG.
#[derive(Debug, Parser)]
#[command(name = "dusk-headless", version)]
struct Args {
    /// PNG file to write
    #[arg(default_value = "frame.png")]
    output: PathBuf,

    /// Number of frames to simulate before saving
    #[arg(default_value_t = 60)]
    frames: u32,

    /// Render configuration as JSON
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let json = std::fs::read_to_string(path).with_context(|| format!("cannot read config '{}'", path.display()))?;
    Ok(RenderConfig::from_json(&json)?)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(None);

    let config = load_config(args.config.as_ref())?;
    let mut runner = SceneRunner::new(config, SceneOptions::default())?;
    let mut last = FrameStats::default();
    for _ in 0..args.frames {
        runner.step(FRAME_DT);
        last = runner.render_frame();
    }

    runner
        .save_png(&args.output)
        .with_context(|| format!("cannot write '{}'", args.output.display()))?;
    log::info!(
        "wrote {} after {} frames (last frame: {} draw calls, {} quads)",
        args.output.display(),
        runner.frames_rendered(),
        last.draw_calls,
        last.quads
    );
    Ok(())
}
