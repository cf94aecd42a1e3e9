use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use swarm_core::{AsciiRaster, Frame, Renderer, World};
use swarm_shared::{SwarmSettings, UpdatePolicy};

#[derive(Parser, Debug)]
#[command(author, version, about = "Flocking simulation rendered as ASCII", long_about = None)]
pub struct Args {
    /// JSON settings file; flags given on the command line override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Volume width in cells [default: 40]
    #[arg(long)]
    pub width: Option<u32>,

    /// Volume height in cells [default: 20]
    #[arg(long)]
    pub height: Option<u32>,

    /// Volume depth [default: 20]
    #[arg(long)]
    pub depth: Option<u32>,

    /// Number of agents [default: 30]
    #[arg(short, long)]
    pub boids: Option<usize>,

    /// Seed for initial placement; random when omitted
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Stop after this many ticks instead of running forever
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Pause between ticks in milliseconds [default: 5]
    #[arg(long)]
    pub pause_ms: Option<u64>,

    /// Glyphs agents are drawn with, one picked per agent [default: X]
    #[arg(short, long)]
    pub markers: Option<String>,

    /// How agents observe each other within a tick [default: interleaved]
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Distance travelled per tick
    #[arg(long)]
    pub speed: Option<f64>,

    /// Radius within which other agents count as neighbors
    #[arg(long)]
    pub vision_range: Option<f64>,

    /// Nearest-neighbor distance that triggers dodging
    #[arg(long)]
    pub dodge_range: Option<f64>,

    /// Weight of neighbor headings
    #[arg(long)]
    pub alignment_rate: Option<f64>,

    /// Weight of the pull toward the local swarm center
    #[arg(long)]
    pub cohesion_rate: Option<f64>,

    /// Drawing radius of each agent
    #[arg(long)]
    pub radius: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Ascii)]
    pub format: OutputFormat,

    /// Redraw in place instead of scrolling
    #[arg(long)]
    pub clear: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Interleaved,
    DoubleBuffered,
}

impl From<PolicyArg> for UpdatePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Interleaved => UpdatePolicy::Interleaved,
            PolicyArg::DoubleBuffered => UpdatePolicy::DoubleBuffered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Text grid per tick
    Ascii,
    /// One JSON frame per line
    Json,
}

impl Args {
    /// Resolve the simulation settings: defaults, then the config file, then flags.
    pub fn settings(&self) -> Result<SwarmSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                SwarmSettings::from_json(&text)
                    .with_context(|| format!("Invalid settings in {}", path.display()))?
            }
            None => SwarmSettings::default(),
        };

        override_with(&mut settings.width, self.width);
        override_with(&mut settings.height, self.height);
        override_with(&mut settings.depth, self.depth);
        override_with(&mut settings.population, self.boids);
        override_with(&mut settings.pause_ms, self.pause_ms);
        override_with(&mut settings.markers, self.markers.clone());
        override_with(&mut settings.policy, self.policy.map(UpdatePolicy::from));

        let tuning = &mut settings.tuning;
        override_with(&mut tuning.speed, self.speed);
        override_with(&mut tuning.vision_range, self.vision_range);
        override_with(&mut tuning.dodge_range, self.dodge_range);
        override_with(&mut tuning.alignment_rate, self.alignment_rate);
        override_with(&mut tuning.cohesion_rate, self.cohesion_rate);
        override_with(&mut tuning.radius, self.radius);

        Ok(settings)
    }
}

fn override_with<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Draws each frame as an ASCII grid
pub struct TerminalRenderer<W: Write> {
    out: W,
    clear: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    type Error = anyhow::Error;

    fn render(&mut self, frame: &Frame) -> Result<()> {
        if self.clear {
            queue!(self.out, MoveTo(0, 0), Clear(ClearType::All))
                .context("Failed to clear terminal")?;
        }
        let raster = AsciiRaster::from_frame(frame);
        write!(self.out, "{raster}\n\n").context("Failed to write frame")?;
        self.out.flush().context("Failed to flush output")?;
        Ok(())
    }
}

/// Writes each frame as a single JSON line
pub struct JsonLinesRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    type Error = anyhow::Error;

    fn render(&mut self, frame: &Frame) -> Result<()> {
        serde_json::to_writer(&mut self.out, frame).context("Failed to serialize frame")?;
        writeln!(self.out).context("Failed to write frame")?;
        self.out.flush().context("Failed to flush output")?;
        Ok(())
    }
}

/// Run the world against `renderer`, forever unless `ticks` is given
pub fn drive<R>(
    world: &mut World,
    renderer: &mut R,
    ticks: Option<u64>,
    pause: Duration,
) -> Result<()>
where
    R: Renderer<Error = anyhow::Error>,
{
    match ticks {
        Some(ticks) => {
            log::info!("Running {} ticks", ticks);
            world.run_for(ticks, renderer, pause)?;
            log::info!("Finished after {} ticks", world.tick_count());
        }
        None => {
            log::info!("Running until interrupted");
            world.run(renderer, pause)?;
        }
    }
    Ok(())
}
