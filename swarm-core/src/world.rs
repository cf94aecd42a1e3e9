use std::thread;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;

use crate::{Agent, AgentTuning, Frame, Renderer, SwarmSettings, UpdatePolicy, Vector3, Volume};

#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    #[error("volume extents must be positive, got {width}x{height}x{depth}")]
    InvalidExtent { width: u32, height: u32, depth: u32 },
    #[error("marker palette is empty")]
    EmptyPalette,
}

/// Glyphs handed out to agents at creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPalette {
    glyphs: Vec<char>,
}

impl MarkerPalette {
    pub fn new(glyphs: &str) -> Result<Self, WorldError> {
        let glyphs: Vec<char> = glyphs.chars().collect();
        if glyphs.is_empty() {
            return Err(WorldError::EmptyPalette);
        }
        Ok(Self { glyphs })
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        self.glyphs[rng.gen_range(0..self.glyphs.len())]
    }
}

impl Default for MarkerPalette {
    fn default() -> Self {
        Self { glyphs: vec!['X'] }
    }
}

/// Statistics for one completed tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummary {
    pub tick: u64,
    pub agents: usize,
    pub mean_neighbors: f64,
}

/// The volume and every agent flying in it
#[derive(Debug, Clone)]
pub struct World {
    volume: Volume,
    center: Vector3,
    agents: Vec<Agent>,
    tick: u64,
    policy: UpdatePolicy,
}

impl World {
    /// Build a world and scatter `settings.population` agents over the
    /// Z = 0 plane with random headings.
    pub fn new<R: Rng + ?Sized>(
        settings: &SwarmSettings,
        rng: &mut R,
    ) -> Result<Self, WorldError> {
        let invalid = || WorldError::InvalidExtent {
            width: settings.width,
            height: settings.height,
            depth: settings.depth,
        };
        if settings.width == 0 || settings.height == 0 || settings.depth == 0 {
            return Err(invalid());
        }
        let extents = Vector3::new(
            settings.width as f64,
            settings.height as f64,
            settings.depth as f64,
        );
        let volume = Volume::new(Vector3::zero(), extents).ok_or_else(invalid)?;
        let palette = MarkerPalette::new(&settings.markers)?;

        let agents = (0..settings.population)
            .map(|_| random_agent(&volume, settings.tuning, &palette, &mut *rng))
            .collect();

        log::info!(
            "World created: {}x{}x{} volume, {} agents, {:?} updates",
            settings.width,
            settings.height,
            settings.depth,
            settings.population,
            settings.policy
        );

        Ok(Self::from_agents(volume, agents).with_policy(settings.policy))
    }

    /// Build a world around agents that were placed by hand
    pub fn from_agents(volume: Volume, agents: Vec<Agent>) -> Self {
        Self {
            center: volume.center(),
            volume,
            agents,
            tick: 0,
            policy: UpdatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn center(&self) -> Vector3 {
        self.center
    }

    /// Agents in creation order
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    /// Number of completed ticks
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Advance every agent once, in creation order
    pub fn tick(&mut self) -> TickSummary {
        let seen = match self.policy {
            UpdatePolicy::Interleaved => self.advance_interleaved(),
            UpdatePolicy::DoubleBuffered => self.advance_double_buffered(),
        };
        self.tick += 1;

        let agents = self.agents.len();
        let summary = TickSummary {
            tick: self.tick,
            agents,
            mean_neighbors: if agents == 0 {
                0.0
            } else {
                seen as f64 / agents as f64
            },
        };
        log::trace!("{:?}", summary);
        summary
    }

    // Agent i sees agents before it in their new state and agents after it
    // in their old state.
    fn advance_interleaved(&mut self) -> usize {
        let volume = self.volume;
        let mut seen = 0;

        for i in 0..self.agents.len() {
            let (before, rest) = self.agents.split_at_mut(i);
            if let Some((agent, after)) = rest.split_first_mut() {
                seen += agent.advance(before.iter().chain(after.iter()), &volume);
            }
        }

        seen
    }

    fn advance_double_buffered(&mut self) -> usize {
        let volume = self.volume;
        let previous = self.agents.clone();
        let mut seen = 0;

        for (i, agent) in self.agents.iter_mut().enumerate() {
            let others = previous
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| other);
            seen += agent.advance(others, &volume);
        }

        seen
    }

    /// Snapshot of what a renderer needs after the last completed tick
    pub fn frame(&self) -> Frame {
        let extents = self.volume.extents();
        Frame {
            tick: self.tick,
            origin: self.volume.min().into(),
            width: extents.x as u32,
            height: extents.y as u32,
            agents: self.agents.iter().map(Agent::view).collect(),
        }
    }

    /// Tick, render and sleep forever. Returns only when the renderer fails.
    pub fn run<R: Renderer>(&mut self, renderer: &mut R, pause: Duration) -> Result<(), R::Error> {
        loop {
            self.step(renderer)?;
            thread::sleep(pause);
        }
    }

    /// Like [`World::run`] but stops after `ticks` ticks
    pub fn run_for<R: Renderer>(
        &mut self,
        ticks: u64,
        renderer: &mut R,
        pause: Duration,
    ) -> Result<(), R::Error> {
        for _ in 0..ticks {
            self.step(renderer)?;
            if !pause.is_zero() {
                thread::sleep(pause);
            }
        }
        Ok(())
    }

    fn step<R: Renderer>(&mut self, renderer: &mut R) -> Result<TickSummary, R::Error> {
        let summary = self.tick();
        renderer.render(&self.frame())?;
        Ok(summary)
    }
}

fn random_agent<R: Rng + ?Sized>(
    volume: &Volume,
    tuning: AgentTuning,
    palette: &MarkerPalette,
    rng: &mut R,
) -> Agent {
    let min = volume.min();
    let max = volume.max();
    let extents = volume.extents();

    let position = Vector3::new(rng.gen_range(min.x..max.x), rng.gen_range(min.y..max.y), 0.0);
    let heading = loop {
        let draw = Vector3::new(
            rng.gen_range(-extents.x..extents.x),
            rng.gen_range(-extents.y..extents.y),
            0.0,
        );
        if let Some(heading) = draw.try_normalize() {
            break heading;
        }
    };

    Agent::new(position, heading)
        .with_tuning(tuning)
        .with_marker(palette.pick(rng))
}
