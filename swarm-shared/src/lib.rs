use serde::{Deserialize, Serialize};

/// A point in world coordinates as seen by renderers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculate distance to another position
    pub fn distance_to(&self, other: &Position3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// What a renderer needs to know about one agent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AgentView {
    pub position: Position3,
    pub marker: char,
    pub radius: f64,
}

/// Immutable snapshot of the world taken between two ticks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    /// Number of ticks completed when the snapshot was taken
    pub tick: u64,
    /// Minimum corner of the volume
    pub origin: Position3,
    pub width: u32,
    pub height: u32,
    /// Agents in creation order
    pub agents: Vec<AgentView>,
}

/// Per-agent steering constants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentTuning {
    /// Distance travelled per tick
    pub speed: f64,
    /// Radius within which other agents count as neighbors
    pub vision_range: f64,
    /// Nearest-neighbor distance below which the agent dodges
    pub dodge_range: f64,
    /// Weight of the summed neighbor headings
    pub alignment_rate: f64,
    /// Weight of the pull toward the local swarm center
    pub cohesion_rate: f64,
    /// Drawing radius, used only for rendering
    pub radius: f64,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            speed: 0.5,
            vision_range: 10.0,
            dodge_range: 5.0,
            alignment_rate: 0.03,
            cohesion_rate: 0.02,
            radius: 1.1,
        }
    }
}

/// How agents observe each other during a tick
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UpdatePolicy {
    /// Agents are updated in place, in order. Later agents see the
    /// already-updated state of earlier ones.
    #[default]
    Interleaved,
    /// Every agent steers against a frozen copy of the previous tick.
    DoubleBuffered,
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SwarmSettings {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub population: usize,
    pub tuning: AgentTuning,
    /// Glyphs markers are drawn from
    pub markers: String,
    /// Pause between ticks in milliseconds
    pub pause_ms: u64,
    pub policy: UpdatePolicy,
}

impl Default for SwarmSettings {
    fn default() -> Self {
        Self {
            width: 40,
            height: 20,
            depth: 20,
            population: 30,
            tuning: AgentTuning::default(),
            markers: "X".to_string(),
            pause_ms: 5,
            policy: UpdatePolicy::default(),
        }
    }
}

impl SwarmSettings {
    /// Parse settings from a JSON document. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_distance() {
        let p1 = Position3::new(0.0, 0.0, 0.0);
        let p2 = Position3::new(3.0, 4.0, 12.0);
        assert_eq!(p1.distance_to(&p2), 13.0);
    }

    #[test]
    fn test_default_tuning() {
        let tuning = AgentTuning::default();
        assert_eq!(tuning.speed, 0.5);
        assert_eq!(tuning.vision_range, 10.0);
        assert_eq!(tuning.dodge_range, 5.0);
        assert_eq!(tuning.radius, 1.1);
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings =
            SwarmSettings::from_json(r#"{ "width": 64, "tuning": { "speed": 1.5 } }"#).unwrap();
        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, 20);
        assert_eq!(settings.tuning.speed, 1.5);
        assert_eq!(settings.tuning.vision_range, 10.0);
        assert_eq!(settings.policy, UpdatePolicy::Interleaved);
    }

    #[test]
    fn test_policy_names() {
        let settings = SwarmSettings::from_json(r#"{ "policy": "double-buffered" }"#).unwrap();
        assert_eq!(settings.policy, UpdatePolicy::DoubleBuffered);
    }

    #[test]
    fn test_frame_serializes_markers() {
        let frame = Frame {
            tick: 3,
            origin: Position3::new(0.0, 0.0, 0.0),
            width: 2,
            height: 2,
            agents: vec![AgentView {
                position: Position3::new(1.0, 1.0, 0.0),
                marker: 'o',
                radius: 1.1,
            }],
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains(r#""marker":"o""#));
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
