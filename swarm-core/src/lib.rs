//! Flocking simulation of agents moving inside a bounded volume.

pub mod agent;
pub mod render;
pub mod volume;
pub mod world;

pub use agent::{Agent, Neighborhood};
pub use render::{point_in_range, AsciiRaster, Renderer, BACKGROUND_GLYPH};
pub use swarm_shared::{AgentTuning, AgentView, Frame, Position3, SwarmSettings, UpdatePolicy};
pub use volume::Volume;
pub use world::{MarkerPalette, TickSummary, World, WorldError};

/// A 3D vector used for position and heading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn normalize(&self) -> Self {
        self.try_normalize().unwrap_or_else(Self::zero)
    }

    /// Unit vector in the same direction, or `None` when the magnitude is
    /// zero or not finite.
    pub fn try_normalize(&self) -> Option<Self> {
        let mag = self.magnitude();
        if mag > 0.0 && mag.is_finite() {
            Some(*self / mag)
        } else {
            None
        }
    }

    /// Unit vector in the same direction, or `fallback` when `self` cannot be normalized.
    pub fn normalize_or(&self, fallback: Vector3) -> Self {
        self.try_normalize().unwrap_or(fallback)
    }

    pub fn distance(&self, other: &Vector3) -> f64 {
        (*self - *other).magnitude()
    }

    pub fn with_z(&self, z: f64) -> Self {
        Self { z, ..*self }
    }
}

impl core::ops::Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl core::ops::Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl core::ops::Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl core::ops::Div<f64> for Vector3 {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl core::ops::AddAssign for Vector3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl core::ops::SubAssign for Vector3 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl core::iter::Sum for Vector3 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, v| acc + v)
    }
}

impl From<Vector3> for Position3 {
    fn from(v: Vector3) -> Self {
        Position3::new(v.x, v.y, v.z)
    }
}

impl From<Position3> for Vector3 {
    fn from(p: Position3) -> Self {
        Vector3::new(p.x, p.y, p.z)
    }
}
