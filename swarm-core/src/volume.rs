use crate::Vector3;

/// Axis-aligned box the agents live in.
///
/// Faces are wrapped: leaving through a max face re-enters through the
/// opposite min face and vice versa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    origin: Vector3,
    extents: Vector3,
}

impl Volume {
    /// Returns `None` unless every extent is positive and finite.
    pub fn new(origin: Vector3, extents: Vector3) -> Option<Self> {
        let valid = |e: f64| e.is_finite() && e > 0.0;
        if valid(extents.x) && valid(extents.y) && valid(extents.z) {
            Some(Self { origin, extents })
        } else {
            None
        }
    }

    pub fn min(&self) -> Vector3 {
        self.origin
    }

    pub fn max(&self) -> Vector3 {
        self.origin + self.extents
    }

    pub fn extents(&self) -> Vector3 {
        self.extents
    }

    pub fn center(&self) -> Vector3 {
        self.origin + self.extents / 2.0
    }

    /// True when `point` is at least `margin` inside the X and Y faces.
    /// Z is not checked; agents fly in the Z = 0 plane.
    pub fn contains_xy(&self, point: &Vector3, margin: f64) -> bool {
        let min = self.min();
        let max = self.max();
        min.x + margin <= point.x
            && min.y + margin <= point.y
            && max.x - margin > point.x
            && max.y - margin > point.y
    }

    /// Wraps each coordinate back inside by one extent.
    ///
    /// Overshoots of more than one extent are not wrapped again.
    pub fn wrap(&self, point: Vector3) -> Vector3 {
        let min = self.min();
        let max = self.max();
        Vector3::new(
            wrap_axis(point.x, min.x, max.x, self.extents.x),
            wrap_axis(point.y, min.y, max.y, self.extents.y),
            wrap_axis(point.z, min.z, max.z, self.extents.z),
        )
    }
}

fn wrap_axis(value: f64, min: f64, max: f64, extent: f64) -> f64 {
    if value > max {
        value - extent
    } else if value < min {
        value + extent
    } else {
        value
    }
}
