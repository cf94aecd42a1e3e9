use crate::{AgentTuning, AgentView, Vector3, Volume};

/// Weight of the pull back toward the volume center near the X/Y faces
pub const BOUNDARY_STEER_RATE: f64 = 0.1;

/// The boundary margin is `vision_range / BOUNDARY_MARGIN_DIVISOR`
pub const BOUNDARY_MARGIN_DIVISOR: f64 = 5.0;

/// A single flocking agent
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Vector3,
    /// Unit direction of travel
    pub heading: Vector3,
    pub tuning: AgentTuning,
    pub marker: char,
}

/// Other agents an agent can see during one tick.
///
/// Borrowed from the agent set for the duration of a single update and
/// never kept across ticks.
#[derive(Debug, Clone, Default)]
pub struct Neighborhood<'a> {
    neighbors: Vec<&'a Agent>,
    nearest: Option<(&'a Agent, f64)>,
}

impl<'a> Neighborhood<'a> {
    /// Neighbors in the order they were scanned
    pub fn neighbors(&self) -> &[&'a Agent] {
        &self.neighbors
    }

    /// Closest neighbor and its distance; the first one scanned wins ties.
    pub fn nearest(&self) -> Option<(&'a Agent, f64)> {
        self.nearest
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Sum of neighbor headings, zero when there are no neighbors
    pub fn heading_sum(&self) -> Vector3 {
        self.neighbors.iter().map(|n| n.heading).sum()
    }

    /// Local swarm center
    pub fn mean_position(&self) -> Option<Vector3> {
        if self.neighbors.is_empty() {
            return None;
        }
        let sum: Vector3 = self.neighbors.iter().map(|n| n.position).sum();
        Some(sum / self.neighbors.len() as f64)
    }
}

impl Agent {
    pub fn new(position: Vector3, heading: Vector3) -> Self {
        Self {
            position,
            heading: heading.normalize(),
            tuning: AgentTuning::default(),
            marker: 'X',
        }
    }

    pub fn with_tuning(mut self, tuning: AgentTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    pub fn distance_to(&self, other: &Agent) -> f64 {
        self.position.distance(&other.position)
    }

    pub fn view(&self) -> AgentView {
        AgentView {
            position: self.position.into(),
            marker: self.marker,
            radius: self.tuning.radius,
        }
    }

    /// Scan `others` for agents within vision range.
    ///
    /// `others` must not contain `self`; agents sharing its position are
    /// still neighbors.
    pub fn neighborhood<'a, I>(&self, others: I) -> Neighborhood<'a>
    where
        I: IntoIterator<Item = &'a Agent>,
    {
        let mut found = Neighborhood::default();

        for other in others {
            let distance = self.distance_to(other);
            if distance > self.tuning.vision_range {
                continue;
            }
            match found.nearest {
                Some((_, nearest)) if nearest <= distance => {}
                _ => found.nearest = Some((other, distance)),
            }
            found.neighbors.push(other);
        }

        found
    }

    /// Steer against `others`, move one step and wrap into `volume`.
    ///
    /// Returns how many neighbors were seen.
    pub fn advance<'a, I>(&mut self, others: I, volume: &Volume) -> usize
    where
        I: IntoIterator<Item = &'a Agent>,
    {
        let neighborhood = self.neighborhood(others);
        self.decide_heading(&neighborhood, volume);
        self.integrate(volume);
        neighborhood.len()
    }

    fn decide_heading(&mut self, neighborhood: &Neighborhood<'_>, volume: &Volume) {
        self.avoid_collision(neighborhood);
        self.align(neighborhood);
        self.cohere(neighborhood);
        self.avoid_boundary(volume);
    }

    fn avoid_collision(&mut self, neighborhood: &Neighborhood<'_>) {
        let Some((nearest, distance)) = neighborhood.nearest() else {
            return;
        };
        let dodge_range = self.tuning.dodge_range;
        if distance <= dodge_range {
            let away = self.position - nearest.position;
            self.steer(away * (1.0 - distance / dodge_range));
        }
    }

    fn align(&mut self, neighborhood: &Neighborhood<'_>) {
        self.steer(neighborhood.heading_sum() * self.tuning.alignment_rate);
    }

    fn cohere(&mut self, neighborhood: &Neighborhood<'_>) {
        if let Some(center) = neighborhood.mean_position() {
            self.steer((center - self.position) * self.tuning.cohesion_rate);
        }
    }

    fn avoid_boundary(&mut self, volume: &Volume) {
        let margin = self.tuning.vision_range / BOUNDARY_MARGIN_DIVISOR;
        if !volume.contains_xy(&self.position, margin) {
            let inward = (volume.center() - self.position).with_z(0.0);
            self.steer(inward * BOUNDARY_STEER_RATE);
        }
    }

    /// Add `adjustment` to the heading and renormalize.
    ///
    /// A zero adjustment leaves the heading untouched, and so does a sum
    /// with no direction.
    fn steer(&mut self, adjustment: Vector3) {
        if adjustment.is_zero() {
            return;
        }
        match (self.heading + adjustment).try_normalize() {
            Some(heading) => self.heading = heading,
            None => log::trace!(
                "degenerate heading at {:?}, keeping {:?}",
                self.position,
                self.heading
            ),
        }
    }

    fn integrate(&mut self, volume: &Volume) {
        self.position += self.heading * self.tuning.speed;
        self.position = volume.wrap(self.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube(size: f64) -> Volume {
        Volume::new(Vector3::zero(), Vector3::new(size, size, size)).unwrap()
    }

    fn agent_at(x: f64, y: f64) -> Agent {
        Agent::new(Vector3::new(x, y, 0.0), Vector3::new(1.0, 0.0, 0.0))
    }

    #[test]
    fn test_agent_creation() {
        let agent = Agent::new(Vector3::new(10.0, 20.0, 0.0), Vector3::new(3.0, 4.0, 0.0));

        assert_eq!(agent.position, Vector3::new(10.0, 20.0, 0.0));
        assert_relative_eq!(agent.heading.x, 0.6);
        assert_relative_eq!(agent.heading.y, 0.8);
        assert_eq!(agent.marker, 'X');
        assert_eq!(agent.tuning, AgentTuning::default());
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = agent_at(1.0, 2.0);
        let b = Agent::new(Vector3::new(-4.0, 7.5, 3.0), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn test_vision_range_is_inclusive() {
        let me = agent_at(0.0, 0.0);
        let edge = agent_at(10.0, 0.0);
        let beyond = agent_at(10.5, 0.0);
        let twin = agent_at(0.0, 0.0);

        let neighborhood = me.neighborhood([&edge, &beyond, &twin]);
        assert_eq!(neighborhood.len(), 2);
        assert_eq!(neighborhood.neighbors()[0], &edge);
        assert_eq!(neighborhood.neighbors()[1], &twin);
    }

    #[test]
    fn test_nearest_is_minimum_distance() {
        let me = agent_at(0.0, 0.0);
        let far = agent_at(6.0, 0.0);
        let near = agent_at(0.0, 2.0);
        let mid = agent_at(3.0, 0.0);
        let tie = agent_at(-2.0, 0.0);

        let neighborhood = me.neighborhood([&far, &near, &mid, &tie]);
        let (nearest, distance) = neighborhood.nearest().unwrap();
        assert_eq!(nearest, &near);
        assert_eq!(distance, 2.0);
    }

    #[test]
    fn test_empty_neighborhood() {
        let me = agent_at(0.0, 0.0);
        let neighborhood = me.neighborhood(std::iter::empty());
        assert!(neighborhood.is_empty());
        assert!(neighborhood.nearest().is_none());
        assert_eq!(neighborhood.heading_sum(), Vector3::zero());
        assert_eq!(neighborhood.mean_position(), None);
    }

    #[test]
    fn test_close_neighbors_steer_apart() {
        let volume = cube(20.0);
        let mut a = Agent::new(Vector3::new(10.0, 10.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        let b = Agent::new(Vector3::new(10.5, 10.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(a.tuning.dodge_range, 5.0);

        let old_heading = a.heading;
        let separation = a.position - b.position;
        a.advance([&b], &volume);

        assert!((a.heading - old_heading).dot(&separation) > 0.0);
        assert_relative_eq!(a.heading.magnitude(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_alignment_pulls_toward_neighbor_headings() {
        let volume = cube(100.0);
        let tuning = AgentTuning {
            cohesion_rate: 0.0,
            ..AgentTuning::default()
        };
        let mut me = Agent::new(Vector3::new(50.0, 50.0, 0.0), Vector3::new(1.0, 0.0, 0.0))
            .with_tuning(tuning);
        // Outside dodge range, inside vision range
        let other = Agent::new(Vector3::new(50.0, 42.0, 0.0), Vector3::new(0.0, 1.0, 0.0));

        me.advance([&other], &volume);

        assert!(me.heading.y > 0.0);
        assert_relative_eq!(me.heading.magnitude(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cohesion_pulls_toward_local_center() {
        let volume = cube(100.0);
        let tuning = AgentTuning {
            alignment_rate: 0.0,
            ..AgentTuning::default()
        };
        let mut me = Agent::new(Vector3::new(50.0, 50.0, 0.0), Vector3::new(1.0, 0.0, 0.0))
            .with_tuning(tuning);
        let left = agent_at(52.0, 56.0);
        let right = agent_at(56.0, 56.0);

        me.advance([&left, &right], &volume);

        assert!(me.heading.y > 0.0);
        assert!(me.heading.x > 0.0);
    }

    #[test]
    fn test_lone_agent_keeps_heading_in_interior() {
        let volume = cube(20.0);
        let mut agent = Agent::new(Vector3::new(5.0, 10.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let heading = agent.heading;

        for _ in 0..10 {
            assert_eq!(agent.advance(std::iter::empty(), &volume), 0);
            assert_eq!(agent.heading, heading);
        }
        assert_relative_eq!(agent.position.x, 10.0);
    }

    #[test]
    fn test_boundary_steers_toward_center_plane() {
        let volume = cube(20.0);
        let mut agent = Agent::new(Vector3::new(1.0, 10.0, 0.0), Vector3::new(0.0, 1.0, 0.0));

        agent.advance(std::iter::empty(), &volume);

        assert!(agent.heading.x > 0.0);
        assert_eq!(agent.heading.z, 0.0);
        assert_relative_eq!(agent.heading.magnitude(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_opposing_adjustment_keeps_previous_heading() {
        let mut agent = agent_at(0.0, 0.0);
        agent.steer(Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(agent.heading, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_integration_wraps_far_face() {
        let volume = cube(20.0);
        let tuning = AgentTuning {
            speed: 1.0,
            ..AgentTuning::default()
        };
        let mut agent = Agent::new(Vector3::new(19.75, 10.0, 0.0), Vector3::new(1.0, 0.0, 0.0))
            .with_tuning(tuning);

        agent.integrate(&volume);

        assert_relative_eq!(agent.position.x, 0.75);
        assert_eq!(agent.position.y, 10.0);
    }
}
