use core::fmt;

use crate::{Frame, Position3};

/// Glyph for cells no agent covers
pub const BACKGROUND_GLYPH: char = '.';

/// Consumer of the per-tick snapshots produced by [`crate::World`]
pub trait Renderer {
    type Error;

    fn render(&mut self, frame: &Frame) -> Result<(), Self::Error>;
}

/// Whether `point` lies within `radius` of `center`
pub fn point_in_range(point: &Position3, center: &Position3, radius: f64) -> bool {
    point.distance_to(center) <= radius
}

/// Top-down projection of a frame onto a character grid.
///
/// Cell `(col, row)` samples the point `(origin.x + col, origin.y + row, 0)`
/// and shows the marker of the closest agent whose radius covers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiRaster {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl AsciiRaster {
    pub fn from_frame(frame: &Frame) -> Self {
        let width = frame.width as usize;
        let height = frame.height as usize;
        let mut cells = Vec::with_capacity(width * height);

        for row in 0..height {
            for col in 0..width {
                let probe = Position3::new(
                    frame.origin.x + col as f64,
                    frame.origin.y + row as f64,
                    0.0,
                );
                cells.push(glyph_at(frame, &probe));
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn glyph(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row * self.width + col).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        // chunks() panics on zero
        self.cells.chunks(self.width.max(1))
    }

    /// True when no agent is visible
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&c| c == BACKGROUND_GLYPH)
    }
}

fn glyph_at(frame: &Frame, probe: &Position3) -> char {
    let mut best: Option<(char, f64)> = None;

    for agent in &frame.agents {
        if !point_in_range(probe, &agent.position, agent.radius) {
            continue;
        }
        let distance = probe.distance_to(&agent.position);
        match best {
            Some((_, closest)) if closest <= distance => {}
            _ => best = Some((agent.marker, distance)),
        }
    }

    best.map_or(BACKGROUND_GLYPH, |(marker, _)| marker)
}

impl fmt::Display for AsciiRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for glyph in row {
                write!(f, " {glyph}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AgentView;

    fn frame(width: u32, height: u32, agents: Vec<AgentView>) -> Frame {
        Frame {
            tick: 0,
            origin: Position3::new(0.0, 0.0, 0.0),
            width,
            height,
            agents,
        }
    }

    fn view(x: f64, y: f64, marker: char, radius: f64) -> AgentView {
        AgentView {
            position: Position3::new(x, y, 0.0),
            marker,
            radius,
        }
    }

    #[test]
    fn test_point_in_range() {
        let center = Position3::new(1.0, 1.0, 0.0);
        assert!(point_in_range(&Position3::new(2.0, 1.0, 0.0), &center, 1.0));
        assert!(!point_in_range(&Position3::new(2.0, 2.0, 0.0), &center, 1.0));
    }

    #[test]
    fn test_empty_frame_is_background() {
        let raster = AsciiRaster::from_frame(&frame(4, 3, Vec::new()));
        assert!(raster.is_blank());
        assert_eq!(raster.to_string(), " . . . .\n . . . .\n . . . .");
    }

    #[test]
    fn test_agent_covers_cells_within_radius() {
        let raster = AsciiRaster::from_frame(&frame(5, 5, vec![view(2.0, 2.0, 'o', 1.1)]));

        assert_eq!(raster.glyph(2, 2), Some('o'));
        assert_eq!(raster.glyph(1, 2), Some('o'));
        assert_eq!(raster.glyph(2, 3), Some('o'));
        assert_eq!(raster.glyph(1, 1), Some('.'));
        assert_eq!(raster.glyph(5, 0), None);
    }

    #[test]
    fn test_closest_agent_wins_cell() {
        let agents = vec![view(1.0, 0.0, 'a', 2.0), view(2.5, 0.0, 'b', 2.0)];
        let raster = AsciiRaster::from_frame(&frame(4, 1, agents));

        assert_eq!(raster.to_string(), " a a b b");
    }

    #[test]
    fn test_tie_goes_to_first_agent() {
        let agents = vec![view(1.0, 0.0, 'a', 1.0), view(1.0, 0.0, 'b', 1.0)];
        let raster = AsciiRaster::from_frame(&frame(3, 1, agents));

        assert_eq!(raster.to_string(), " a a a");
    }

    #[test]
    fn test_origin_offsets_probe_points() {
        let mut shifted = frame(3, 1, vec![view(11.0, 5.0, 'x', 0.5)]);
        shifted.origin = Position3::new(10.0, 5.0, 0.0);
        let raster = AsciiRaster::from_frame(&shifted);

        assert_eq!(raster.to_string(), " . x .");
    }
}
