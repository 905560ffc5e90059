use crate::infra::Position;

/// Cumulative record of which interior cells have ever been inside any
/// agent's visibility radius. Cells only ever flip unseen -> seen within an
/// episode; the percentage is a pure function of the matrix.
#[derive(Debug, Clone)]
pub struct CoverageTracker {
    width: i32,
    height: i32,
    seen: Vec<bool>,
}

impl CoverageTracker {
    /// `width`/`height` are full grid dimensions, walls included; only the
    /// interior is tracked.
    pub fn new(width: i32, height: i32) -> Self {
        let len = ((width - 2) * (height - 2)) as usize;
        Self {
            width,
            height,
            seen: vec![false; len],
        }
    }

    pub fn reset(&mut self) {
        self.seen.fill(false);
    }

    /// Marks every interior cell within `max_edge_dist` (Euclidean) of any
    /// agent. Short-circuits per cell once one agent covers it.
    pub fn update(&mut self, agent_positions: &[Position], max_edge_dist: f32) {
        for x in 1..self.width - 1 {
            for y in 1..self.height - 1 {
                let idx = ((x - 1) * (self.height - 2) + (y - 1)) as usize;
                if self.seen[idx] {
                    continue;
                }
                let cell = Position::new(x, y);
                if agent_positions
                    .iter()
                    .any(|agent| cell.euclidean(agent) <= max_edge_dist)
                {
                    self.seen[idx] = true;
                }
            }
        }
    }

    pub fn seen_count(&self) -> usize {
        self.seen.iter().filter(|seen| **seen).count()
    }

    pub fn seen_percentage(&self) -> f32 {
        self.seen_count() as f32 / self.seen.len() as f32 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_tracker_sees_nothing() {
        let tracker = CoverageTracker::new(6, 6);
        assert_eq!(tracker.seen_count(), 0);
        assert_eq!(tracker.seen_percentage(), 0.0);
    }

    #[test]
    fn test_update_marks_cells_within_radius() {
        let mut tracker = CoverageTracker::new(6, 6);
        tracker.update(&[Position::new(1, 1)], 1.0);

        // (1,1), (1,2), (2,1) are within distance 1 of the agent.
        assert_eq!(tracker.seen_count(), 3);
    }

    #[test]
    fn test_coverage_is_monotonic() {
        let mut tracker = CoverageTracker::new(8, 8);
        let mut prev = 0.0;
        let path = [
            Position::new(1, 1),
            Position::new(3, 3),
            Position::new(1, 1),
            Position::new(6, 6),
        ];
        for pos in path {
            tracker.update(&[pos], 1.5);
            let pct = tracker.seen_percentage();
            assert!(pct >= prev, "seen percentage must never drop");
            prev = pct;
        }
    }

    #[test]
    fn test_large_radius_covers_full_interior() {
        let mut tracker = CoverageTracker::new(6, 6);
        tracker.update(&[Position::new(3, 3)], 100.0);
        assert_eq!(tracker.seen_count(), 16);
        assert_eq!(tracker.seen_percentage(), 100.0);
    }

    #[test]
    fn test_reset_clears_matrix() {
        let mut tracker = CoverageTracker::new(6, 6);
        tracker.update(&[Position::new(3, 3)], 100.0);
        tracker.reset();
        assert_eq!(tracker.seen_count(), 0);
    }
}
