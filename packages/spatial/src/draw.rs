//! Draw-tool state machine for catchment regions.
//!
//! ```text
//! Idle --arm--> Armed --pointer_down--> Drawing --pointer_up--> Idle (region committed)
//!   ^             |                        |
//!   +---cancel----+--------cancel----------+
//! ```
//!
//! Arming discards any previously committed region, so cancelling a redraw
//! leaves no region behind.

use geo::Point;

use crate::catchment::CatchmentRegion;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawState {
    /// The map pans normally.
    Idle,
    /// The draw control is active and waiting for a pointer press.
    Armed,
    /// A drag is in progress.
    Drawing {
        start: Point<f64>,
        preview: Option<CatchmentRegion>,
    },
}

/// Produces catchment regions from pointer events.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTool {
    state: DrawState,
    committed: Option<CatchmentRegion>,
}

impl Default for DrawTool {
    fn default() -> Self {
        Self {
            state: DrawState::Idle,
            committed: None,
        }
    }
}

impl DrawTool {
    #[must_use]
    pub const fn state(&self) -> &DrawState {
        &self.state
    }

    /// Whether the draw control is active (armed or mid-drag).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, DrawState::Idle)
    }

    /// The most recently committed region.
    #[must_use]
    pub const fn committed(&self) -> Option<&CatchmentRegion> {
        self.committed.as_ref()
    }

    /// The region following the pointer during a drag.
    #[must_use]
    pub const fn preview(&self) -> Option<&CatchmentRegion> {
        match &self.state {
            DrawState::Drawing { preview, .. } => preview.as_ref(),
            DrawState::Idle | DrawState::Armed => None,
        }
    }

    /// Activates the draw control, discarding the committed region.
    pub fn arm(&mut self) {
        if matches!(self.state, DrawState::Idle) {
            self.committed = None;
            self.state = DrawState::Armed;
        }
    }

    /// Toggles the draw control; deactivating cancels any drag in progress.
    pub fn toggle(&mut self) {
        if self.is_active() {
            self.cancel();
        } else {
            self.arm();
        }
    }

    /// Leaves draw mode without committing. Bound to the exit shortcut.
    pub fn cancel(&mut self) {
        if self.is_active() {
            log::debug!("draw cancelled");
        }
        self.state = DrawState::Idle;
    }

    /// Starts a drag. Pressing again mid-drag restarts from the new point.
    pub fn pointer_down(&mut self, at: Point<f64>) {
        if self.is_active() {
            self.state = DrawState::Drawing {
                start: at,
                preview: None,
            };
        }
    }

    /// Updates the preview circle while dragging.
    pub fn pointer_move(&mut self, at: Point<f64>) -> Option<&CatchmentRegion> {
        if let DrawState::Drawing { start, preview } = &mut self.state {
            *preview = Some(CatchmentRegion::from_drag(*start, at));
            preview.as_ref()
        } else {
            None
        }
    }

    /// Finishes a drag, committing its region and returning to idle.
    pub fn pointer_up(&mut self, at: Point<f64>) -> Option<&CatchmentRegion> {
        let DrawState::Drawing { start, .. } = self.state else {
            return None;
        };

        let region = CatchmentRegion::from_drag(start, at);
        log::debug!(
            "committed catchment at ({:.5}, {:.5}) radius {:.3} km",
            region.center().x(),
            region.center().y(),
            region.radius_km()
        );
        self.committed = Some(region);
        self.state = DrawState::Idle;
        self.committed.as_ref()
    }

    /// Drops the committed region.
    pub fn clear(&mut self) {
        self.committed = None;
    }

    /// Whether the pointer is over the committed region, for the hover
    /// highlight.
    #[must_use]
    pub fn hover(&self, at: Point<f64>) -> bool {
        self.committed
            .as_ref()
            .is_some_and(|region| region.contains(at.x(), at.y()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_drag_commits_region() {
        let mut tool = DrawTool::default();
        tool.arm();
        tool.pointer_down(Point::new(32.40, 37.80));
        assert!(tool.pointer_move(Point::new(32.41, 37.80)).is_some());
        assert!(tool.preview().is_some());

        let committed = tool.pointer_up(Point::new(32.42, 37.80)).cloned();
        assert!(committed.is_some());
        assert_eq!(tool.state(), &DrawState::Idle);
        assert_eq!(tool.committed(), committed.as_ref());
        assert!(tool.preview().is_none());
    }

    #[test]
    fn pointer_events_ignored_when_idle() {
        let mut tool = DrawTool::default();
        tool.pointer_down(Point::new(32.40, 37.80));
        assert!(tool.pointer_move(Point::new(32.41, 37.80)).is_none());
        assert!(tool.pointer_up(Point::new(32.42, 37.80)).is_none());
        assert!(tool.committed().is_none());
    }

    #[test]
    fn new_commit_replaces_previous() {
        let mut tool = DrawTool::default();
        tool.arm();
        tool.pointer_down(Point::new(32.40, 37.80));
        tool.pointer_up(Point::new(32.42, 37.80));
        let first = tool.committed().cloned();

        tool.arm();
        tool.pointer_down(Point::new(32.50, 37.90));
        tool.pointer_up(Point::new(32.51, 37.90));

        assert_ne!(tool.committed().cloned(), first);
        assert!(tool.hover(Point::new(32.505, 37.90)));
        assert!(!tool.hover(Point::new(32.41, 37.80)));
    }

    #[test]
    fn arming_discards_committed_region() {
        let mut tool = DrawTool::default();
        tool.arm();
        tool.pointer_down(Point::new(32.40, 37.80));
        tool.pointer_up(Point::new(32.42, 37.80));
        assert!(tool.committed().is_some());

        tool.toggle();
        assert!(tool.committed().is_none());
        assert!(!tool.hover(Point::new(32.41, 37.80)));

        tool.pointer_down(Point::new(32.50, 37.90));
        tool.cancel();

        assert!(!tool.is_active());
        assert!(tool.committed().is_none());
        assert!(tool.preview().is_none());
    }

    #[test]
    fn clear_drops_committed_region() {
        let mut tool = DrawTool::default();
        tool.arm();
        tool.pointer_down(Point::new(32.40, 37.80));
        tool.pointer_up(Point::new(32.42, 37.80));

        tool.clear();
        assert!(tool.committed().is_none());
    }
}
