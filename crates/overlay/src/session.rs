//! Overlay session: selection, renderer and visibility in one owner

use crate::geometry::{CursorKind, Point, Size};
use crate::render::{OverlayRenderer, RenderStyle};
use crate::screenshot::DesktopSnapshot;
use crate::selection::{SelectionLimits, SelectionState};
use crate::{OverlayError, OverlayResult};
use capture::Rect;

/// Display surface the session is presented on
pub trait OverlaySurface {
    /// Cover the desktop and bring the overlay to the front
    fn show(&mut self, size: Size);

    fn hide(&mut self);

    /// Schedule a repaint of the whole overlay
    fn redraw(&mut self);

    fn set_cursor(&mut self, cursor: CursorKind);
}

/// UI-thread owner of the session, called from the overlay window
pub trait OverlayHandler {
    fn session(&self) -> &OverlaySession;

    fn session_mut(&mut self) -> &mut OverlaySession;

    /// Queued work is waiting to be drained
    fn on_wake(&mut self, surface: &mut dyn OverlaySurface);

    /// The overlay is closing; stop background work before it is destroyed
    fn on_exit(&mut self);
}

/// All overlay state, mutated only from the UI thread
pub struct OverlaySession {
    selection: SelectionState,
    renderer: OverlayRenderer,
    visible: bool,
}

impl OverlaySession {
    /// Hidden session sized to `snapshot`
    pub fn new(snapshot: DesktopSnapshot, limits: SelectionLimits, style: RenderStyle) -> Self {
        let selection = SelectionState::new(snapshot.size(), limits);
        let renderer = OverlayRenderer::new(snapshot, style, selection.rect());
        Self {
            selection,
            renderer,
            visible: false,
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn renderer(&self) -> &OverlayRenderer {
        &self.renderer
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn desktop_size(&self) -> Size {
        self.selection.bounds()
    }

    /// Install a fresh snapshot and recenter the selection on it
    pub fn present(&mut self, snapshot: DesktopSnapshot) {
        let size = snapshot.size();
        self.renderer.set_snapshot(snapshot);
        self.selection.reset_to_default(size);
        self.refresh();
        self.visible = true;
    }

    /// Mark visible again without touching snapshot or selection
    pub fn restore(&mut self) {
        self.visible = true;
    }

    pub fn conceal(&mut self) {
        self.selection.pointer_up();
        self.visible = false;
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.selection.pointer_down(p);
        self.refresh();
    }

    /// Returns whether the overlay needs redrawing
    pub fn pointer_move(&mut self, p: Point) -> bool {
        let changed = self.selection.pointer_move(p);
        if changed {
            self.refresh();
        }
        changed
    }

    pub fn pointer_up(&mut self) {
        self.selection.pointer_up();
    }

    pub fn hover(&self, p: Point) -> Option<CursorKind> {
        self.selection.hover(p)
    }

    /// Normalized selection as a capture region, if it is large enough
    pub fn capture_region(&self) -> OverlayResult<Rect> {
        let n = self.selection.normalized();
        let limits = self.selection.limits();
        if !self.selection.is_large_enough() {
            return Err(OverlayError::SelectionTooSmall {
                width: n.width(),
                height: n.height(),
                min_width: limits.min_width(),
                min_height: limits.min_height(),
            });
        }
        Ok(Rect::new(n.x1, n.y1, n.width() as u32, n.height() as u32))
    }

    fn refresh(&mut self) {
        self.renderer.update(self.selection.rect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SelectionRect;
    use capture::FrameData;

    fn snapshot(width: u32, height: u32) -> DesktopSnapshot {
        DesktopSnapshot::new(FrameData::new(vec![0; (width * height * 4) as usize], width, height).unwrap())
    }

    fn session() -> OverlaySession {
        OverlaySession::new(snapshot(1920, 1080), SelectionLimits::default(), RenderStyle::default())
    }

    #[test]
    fn starts_hidden_with_default_selection() {
        let s = session();
        assert!(!s.is_visible());
        assert_eq!(s.capture_region().unwrap(), Rect::new(180, 180, 1560, 720));
        assert_eq!(s.renderer().frame().outline, SelectionRect::new(180, 180, 1740, 900));
    }

    #[test]
    fn pointer_drag_updates_frame() {
        let mut s = session();
        s.pointer_down(Point::new(10, 10));
        assert!(s.pointer_move(Point::new(110, 60)));
        s.pointer_up();
        assert_eq!(s.renderer().frame().outline, SelectionRect::new(10, 10, 110, 60));
        assert_eq!(s.capture_region().unwrap(), Rect::new(10, 10, 100, 50));
    }

    #[test]
    fn too_small_selection_is_rejected() {
        let mut s = session();
        s.pointer_down(Point::new(10, 10));
        s.pointer_move(Point::new(25, 200));
        s.pointer_up();
        match s.capture_region() {
            Err(OverlayError::SelectionTooSmall { width, height, .. }) => {
                assert_eq!((width, height), (15, 190));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn present_replaces_snapshot_and_recenters() {
        let mut s = session();
        s.pointer_down(Point::new(10, 10));
        s.pointer_move(Point::new(110, 60));

        s.present(snapshot(1200, 600));
        assert!(s.is_visible());
        assert!(!s.selection().is_dragging());
        assert_eq!(s.desktop_size(), Size::new(1200, 600));
        assert_eq!(s.renderer().snapshot().width(), 1200);
        assert_eq!(s.capture_region().unwrap(), Rect::new(100, 100, 1000, 400));
    }

    #[test]
    fn conceal_ends_drag() {
        let mut s = session();
        s.present(snapshot(1920, 1080));
        s.pointer_down(Point::new(960, 540));
        s.conceal();
        assert!(!s.is_visible());
        assert!(!s.selection().is_dragging());
        s.restore();
        assert!(s.is_visible());
    }
}
