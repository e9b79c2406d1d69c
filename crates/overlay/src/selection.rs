//! Interactive selection: create, move and resize with the pointer

use crate::geometry::{cursor_for, hit_test, CursorKind, HitTarget, Point, SelectionRect, Size, Zone};
use crate::{OverlayError, OverlayResult};

/// Minimum selection size
pub const MIN_SELECTION_SIZE: i32 = 20;

/// Distance from an edge that still grabs it
pub const EDGE_TOLERANCE: i32 = 6;

/// Size and hit-test limits for the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLimits {
    min_width: i32,
    min_height: i32,
    edge_tolerance: i32,
}

impl SelectionLimits {
    /// Both minimums must exceed twice the tolerance, otherwise the
    /// tolerance bands of opposite edges overlap and hits become ambiguous.
    pub fn new(min_width: i32, min_height: i32, edge_tolerance: i32) -> OverlayResult<Self> {
        if edge_tolerance <= 0 {
            return Err(OverlayError::InvalidLimits(format!(
                "edge tolerance must be positive, got {}",
                edge_tolerance
            )));
        }
        if min_width <= 2 * edge_tolerance || min_height <= 2 * edge_tolerance {
            return Err(OverlayError::InvalidLimits(format!(
                "minimum size {}x{} must exceed twice the edge tolerance ({})",
                min_width, min_height, edge_tolerance
            )));
        }
        Ok(Self {
            min_width,
            min_height,
            edge_tolerance,
        })
    }

    pub fn min_width(&self) -> i32 {
        self.min_width
    }

    pub fn min_height(&self) -> i32 {
        self.min_height
    }

    pub fn edge_tolerance(&self) -> i32 {
        self.edge_tolerance
    }
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            min_width: MIN_SELECTION_SIZE,
            min_height: MIN_SELECTION_SIZE,
            edge_tolerance: EDGE_TOLERANCE,
        }
    }
}

/// Current pointer interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Moving,
    Resizing(Zone),
    CreatingNew,
}

/// Pointer position and rectangle when the drag started
#[derive(Debug, Clone, Copy)]
struct DragOrigin {
    pointer: Point,
    rect: SelectionRect,
}

/// Selection rectangle plus the drag in progress
#[derive(Debug, Clone)]
pub struct SelectionState {
    rect: SelectionRect,
    mode: InteractionMode,
    origin: Option<DragOrigin>,
    bounds: Size,
    limits: SelectionLimits,
}

impl SelectionState {
    pub fn new(bounds: Size, limits: SelectionLimits) -> Self {
        Self {
            rect: SelectionRect::centered(bounds),
            mode: InteractionMode::Idle,
            origin: None,
            bounds,
            limits,
        }
    }

    /// Raw rectangle, possibly inverted during a create drag
    pub fn rect(&self) -> SelectionRect {
        self.rect
    }

    pub fn normalized(&self) -> SelectionRect {
        self.rect.normalized()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.mode != InteractionMode::Idle
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn limits(&self) -> SelectionLimits {
        self.limits
    }

    /// Whether the normalized rectangle meets the minimum size
    pub fn is_large_enough(&self) -> bool {
        let n = self.normalized();
        n.width() >= self.limits.min_width && n.height() >= self.limits.min_height
    }

    /// Recenter against a (possibly new) desktop size and drop any drag
    pub fn reset_to_default(&mut self, bounds: Size) {
        self.bounds = bounds;
        self.rect = SelectionRect::centered(bounds);
        self.mode = InteractionMode::Idle;
        self.origin = None;
    }

    pub fn pointer_down(&mut self, p: Point) {
        let p = p.clamped(self.bounds);
        if self.is_dragging() {
            log::debug!("pointer down during {:?}, restarting drag", self.mode);
        }

        self.origin = Some(DragOrigin {
            pointer: p,
            rect: self.rect,
        });
        self.mode = match hit_test(self.rect, p, self.limits.edge_tolerance) {
            HitTarget::Handle(zone) => InteractionMode::Resizing(zone),
            HitTarget::Body => InteractionMode::Moving,
            HitTarget::Outside => {
                self.rect = SelectionRect::at(p);
                InteractionMode::CreatingNew
            }
        };
    }

    /// Apply a drag step. Returns whether a drag is active and the overlay
    /// needs redrawing.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        let Some(origin) = self.origin else {
            return false;
        };
        let p = p.clamped(self.bounds);

        match self.mode {
            InteractionMode::Idle => return false,
            InteractionMode::Moving => {
                self.rect = self.translate(origin, p);
            }
            InteractionMode::Resizing(zone) => {
                self.rect = self.resize(origin.rect, zone, p);
            }
            InteractionMode::CreatingNew => {
                self.rect.x2 = p.x;
                self.rect.y2 = p.y;
            }
        }
        true
    }

    pub fn pointer_up(&mut self) {
        self.mode = InteractionMode::Idle;
        self.origin = None;
    }

    /// Cursor for the pointer at `p`; the drag cursor is left alone while dragging
    pub fn hover(&self, p: Point) -> Option<CursorKind> {
        if self.is_dragging() {
            return None;
        }
        Some(cursor_for(hit_test(self.rect, p, self.limits.edge_tolerance)))
    }

    /// Shift the start rectangle by the pointer delta, clamped as a unit
    fn translate(&self, origin: DragOrigin, p: Point) -> SelectionRect {
        let start = origin.rect.normalized();
        let w = start.width();
        let h = start.height();

        let moved = start.translated(p.x - origin.pointer.x, p.y - origin.pointer.y);
        let x1 = moved.x1.clamp(0, (self.bounds.width - w).max(0));
        let y1 = moved.y1.clamp(0, (self.bounds.height - h).max(0));
        SelectionRect::new(x1, y1, x1 + w, y1 + h)
    }

    /// Move the zone's edges to follow `p`, holding the opposite edges.
    ///
    /// A moving edge stops `min` short of its opposite edge. The opposite
    /// edge only gives way when the start rectangle was itself smaller than
    /// the minimum and pinned against the desktop border.
    fn resize(&self, start: SelectionRect, zone: Zone, p: Point) -> SelectionRect {
        let SelectionRect { mut x1, mut y1, mut x2, mut y2 } = start.normalized();
        let Size { width, height } = self.bounds;
        let min_w = self.limits.min_width;
        let min_h = self.limits.min_height;

        if zone.moves_top() {
            y1 = p.y.min(y2 - min_h).max(0);
            if y2 - y1 < min_h {
                y2 = (y1 + min_h).min(height);
            }
        }
        if zone.moves_bottom() {
            y2 = p.y.max(y1 + min_h).min(height);
            if y2 - y1 < min_h {
                y1 = (y2 - min_h).max(0);
            }
        }
        if zone.moves_left() {
            x1 = p.x.min(x2 - min_w).max(0);
            if x2 - x1 < min_w {
                x2 = (x1 + min_w).min(width);
            }
        }
        if zone.moves_right() {
            x2 = p.x.max(x1 + min_w).min(width);
            if x2 - x1 < min_w {
                x1 = (x2 - min_w).max(0);
            }
        }

        SelectionRect::new(x1, y1, x2, y2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP: Size = Size::new(1920, 1080);

    fn state() -> SelectionState {
        SelectionState::new(DESKTOP, SelectionLimits::default())
    }

    fn drag(s: &mut SelectionState, from: Point, path: &[Point]) {
        s.pointer_down(from);
        for p in path {
            assert!(s.pointer_move(*p));
        }
        s.pointer_up();
    }

    /// Deterministic pseudo-random points, some outside the desktop
    fn wander(seed: u32, n: usize) -> Vec<Point> {
        let mut v = seed;
        (0..n)
            .map(|_| {
                v = v.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let x = (v >> 8) as i32 % 2200 - 140;
                v = v.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let y = (v >> 8) as i32 % 1300 - 110;
                Point::new(x, y)
            })
            .collect()
    }

    #[test]
    fn limits_reject_overlapping_tolerance() {
        assert!(SelectionLimits::new(20, 20, 6).is_ok());
        assert!(SelectionLimits::new(12, 20, 6).is_err());
        assert!(SelectionLimits::new(20, 11, 6).is_err());
        assert!(SelectionLimits::new(20, 20, 0).is_err());
    }

    #[test]
    fn starts_centered_and_idle() {
        let s = state();
        assert_eq!(s.rect(), SelectionRect::new(180, 180, 1740, 900));
        assert_eq!(s.mode(), InteractionMode::Idle);
    }

    #[test]
    fn pointer_down_picks_mode() {
        let mut s = state();
        s.pointer_down(Point::new(1740, 900));
        assert_eq!(s.mode(), InteractionMode::Resizing(Zone::SE));
        s.pointer_up();

        s.pointer_down(Point::new(960, 183));
        assert_eq!(s.mode(), InteractionMode::Resizing(Zone::N));
        s.pointer_up();

        s.pointer_down(Point::new(960, 540));
        assert_eq!(s.mode(), InteractionMode::Moving);
        s.pointer_up();

        s.pointer_down(Point::new(40, 50));
        assert_eq!(s.mode(), InteractionMode::CreatingNew);
        assert_eq!(s.rect(), SelectionRect::new(40, 50, 40, 50));
        s.pointer_up();
        assert_eq!(s.mode(), InteractionMode::Idle);
    }

    #[test]
    fn se_handle_dragged_past_nw_corner_clamps() {
        let mut s = state();
        drag(&mut s, Point::new(1740, 900), &[Point::new(100, 100)]);
        assert_eq!(s.rect(), SelectionRect::new(180, 180, 200, 200));
        assert!(s.rect().is_normalized());
    }

    #[test]
    fn nw_handle_dragged_off_desktop_clamps_to_origin() {
        let mut s = state();
        drag(&mut s, Point::new(180, 180), &[Point::new(-50, -80)]);
        assert_eq!(s.rect(), SelectionRect::new(0, 0, 1740, 900));
    }

    #[test]
    fn east_resize_holds_other_edges() {
        let mut s = state();
        drag(
            &mut s,
            Point::new(1740, 540),
            &[Point::new(1800, 10), Point::new(1000, 1070), Point::new(5000, 540)],
        );
        assert_eq!(s.rect(), SelectionRect::new(180, 180, 1920, 900));
    }

    #[test]
    fn single_axis_resize_keeps_fixed_edges() {
        for (zone, grab) in [
            (Zone::N, Point::new(960, 180)),
            (Zone::S, Point::new(960, 900)),
            (Zone::E, Point::new(1740, 540)),
            (Zone::W, Point::new(180, 540)),
        ] {
            for seed in 0..20 {
                let mut s = state();
                let before = s.rect();
                s.pointer_down(grab);
                assert_eq!(s.mode(), InteractionMode::Resizing(zone));
                for p in wander(seed, 40) {
                    s.pointer_move(p);
                    let r = s.rect();
                    if zone.moves_top() || zone.moves_bottom() {
                        assert_eq!((r.x1, r.x2), (before.x1, before.x2));
                    } else {
                        assert_eq!((r.y1, r.y2), (before.y1, before.y2));
                    }
                    if !zone.moves_top() {
                        assert_eq!(r.y1, before.y1);
                    }
                    if !zone.moves_bottom() {
                        assert_eq!(r.y2, before.y2);
                    }
                    if !zone.moves_left() {
                        assert_eq!(r.x1, before.x1);
                    }
                    if !zone.moves_right() {
                        assert_eq!(r.x2, before.x2);
                    }
                }
                s.pointer_up();
            }
        }
    }

    #[test]
    fn resizing_never_drops_below_minimum() {
        let limits = SelectionLimits::default();
        for zone in Zone::ALL {
            for seed in 0..25 {
                let mut s = state();
                s.pointer_down(s.rect().anchor(zone));
                assert_eq!(s.mode(), InteractionMode::Resizing(zone));
                for p in wander(seed * 31 + 7, 50) {
                    s.pointer_move(p);
                    let n = s.normalized();
                    assert!(n.width() >= limits.min_width(), "{:?} {:?}", zone, n);
                    assert!(n.height() >= limits.min_height(), "{:?} {:?}", zone, n);
                    assert!(n.within(DESKTOP), "{:?} {:?}", zone, n);
                }
                s.pointer_up();
            }
        }
    }

    #[test]
    fn resizing_tiny_selection_at_border_grows_to_minimum() {
        let mut s = state();
        drag(&mut s, Point::new(0, 0), &[Point::new(8, 8)]);
        assert_eq!(s.rect(), SelectionRect::new(0, 0, 8, 8));

        // Top-left corner of an 8x8 selection pinned at the origin
        drag(&mut s, Point::new(0, 0), &[Point::new(0, 0)]);
        let n = s.normalized();
        assert_eq!(n, SelectionRect::new(0, 0, 20, 20));
    }

    #[test]
    fn moving_preserves_size_and_stays_inside() {
        for seed in 0..30 {
            let mut s = state();
            let w = s.rect().width();
            let h = s.rect().height();
            s.pointer_down(Point::new(960, 540));
            assert_eq!(s.mode(), InteractionMode::Moving);
            for p in wander(seed, 40) {
                s.pointer_move(p);
                let r = s.rect();
                assert_eq!((r.x2 - r.x1, r.y2 - r.y1), (w, h));
                assert!(r.within(DESKTOP));
            }
            s.pointer_up();
        }
    }

    #[test]
    fn moving_translates_by_pointer_delta() {
        let mut s = state();
        drag(&mut s, Point::new(960, 540), &[Point::new(1000, 500)]);
        assert_eq!(s.rect(), SelectionRect::new(220, 140, 1780, 860));

        drag(&mut s, Point::new(960, 540), &[Point::new(1900, 540)]);
        assert_eq!(s.rect(), SelectionRect::new(360, 140, 1920, 860));
    }

    #[test]
    fn creating_follows_pointer_without_minimum() {
        let mut s = state();
        s.pointer_down(Point::new(50, 1000));
        s.pointer_move(Point::new(10, 1070));
        assert_eq!(s.rect(), SelectionRect::new(50, 1000, 10, 1070));
        assert!(!s.rect().is_normalized());
        s.pointer_move(Point::new(-30, 2000));
        assert_eq!(s.rect(), SelectionRect::new(50, 1000, 0, 1080));
        s.pointer_up();
        assert_eq!(s.normalized(), SelectionRect::new(0, 1000, 50, 1080));
        assert!(s.is_large_enough());
    }

    #[test]
    fn resize_after_inverted_create_uses_normalized_edges() {
        let mut s = state();
        drag(&mut s, Point::new(100, 1000), &[Point::new(60, 950)]);
        assert_eq!(s.rect(), SelectionRect::new(100, 1000, 60, 950));

        // Right edge of the normalized rectangle is x = 100
        drag(&mut s, Point::new(100, 975), &[Point::new(200, 975)]);
        assert_eq!(s.rect(), SelectionRect::new(60, 950, 200, 1000));
    }

    #[test]
    fn move_while_idle_is_noop() {
        let mut s = state();
        let before = s.rect();
        assert!(!s.pointer_move(Point::new(10, 10)));
        assert_eq!(s.rect(), before);
    }

    #[test]
    fn hover_reports_cursor_only_when_idle() {
        let mut s = state();
        assert_eq!(s.hover(Point::new(960, 540)), Some(CursorKind::Move));
        assert_eq!(s.hover(Point::new(180, 540)), Some(CursorKind::SizeWE));
        assert_eq!(s.hover(Point::new(1740, 180)), Some(CursorKind::SizeNESW));
        assert_eq!(s.hover(Point::new(10, 10)), Some(CursorKind::Crosshair));

        s.pointer_down(Point::new(960, 540));
        assert_eq!(s.hover(Point::new(10, 10)), None);
    }

    #[test]
    fn reset_recenters_for_new_desktop() {
        let mut s = state();
        drag(&mut s, Point::new(10, 10), &[Point::new(40, 40)]);
        s.reset_to_default(Size::new(2560, 1440));
        assert_eq!(s.rect(), SelectionRect::new(240, 240, 2320, 1200));
        assert_eq!(s.bounds(), Size::new(2560, 1440));
    }
}
