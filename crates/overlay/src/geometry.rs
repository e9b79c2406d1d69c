//! Rectangle math and hit testing for the selection

/// Point in desktop pixel space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Clamp into `[0, size.width] x [0, size.height]`
    pub fn clamped(self, size: Size) -> Self {
        Self {
            x: self.x.clamp(0, size.width.max(0)),
            y: self.y.clamp(0, size.height.max(0)),
        }
    }
}

/// Desktop dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Selection rectangle by corners; `x1 > x2` or `y1 > y2` is allowed
/// while a new selection is being dragged out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl SelectionRect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Zero-size rectangle at `p`
    pub const fn at(p: Point) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    /// Default selection: inset from every side by `min(W, H) / 6`
    pub fn centered(size: Size) -> Self {
        let margin = size.width.min(size.height) / 6;
        Self::new(margin, margin, size.width - margin, size.height - margin)
    }

    pub fn normalized(&self) -> Self {
        normalize(*self)
    }

    /// Width of the normalized rectangle
    pub fn width(&self) -> i32 {
        (self.x2 - self.x1).abs()
    }

    /// Height of the normalized rectangle
    pub fn height(&self) -> i32 {
        (self.y2 - self.y1).abs()
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    #[cfg(test)]
    pub fn is_normalized(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Whether the normalized rectangle lies inside `[0, W] x [0, H]`
    #[cfg(test)]
    pub fn within(&self, size: Size) -> bool {
        let n = self.normalized();
        n.x1 >= 0 && n.y1 >= 0 && n.x2 <= size.width && n.y2 <= size.height
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// Handle anchor for each zone of the normalized rectangle
    pub fn anchor(&self, zone: Zone) -> Point {
        let n = self.normalized();
        let cx = (n.x1 + n.x2) / 2;
        let cy = (n.y1 + n.y2) / 2;
        match zone {
            Zone::NW => Point::new(n.x1, n.y1),
            Zone::N => Point::new(cx, n.y1),
            Zone::NE => Point::new(n.x2, n.y1),
            Zone::E => Point::new(n.x2, cy),
            Zone::SE => Point::new(n.x2, n.y2),
            Zone::S => Point::new(cx, n.y2),
            Zone::SW => Point::new(n.x1, n.y2),
            Zone::W => Point::new(n.x1, cy),
        }
    }
}

/// Resize zone: one of the four edges or four corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Zone {
    /// Clockwise from the top-left corner
    pub const ALL: [Zone; 8] = [
        Zone::NW,
        Zone::N,
        Zone::NE,
        Zone::E,
        Zone::SE,
        Zone::S,
        Zone::SW,
        Zone::W,
    ];

    pub fn moves_top(self) -> bool {
        matches!(self, Zone::N | Zone::NE | Zone::NW)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Zone::S | Zone::SE | Zone::SW)
    }

    pub fn moves_left(self) -> bool {
        matches!(self, Zone::W | Zone::NW | Zone::SW)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Zone::E | Zone::NE | Zone::SE)
    }

    #[cfg(test)]
    pub fn is_corner(self) -> bool {
        matches!(self, Zone::NE | Zone::NW | Zone::SE | Zone::SW)
    }
}

/// What lies under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Handle(Zone),
    Body,
    Outside,
}

/// Cursor shapes the overlay shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorKind {
    #[default]
    Crosshair,
    Move,
    SizeNS,
    SizeWE,
    SizeNESW,
    SizeNWSE,
}

pub fn normalize(rect: SelectionRect) -> SelectionRect {
    SelectionRect {
        x1: rect.x1.min(rect.x2),
        y1: rect.y1.min(rect.y2),
        x2: rect.x1.max(rect.x2),
        y2: rect.y1.max(rect.y2),
    }
}

/// Inclusive containment test on the normalized rectangle
pub fn point_in_rect(rect: SelectionRect, p: Point) -> bool {
    let n = normalize(rect);
    n.x1 <= p.x && p.x <= n.x2 && n.y1 <= p.y && p.y <= n.y2
}

/// Edge or corner within `tolerance` of `p`.
///
/// An edge counts as near when `p` is within `tolerance` of the edge
/// segment, extended by `tolerance` past both ends. Corners win over edges.
/// Ambiguous hits only occur when the rectangle is narrower than
/// `2 * tolerance`; the fixed precedence NW, NE, SE, SW, N, S, W, E keeps
/// them deterministic.
pub fn edge_hit(rect: SelectionRect, p: Point, tolerance: i32) -> Option<Zone> {
    let n = normalize(rect);
    let tol = tolerance;
    let in_x_span = p.x >= n.x1 - tol && p.x <= n.x2 + tol;
    let in_y_span = p.y >= n.y1 - tol && p.y <= n.y2 + tol;

    let near_left = in_y_span && (p.x - n.x1).abs() <= tol;
    let near_right = in_y_span && (p.x - n.x2).abs() <= tol;
    let near_top = in_x_span && (p.y - n.y1).abs() <= tol;
    let near_bottom = in_x_span && (p.y - n.y2).abs() <= tol;

    match (near_top, near_bottom, near_left, near_right) {
        (true, _, true, _) => Some(Zone::NW),
        (true, _, _, true) => Some(Zone::NE),
        (_, true, _, true) => Some(Zone::SE),
        (_, true, true, _) => Some(Zone::SW),
        (true, _, _, _) => Some(Zone::N),
        (_, true, _, _) => Some(Zone::S),
        (_, _, true, _) => Some(Zone::W),
        (_, _, _, true) => Some(Zone::E),
        _ => None,
    }
}

/// Classify `p`: a resize zone first, then the rectangle body
pub fn hit_test(rect: SelectionRect, p: Point, tolerance: i32) -> HitTarget {
    if let Some(zone) = edge_hit(rect, p, tolerance) {
        HitTarget::Handle(zone)
    } else if point_in_rect(rect, p) {
        HitTarget::Body
    } else {
        HitTarget::Outside
    }
}

pub fn cursor_for(target: HitTarget) -> CursorKind {
    match target {
        HitTarget::Handle(Zone::N | Zone::S) => CursorKind::SizeNS,
        HitTarget::Handle(Zone::E | Zone::W) => CursorKind::SizeWE,
        HitTarget::Handle(Zone::NE | Zone::SW) => CursorKind::SizeNESW,
        HitTarget::Handle(Zone::NW | Zone::SE) => CursorKind::SizeNWSE,
        HitTarget::Body => CursorKind::Move,
        HitTarget::Outside => CursorKind::Crosshair,
    }
}
