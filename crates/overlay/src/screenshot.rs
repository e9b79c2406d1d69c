//! Frozen desktop image behind the overlay

use crate::geometry::Size;
use capture::FrameData;

/// Desktop grab shown under the dimming mask. Replaced, never mutated,
/// each time the overlay is shown.
#[derive(Debug, Clone)]
pub struct DesktopSnapshot {
    frame: FrameData,
}

impl DesktopSnapshot {
    pub fn new(frame: FrameData) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &FrameData {
        &self.frame
    }

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    /// Desktop size as the selection sees it
    pub fn size(&self) -> Size {
        Size::new(self.frame.width as i32, self.frame.height as i32)
    }
}
