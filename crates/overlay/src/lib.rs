//! Overlay module for Snapcrop
//!
//! Provides the frozen desktop overlay with an adjustable selection rectangle.

pub mod dispatch;
pub mod geometry;
pub mod render;
pub mod screenshot;
pub mod selection;
pub mod session;
#[cfg(windows)]
pub mod window;

pub use dispatch::{Followup, HandlerSlot};
pub use geometry::{CursorKind, HitTarget, Point, SelectionRect, Size, Zone};
pub use render::{OverlayFrame, OverlayRenderer, RenderStyle};
pub use screenshot::DesktopSnapshot;
pub use selection::{InteractionMode, SelectionLimits, SelectionState};
pub use session::{OverlayHandler, OverlaySession, OverlaySurface};
#[cfg(windows)]
pub use window::OverlayWindow;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Invalid selection limits: {0}")]
    InvalidLimits(String),

    #[error("Selection {width}x{height} is smaller than {min_width}x{min_height}")]
    SelectionTooSmall {
        width: i32,
        height: i32,
        min_width: i32,
        min_height: i32,
    },
}

pub type OverlayResult<T> = Result<T, OverlayError>;
