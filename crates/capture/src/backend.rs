//! Capture backends and the region fallback policy

use crate::{CaptureResult, FrameData, Rect};

/// Source of desktop pixels.
///
/// Coordinates are in desktop pixel space: `(0, 0)` is the top-left corner
/// of the virtual desktop's bounding rectangle, whatever the monitor layout.
pub trait ScreenCapture {
    /// Grab a region directly
    fn capture_region(&mut self, region: Rect) -> CaptureResult<FrameData>;

    /// Grab the whole virtual desktop
    fn capture_full_desktop(&mut self) -> CaptureResult<FrameData>;
}

impl<C: ScreenCapture + ?Sized> ScreenCapture for Box<C> {
    fn capture_region(&mut self, region: Rect) -> CaptureResult<FrameData> {
        (**self).capture_region(region)
    }

    fn capture_full_desktop(&mut self) -> CaptureResult<FrameData> {
        (**self).capture_full_desktop()
    }
}

/// Grab `region`, falling back to a full-desktop grab cropped to `region`
/// when the direct grab fails. The fallback's error is the one returned.
pub fn capture_region_or_crop<C>(capturer: &mut C, region: Rect) -> CaptureResult<FrameData>
where
    C: ScreenCapture + ?Sized,
{
    match capturer.capture_region(region) {
        Ok(frame) => Ok(frame),
        Err(e) => {
            log::warn!("Region grab failed ({}), cropping a full-desktop grab", e);
            let full = capturer.capture_full_desktop()?;
            full.crop(&region)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaptureError;

    struct Scripted {
        region_ok: bool,
        full_ok: bool,
        full_calls: usize,
    }

    impl Scripted {
        fn frame(width: u32, height: u32) -> FrameData {
            FrameData::new(vec![7; (width * height * 4) as usize], width, height).unwrap()
        }
    }

    impl ScreenCapture for Scripted {
        fn capture_region(&mut self, region: Rect) -> CaptureResult<FrameData> {
            if self.region_ok {
                Ok(Self::frame(region.width, region.height))
            } else {
                Err(CaptureError::Gdi("BitBlt failed".into()))
            }
        }

        fn capture_full_desktop(&mut self) -> CaptureResult<FrameData> {
            self.full_calls += 1;
            if self.full_ok {
                Ok(Self::frame(64, 48))
            } else {
                Err(CaptureError::Gdi("GetDC failed".into()))
            }
        }
    }

    #[test]
    fn direct_grab_skips_fallback() {
        let mut cap = Scripted { region_ok: true, full_ok: true, full_calls: 0 };
        let frame = capture_region_or_crop(&mut cap, Rect::new(4, 4, 10, 8)).unwrap();
        assert_eq!((frame.width, frame.height), (10, 8));
        assert_eq!(cap.full_calls, 0);
    }

    #[test]
    fn failed_region_falls_back_to_crop() {
        let mut cap = Scripted { region_ok: false, full_ok: true, full_calls: 0 };
        let frame = capture_region_or_crop(&mut cap, Rect::new(4, 4, 10, 8)).unwrap();
        assert_eq!((frame.width, frame.height), (10, 8));
        assert_eq!(cap.full_calls, 1);
    }

    #[test]
    fn both_failing_propagates() {
        let mut cap = Scripted { region_ok: false, full_ok: false, full_calls: 0 };
        let err = capture_region_or_crop(&mut cap, Rect::new(0, 0, 10, 10)).unwrap_err();
        assert!(matches!(err, CaptureError::Gdi(_)));
    }
}
