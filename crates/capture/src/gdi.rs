//! Virtual desktop grabs using GDI

use crate::{CaptureError, CaptureResult, FrameData, Rect, ScreenCapture};
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC,
    GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS,
    SRCCOPY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
    SM_YVIRTUALSCREEN,
};

/// Virtual desktop bounds in screen coordinates
pub fn virtual_desktop_rect() -> Rect {
    unsafe {
        Rect::new(
            GetSystemMetrics(SM_XVIRTUALSCREEN),
            GetSystemMetrics(SM_YVIRTUALSCREEN),
            GetSystemMetrics(SM_CXVIRTUALSCREEN).max(0) as u32,
            GetSystemMetrics(SM_CYVIRTUALSCREEN).max(0) as u32,
        )
    }
}

/// GDI screen grabber
#[derive(Debug, Default)]
pub struct GdiCapture;

impl GdiCapture {
    pub fn new() -> Self {
        Self
    }

    /// Copy a screen-coordinate rectangle out of the screen DC
    fn grab(&self, screen: Rect) -> CaptureResult<FrameData> {
        if screen.is_empty() {
            return Err(CaptureError::InvalidRegion(screen));
        }
        let width = screen.width as i32;
        let height = screen.height as i32;

        unsafe {
            let screen_dc = GetDC(None);
            if screen_dc.is_invalid() {
                return Err(CaptureError::Gdi("Failed to get screen DC".into()));
            }

            let mem_dc = CreateCompatibleDC(screen_dc);
            let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
            let old_bitmap = SelectObject(mem_dc, bitmap);

            let blit = BitBlt(
                mem_dc, 0, 0, width, height, screen_dc, screen.x, screen.y, SRCCOPY,
            );

            let mut bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    biHeight: -height, // Top-down DIB
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                bmiColors: [Default::default()],
            };

            let mut data = vec![0u8; screen.width as usize * screen.height as usize * 4];
            let lines = if blit.is_ok() {
                GetDIBits(
                    mem_dc,
                    bitmap,
                    0,
                    height as u32,
                    Some(data.as_mut_ptr() as *mut _),
                    &mut bmi,
                    DIB_RGB_COLORS,
                )
            } else {
                0
            };

            SelectObject(mem_dc, old_bitmap);
            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);
            ReleaseDC(None, screen_dc);

            blit?;
            if lines == 0 {
                return Err(CaptureError::Gdi("GetDIBits copied no scan lines".into()));
            }

            FrameData::new(data, screen.width, screen.height)
        }
    }
}

impl ScreenCapture for GdiCapture {
    fn capture_region(&mut self, region: Rect) -> CaptureResult<FrameData> {
        let vd = virtual_desktop_rect();
        let local = Rect::new(0, 0, vd.width, vd.height);
        if region.is_empty() || !local.encloses(&region) {
            return Err(CaptureError::InvalidRegion(region));
        }
        self.grab(Rect::new(vd.x + region.x, vd.y + region.y, region.width, region.height))
    }

    fn capture_full_desktop(&mut self) -> CaptureResult<FrameData> {
        self.grab(virtual_desktop_rect())
    }
}
