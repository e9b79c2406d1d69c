//! Overlay frame layout and GDI rendering

use crate::geometry::{Point, SelectionRect, Size, Zone};
use crate::screenshot::DesktopSnapshot;

/// Half the side length of a handle marker
pub const HANDLE_SIZE: i32 = 8;

/// Mask opacity over the unselected desktop
pub const DIM_ALPHA: u8 = 96;

/// Visual parameters of the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    pub handle_size: i32,
    pub dim_alpha: u8,
    /// COLORREF layout, 0x00BBGGRR
    pub accent: u32,
    pub outline_width: i32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            handle_size: HANDLE_SIZE,
            dim_alpha: DIM_ALPHA,
            accent: 0x00FF_E000, // #00e0ff
            outline_width: 2,
        }
    }
}

/// Square handle centered on an edge midpoint or a corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleMarker {
    pub zone: Zone,
    pub bounds: SelectionRect,
}

/// Everything drawn over the snapshot for one selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayFrame {
    /// Above, below, left and right of the selection
    pub dim: [SelectionRect; 4],
    pub outline: SelectionRect,
    pub handles: [HandleMarker; 8],
    pub label: String,
    pub label_at: Point,
}

impl OverlayFrame {
    pub fn compose(selection: SelectionRect, desktop: Size, style: &RenderStyle) -> Self {
        let SelectionRect { x1, y1, x2, y2 } = selection.normalized();
        let Size { width, height } = desktop;

        let dim = [
            SelectionRect::new(0, 0, width, y1),
            SelectionRect::new(0, y2, width, height),
            SelectionRect::new(0, y1, x1, y2),
            SelectionRect::new(x2, y1, width, y2),
        ];

        let hs = style.handle_size;
        let outline = SelectionRect::new(x1, y1, x2, y2);
        let handles = Zone::ALL.map(|zone| {
            let c = outline.anchor(zone);
            HandleMarker {
                zone,
                bounds: SelectionRect::new(c.x - hs, c.y - hs, c.x + hs, c.y + hs),
            }
        });

        // Under the bottom-left handle, or above the top edge near the bottom
        let label_y = if y2 + hs + 20 <= height { y2 + hs + 4 } else { (y1 - hs - 20).max(0) };
        let label_at = Point::new(x1 + hs + 4, label_y);

        Self {
            dim,
            outline,
            handles,
            label: format!("{}x{}", x2 - x1, y2 - y1),
            label_at,
        }
    }
}

/// Overlay renderer
pub struct OverlayRenderer {
    snapshot: DesktopSnapshot,
    style: RenderStyle,
    frame: OverlayFrame,
}

impl OverlayRenderer {
    pub fn new(snapshot: DesktopSnapshot, style: RenderStyle, selection: SelectionRect) -> Self {
        let frame = OverlayFrame::compose(selection, snapshot.size(), &style);
        Self {
            snapshot,
            style,
            frame,
        }
    }

    /// Swap in a fresh desktop grab
    pub fn set_snapshot(&mut self, snapshot: DesktopSnapshot) {
        self.snapshot = snapshot;
    }

    /// Rebuild the frame for the current selection, replacing the old one
    pub fn update(&mut self, selection: SelectionRect) {
        self.frame = OverlayFrame::compose(selection, self.snapshot.size(), &self.style);
    }

    pub fn frame(&self) -> &OverlayFrame {
        &self.frame
    }

    pub fn snapshot(&self) -> &DesktopSnapshot {
        &self.snapshot
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }
}

#[cfg(windows)]
mod gdi {
    use super::OverlayRenderer;
    use crate::geometry::SelectionRect;
    use std::mem::size_of;
    use windows::Win32::Foundation::{COLORREF, HWND, RECT};
    use windows::Win32::Graphics::Gdi::{
        BeginPaint, BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, CreatePen,
        CreateSolidBrush, DeleteDC, DeleteObject, EndPaint, FillRect, GdiAlphaBlend,
        GetStockObject, Rectangle, SelectObject, SetBkMode, SetDIBitsToDevice, SetTextColor,
        TextOutW, AC_SRC_OVER, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, BLENDFUNCTION,
        DIB_RGB_COLORS, HDC, NULL_BRUSH, PAINTSTRUCT, PS_SOLID, SRCCOPY, TRANSPARENT,
    };

    fn to_rect(r: &SelectionRect) -> RECT {
        RECT {
            left: r.x1,
            top: r.y1,
            right: r.x2,
            bottom: r.y2,
        }
    }

    impl OverlayRenderer {
        /// Paint the whole overlay into a back buffer, then blit it
        pub fn render(&self, hwnd: HWND) {
            unsafe {
                let mut ps = PAINTSTRUCT::default();
                let hdc = BeginPaint(hwnd, &mut ps);

                let width = self.snapshot.width() as i32;
                let height = self.snapshot.height() as i32;

                let back_dc = CreateCompatibleDC(hdc);
                let back_bitmap = CreateCompatibleBitmap(hdc, width, height);
                let old_bitmap = SelectObject(back_dc, back_bitmap);

                self.draw_screenshot(back_dc);
                self.draw_mask(back_dc);
                self.draw_selection(back_dc);
                self.draw_handles(back_dc);
                self.draw_size_label(back_dc);

                let _ = BitBlt(hdc, 0, 0, width, height, back_dc, 0, 0, SRCCOPY);

                SelectObject(back_dc, old_bitmap);
                let _ = DeleteObject(back_bitmap);
                let _ = DeleteDC(back_dc);

                let _ = EndPaint(hwnd, &ps);
            }
        }

        unsafe fn draw_screenshot(&self, hdc: HDC) {
            let frame = self.snapshot.frame();
            let width = frame.width as i32;
            let height = frame.height as i32;

            let bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    biHeight: -height, // Top-down
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                bmiColors: [Default::default()],
            };

            SetDIBitsToDevice(
                hdc,
                0,
                0,
                width as u32,
                height as u32,
                0,
                0,
                0,
                height as u32,
                frame.data.as_ptr() as *const _,
                &bmi,
                DIB_RGB_COLORS,
            );
        }

        /// Blend a stretched 1x1 black pixel over each dim region
        unsafe fn draw_mask(&self, hdc: HDC) {
            let src_dc = CreateCompatibleDC(hdc);
            let src_bitmap = CreateCompatibleBitmap(hdc, 1, 1);
            let old_bitmap = SelectObject(src_dc, src_bitmap);

            let black = CreateSolidBrush(COLORREF(0));
            FillRect(src_dc, &RECT { left: 0, top: 0, right: 1, bottom: 1 }, black);
            let _ = DeleteObject(black);

            let blend = BLENDFUNCTION {
                BlendOp: AC_SRC_OVER as u8,
                BlendFlags: 0,
                SourceConstantAlpha: self.style.dim_alpha,
                AlphaFormat: 0,
            };

            for region in &self.frame.dim {
                if region.area() == 0 {
                    continue;
                }
                let _ = GdiAlphaBlend(
                    hdc,
                    region.x1,
                    region.y1,
                    region.width(),
                    region.height(),
                    src_dc,
                    0,
                    0,
                    1,
                    1,
                    blend,
                );
            }

            SelectObject(src_dc, old_bitmap);
            let _ = DeleteObject(src_bitmap);
            let _ = DeleteDC(src_dc);
        }

        unsafe fn draw_selection(&self, hdc: HDC) {
            let pen = CreatePen(PS_SOLID, self.style.outline_width, COLORREF(self.style.accent));
            let old_pen = SelectObject(hdc, pen);
            let old_brush = SelectObject(hdc, GetStockObject(NULL_BRUSH));

            let r = &self.frame.outline;
            let _ = Rectangle(hdc, r.x1, r.y1, r.x2, r.y2);

            SelectObject(hdc, old_brush);
            SelectObject(hdc, old_pen);
            let _ = DeleteObject(pen);
        }

        unsafe fn draw_handles(&self, hdc: HDC) {
            let brush = CreateSolidBrush(COLORREF(self.style.accent));
            for handle in &self.frame.handles {
                FillRect(hdc, &to_rect(&handle.bounds), brush);
            }
            let _ = DeleteObject(brush);
        }

        unsafe fn draw_size_label(&self, hdc: HDC) {
            let text: Vec<u16> = self.frame.label.encode_utf16().collect();

            SetBkMode(hdc, TRANSPARENT);
            SetTextColor(hdc, COLORREF(0x00FF_FFFF));

            let _ = TextOutW(hdc, self.frame.label_at.x, self.frame.label_at.y, &text);
        }
    }
}
