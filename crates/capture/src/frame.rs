//! Captured frames and PNG encoding

use crate::{CaptureError, CaptureResult, Rect};
use image::{ImageBuffer, ImageFormat, RgbaImage};
use std::io::Cursor;

/// Top-down 32-bit BGRA pixels, as GDI hands them out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FrameData {
    /// Wrap a BGRA buffer, checking that it matches the dimensions
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> CaptureResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(CaptureError::InvalidFrame {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// Bounds of the frame in its own pixel space
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Convert BGRA data to RGBA image
    pub fn to_rgba_image(&self) -> CaptureResult<RgbaImage> {
        let mut rgba_data = self.data.clone();

        for chunk in rgba_data.chunks_exact_mut(4) {
            chunk.swap(0, 2);
            // GDI leaves the alpha byte undefined for screen DCs
            chunk[3] = 0xFF;
        }

        let actual = rgba_data.len();
        ImageBuffer::from_raw(self.width, self.height, rgba_data).ok_or(
            CaptureError::InvalidFrame {
                expected: self.width as usize * self.height as usize * 4,
                actual,
            },
        )
    }

    /// Encode as PNG bytes
    pub fn encode_png(&self) -> CaptureResult<Vec<u8>> {
        let img = self.to_rgba_image()?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Crop frame to rectangle; the rectangle must lie inside the frame
    pub fn crop(&self, rect: &Rect) -> CaptureResult<FrameData> {
        if rect.is_empty() || !self.bounds().encloses(rect) {
            return Err(CaptureError::InvalidRegion(*rect));
        }

        let src_x = rect.x as u32;
        let src_y = rect.y as u32;
        let row_bytes = rect.width as usize * 4;
        let mut cropped_data = Vec::with_capacity(row_bytes * rect.height as usize);

        for y in 0..rect.height {
            let src_offset = ((src_y + y) * self.width + src_x) as usize * 4;
            cropped_data.extend_from_slice(&self.data[src_offset..src_offset + row_bytes]);
        }

        Ok(FrameData {
            data: cropped_data,
            width: rect.width,
            height: rect.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x3 frame where each pixel's blue byte is its index
    fn indexed_frame() -> FrameData {
        let data = (0..12u8).flat_map(|i| [i, 0, 0, 0]).collect();
        FrameData::new(data, 4, 3).unwrap()
    }

    #[test]
    fn new_rejects_short_buffer() {
        let err = FrameData::new(vec![0; 10], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::InvalidFrame { expected: 16, actual: 10 }
        ));
    }

    #[test]
    fn crop_copies_rows() {
        let frame = indexed_frame();
        let cropped = frame.crop(&Rect::new(1, 1, 2, 2)).unwrap();
        assert_eq!((cropped.width, cropped.height), (2, 2));
        let blues: Vec<u8> = cropped.data.chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(blues, vec![5, 6, 9, 10]);
    }

    #[test]
    fn crop_outside_frame_fails() {
        let frame = indexed_frame();
        assert!(frame.crop(&Rect::new(3, 0, 2, 1)).is_err());
        assert!(frame.crop(&Rect::new(0, 0, 0, 1)).is_err());
    }

    #[test]
    fn rgba_swaps_channels_and_sets_alpha() {
        let frame = FrameData::new(vec![1, 2, 3, 0], 1, 1).unwrap();
        let img = frame.to_rgba_image().unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [3, 2, 1, 255]);
    }

    #[test]
    fn encode_png_writes_signature() {
        let bytes = indexed_frame().encode_png().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
