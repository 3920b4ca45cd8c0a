//! Frame Surfaces
//!
//! A [`FrameSurface`] is the drawing surface a captured frame is rendered
//! onto: the caller-supplied mirror targets, and the internal surface the
//! encoder reads from. It owns an RGB24 pixel buffer, can be resized, can
//! have a video frame drawn into it with scaling, and exposes the export
//! primitives the encoder's strategy chain probes for.
//!
//! Export availability is modeled explicitly ([`ExportSupport`]) because
//! not every rendering host can hand out encoded files or binary blobs
//! directly; when neither is available the encoder falls back to the
//! text-encoded data-URI export, which is always present.

use crate::camera::frame::VideoFrame;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use percent_encoding::{percent_encode, AsciiSet, CONTROLS};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Shared handle to a drawing surface
///
/// The session mirrors the captured frame onto zero or more of these.
pub type SharedSurface = Arc<Mutex<FrameSurface>>;

/// Bytes that must be escaped in a percent-encoded data URI payload
const DATA_URL_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'%')
    .add(b'#')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b',');

/// Which export primitives a surface offers
///
/// Defaults to everything; tests and constrained hosts switch individual
/// primitives off to exercise the encoder's fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSupport {
    /// Surface can hand out an encoded image file directly
    pub as_file: bool,
    /// Surface can hand out an encoded binary blob directly
    pub as_blob: bool,
    /// The data-URI export is base64-marked (otherwise percent-encoded)
    pub data_url_base64: bool,
}

impl Default for ExportSupport {
    fn default() -> Self {
        Self {
            as_file: true,
            as_blob: true,
            data_url_base64: true,
        }
    }
}

/// An RGB24 drawing surface
#[derive(Debug, Clone)]
pub struct FrameSurface {
    width: u32,
    height: u32,
    /// Packed RGB24, row-major
    pixels: Vec<u8>,
    exports: ExportSupport,
}

impl FrameSurface {
    /// Create a surface with a zeroed pixel buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 3],
            exports: ExportSupport::default(),
        }
    }

    /// Create a shared surface handle
    pub fn shared(width: u32, height: u32) -> SharedSurface {
        Arc::new(Mutex::new(Self::new(width, height)))
    }

    /// Builder: restrict the available export primitives
    pub fn with_exports(mut self, exports: ExportSupport) -> Self {
        self.exports = exports;
        self
    }

    /// Surface dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Available export primitives
    pub fn exports(&self) -> ExportSupport {
        self.exports
    }

    /// Resize the surface, clearing its contents
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0u8; width as usize * height as usize * 3];
    }

    /// Read the RGB value at a pixel position
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    /// Draw a video frame into the surface, scaling to the surface size
    ///
    /// Nearest-neighbor; a still-frame preview does not warrant a
    /// resampling filter. Non-RGB frames are converted first.
    pub fn draw_frame(&mut self, frame: &VideoFrame) {
        let rgb = match frame.convert(crate::camera::PixelFormat::RGB24) {
            Some(f) => f,
            None => return,
        };
        if rgb.width == 0 || rgb.height == 0 || self.width == 0 || self.height == 0 {
            return;
        }
        for y in 0..self.height {
            let src_y = (y as u64 * rgb.height as u64 / self.height as u64) as u32;
            for x in 0..self.width {
                let src_x = (x as u64 * rgb.width as u64 / self.width as u64) as u32;
                let src = (src_y as usize * rgb.width as usize + src_x as usize) * 3;
                let dst = (y as usize * self.width as usize + x as usize) * 3;
                self.pixels[dst..dst + 3].copy_from_slice(&rgb.data[src..src + 3]);
            }
        }
    }

    /// Encode the surface pixels for a MIME type
    ///
    /// `image/jpeg` produces JPEG; anything else produces PNG.
    fn encode_pixels(&self, mime: &str) -> Option<Vec<u8>> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())?;
        let format = if mime == "image/jpeg" {
            image::ImageFormat::Jpeg
        } else {
            image::ImageFormat::Png
        };
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).ok()?;
        Some(out.into_inner())
    }

    /// Export the surface as an encoded image file, if the surface offers
    /// the file primitive
    pub fn export_file(&self, mime: &str) -> Option<Vec<u8>> {
        if !self.exports.as_file {
            return None;
        }
        self.encode_pixels(mime)
    }

    /// Export the surface as an encoded binary blob, if the surface
    /// offers the blob primitive
    pub fn export_blob(&self, mime: &str) -> Option<Vec<u8>> {
        if !self.exports.as_blob {
            return None;
        }
        self.encode_pixels(mime)
    }

    /// Export the surface as a text-encoded data URI
    ///
    /// Always available. The payload is base64-marked when the surface
    /// supports it, percent-encoded otherwise; the two forms need
    /// different decoders and mixing them up corrupts every byte.
    pub fn export_data_url(&self, mime: &str) -> Option<String> {
        let bytes = self.encode_pixels(mime)?;
        if self.exports.data_url_base64 {
            Some(format!("data:{};base64,{}", mime, BASE64.encode(&bytes)))
        } else {
            Some(format!(
                "data:{},{}",
                mime,
                percent_encode(&bytes, DATA_URL_ESCAPE)
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::frame::VideoFrame;

    #[test]
    fn test_resize_clears_pixels() {
        let mut surface = FrameSurface::new(2, 2);
        surface.pixels.fill(200);
        surface.resize(3, 3);
        assert_eq!(surface.dimensions(), (3, 3));
        assert_eq!(surface.rgb_at(0, 0), Some([0, 0, 0]));
    }

    #[test]
    fn test_draw_frame_scales_to_surface() {
        let frame = VideoFrame::solid_rgb(640, 480, [50, 100, 150]);
        let mut surface = FrameSurface::new(300, 225);
        surface.draw_frame(&frame);
        assert_eq!(surface.rgb_at(0, 0), Some([50, 100, 150]));
        assert_eq!(surface.rgb_at(299, 224), Some([50, 100, 150]));
    }

    #[test]
    fn test_data_url_base64_marker() {
        let surface = FrameSurface::new(2, 2);
        let url = surface.export_data_url("image/png").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_data_url_percent_form() {
        let surface = FrameSurface::new(2, 2).with_exports(ExportSupport {
            data_url_base64: false,
            ..Default::default()
        });
        let url = surface.export_data_url("image/png").unwrap();
        assert!(url.starts_with("data:image/png,"));
        assert!(!url.contains("base64"));
    }

    #[test]
    fn test_export_file_respects_support_flag() {
        let surface = FrameSurface::new(2, 2).with_exports(ExportSupport {
            as_file: false,
            ..Default::default()
        });
        assert!(surface.export_file("image/png").is_none());
        assert!(surface.export_blob("image/png").is_some());
    }
}
