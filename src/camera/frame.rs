//! Video Frame Types
//!
//! Defines the frame buffer and pixel format types the capture pipeline
//! moves around.

use std::fmt;

/// Pixel format for video frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// YUYV (YUV 4:2:2 packed) - Common capture-device format
    YUYV,
    /// RGB24 (8 bits per channel, packed)
    RGB24,
    /// RGBA32 (8 bits per channel with alpha, packed)
    RGBA32,
}

impl PixelFormat {
    /// Calculate the buffer size needed for a frame
    pub fn buffer_size(&self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            PixelFormat::YUYV => pixels * 2,   // 2 bytes per pixel
            PixelFormat::RGB24 => pixels * 3,  // 3 bytes per pixel
            PixelFormat::RGBA32 => pixels * 4, // 4 bytes per pixel
        }
    }

    /// Get bytes per pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::YUYV => 2,
            PixelFormat::RGB24 => 3,
            PixelFormat::RGBA32 => 4,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::YUYV => write!(f, "YUYV (YUV 4:2:2 packed)"),
            PixelFormat::RGB24 => write!(f, "RGB24"),
            PixelFormat::RGBA32 => write!(f, "RGBA32"),
        }
    }
}

/// A single captured video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: PixelFormat,
    /// Frame data buffer
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Create a new frame with a zeroed buffer
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let size = format.buffer_size(width, height);
        Self {
            width,
            height,
            format,
            data: vec![0u8; size],
        }
    }

    /// Create a frame from existing data
    pub fn from_data(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Create an RGB24 frame filled with a single color
    ///
    /// Used by scripted camera backends and tests.
    pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgb);
        }
        Self::from_data(width, height, PixelFormat::RGB24, data)
    }

    /// Read the RGB value at a pixel position
    ///
    /// Returns `None` for non-RGB formats or out-of-bounds positions.
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * self.format.bytes_per_pixel();
        match self.format {
            PixelFormat::RGB24 | PixelFormat::RGBA32 => {
                Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
            }
            PixelFormat::YUYV => None,
        }
    }

    /// Convert the frame to a different pixel format
    ///
    /// Currently supports:
    /// - YUYV → RGB24
    /// - RGBA32 → RGB24
    pub fn convert(&self, target_format: PixelFormat) -> Option<VideoFrame> {
        match (self.format, target_format) {
            (PixelFormat::YUYV, PixelFormat::RGB24) => Some(self.yuyv_to_rgb24()),
            (PixelFormat::RGBA32, PixelFormat::RGB24) => Some(self.rgba_to_rgb24()),
            (a, b) if a == b => Some(self.clone()),
            _ => None,
        }
    }

    /// Convert YUYV to RGB24 (BT.601)
    fn yuyv_to_rgb24(&self) -> VideoFrame {
        let width = self.width as usize;
        let height = self.height as usize;
        let mut rgb = vec![0u8; width * height * 3];

        for y in 0..height {
            for x in 0..(width / 2) {
                let src = y * width * 2 + x * 4;
                let y0 = self.data[src] as f32;
                let u = self.data[src + 1] as f32 - 128.0;
                let y1 = self.data[src + 2] as f32;
                let v = self.data[src + 3] as f32 - 128.0;

                let dst = y * width * 3 + x * 6;
                for (i, luma) in [y0, y1].into_iter().enumerate() {
                    let r = luma + 1.402 * v;
                    let g = luma - 0.344 * u - 0.714 * v;
                    let b = luma + 1.772 * u;
                    rgb[dst + i * 3] = r.clamp(0.0, 255.0) as u8;
                    rgb[dst + i * 3 + 1] = g.clamp(0.0, 255.0) as u8;
                    rgb[dst + i * 3 + 2] = b.clamp(0.0, 255.0) as u8;
                }
            }
        }

        VideoFrame::from_data(self.width, self.height, PixelFormat::RGB24, rgb)
    }

    /// Drop the alpha channel
    fn rgba_to_rgb24(&self) -> VideoFrame {
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.data.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }
        VideoFrame::from_data(self.width, self.height, PixelFormat::RGB24, rgb)
    }
}
