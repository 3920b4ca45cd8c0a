//! V4L2 Capture Backend
//!
//! Acquires still-capture streams from Video4Linux capture devices
//! (`/dev/video*`). Frames arrive as YUYV and are converted to RGB24 for
//! the preview surface.
//!
//! ## Prerequisites
//!
//! The user must have read access to the device node, typically by being
//! in the `video` group.

use crate::camera::frame::{PixelFormat, VideoFrame};
use crate::camera::{CameraBackend, MediaStream, StreamConstraints};
use crate::error::{CaptureError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

/// Default capture device path
pub const DEFAULT_DEVICE: &str = "/dev/video0";

/// V4L2 camera acquisition backend
///
/// Probes for the configured device node; acquisition opens the device,
/// negotiates YUYV, and hands the session an exclusively-owned stream.
pub struct V4l2Backend {
    /// Device path (e.g. /dev/video0)
    path: PathBuf,
}

impl V4l2Backend {
    /// Create a backend for a specific device path
    pub fn new(device_path: impl Into<PathBuf>) -> Self {
        Self {
            path: device_path.into(),
        }
    }

    /// Backend for the default capture device
    pub fn default_device() -> Self {
        Self::new(DEFAULT_DEVICE)
    }
}

#[async_trait]
impl CameraBackend for V4l2Backend {
    fn name(&self) -> &str {
        "v4l2"
    }

    fn probe(&self) -> bool {
        // Existence only; opening the device may prompt or block, and a
        // probe must never touch the camera.
        self.path.exists()
    }

    async fn acquire(&self, constraints: StreamConstraints) -> Result<Box<dyn MediaStream>> {
        if !constraints.video {
            return Err(CaptureError::acquisition("video track not requested"));
        }

        info!("Opening V4L2 capture device {}", self.path.display());

        let device = Device::with_path(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                CaptureError::acquisition(format!(
                    "permission denied for {}, try adding user to 'video' group",
                    self.path.display()
                ))
            } else {
                CaptureError::acquisition(e.to_string())
            }
        })?;

        let mut fmt = device
            .format()
            .map_err(|e| CaptureError::acquisition(e.to_string()))?;
        fmt.fourcc = FourCC::new(b"YUYV");
        let fmt = device
            .set_format(&fmt)
            .map_err(|e| CaptureError::acquisition(e.to_string()))?;
        if &fmt.fourcc.repr != b"YUYV" {
            warn!("Device did not accept YUYV, got {}", fmt.fourcc);
            return Err(CaptureError::acquisition(format!(
                "device only offers unsupported format {}",
                fmt.fourcc
            )));
        }

        debug!("Negotiated capture format {}x{}", fmt.width, fmt.height);

        Ok(Box::new(V4l2Stream {
            width: fmt.width,
            height: fmt.height,
            device: Some(device),
            frames_captured: 0,
        }))
    }
}

/// Live V4L2 capture stream
///
/// Holds the opened device for the session's lifetime; each frame grab
/// maps a short-lived buffer stream, which keeps the handle free of
/// self-referential borrows and releases the mmap buffers between grabs.
pub struct V4l2Stream {
    width: u32,
    height: u32,
    device: Option<Device>,
    frames_captured: u64,
}

#[async_trait]
impl MediaStream for V4l2Stream {
    async fn ready(&mut self) -> Result<(u32, u32)> {
        if self.device.is_none() {
            return Err(CaptureError::stream("stream already stopped"));
        }
        // Format negotiation already pinned the intrinsic size.
        Ok((self.width, self.height))
    }

    fn capture_frame(&mut self) -> Result<VideoFrame> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| CaptureError::stream("stream already stopped"))?;

        let mut stream = MmapStream::with_buffers(device, Type::VideoCapture, 4)
            .map_err(|e| CaptureError::stream(e.to_string()))?;
        let (data, _meta) = stream
            .next()
            .map_err(|e| CaptureError::stream(e.to_string()))?;

        let raw = VideoFrame::from_data(self.width, self.height, PixelFormat::YUYV, data.to_vec());
        self.frames_captured += 1;

        raw.convert(PixelFormat::RGB24)
            .ok_or_else(|| CaptureError::stream("YUYV conversion failed"))
    }

    fn stop(&mut self) -> Result<()> {
        if self.device.take().is_some() {
            info!(
                "Stopped V4L2 stream (captured {} frames)",
                self.frames_captured
            );
        }
        Ok(())
    }
}

impl Drop for V4l2Stream {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_missing_device() {
        let backend = V4l2Backend::new("/dev/video-nonexistent-for-test");
        assert!(!backend.probe());
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(V4l2Backend::default_device().name(), "v4l2");
    }
}
