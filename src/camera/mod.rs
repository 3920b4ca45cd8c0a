//! Camera acquisition layer
//!
//! The capture session never talks to a device directly. It acquires a
//! [`MediaStream`] through a [`CameraBackend`], and backends are probed in
//! a fixed order at context construction (see [`crate::capability`]).
//! This keeps the vendor-specific acquisition primitives behind one
//! normalized reference, and lets tests swap in a scripted backend.
//!
//! ## Components
//!
//! - [`CameraBackend`] - Named acquisition strategy (probe + acquire)
//! - [`MediaStream`] - Exclusively-owned live stream handle
//! - [`StreamConstraints`] - What the session asks the backend for

use crate::error::Result;
use async_trait::async_trait;

pub mod frame;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use frame::{PixelFormat, VideoFrame};

/// What a session requests from an acquisition backend
///
/// Mirrors the "video on, audio off" request a still-frame capture makes;
/// a still capture never asks for audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Request a video track
    pub video: bool,
    /// Request an audio track
    pub audio: bool,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

/// A named camera acquisition strategy
///
/// Backends are probed in a fixed preference order; the first one whose
/// `probe()` succeeds becomes the context's normalized acquisition
/// reference for all sessions.
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Stable backend name, used in logs and capability reports
    fn name(&self) -> &str;

    /// Cheap availability check, run once at context construction
    ///
    /// Must not acquire the camera or prompt the user.
    fn probe(&self) -> bool;

    /// Acquire a live camera stream
    ///
    /// The returned handle is exclusively owned by one capture session and
    /// must be stopped exactly once on session teardown.
    async fn acquire(&self, constraints: StreamConstraints) -> Result<Box<dyn MediaStream>>;
}

/// A live camera stream owned by exactly one capture session
#[async_trait]
pub trait MediaStream: Send {
    /// Wait until the stream is ready to render, returning the intrinsic
    /// `(width, height)` of the media
    ///
    /// The intrinsic dimensions are unknown before this resolves; the
    /// session derives the preview frame height from them exactly once.
    async fn ready(&mut self) -> Result<(u32, u32)>;

    /// Grab the current frame
    ///
    /// Only valid after [`ready`](MediaStream::ready) has resolved.
    fn capture_frame(&mut self) -> Result<VideoFrame>;

    /// Release the underlying device
    ///
    /// May fail on an already-stopped or erroring stream; the session
    /// swallows the error so teardown never propagates a secondary
    /// failure.
    fn stop(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints_are_video_only() {
        let constraints = StreamConstraints::default();
        assert!(constraints.video);
        assert!(!constraints.audio);
    }
}
