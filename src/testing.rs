//! Test fixtures
//!
//! Scripted stand-ins for the hardware-facing traits, shared between the
//! unit tests and the integration suite. The fakes count their lifecycle
//! calls so tests can assert the session contract (acquire at most once,
//! stop exactly once) without touching a real device.

use crate::camera::{CameraBackend, MediaStream, StreamConstraints, VideoFrame};
use crate::error::{CaptureError, Result};
use crate::payload::Notifier;
use crate::presentation::Host;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted camera backend
///
/// Hands out [`FakeStream`]s with a fixed intrinsic size and frame color.
pub struct FakeBackend {
    name: &'static str,
    usable: bool,
    acquire_fails: bool,
    intrinsic: (u32, u32),
    color: [u8; 3],
    acquires: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl FakeBackend {
    /// Usable backend with a 640x480 stream of a single color
    pub fn new() -> Self {
        Self {
            name: "fake",
            usable: true,
            acquire_fails: false,
            intrinsic: (640, 480),
            color: [40, 120, 200],
            acquires: Arc::new(AtomicUsize::new(0)),
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Builder: probe outcome
    pub fn with_usable(mut self, usable: bool) -> Self {
        self.usable = usable;
        self
    }

    /// Builder: make every acquisition fail
    pub fn with_acquire_failure(mut self) -> Self {
        self.acquire_fails = true;
        self
    }

    /// Builder: intrinsic stream dimensions
    pub fn with_intrinsic(mut self, width: u32, height: u32) -> Self {
        self.intrinsic = (width, height);
        self
    }

    /// Builder: solid frame color
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// How many times `acquire` was called
    pub fn acquire_count(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    /// How many times a handed-out stream was stopped
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraBackend for FakeBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn probe(&self) -> bool {
        self.usable
    }

    async fn acquire(&self, _constraints: StreamConstraints) -> Result<Box<dyn MediaStream>> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        if self.acquire_fails {
            return Err(CaptureError::acquisition("scripted acquisition failure"));
        }
        Ok(Box::new(FakeStream {
            intrinsic: self.intrinsic,
            color: self.color,
            stopped: false,
            stops: self.stops.clone(),
        }))
    }
}

/// Scripted media stream producing solid-color frames
pub struct FakeStream {
    intrinsic: (u32, u32),
    color: [u8; 3],
    stopped: bool,
    stops: Arc<AtomicUsize>,
}

#[async_trait]
impl MediaStream for FakeStream {
    async fn ready(&mut self) -> Result<(u32, u32)> {
        Ok(self.intrinsic)
    }

    fn capture_frame(&mut self) -> Result<VideoFrame> {
        if self.stopped {
            return Err(CaptureError::stream("stream already stopped"));
        }
        Ok(VideoFrame::solid_rgb(
            self.intrinsic.0,
            self.intrinsic.1,
            self.color,
        ))
    }

    fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Err(CaptureError::stream("stream already stopped"));
        }
        self.stopped = true;
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Notifier that records every alert
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All alerts in arrival order
    pub fn alerts(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}

/// Wait until a predicate over the host tree holds
///
/// Rechecks on every tree mutation; gives up after two seconds and
/// returns whether the predicate held.
pub async fn wait_for_host<F>(host: &Host, predicate: F) -> bool
where
    F: Fn(&Host) -> bool,
{
    let mut rx = host.subscribe();
    if predicate(host) {
        return true;
    }
    loop {
        match tokio::time::timeout(Duration::from_secs(2), rx.changed()).await {
            Ok(Ok(())) => {
                if predicate(host) {
                    return true;
                }
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PixelFormat;
    use crate::presentation::NodeKind;

    #[tokio::test]
    async fn test_fake_stream_lifecycle() {
        let backend = FakeBackend::new().with_intrinsic(320, 240);
        let mut stream = backend
            .acquire(StreamConstraints::default())
            .await
            .unwrap();
        assert_eq!(stream.ready().await.unwrap(), (320, 240));

        let frame = stream.capture_frame().unwrap();
        assert_eq!(frame.width, 320);
        assert_eq!(frame.format, PixelFormat::RGB24);

        stream.stop().unwrap();
        assert!(stream.stop().is_err());
        assert_eq!(backend.stop_count(), 1);
    }

    #[tokio::test]
    async fn test_wait_for_host_sees_mutations() {
        let host = Host::new();
        let waiter = {
            let host = host.clone();
            tokio::spawn(async move {
                wait_for_host(&host, |h| h.find_by_label("late").is_some()).await
            })
        };
        tokio::task::yield_now().await;
        let node = host.create(NodeKind::Container, "late");
        host.append(host.root(), node);
        assert!(waiter.await.unwrap());
    }
}
