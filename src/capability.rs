//! Capability Detection and the Capture Context
//!
//! Whether the host can capture at all is decided once, at context
//! construction: an ordered list of camera acquisition backends is probed
//! and the first usable one becomes the context's normalized acquisition
//! reference; binary multipart form support is checked alongside. The
//! result lives in an explicit [`CaptureContext`] handed to every
//! session - never in process-global state - so tests can inject a fake
//! capability outcome.

use crate::camera::CameraBackend;
use crate::encoder::Encoder;
use crate::payload::{Notifier, TracingNotifier};
use std::sync::Arc;
use tracing::{debug, info};

/// One-shot capability probe result
///
/// Immutable after detection. If `supported()` is false no session may
/// acquire a camera stream.
#[derive(Debug, Clone)]
pub struct Capability {
    backend_name: Option<String>,
    form_support: bool,
}

impl Capability {
    /// Probe backends in preference order
    fn detect(backends: &[Arc<dyn CameraBackend>], form_support: bool) -> Self {
        let mut backend_name = None;
        for backend in backends {
            let usable = backend.probe();
            debug!(backend = backend.name(), usable, "probed camera backend");
            if usable {
                backend_name = Some(backend.name().to_string());
                break;
            }
        }
        Self {
            backend_name,
            form_support,
        }
    }

    /// Whether a capture session can run at all
    pub fn supported(&self) -> bool {
        self.backend_name.is_some() && self.form_support
    }

    /// Name of the backend that answered the probe
    pub fn backend_name(&self) -> Option<&str> {
        self.backend_name.as_deref()
    }

    /// Whether binary multipart payloads can be represented
    pub fn form_support(&self) -> bool {
        self.form_support
    }
}

/// Shared context for capture sessions
///
/// Owns the capability result, the chosen acquisition backend, the image
/// encoder, the notification sink, and the HTTP client. Cheap to share by
/// reference; sessions never mutate it.
pub struct CaptureContext {
    capability: Capability,
    backend: Option<Arc<dyn CameraBackend>>,
    encoder: Encoder,
    notifier: Arc<dyn Notifier>,
    http: reqwest::Client,
}

impl CaptureContext {
    /// Build a context by probing the given backends in order
    pub fn detect(backends: Vec<Arc<dyn CameraBackend>>) -> Self {
        // Native builds always carry a binary multipart representation;
        // the flag exists so tests can model hosts that do not.
        let capability = Capability::detect(&backends, true);
        let backend = capability
            .backend_name()
            .and_then(|name| backends.into_iter().find(|b| b.name() == name));

        match capability.backend_name() {
            Some(name) => info!(backend = name, "capture capability detected"),
            None => info!("no usable camera backend, capture unsupported"),
        }

        Self {
            capability,
            backend,
            encoder: Encoder::new(),
            notifier: Arc::new(TracingNotifier),
            http: reqwest::Client::new(),
        }
    }

    /// Context with the built-in backend list
    ///
    /// Currently the V4L2 backend when the `v4l2` feature is enabled;
    /// otherwise no backends, which yields an unsupported context.
    pub fn with_default_backends() -> Self {
        #[allow(unused_mut)]
        let mut backends: Vec<Arc<dyn CameraBackend>> = Vec::new();
        #[cfg(feature = "v4l2")]
        backends.push(Arc::new(crate::camera::v4l2::V4l2Backend::default_device()));
        Self::detect(backends)
    }

    /// Builder: replace the notification sink
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Builder: replace the image encoder
    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Builder: override the multipart support flag (tests)
    pub fn with_form_support(mut self, form_support: bool) -> Self {
        self.capability.form_support = form_support;
        self
    }

    /// Pure capability query
    pub fn is_supported(&self) -> bool {
        self.capability.supported()
    }

    /// The capability probe result
    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// The normalized acquisition backend, if any
    pub fn backend(&self) -> Option<&Arc<dyn CameraBackend>> {
        self.backend.as_ref()
    }

    /// The image encoder
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// The notification sink
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// The HTTP client used for submissions
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{MediaStream, StreamConstraints};
    use crate::error::{CaptureError, Result};
    use async_trait::async_trait;

    struct StubBackend {
        name: &'static str,
        usable: bool,
    }

    #[async_trait]
    impl CameraBackend for StubBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn probe(&self) -> bool {
            self.usable
        }

        async fn acquire(&self, _: StreamConstraints) -> Result<Box<dyn MediaStream>> {
            Err(CaptureError::acquisition("stub"))
        }
    }

    #[test]
    fn test_first_usable_backend_wins() {
        let ctx = CaptureContext::detect(vec![
            Arc::new(StubBackend {
                name: "first",
                usable: false,
            }),
            Arc::new(StubBackend {
                name: "second",
                usable: true,
            }),
            Arc::new(StubBackend {
                name: "third",
                usable: true,
            }),
        ]);
        assert!(ctx.is_supported());
        assert_eq!(ctx.capability().backend_name(), Some("second"));
        assert_eq!(ctx.backend().unwrap().name(), "second");
    }

    #[test]
    fn test_no_backend_means_unsupported() {
        let ctx = CaptureContext::detect(vec![]);
        assert!(!ctx.is_supported());
        assert!(ctx.backend().is_none());
    }

    #[test]
    fn test_missing_form_support_means_unsupported() {
        let ctx = CaptureContext::detect(vec![Arc::new(StubBackend {
            name: "cam",
            usable: true,
        })])
        .with_form_support(false);
        assert!(!ctx.is_supported());
    }
}
