//! webcam-capture-core
//!
//! Still-frame webcam capture sessions with pluggable presentation
//! chrome and multipart submission.
//!
//! ## Architecture
//!
//! A [`CaptureContext`] is built once by probing camera backends in
//! preference order; each call to [`go`] then runs one session: acquire
//! a stream, show a live preview inside one of several chrome
//! strategies, and on "take" mirror the frame onto caller surfaces and
//! optionally POST it as a multipart form.
//!
//! ### Modules
//!
//! - `camera`: Acquisition backends and media streams
//! - `capability`: One-shot capability detection and the capture context
//! - `surface`: RGB drawing surfaces and export primitives
//! - `encoder`: Image encoding with an ordered extraction fallback chain
//! - `payload`: Multipart form payloads and submission
//! - `presentation`: Host tree and chrome strategies
//! - `session`: The capture session state machine and flow
//!
//! ## Example
//!
//! ```rust,no_run
//! use webcam_capture_core::{go, CaptureContext, CaptureOptions, Host};
//!
//! # async fn run() {
//! let ctx = CaptureContext::with_default_backends();
//! let host = Host::new();
//! let result = go(&ctx, &host, CaptureOptions::new().with_width(320)).await;
//! println!("outcome: {:?}", result.code);
//! # }
//! ```

// Re-export commonly used types
pub use capability::{Capability, CaptureContext};
pub use error::{CaptureError, Result};
pub use payload::{FormPayload, Notifier, ResponseBody, ReturnDataType};
pub use presentation::{Host, NodeId, NodeKind, PresentationMode};
pub use session::{go, go_with, CaptureOptions, CaptureResult, ResultCode, SessionState};
pub use surface::{ExportSupport, FrameSurface, SharedSurface};

// Public modules
pub mod camera;
pub mod capability;
pub mod encoder;
pub mod error;
pub mod payload;
pub mod presentation;
pub mod session;
pub mod surface;
pub mod testing;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default multipart field name for the captured image
pub const DEFAULT_POST_FIELD_NAME: &str = "image";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_field_name() {
        assert_eq!(DEFAULT_POST_FIELD_NAME, "image");
        assert_eq!(CaptureOptions::default().post_field_name, "image");
    }
}
