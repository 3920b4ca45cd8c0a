//! Session configuration
//!
//! Options for a single capture session. Everything has a working default
//! except the pieces that are inherently caller-supplied: mirror
//! surfaces, the submission endpoint, and the anchor node for anchored
//! chrome. Validation happens up front, before any camera stream is
//! acquired, so a misconfigured session fails without ever touching
//! hardware.

use crate::payload::{FormPayload, ReturnDataType};
use crate::presentation::{NodeId, PresentationMode};
use crate::surface::SharedSurface;
use crate::{error::CaptureError, DEFAULT_POST_FIELD_NAME};
use std::fmt;
use std::sync::Arc;

/// Pre-submit hook
///
/// Runs after the image is attached and before the POST; may append
/// additional form fields. An `Err` aborts the submission and surfaces
/// the message verbatim through the completion callback.
pub type BeforePostHook =
    Arc<dyn Fn(&mut FormPayload) -> std::result::Result<(), String> + Send + Sync>;

/// Options for one capture session
#[derive(Clone)]
pub struct CaptureOptions {
    /// Preview and capture width in pixels; height follows the stream's
    /// aspect ratio
    pub width: u32,
    /// Dialog title, where the chrome has a title bar
    pub dialog_title: Option<String>,
    /// Label of the take button
    pub take_text: String,
    /// Label of the cancel button
    pub cancel_text: String,
    /// Chrome strategy
    pub presentation: PresentationMode,
    /// Node the chrome mounts under; defaults to the host root
    pub parent: Option<NodeId>,
    /// Anchor node, required by anchored chrome
    pub anchor: Option<NodeId>,
    /// Caller surfaces the captured frame is mirrored onto
    pub canvases: Vec<SharedSurface>,
    /// Submission endpoint; no POST happens without one
    pub post_to: Option<String>,
    /// Multipart field name for the image
    pub post_field_name: String,
    /// Requested image format name, parsed leniently at take time
    pub post_image_format: String,
    /// How the submission response body is interpreted
    pub post_return_data_type: ReturnDataType,
    /// Pre-submit hook
    pub on_before_post: Option<BeforePostHook>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: 300,
            dialog_title: None,
            take_text: "Take it".to_string(),
            cancel_text: "Cancel".to_string(),
            presentation: PresentationMode::default(),
            parent: None,
            anchor: None,
            canvases: Vec::new(),
            post_to: None,
            post_field_name: DEFAULT_POST_FIELD_NAME.to_string(),
            post_image_format: "png".to_string(),
            post_return_data_type: ReturnDataType::default(),
            on_before_post: None,
        }
    }
}

impl fmt::Debug for CaptureOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureOptions")
            .field("width", &self.width)
            .field("dialog_title", &self.dialog_title)
            .field("take_text", &self.take_text)
            .field("cancel_text", &self.cancel_text)
            .field("presentation", &self.presentation)
            .field("parent", &self.parent)
            .field("anchor", &self.anchor)
            .field("canvases", &self.canvases.len())
            .field("post_to", &self.post_to)
            .field("post_field_name", &self.post_field_name)
            .field("post_image_format", &self.post_image_format)
            .field("post_return_data_type", &self.post_return_data_type)
            .field("on_before_post", &self.on_before_post.is_some())
            .finish()
    }
}

impl CaptureOptions {
    /// Options with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: preview width
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Builder: dialog title
    pub fn with_dialog_title(mut self, title: impl Into<String>) -> Self {
        self.dialog_title = Some(title.into());
        self
    }

    /// Builder: chrome strategy
    pub fn with_presentation(mut self, presentation: PresentationMode) -> Self {
        self.presentation = presentation;
        self
    }

    /// Builder: anchor node for anchored chrome
    pub fn with_anchor(mut self, anchor: NodeId) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Builder: add a mirror surface
    pub fn with_canvas(mut self, canvas: SharedSurface) -> Self {
        self.canvases.push(canvas);
        self
    }

    /// Builder: submission endpoint
    pub fn with_post_to(mut self, url: impl Into<String>) -> Self {
        self.post_to = Some(url.into());
        self
    }

    /// Builder: multipart field name
    pub fn with_post_field_name(mut self, name: impl Into<String>) -> Self {
        self.post_field_name = name.into();
        self
    }

    /// Builder: requested image format name
    pub fn with_post_image_format(mut self, format: impl Into<String>) -> Self {
        self.post_image_format = format.into();
        self
    }

    /// Builder: response interpretation
    pub fn with_post_return_data_type(mut self, kind: ReturnDataType) -> Self {
        self.post_return_data_type = kind;
        self
    }

    /// Builder: pre-submit hook
    pub fn with_on_before_post(mut self, hook: BeforePostHook) -> Self {
        self.on_before_post = Some(hook);
        self
    }

    /// Fail fast on required options the chrome cannot run without
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.presentation.requires_anchor() && self.anchor.is_none() {
            return Err(CaptureError::config(
                "anchored chrome requires an anchor node",
            ));
        }
        if self.width == 0 {
            return Err(CaptureError::config("width must be nonzero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CaptureOptions::default();
        assert_eq!(options.width, 300);
        assert_eq!(options.take_text, "Take it");
        assert_eq!(options.cancel_text, "Cancel");
        assert_eq!(options.post_field_name, "image");
        assert_eq!(options.post_image_format, "png");
        assert_eq!(options.presentation, PresentationMode::Plain);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_anchored_chrome_requires_anchor() {
        let options = CaptureOptions::new().with_presentation(PresentationMode::AnchoredPopover);
        assert!(options.validate().is_err());

        let host = crate::presentation::Host::new();
        let anchor = host.create(crate::presentation::NodeKind::Container, "anchor");
        let options = options.with_anchor(anchor);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(CaptureOptions::new().with_width(0).validate().is_err());
    }
}
