//! Presentation adapters
//!
//! The modal chrome around the live preview is pluggable: every strategy
//! satisfies the same small [`Presentation`] contract (`mount` / `show` /
//! `destroy`), and the capture session is agnostic to which one is active
//! apart from documented timing nuances (modal variants remove their
//! loading backdrop only once the stream is ready and the dialog is about
//! to display).
//!
//! ## Strategies
//!
//! - [`plain`] - Plain overlay: shadow + centered dialog
//! - [`modal`] - Framework modal chrome, v2 and v3 dialects
//! - [`dialog`] - Scripted dialog widget
//! - [`popover`] - Popover anchored to a caller-supplied node

use crate::error::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub mod dialog;
pub mod host;
pub mod modal;
pub mod plain;
pub mod popover;

pub use host::{BindingId, Host, LayoutBinding, NodeId, NodeKind};

/// A user action raised by the chrome's buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Capture the current frame
    Take,
    /// Abandon the session
    Cancel,
}

/// Channel end the chrome sends user actions into
pub type ActionSender = mpsc::UnboundedSender<UserAction>;

/// Which chrome strategy wraps the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PresentationMode {
    /// Plain overlay
    #[default]
    #[serde(rename = "")]
    Plain,
    /// Framework modal, v2 dialect
    #[serde(rename = "bs2")]
    ModalV2,
    /// Framework modal, v3 dialect
    #[serde(rename = "bs3")]
    ModalV3,
    /// Scripted dialog widget
    #[serde(rename = "jQueryUI")]
    ScriptedDialog,
    /// Popover anchored to a caller-supplied node
    #[serde(rename = "bs3popover")]
    AnchoredPopover,
}

impl PresentationMode {
    /// Whether this mode requires an anchor node
    pub fn requires_anchor(&self) -> bool {
        matches!(self, PresentationMode::AnchoredPopover)
    }
}

/// What the session asks the chrome to render
#[derive(Debug, Clone)]
pub struct ChromeSpec {
    /// Dialog title, when the chrome has a title bar
    pub title: Option<String>,
    /// Label of the take button
    pub take_text: String,
    /// Label of the cancel button
    pub cancel_text: String,
    /// Content width in pixels
    pub width: u32,
    /// Node the chrome mounts under
    pub parent: NodeId,
    /// Anchor node for anchored strategies
    pub anchor: Option<NodeId>,
}

/// Chrome strategy contract
///
/// Lifecycle: `mount` once after the stream is acquired, `show` once the
/// stream is ready to display, `destroy` exactly once from the session's
/// disposal chokepoint. `destroy` must be idempotent and remove every
/// node the chrome mounted, including detached ones.
pub trait Presentation: Send {
    /// Mount the chrome and wire its buttons to `actions`
    fn mount(&mut self, spec: &ChromeSpec, actions: ActionSender) -> Result<()>;

    /// The preview node the session renders into
    ///
    /// Only meaningful after `mount`.
    fn preview_node(&self) -> Option<NodeId>;

    /// Reveal the dialog once the stream is ready
    fn show(&mut self) -> Result<()>;

    /// Tear the chrome down; idempotent
    fn destroy(&mut self);
}

/// Build the chrome for a presentation mode
pub fn build(mode: PresentationMode, host: Host) -> Box<dyn Presentation> {
    match mode {
        PresentationMode::Plain => Box::new(plain::PlainChrome::new(host)),
        PresentationMode::ModalV2 => Box::new(modal::ModalChrome::v2(host)),
        PresentationMode::ModalV3 => Box::new(modal::ModalChrome::v3(host)),
        PresentationMode::ScriptedDialog => Box::new(dialog::ScriptedDialogChrome::new(host)),
        PresentationMode::AnchoredPopover => Box::new(popover::AnchoredPopoverChrome::new(host)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_wire_names() {
        assert_eq!(serde_json::to_string(&PresentationMode::Plain).unwrap(), "\"\"");
        assert_eq!(
            serde_json::to_string(&PresentationMode::ModalV3).unwrap(),
            "\"bs3\""
        );
        let mode: PresentationMode = serde_json::from_str("\"bs3popover\"").unwrap();
        assert_eq!(mode, PresentationMode::AnchoredPopover);
        let mode: PresentationMode = serde_json::from_str("\"jQueryUI\"").unwrap();
        assert_eq!(mode, PresentationMode::ScriptedDialog);
    }

    #[test]
    fn test_anchor_requirement() {
        assert!(PresentationMode::AnchoredPopover.requires_anchor());
        assert!(!PresentationMode::Plain.requires_anchor());
        assert!(!PresentationMode::ModalV2.requires_anchor());
    }
}
