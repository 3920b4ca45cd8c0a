//! Anchored popover chrome
//!
//! Attaches the preview to a caller-supplied anchor node instead of
//! floating a dialog. The anchor is a hard requirement: the session
//! validates it before acquiring any stream, and `mount` re-checks that
//! the anchor is still alive in the tree. No centering binding; the
//! popover tracks its anchor.

use crate::error::{CaptureError, Result};
use crate::presentation::host::{Host, NodeId, NodeKind};
use crate::presentation::{ActionSender, ChromeSpec, Presentation, UserAction};
use tracing::debug;

/// Anchored popover chrome
pub struct AnchoredPopoverChrome {
    host: Host,
    popover: Option<NodeId>,
    preview: Option<NodeId>,
}

impl AnchoredPopoverChrome {
    /// Chrome over a host tree
    pub fn new(host: Host) -> Self {
        Self {
            host,
            popover: None,
            preview: None,
        }
    }
}

impl Presentation for AnchoredPopoverChrome {
    fn mount(&mut self, spec: &ChromeSpec, actions: ActionSender) -> Result<()> {
        if self.popover.is_some() {
            return Err(CaptureError::presentation("chrome already mounted"));
        }
        let anchor = spec
            .anchor
            .ok_or_else(|| CaptureError::config("anchored popover requires an anchor node"))?;
        if !self.host.contains(anchor) {
            return Err(CaptureError::config("anchor node is not mounted"));
        }

        let popover = self.host.create(NodeKind::Popover, "webcam-popover");
        self.host.append(anchor, popover);
        self.host.set_attr(popover, "visible", "false");
        if let Some(title) = &spec.title {
            self.host.set_attr(popover, "title", title.clone());
        }

        let preview = self.host.create(NodeKind::Preview, "webcam-preview");
        self.host.append(popover, preview);

        let take = self.host.create(NodeKind::Button, spec.take_text.clone());
        let cancel = self.host.create(NodeKind::Button, spec.cancel_text.clone());
        self.host.append(popover, take);
        self.host.append(popover, cancel);
        self.host.wire_click(take, actions.clone(), UserAction::Take);
        self.host.wire_click(cancel, actions, UserAction::Cancel);

        self.popover = Some(popover);
        self.preview = Some(preview);
        debug!("mounted anchored popover chrome");
        Ok(())
    }

    fn preview_node(&self) -> Option<NodeId> {
        self.preview
    }

    fn show(&mut self) -> Result<()> {
        let popover = self
            .popover
            .ok_or_else(|| CaptureError::presentation("chrome not mounted"))?;
        self.host.set_attr(popover, "visible", "true");
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(popover) = self.popover.take() {
            self.host.remove(popover);
        }
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn spec(host: &Host, anchor: Option<NodeId>) -> ChromeSpec {
        ChromeSpec {
            title: None,
            take_text: "Take it".into(),
            cancel_text: "Cancel".into(),
            width: 300,
            parent: host.root(),
            anchor,
        }
    }

    #[test]
    fn test_mount_requires_live_anchor() {
        let host = Host::new();
        let mut chrome = AnchoredPopoverChrome::new(host.clone());
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(chrome.mount(&spec(&host, None), tx.clone()).is_err());

        let anchor = host.create(NodeKind::Container, "anchor-button");
        host.append(host.root(), anchor);
        chrome.mount(&spec(&host, Some(anchor)), tx).unwrap();
        assert_eq!(host.children(anchor).len(), 1);
    }

    #[test]
    fn test_destroy_leaves_anchor_in_place() {
        let host = Host::new();
        let anchor = host.create(NodeKind::Container, "anchor-button");
        host.append(host.root(), anchor);

        let mut chrome = AnchoredPopoverChrome::new(host.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        chrome.mount(&spec(&host, Some(anchor)), tx).unwrap();
        chrome.show().unwrap();

        chrome.destroy();
        assert!(host.contains(anchor));
        assert!(host.children(anchor).is_empty());
    }
}
