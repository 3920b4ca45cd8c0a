//! Scripted dialog widget chrome
//!
//! Wraps the preview in a dialog driven by a scripted widget API: the
//! dialog node mounts closed, `show` flips the widget open, and `destroy`
//! issues the widget's own destroy call before removing the node. The
//! widget manages its own centering, so no layout binding is registered.

use crate::error::{CaptureError, Result};
use crate::presentation::host::{Host, NodeId, NodeKind};
use crate::presentation::{ActionSender, ChromeSpec, Presentation, UserAction};
use tracing::debug;

/// Scripted dialog widget chrome
pub struct ScriptedDialogChrome {
    host: Host,
    dialog: Option<NodeId>,
    preview: Option<NodeId>,
}

impl ScriptedDialogChrome {
    /// Chrome over a host tree
    pub fn new(host: Host) -> Self {
        Self {
            host,
            dialog: None,
            preview: None,
        }
    }
}

impl Presentation for ScriptedDialogChrome {
    fn mount(&mut self, spec: &ChromeSpec, actions: ActionSender) -> Result<()> {
        if self.dialog.is_some() {
            return Err(CaptureError::presentation("chrome already mounted"));
        }

        let dialog = self.host.create(NodeKind::Dialog, "scripted-dialog");
        self.host.append(spec.parent, dialog);
        self.host.set_attr(dialog, "open", "false");
        if let Some(title) = &spec.title {
            self.host.set_attr(dialog, "title", title.clone());
        }
        self.host.set_attr(dialog, "width", spec.width.to_string());

        let preview = self.host.create(NodeKind::Preview, "webcam-preview");
        self.host.append(dialog, preview);

        let take = self.host.create(NodeKind::Button, spec.take_text.clone());
        let cancel = self.host.create(NodeKind::Button, spec.cancel_text.clone());
        self.host.append(dialog, take);
        self.host.append(dialog, cancel);
        self.host.wire_click(take, actions.clone(), UserAction::Take);
        self.host.wire_click(cancel, actions, UserAction::Cancel);

        self.dialog = Some(dialog);
        self.preview = Some(preview);
        debug!("mounted scripted dialog chrome");
        Ok(())
    }

    fn preview_node(&self) -> Option<NodeId> {
        self.preview
    }

    fn show(&mut self) -> Result<()> {
        let dialog = self
            .dialog
            .ok_or_else(|| CaptureError::presentation("chrome not mounted"))?;
        self.host.set_attr(dialog, "open", "true");
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            // Widget destroy call first, then drop the node itself.
            self.host.set_attr(dialog, "open", "false");
            self.host.remove(dialog);
        }
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_open_flag_follows_lifecycle() {
        let host = Host::new();
        let mut chrome = ScriptedDialogChrome::new(host.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        chrome
            .mount(
                &ChromeSpec {
                    title: Some("Snapshot".into()),
                    take_text: "Take it".into(),
                    cancel_text: "Cancel".into(),
                    width: 320,
                    parent: host.root(),
                    anchor: None,
                },
                tx,
            )
            .unwrap();

        let dialog = host.find_by_label("scripted-dialog").unwrap();
        assert_eq!(host.attr(dialog, "open").unwrap(), "false");
        assert_eq!(host.attr(dialog, "title").unwrap(), "Snapshot");

        chrome.show().unwrap();
        assert_eq!(host.attr(dialog, "open").unwrap(), "true");

        chrome.destroy();
        assert!(!host.contains(dialog));
    }
}
