//! Plain overlay chrome
//!
//! A full-viewport shadow with a horizontally centered dialog on top.
//! The shadow mounts immediately; the dialog stays detached until the
//! stream is ready and `show` is called, so a failed acquisition never
//! flashes an empty dialog. Layout bindings keep the shadow sized to the
//! viewport and the dialog centered until the chrome is destroyed.

use crate::error::{CaptureError, Result};
use crate::presentation::host::{BindingId, Host, LayoutBinding, NodeId, NodeKind};
use crate::presentation::{ActionSender, ChromeSpec, Presentation, UserAction};
use tracing::debug;

/// Plain overlay chrome
pub struct PlainChrome {
    host: Host,
    shadow: Option<NodeId>,
    dialog: Option<NodeId>,
    preview: Option<NodeId>,
    parent: Option<NodeId>,
    bindings: Vec<BindingId>,
}

impl PlainChrome {
    /// Chrome over a host tree
    pub fn new(host: Host) -> Self {
        Self {
            host,
            shadow: None,
            dialog: None,
            preview: None,
            parent: None,
            bindings: Vec::new(),
        }
    }
}

impl Presentation for PlainChrome {
    fn mount(&mut self, spec: &ChromeSpec, actions: ActionSender) -> Result<()> {
        if self.dialog.is_some() {
            return Err(CaptureError::presentation("chrome already mounted"));
        }

        let shadow = self.host.create(NodeKind::Shadow, "webcam-shadow");
        self.host.append(spec.parent, shadow);

        let dialog = self.host.create(NodeKind::Dialog, "webcam-dialog");
        if let Some(title) = &spec.title {
            let title_node = self.host.create(NodeKind::Title, title.clone());
            self.host.append(dialog, title_node);
        }
        let preview = self.host.create(NodeKind::Preview, "webcam-preview");
        self.host.append(dialog, preview);

        let take = self.host.create(NodeKind::Button, spec.take_text.clone());
        let cancel = self.host.create(NodeKind::Button, spec.cancel_text.clone());
        self.host.append(dialog, take);
        self.host.append(dialog, cancel);
        self.host.wire_click(take, actions.clone(), UserAction::Take);
        self.host.wire_click(cancel, actions, UserAction::Cancel);

        self.bindings
            .push(self.host.bind_layout(LayoutBinding::FillViewport { node: shadow }));
        self.bindings.push(self.host.bind_layout(
            LayoutBinding::CenterHorizontally {
                node: dialog,
                width: spec.width,
            },
        ));

        self.shadow = Some(shadow);
        self.dialog = Some(dialog);
        self.preview = Some(preview);
        self.parent = Some(spec.parent);
        debug!("mounted plain overlay chrome");
        Ok(())
    }

    fn preview_node(&self) -> Option<NodeId> {
        self.preview
    }

    fn show(&mut self) -> Result<()> {
        let (dialog, parent) = match (self.dialog, self.parent) {
            (Some(d), Some(p)) => (d, p),
            _ => return Err(CaptureError::presentation("chrome not mounted")),
        };
        self.host.append(parent, dialog);
        Ok(())
    }

    fn destroy(&mut self) {
        for binding in self.bindings.drain(..) {
            self.host.unbind_layout(binding);
        }
        if let Some(dialog) = self.dialog.take() {
            self.host.remove(dialog);
        }
        if let Some(shadow) = self.shadow.take() {
            self.host.remove(shadow);
        }
        self.preview = None;
        self.parent = None;
    }
}
