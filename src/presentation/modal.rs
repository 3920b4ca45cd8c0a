//! Framework modal chrome
//!
//! Two dialects of the same modal framework, differing in markup
//! generation but not in lifecycle. Both show a loading backdrop during
//! stream acquisition and remove it only once the stream is ready and the
//! dialog is about to display; removing it earlier leaves the user
//! staring at the page while permission prompts are still pending.

use crate::error::{CaptureError, Result};
use crate::presentation::host::{BindingId, Host, LayoutBinding, NodeId, NodeKind};
use crate::presentation::{ActionSender, ChromeSpec, Presentation, UserAction};
use tracing::debug;

/// Modal framework dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalDialect {
    /// v2 markup
    V2,
    /// v3 markup
    V3,
}

impl ModalDialect {
    fn dialog_label(&self) -> &'static str {
        match self {
            ModalDialect::V2 => "modal-v2-dialog",
            ModalDialect::V3 => "modal-v3-dialog",
        }
    }
}

/// Framework modal chrome
pub struct ModalChrome {
    host: Host,
    dialect: ModalDialect,
    backdrop: Option<NodeId>,
    dialog: Option<NodeId>,
    preview: Option<NodeId>,
    parent: Option<NodeId>,
    binding: Option<BindingId>,
}

impl ModalChrome {
    /// v2-dialect chrome
    pub fn v2(host: Host) -> Self {
        Self::with_dialect(host, ModalDialect::V2)
    }

    /// v3-dialect chrome
    pub fn v3(host: Host) -> Self {
        Self::with_dialect(host, ModalDialect::V3)
    }

    fn with_dialect(host: Host, dialect: ModalDialect) -> Self {
        Self {
            host,
            dialect,
            backdrop: None,
            dialog: None,
            preview: None,
            parent: None,
            binding: None,
        }
    }
}

impl Presentation for ModalChrome {
    fn mount(&mut self, spec: &ChromeSpec, actions: ActionSender) -> Result<()> {
        if self.dialog.is_some() {
            return Err(CaptureError::presentation("chrome already mounted"));
        }

        let backdrop = self.host.create(NodeKind::Backdrop, "modal-loading");
        self.host.append(spec.parent, backdrop);

        let dialog = self
            .host
            .create(NodeKind::Dialog, self.dialect.dialog_label());
        let title = self.host.create(
            NodeKind::Title,
            spec.title.clone().unwrap_or_else(|| "Webcam".to_string()),
        );
        self.host.append(dialog, title);
        let preview = self.host.create(NodeKind::Preview, "webcam-preview");
        self.host.append(dialog, preview);

        let take = self.host.create(NodeKind::Button, spec.take_text.clone());
        let cancel = self.host.create(NodeKind::Button, spec.cancel_text.clone());
        self.host.append(dialog, take);
        self.host.append(dialog, cancel);
        self.host.wire_click(take, actions.clone(), UserAction::Take);
        self.host.wire_click(cancel, actions, UserAction::Cancel);

        self.binding = Some(self.host.bind_layout(LayoutBinding::CenterHorizontally {
            node: dialog,
            width: spec.width,
        }));

        self.backdrop = Some(backdrop);
        self.dialog = Some(dialog);
        self.preview = Some(preview);
        self.parent = Some(spec.parent);
        debug!(dialect = ?self.dialect, "mounted modal chrome");
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
        // Backdrop goes away only now, with the dialog ready to replace it.
        if let Some(backdrop) = self.backdrop.take() {
            self.host.remove(backdrop);
        }
        self.host.append(parent, dialog);
        self.host.set_attr(dialog, "open", "true");
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(binding) = self.binding.take() {
            self.host.unbind_layout(binding);
        }
        if let Some(backdrop) = self.backdrop.take() {
            self.host.remove(backdrop);
        }
        if let Some(dialog) = self.dialog.take() {
            self.host.remove(dialog);
        }
        self.preview = None;
        self.parent = None;
    }
}
