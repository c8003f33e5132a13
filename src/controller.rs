use tracing::{trace, warn};

use crate::domain::{Message, SortConfig};
use crate::dom::{Binding, Document, NodeId};

/// Maps user input on the host document to session messages.
pub struct Controller {
    jump_attribute: String,
}

impl Controller {
    pub fn new(cfg: &SortConfig) -> Self {
        Self {
            jump_attribute: cfg.jump_attribute.clone(),
        }
    }

    pub fn handle_click(&self, doc: &Document, node: NodeId) -> Option<Message> {
        let message = match doc.click(node) {
            Some((control, Binding::SortControl(key))) => Some(Message::Sort(control, key)),
            Some((control, Binding::Navigate)) => self.jump_target(doc, control),
            None => None,
        };
        trace!("Mapped: click on {node:?} => {message:?}");
        message
    }

    fn jump_target(&self, doc: &Document, control: NodeId) -> Option<Message> {
        let raw = doc.attribute(control, &self.jump_attribute)?;
        match raw.trim().parse() {
            Ok(id) => Some(Message::JumpToCell(id)),
            Err(_) => {
                warn!("Jump control {control:?} carries unusable id \"{raw}\"");
                None
            }
        }
    }
}
