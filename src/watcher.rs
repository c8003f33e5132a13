//! Two stage observation of the host table.
//!
//! The table body does not exist yet (or is about to be replaced) when the
//! panel opens, so the coarse watch on the panel content waits for the
//! options bar to be added and only then arms the fine watch on the body.
//! The fine watch fires once per arming.

use tracing::{debug, trace, warn};

use crate::domain::{MSError, SortConfig};
use crate::dom::{Document, MutationRecord, NodeId, ObserverId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    Idle,
    WatchingBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    /// The options bar appeared and the body is now observed.
    Armed(NodeId),
    /// The body received its rows. The fine watch is already disconnected.
    Populated(NodeId),
}

#[derive(Debug)]
pub struct Watcher {
    phase: WatchPhase,
    coarse: ObserverId,
    fine: ObserverId,
    body: Option<NodeId>,
    options_class: String,
    body_selector: String,
}

impl Watcher {
    pub fn start(doc: &mut Document, config: &SortConfig) -> Result<Self, MSError> {
        let content = doc
            .first_by_class(&config.panel_content_class)
            .ok_or_else(|| MSError::missing(format!(".{}", config.panel_content_class)))?;
        let coarse = doc.create_observer();
        let fine = doc.create_observer();
        doc.observe(coarse, content);
        debug!("Watching panel content {content:?}");

        Ok(Self {
            phase: WatchPhase::Idle,
            coarse,
            fine,
            body: None,
            options_class: config.options_class.clone(),
            body_selector: config.body_selector(),
        })
    }

    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    pub fn handle(
        &mut self,
        doc: &mut Document,
        observer: ObserverId,
        records: &[MutationRecord],
    ) -> Option<WatchEvent> {
        if records.is_empty() {
            return None;
        }
        if observer == self.coarse {
            self.on_panel_content(doc, records)
        } else if observer == self.fine {
            self.on_table_body(doc)
        } else {
            None
        }
    }

    fn on_panel_content(
        &mut self,
        doc: &mut Document,
        records: &[MutationRecord],
    ) -> Option<WatchEvent> {
        let options_added = records
            .iter()
            .flat_map(|r| r.added.iter())
            .any(|&n| doc.has_class(n, &self.options_class));
        if !options_added {
            trace!("Panel content changed without an options bar");
            return None;
        }

        let Some(body) = doc.query(&self.body_selector) else {
            warn!("Options bar added but \"{}\" is missing", self.body_selector);
            // Drop any watch on a body the host has since thrown away.
            doc.disconnect(self.fine);
            self.body = None;
            self.phase = WatchPhase::Idle;
            return None;
        };
        // A new signal retargets the fine watch to whatever body is current.
        doc.disconnect(self.fine);
        doc.observe(self.fine, body);
        self.body = Some(body);
        self.phase = WatchPhase::WatchingBody;
        debug!("Options bar added, watching table body {body:?}");
        Some(WatchEvent::Armed(body))
    }

    fn on_table_body(&mut self, doc: &mut Document) -> Option<WatchEvent> {
        if self.phase != WatchPhase::WatchingBody {
            return None;
        }
        doc.disconnect(self.fine);
        self.phase = WatchPhase::Idle;
        let body = self.body.take()?;
        debug!("Table body {body:?} populated");
        Some(WatchEvent::Populated(body))
    }
}
