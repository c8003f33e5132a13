use tracing::{debug, trace, warn};

use crate::comparator::{SortDirection, SortKey};
use crate::domain::SortConfig;
use crate::dom::{Binding, Document, NodeId};
use crate::state::SortState;

const DIRECTION_ATTR: &str = "data-sort-direction";
const BASE_TEXT_ATTR: &str = "data-base-text";

// Id goes in before name so that name ends up first in the shared cell.
const INSERT_ORDER: [SortKey; 6] = [
    SortKey::Id,
    SortKey::Name,
    SortKey::Status,
    SortKey::AssigneeA,
    SortKey::AssigneeB,
    SortKey::Timestamp,
];

const ARROW_DOWN: &str = "iVBORw0KGgoAAAANSUhEUgAAAAsAAAALCAYAAACprHcmAAAAAXNSR0IArs4c6QAAAARnQU1BAACxjwv8YQUAAAAJcEhZcwAADsMAAA7DAcdvqGQAAABRSURBVChTY/z//z8DsYAJSlMfMHp5+RDtDpAzGCFMvOD/tm1bGMEKgaaDBUAEFgBSCPYb3FQcGuAKQQDFCWgaUBRiBSANQPwPykUBtIoUBgYAr4QcxTCXiOcAAAAASUVORK5CYII=";
const ARROW_UP: &str = "iVBORw0KGgoAAAANSUhEUgAAAAsAAAALCAYAAACprHcmAAAAAXNSR0IArs4c6QAAAARnQU1BAACxjwv8YQUAAAAJcEhZcwAADsMAAA7DAcdvqGQAAABESURBVChTY/z//z8DsYAJShMFsCr29vbFah2GYphCbBpQFKMrQOfDFeOyGlkcrBiXQhiAyTN6efngVYgM6BzO2AEDAwBazBjfk+e3QgAAAABJRU5ErkJggg==";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnControl {
    pub key: SortKey,
    pub node: NodeId,
}

#[derive(Debug, Default)]
pub struct ControlSet {
    controls: Vec<ColumnControl>,
}

impl ControlSet {
    pub fn find(&self, key: SortKey) -> Option<ColumnControl> {
        self.controls.iter().copied().find(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnControl> {
        self.controls.iter()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

pub struct ControlPanel;

impl ControlPanel {
    /// Rewrites the header for a fresh population: per-user counts on the
    /// assignee columns and one sort control per key. Controls from an
    /// earlier build are replaced.
    pub fn build(
        doc: &mut Document,
        header_row: NodeId,
        state: SortState,
        yours: (usize, usize),
        config: &SortConfig,
    ) -> ControlSet {
        let cells = doc.children(header_row).to_vec();
        if cells.len() < 5 {
            warn!("Header row has {} cells, expected 5", cells.len());
        }

        if let Some(&cell) = cells.get(SortKey::AssigneeA.column()) {
            Self::set_count(doc, cell, yours.0);
        }
        if let Some(&cell) = cells.get(SortKey::AssigneeB.column()) {
            Self::set_count(doc, cell, yours.1);
        }

        for &cell in &cells {
            let stale: Vec<NodeId> = doc
                .children(cell)
                .iter()
                .copied()
                .filter(|&n| doc.has_class(n, &config.button_class))
                .collect();
            for node in stale {
                doc.remove(node);
            }
        }

        let mut controls = Vec::with_capacity(INSERT_ORDER.len());
        for key in INSERT_ORDER {
            let Some(&cell) = cells.get(key.column()) else {
                continue;
            };
            // Only the active key reflects the real direction. Any other
            // control starts at "reverse" so its first click sorts naturally.
            let direction = if key == state.key {
                state.direction
            } else {
                SortDirection::Reverse
            };
            let node = Self::create_button(doc, key, direction, config);
            doc.prepend_child(cell, node);
            controls.push(ColumnControl { key, node });
        }
        debug!(
            "Built {} sort controls, active {} ({})",
            controls.len(),
            state.key,
            state.direction.as_attr()
        );
        ControlSet { controls }
    }

    fn create_button(
        doc: &mut Document,
        key: SortKey,
        direction: SortDirection,
        config: &SortConfig,
    ) -> NodeId {
        let button = doc.create_element("input");
        doc.set_attribute(button, "type", "button");
        doc.set_attribute(button, "title", key.title());
        doc.add_class(button, &config.button_class);
        doc.set_attribute(button, DIRECTION_ATTR, direction.as_attr());
        doc.bind(button, Binding::SortControl(key));
        button
    }

    fn set_count(doc: &mut Document, cell: NodeId, count: usize) {
        let base = match doc.attribute(cell, BASE_TEXT_ATTR).map(str::to_string) {
            Some(base) => base,
            None => {
                let base = doc.text(cell).to_string();
                doc.set_attribute(cell, BASE_TEXT_ATTR, base.clone());
                base
            }
        };
        let text = if count > 0 {
            format!("{base} (Yours: {count})")
        } else {
            base
        };
        trace!("Header {cell:?} -> \"{text}\"");
        doc.set_text(cell, text);
    }
}

pub fn indicator(doc: &Document, control: NodeId) -> SortDirection {
    SortDirection::from_attr(doc.attribute(control, DIRECTION_ATTR))
}

/// Flips a control's indicator and returns the direction to sort in.
pub fn toggle(doc: &mut Document, control: NodeId) -> SortDirection {
    let next = indicator(doc, control).flip();
    doc.set_attribute(control, DIRECTION_ATTR, next.as_attr());
    next
}

/// Adds the control stylesheet to `<head>` unless it is already there.
pub fn install_style(doc: &mut Document, config: &SortConfig) -> bool {
    if doc.get_element_by_id(&config.style_id).is_some() {
        return false;
    }
    let class = &config.button_class;
    let style = doc.create_element("style");
    doc.set_attribute(style, "id", config.style_id.as_str());
    doc.set_text(
        style,
        format!(
            ".{class} {{ border-width: 0px; width: 11px; height: 11px; margin-right: 5px; cursor: pointer; outline: none; }}\
             .{class}[{DIRECTION_ATTR}=normal] {{ background: url(\"data:image/png;base64,{ARROW_DOWN}\") no-repeat; }}\
             .{class}[{DIRECTION_ATTR}=reverse] {{ background: url(\"data:image/png;base64,{ARROW_UP}\") no-repeat; }}"
        ),
    );
    let head = doc.head();
    doc.append_child(head, style);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(doc: &mut Document) -> NodeId {
        let tr = doc.create_element("tr");
        for title in ["Cell", "Status", "Player A", "Player B", "Time"] {
            let th = doc.create_element("th");
            doc.set_text(th, title);
            doc.append_child(tr, th);
        }
        doc.append_child(doc.body(), tr);
        tr
    }

    fn cell(doc: &Document, tr: NodeId, idx: usize) -> NodeId {
        doc.children(tr)[idx]
    }

    #[test]
    fn counts_only_when_positive() {
        let mut doc = Document::new();
        let tr = header(&mut doc);
        let cfg = SortConfig::default();
        ControlPanel::build(&mut doc, tr, SortState::default(), (2, 0), &cfg);
        assert_eq!(doc.text(cell(&doc, tr, 2)), "Player A (Yours: 2)");
        assert_eq!(doc.text(cell(&doc, tr, 3)), "Player B");
    }

    #[test]
    fn rebuild_does_not_accumulate() {
        let mut doc = Document::new();
        let tr = header(&mut doc);
        let cfg = SortConfig::default();
        ControlPanel::build(&mut doc, tr, SortState::default(), (2, 1), &cfg);
        let set = ControlPanel::build(&mut doc, tr, SortState::default(), (3, 1), &cfg);
        assert_eq!(doc.text(cell(&doc, tr, 2)), "Player A (Yours: 3)");
        assert_eq!(doc.text(cell(&doc, tr, 3)), "Player B (Yours: 1)");
        assert_eq!(set.len(), 6);
        let buttons = doc
            .descendants(tr)
            .into_iter()
            .filter(|&n| doc.has_class(n, &cfg.button_class))
            .count();
        assert_eq!(buttons, 6);
    }

    #[test]
    fn name_precedes_id_in_first_cell() {
        let mut doc = Document::new();
        let tr = header(&mut doc);
        let set = ControlPanel::build(&mut doc, tr, SortState::default(), (0, 0), &SortConfig::default());
        let first = doc.children(cell(&doc, tr, 0)).to_vec();
        assert_eq!(first, vec![set.find(SortKey::Name).unwrap().node, set.find(SortKey::Id).unwrap().node]);
    }

    #[test]
    fn indicators_follow_active_state() {
        let mut doc = Document::new();
        let tr = header(&mut doc);
        let state = SortState {
            key: SortKey::Status,
            direction: SortDirection::Normal,
        };
        let set = ControlPanel::build(&mut doc, tr, state, (0, 0), &SortConfig::default());
        for control in set.iter() {
            let expected = if control.key == SortKey::Status {
                SortDirection::Normal
            } else {
                SortDirection::Reverse
            };
            assert_eq!(indicator(&doc, control.node), expected, "{}", control.key);
        }
    }

    #[test]
    fn toggle_flips_indicator() {
        let mut doc = Document::new();
        let tr = header(&mut doc);
        let set = ControlPanel::build(&mut doc, tr, SortState::default(), (0, 0), &SortConfig::default());
        let id = set.find(SortKey::Id).unwrap().node;
        assert_eq!(toggle(&mut doc, id), SortDirection::Normal);
        assert_eq!(toggle(&mut doc, id), SortDirection::Reverse);
        let name = set.find(SortKey::Name).unwrap().node;
        assert_eq!(toggle(&mut doc, name), SortDirection::Reverse);
    }

    #[test]
    fn style_installed_once() {
        let mut doc = Document::new();
        let cfg = SortConfig::default();
        assert!(install_style(&mut doc, &cfg));
        assert!(!install_style(&mut doc, &cfg));
        assert_eq!(doc.children(doc.head()).len(), 1);
    }
}
