use tracing::{debug, instrument, trace};

use crate::domain::SortConfig;
use crate::dom::{Binding, Document, NodeId};
use crate::row::RowRecord;

/// Writes the model order onto the table body.
///
/// Emptying the body drops every binding below it, so the navigation
/// controls inside the rows are bound again afterwards. The binding carries
/// no target, the cell id is read from the control's attribute when it is
/// clicked.
#[instrument(skip_all, fields(rows = rows.len()))]
pub fn reproject(doc: &mut Document, body: NodeId, rows: &[RowRecord], config: &SortConfig) {
    doc.empty(body);
    for row in rows {
        doc.append_child(body, row.element);
    }

    let mut rebound = 0;
    for row in rows {
        for node in doc.descendants(row.element) {
            if doc.has_class(node, &config.jump_class) {
                trace!("Rebinding jump control {node:?}");
                doc.bind(node, Binding::Navigate);
                rebound += 1;
            }
        }
    }
    debug!("Reprojected {} rows, rebound {rebound} jump controls", rows.len());
}
