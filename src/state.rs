use tracing::debug;

use crate::comparator::{SortDirection, SortKey, sort_rows};
use crate::row::RowRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Name,
            direction: SortDirection::Normal,
        }
    }
}

/// Remembers the last applied ordering for as long as the session lives, so
/// a repopulated table comes back in the order the user picked.
#[derive(Debug, Default)]
pub struct SortTracker {
    last: Option<SortState>,
}

impl SortTracker {
    pub fn apply(&mut self, rows: &mut [RowRecord], key: SortKey, direction: SortDirection) {
        debug!("Sorting {} rows by {key} ({})", rows.len(), direction.as_attr());
        sort_rows(rows, key, direction);
        self.last = Some(SortState { key, direction });
    }

    pub fn current_state(&self) -> SortState {
        self.last.unwrap_or_default()
    }

    /// Re-sorts with whatever was applied last.
    pub fn reapply(&mut self, rows: &mut [RowRecord]) {
        let state = self.current_state();
        self.apply(rows, state.key, state.direction);
    }
}
