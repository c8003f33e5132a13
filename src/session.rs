//! The sorting session: everything that lives from panel activation until
//! the page goes away.
//!
//! The session owns the row model, the sort tracker, the watcher and the
//! current control set. The host loop feeds it mutation batches through
//! [`Session::pump`] and user clicks through [`Session::click`]. Nothing
//! here surfaces an error to the user: structural problems are logged and
//! the affected step is skipped.

use tracing::{debug, info, instrument, warn};

use crate::comparator::{SortDirection, SortKey};
use crate::controller::Controller;
use crate::domain::{MSError, Message, SortConfig};
use crate::dom::{Document, NodeId};
use crate::host::{Account, Navigator};
use crate::panel::{self, ControlPanel, ControlSet};
use crate::reproject::reproject;
use crate::row::{RowRecord, extract};
use crate::state::{SortState, SortTracker};
use crate::watcher::{WatchEvent, Watcher};

pub struct Session {
    config: SortConfig,
    username: String,
    controller: Controller,
    tracker: SortTracker,
    watcher: Watcher,
    rows: Vec<RowRecord>,
    body: Option<NodeId>,
    controls: ControlSet,
    yours: (usize, usize),
    populations: usize,
}

impl Session {
    pub fn start<A: Account>(
        doc: &mut Document,
        account: &A,
        config: &SortConfig,
    ) -> Result<Self, MSError> {
        panel::install_style(doc, config);
        let watcher = Watcher::start(doc, config)?;
        info!("Sorting session started for {}", account.username());
        Ok(Self {
            config: config.clone(),
            username: account.username().to_string(),
            controller: Controller::new(config),
            tracker: SortTracker::default(),
            watcher,
            rows: Vec::new(),
            body: None,
            controls: ControlSet::default(),
            yours: (0, 0),
            populations: 0,
        })
    }

    /// Delivers queued mutation batches. Returns how many population
    /// pipelines ran.
    pub fn pump(&mut self, doc: &mut Document) -> usize {
        let mut ran = 0;
        for (observer, records) in doc.drain_mutations() {
            if let Some(WatchEvent::Populated(body)) = self.watcher.handle(doc, observer, &records)
            {
                if let Err(e) = self.populate(doc, body) {
                    warn!("Population pipeline incomplete: {e}");
                }
                ran += 1;
            }
        }
        ran
    }

    /// extract -> re-apply last sort -> reproject -> rebuild controls
    #[instrument(skip(self, doc))]
    fn populate(&mut self, doc: &mut Document, body: NodeId) -> Result<(), MSError> {
        let extraction = extract(doc, body, &self.username);
        self.rows = extraction.rows;
        self.yours = (extraction.yours_a, extraction.yours_b);
        self.body = Some(body);
        self.populations += 1;

        self.tracker.reapply(&mut self.rows);
        reproject(doc, body, &self.rows, &self.config);

        // The previous controls may sit in a header the host has replaced.
        self.controls = ControlSet::default();
        let header = doc
            .query(&self.config.header_selector())
            .ok_or_else(|| MSError::missing(self.config.header_selector()))?;
        self.controls = ControlPanel::build(
            doc,
            header,
            self.tracker.current_state(),
            self.yours,
            &self.config,
        );
        debug!("Population #{} done", self.populations);
        Ok(())
    }

    pub fn click<N: Navigator>(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        navigator: &mut N,
    ) -> Option<Message> {
        let message = self.controller.handle_click(doc, node)?;
        self.update(doc, message, navigator);
        Some(message)
    }

    pub fn update<N: Navigator>(&mut self, doc: &mut Document, message: Message, navigator: &mut N) {
        match message {
            Message::Sort(control, key) => {
                let direction = panel::toggle(doc, control);
                self.sort(doc, key, direction);
            }
            Message::JumpToCell(id) => {
                info!("Jumping to cell {id}");
                navigator.close_panel();
                navigator.jump_to_cell(id);
            }
        }
    }

    /// Activates the control for `key` as if the user had clicked it.
    pub fn activate<N: Navigator>(
        &mut self,
        doc: &mut Document,
        key: SortKey,
        navigator: &mut N,
    ) -> Option<SortDirection> {
        let control = self.controls.find(key)?;
        self.update(doc, Message::Sort(control.node, key), navigator);
        Some(self.tracker.current_state().direction)
    }

    fn sort(&mut self, doc: &mut Document, key: SortKey, direction: SortDirection) {
        self.tracker.apply(&mut self.rows, key, direction);
        match self.body {
            Some(body) => reproject(doc, body, &self.rows, &self.config),
            None => warn!("Sort requested before the table was populated"),
        }
    }

    pub fn state(&self) -> SortState {
        self.tracker.current_state()
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    pub fn yours(&self) -> (usize, usize) {
        self.yours
    }

    pub fn populations(&self) -> usize {
        self.populations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostPage, LogEntry, RecordingNavigator, StaticAccount};

    fn entries() -> Vec<LogEntry> {
        vec![
            LogEntry::new("bob", 5, "Need B", "alice", "", "2024-01-03 10:00:00"),
            LogEntry::new("Amy", 1, "Done", "carl", "alice", "2024-01-01 10:00:00"),
            LogEntry::new("carl", 3, "Need A", "", "", "2024-01-02 10:00:00"),
        ]
    }

    fn open(host: &mut HostPage, session: &mut Session) -> usize {
        host.open_tab();
        session.pump(&mut host.doc);
        host.populate(&entries());
        session.pump(&mut host.doc)
    }

    fn setup() -> (HostPage, Session) {
        let cfg = SortConfig::default();
        let mut host = HostPage::new(&cfg);
        host.install_panel();
        let account = StaticAccount::new(1, "alice", &["mystic admin"]);
        let session = Session::start(&mut host.doc, &account, &cfg).unwrap();
        (host, session)
    }

    #[test]
    fn population_sorts_by_name_by_default() {
        let (mut host, mut session) = setup();
        assert_eq!(open(&mut host, &mut session), 1);
        assert_eq!(host.row_names(), vec!["Amy (1)", "bob (5)", "carl (3)"]);
        assert_eq!(session.yours(), (1, 1));
        assert_eq!(session.controls().len(), 6);
    }

    #[test]
    fn activation_toggles_and_reprojects() {
        let (mut host, mut session) = setup();
        let mut nav = RecordingNavigator::default();
        open(&mut host, &mut session);

        assert_eq!(session.activate(&mut host.doc, SortKey::Id, &mut nav), Some(SortDirection::Normal));
        assert_eq!(host.row_names(), vec!["bob (5)", "carl (3)", "Amy (1)"]);
        assert_eq!(session.activate(&mut host.doc, SortKey::Id, &mut nav), Some(SortDirection::Reverse));
        assert_eq!(host.row_names(), vec!["Amy (1)", "carl (3)", "bob (5)"]);
    }

    #[test]
    fn first_name_click_reverses_default_order() {
        let (mut host, mut session) = setup();
        let mut nav = RecordingNavigator::default();
        open(&mut host, &mut session);
        session.activate(&mut host.doc, SortKey::Name, &mut nav);
        assert_eq!(host.row_names(), vec!["carl (3)", "bob (5)", "Amy (1)"]);
    }

    #[test]
    fn sort_before_population_is_a_no_op() {
        let (mut host, mut session) = setup();
        let mut nav = RecordingNavigator::default();
        assert_eq!(session.activate(&mut host.doc, SortKey::Id, &mut nav), None);
        assert_eq!(session.state(), SortState::default());
    }

    #[test]
    fn lost_header_drops_the_old_controls() {
        let (mut host, mut session) = setup();
        let mut nav = RecordingNavigator::default();
        open(&mut host, &mut session);
        assert_eq!(session.controls().len(), 6);

        let header = host.header().unwrap();
        host.doc.remove(header);
        host.open_tab();
        session.pump(&mut host.doc);
        host.populate(&entries());
        assert_eq!(session.pump(&mut host.doc), 1);

        assert!(session.controls().is_empty());
        assert_eq!(session.activate(&mut host.doc, SortKey::Id, &mut nav), None);
        assert_eq!(session.state(), SortState::default());
    }

    #[test]
    fn start_requires_panel_content() {
        let cfg = SortConfig::default();
        let mut host = HostPage::new(&cfg);
        let account = StaticAccount::new(1, "alice", &["mystic admin"]);
        assert!(Session::start(&mut host.doc, &account, &cfg).is_err());
    }
}
