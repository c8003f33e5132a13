//! The host page as the sorting session sees it: an account object, a
//! navigation function, and a scripted renderer that builds the scouts' log
//! markup the way the host does.

use tracing::{debug, trace};

use crate::domain::SortConfig;
use crate::dom::{Binding, Document, NodeId};

pub const HEADER_TITLES: [&str; 5] = ["Cell", "Status", "Player A", "Player B", "Last Updated"];

/// Authorization and identity provided by the host.
pub trait Account {
    fn uid(&self) -> Option<u64>;
    fn username(&self) -> &str;
    fn can(&self, capability: &str) -> bool;
}

/// The host's "jump to cell" action.
pub trait Navigator {
    fn close_panel(&mut self);
    fn jump_to_cell(&mut self, id: u64);
}

#[derive(Debug, Clone, Default)]
pub struct StaticAccount {
    pub uid: Option<u64>,
    pub username: String,
    pub capabilities: Vec<String>,
}

impl StaticAccount {
    pub fn new(uid: u64, username: &str, capabilities: &[&str]) -> Self {
        Self {
            uid: Some(uid),
            username: username.to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Account for StaticAccount {
    fn uid(&self) -> Option<u64> {
        self.uid
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn can(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// Remembers every navigation request.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub closed: usize,
    pub jumps: Vec<u64>,
}

impl Navigator for RecordingNavigator {
    fn close_panel(&mut self) {
        self.closed += 1;
    }

    fn jump_to_cell(&mut self, id: u64) {
        self.jumps.push(id);
    }
}

/// One scouts' log row as the host knows it, before it is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogEntry {
    pub name: String,
    pub id: String,
    pub status: String,
    pub player_a: String,
    pub player_b: String,
    pub timestamp: String,
}

impl LogEntry {
    pub fn new(name: &str, id: u64, status: &str, a: &str, b: &str, timestamp: &str) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            status: status.to_string(),
            player_a: a.to_string(),
            player_b: b.to_string(),
            timestamp: timestamp.to_string(),
        }
    }
}

/// Scripted host page. Each method is one host task; mutation records
/// queue up until the session pumps them.
#[derive(Debug)]
pub struct HostPage {
    pub doc: Document,
    config: SortConfig,
    content: Option<NodeId>,
}

impl HostPage {
    pub fn new(config: &SortConfig) -> Self {
        Self {
            doc: Document::new(),
            config: config.clone(),
            content: None,
        }
    }

    /// Adds the (still empty) scouts' log panel.
    pub fn install_panel(&mut self) -> NodeId {
        if let Some(content) = self.content {
            return content;
        }
        let panel = self.doc.create_element("div");
        self.doc.set_attribute(panel, "id", self.config.panel_id.as_str());
        let content = self.doc.create_element("div");
        self.doc.add_class(content, &self.config.panel_content_class);
        let body = self.doc.body();
        self.doc.append_child(body, panel);
        self.doc.append_child(panel, content);
        self.content = Some(content);
        content
    }

    /// Opens the Mystic tab. The table skeleton is kept when it already
    /// exists, the body is always emptied and the options bar re-added.
    pub fn open_tab(&mut self) {
        let content = self.install_panel();

        for node in self.doc.children(content).to_vec() {
            if self.doc.has_class(node, &self.config.options_class) {
                self.doc.remove(node);
            }
        }

        let tbody = match self.doc.query(&self.config.body_selector()) {
            Some(tbody) => tbody,
            None => self.render_skeleton(content),
        };
        self.doc.empty(tbody);

        let options = self.doc.create_element("div");
        self.doc.add_class(options, &self.config.options_class);
        self.doc.prepend_child(content, options);
        debug!("Host opened the Mystic tab");
    }

    /// Fills the table body with rendered rows.
    pub fn populate(&mut self, entries: &[LogEntry]) {
        let Some(tbody) = self.doc.query(&self.config.body_selector()) else {
            return;
        };
        for entry in entries {
            let tr = self.render_row(entry);
            self.doc.append_child(tbody, tr);
        }
        debug!("Host rendered {} rows", entries.len());
    }

    /// Tears the panel content down, header included.
    pub fn close_panel(&mut self) {
        if let Some(content) = self.content {
            self.doc.empty(content);
        }
    }

    pub fn body(&self) -> Option<NodeId> {
        self.doc.query(&self.config.body_selector())
    }

    pub fn header(&self) -> Option<NodeId> {
        self.doc.query(&self.config.header_selector())
    }

    /// Finds the jump control rendered for `id`.
    pub fn jump_control(&self, id: &str) -> Option<NodeId> {
        let body = self.body()?;
        self.doc.descendants(body).into_iter().find(|&n| {
            self.doc.has_class(n, &self.config.jump_class)
                && self.doc.attribute(n, &self.config.jump_attribute) == Some(id)
        })
    }

    /// Row names in current DOM order.
    pub fn row_names(&self) -> Vec<String> {
        let Some(body) = self.body() else {
            return Vec::new();
        };
        self.doc
            .children(body)
            .iter()
            .map(|&tr| {
                self.doc
                    .children(tr)
                    .first()
                    .map(|&td| self.doc.inner_text(td))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Plain text rendering of the table, one line per row.
    pub fn render_text(&self) -> String {
        let mut lines = Vec::new();
        let line = |cells: &[NodeId]| {
            cells
                .iter()
                .map(|&c| format!("{:<24}", self.doc.inner_text(c)))
                .collect::<Vec<_>>()
                .join(" | ")
        };
        if let Some(header) = self.header() {
            lines.push(line(self.doc.children(header)));
        }
        if let Some(body) = self.body() {
            for &tr in self.doc.children(body) {
                lines.push(line(self.doc.children(tr)));
            }
        }
        lines.join("\n")
    }

    fn render_skeleton(&mut self, content: NodeId) -> NodeId {
        let main = self.doc.create_element("div");
        self.doc.set_attribute(main, "id", self.config.table_id.as_str());
        let table = self.doc.create_element("table");
        let thead = self.doc.create_element("thead");
        let header = self.doc.create_element("tr");
        for title in HEADER_TITLES {
            let th = self.doc.create_element("th");
            self.doc.set_text(th, title);
            self.doc.append_child(header, th);
        }
        let tbody = self.doc.create_element("tbody");
        self.doc.append_child(thead, header);
        self.doc.append_child(table, thead);
        self.doc.append_child(table, tbody);
        self.doc.append_child(main, table);
        self.doc.append_child(content, main);
        tbody
    }

    fn render_row(&mut self, entry: &LogEntry) -> NodeId {
        let tr = self.doc.create_element("tr");
        let texts = [
            format!("{} ({})", entry.name, entry.id),
            entry.status.clone(),
            entry.player_a.clone(),
            entry.player_b.clone(),
            entry.timestamp.clone(),
        ];
        for (idx, text) in texts.into_iter().enumerate() {
            let td = self.doc.create_element("td");
            self.doc.set_text(td, text);
            if idx == 0 {
                let jump = self.doc.create_element("button");
                self.doc.add_class(jump, &self.config.jump_class);
                self.doc
                    .set_attribute(jump, &self.config.jump_attribute, entry.id.as_str());
                self.doc.bind(jump, Binding::Navigate);
                self.doc.append_child(td, jump);
            }
            self.doc.append_child(tr, td);
        }
        trace!("Rendered row {tr:?} for {}", entry.name);
        tr
    }
}
