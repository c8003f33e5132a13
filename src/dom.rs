//! In-memory stand-in for the host page's document.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Child-list
//! changes are queued for every observer watching the changed node and
//! handed out in batches by [`Document::drain_mutations`], the way a
//! browser delivers mutation records once per task.

use std::collections::BTreeMap;

use tracing::trace;

use crate::comparator::SortKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

/// Event behaviour attached to a node. Bindings are data, the session
/// decides what a click on them does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    SortControl(SortKey),
    Navigate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    binding: Option<Binding>,
}

#[derive(Debug)]
struct Observer {
    id: ObserverId,
    targets: Vec<NodeId>,
    pending: Vec<MutationRecord>,
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    observers: Vec<Observer>,
    next_observer: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            observers: Vec::new(),
            next_observer: 0,
        };
        doc.root = doc.create_element("html");
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.append_child(doc.root, doc.head);
        doc.append_child(doc.root, doc.body);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    // -------------------- Attributes and text ---------------------- //

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        self.nodes[node.0]
            .attributes
            .insert(name.to_string(), value.into());
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attributes.get(name).map(String::as_str)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        let classes = &mut self.nodes[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.nodes[node.0].text = text.into();
    }

    pub fn text(&self, node: NodeId) -> &str {
        &self.nodes[node.0].text
    }

    /// Own text followed by the inner text of every child, trimmed.
    pub fn inner_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        out.push_str(&self.nodes[node.0].text);
        for &child in &self.nodes[node.0].children {
            self.collect_text(child, out);
        }
    }

    // -------------------- Tree structure ---------------------- //

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == self.root
    }

    /// Pre-order walk of everything below `node`, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.record(parent, vec![child], Vec::new());
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.insert(0, child);
        self.nodes[child.0].parent = Some(parent);
        self.record(parent, vec![child], Vec::new());
    }

    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    /// Removes every child of `node`. Bindings of the whole removed subtree
    /// are dropped, the same cleanup the host's DOM library performs.
    pub fn empty(&mut self, node: NodeId) {
        let removed = std::mem::take(&mut self.nodes[node.0].children);
        if removed.is_empty() {
            return;
        }
        for &child in &removed {
            self.nodes[child.0].parent = None;
            self.nodes[child.0].binding = None;
            for below in self.descendants(child) {
                self.nodes[below.0].binding = None;
            }
        }
        self.record(node, Vec::new(), removed);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
            self.record(parent, Vec::new(), vec![node]);
        }
    }

    // -------------------- Queries ---------------------- //

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.attribute(n, "id") == Some(id))
    }

    pub fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.has_class(n, class))
    }

    /// Minimal selector support: simple selectors (`#id`, `.class`, `tag`)
    /// joined by the child combinator `>`. The first step matches anywhere
    /// in the document, every later step must be a direct child.
    pub fn query(&self, selector: &str) -> Option<NodeId> {
        let mut steps = selector.split('>').map(str::trim).filter(|s| !s.is_empty());
        let first = steps.next()?;
        let mut candidates: Vec<NodeId> = self
            .descendants(self.root)
            .into_iter()
            .filter(|&n| self.matches(n, first))
            .collect();
        for step in steps {
            candidates = candidates
                .iter()
                .flat_map(|&c| self.children(c).iter().copied())
                .filter(|&n| self.matches(n, step))
                .collect();
        }
        candidates.first().copied()
    }

    fn matches(&self, node: NodeId, simple: &str) -> bool {
        if let Some(id) = simple.strip_prefix('#') {
            self.attribute(node, "id") == Some(id)
        } else if let Some(class) = simple.strip_prefix('.') {
            self.has_class(node, class)
        } else {
            self.tag(node).eq_ignore_ascii_case(simple)
        }
    }

    // -------------------- Events ---------------------- //

    pub fn bind(&mut self, node: NodeId, binding: Binding) {
        self.nodes[node.0].binding = Some(binding);
    }

    pub fn binding(&self, node: NodeId) -> Option<Binding> {
        self.nodes[node.0].binding
    }

    /// Resolves a click on `node` to the closest bound node, bubbling up
    /// through the ancestors.
    pub fn click(&self, node: NodeId) -> Option<(NodeId, Binding)> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(binding) = self.binding(n) {
                return Some((n, binding));
            }
            current = self.parent(n);
        }
        None
    }

    // -------------------- Mutation observers ---------------------- //

    pub fn create_observer(&mut self) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Observer {
            id,
            targets: Vec::new(),
            pending: Vec::new(),
        });
        id
    }

    /// Starts watching the child list of `target`. Observing the same target
    /// twice has no additional effect.
    pub fn observe(&mut self, observer: ObserverId, target: NodeId) {
        if let Some(obs) = self.observers.iter_mut().find(|o| o.id == observer)
            && !obs.targets.contains(&target)
        {
            obs.targets.push(target);
        }
    }

    /// Stops all observation for `observer` and discards its queued records.
    pub fn disconnect(&mut self, observer: ObserverId) {
        if let Some(obs) = self.observers.iter_mut().find(|o| o.id == observer) {
            obs.targets.clear();
            obs.pending.clear();
        }
    }

    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .iter_mut()
            .find(|o| o.id == observer)
            .map(|o| std::mem::take(&mut o.pending))
            .unwrap_or_default()
    }

    /// Hands out one batch per observer with queued records.
    pub fn drain_mutations(&mut self) -> Vec<(ObserverId, Vec<MutationRecord>)> {
        self.observers
            .iter_mut()
            .filter(|o| !o.pending.is_empty())
            .map(|o| (o.id, std::mem::take(&mut o.pending)))
            .collect()
    }

    fn record(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        for obs in self.observers.iter_mut() {
            if obs.targets.contains(&target) {
                trace!("Queue mutation on {target:?} for {:?}", obs.id);
                obs.pending.push(MutationRecord {
                    target,
                    added: added.clone(),
                    removed: removed.clone(),
                });
            }
        }
    }
}
