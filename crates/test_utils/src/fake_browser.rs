//! In-memory browser for exercising element handles and pages.
//!
//! [`FakeBrowser`] holds a small tree of nodes. Tests build the tree, hand
//! the browser to a page or element registry, and inspect what was clicked,
//! typed and navigated to afterwards.
//!
//! Selector support:
//!
//! | Kind          | Matches                                                    |
//! |---------------|------------------------------------------------------------|
//! | `id`, `name`  | the attribute of that name                                 |
//! | `class`       | one of the whitespace-separated classes                    |
//! | `tagname`     | the tag, ignoring case                                     |
//! | `text`        | the whole trimmed text                                     |
//! | `partialtext` | part of the text                                           |
//! | `css`         | `tag`, `#id`, `.class`, `[attr=value]` and combinations    |
//! | `xpath`       | `//tag`, `//tag[@attr='value']`, `//tag[text()='value']`   |
//!
//! CSS and XPath outside that subset are reported as invalid selectors.

use async_trait::async_trait;
use pagewright_core::{Browser, BrowserError, BrowserResult, NodeHandle, Selector, SelectorKind};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

#[cfg(test)]
#[path = "fake_browser_tests.rs"]
mod tests;

static CSS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<tag>[A-Za-z][\w-]*)?(?:#(?P<id>[\w-]+))?(?:\.(?P<class>[\w-]+))?(?:\[(?P<attr>[\w-]+)=["']?(?P<value>[^"'\]]*)["']?\])?$"#,
    )
    .expect("CSS subset pattern is valid")
});

static XPATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^//(?P<tag>\*|[A-Za-z][\w-]*)(?:\[(?:@(?P<attr>[\w-]+)|(?P<text>text\(\)))\s*=\s*'(?P<value>[^']*)'\])?$"#,
    )
    .expect("XPath subset pattern is valid")
});

const COMPLETE: &str = "complete";

/// A node to add to a [`FakeBrowser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeNode {
    pub tag: String,
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    pub visible: bool,
    pub enabled: bool,
    pub selected: bool,
    /// Number of lookups that miss the node before it can be found.
    pub appears_after: u32,
}

impl FakeNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            text: String::new(),
            attributes: BTreeMap::new(),
            visible: true,
            enabled: true,
            selected: false,
            appears_after: 0,
        }
    }

    pub fn with_id(self, id: &str) -> Self {
        self.with_attribute("id", id)
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    pub fn appearing_after(mut self, lookups: u32) -> Self {
        self.appears_after = lookups;
        self
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn input_type(&self) -> Option<String> {
        self.attribute("type").map(str::to_ascii_lowercase)
    }
}

#[derive(Debug)]
struct Entry {
    node: FakeNode,
    parent: Option<String>,
    attached: bool,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    /// Node ids in document order.
    order: Vec<String>,
    next_id: usize,
    find_calls: usize,
    clicks: Vec<String>,
    history: Vec<String>,
    position: usize,
    ready_states: VecDeque<String>,
    session_closed: bool,
}

impl State {
    fn entry(&self, node: &NodeHandle) -> BrowserResult<&Entry> {
        match self.entries.get(node.as_str()) {
            Some(entry) if entry.attached => Ok(entry),
            _ => Err(BrowserError::StaleNode {
                node: node.to_string(),
            }),
        }
    }

    fn entry_mut(&mut self, node: &NodeHandle) -> BrowserResult<&mut Entry> {
        match self.entries.get_mut(node.as_str()) {
            Some(entry) if entry.attached => Ok(entry),
            _ => Err(BrowserError::StaleNode {
                node: node.to_string(),
            }),
        }
    }

    fn is_descendant(&self, id: &str, ancestor: &str) -> bool {
        let mut current = self.entries.get(id).and_then(|e| e.parent.clone());
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.entries.get(&parent).and_then(|e| e.parent.clone());
        }
        false
    }

    fn check_open(&self) -> BrowserResult<()> {
        if self.session_closed {
            Err(BrowserError::SessionClosed)
        } else {
            Ok(())
        }
    }
}

/// Scriptable in-memory [`Browser`].
#[derive(Debug, Default)]
pub struct FakeBrowser {
    state: Mutex<State>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a node at the top level of the page.
    pub fn add(&self, node: FakeNode) -> NodeHandle {
        self.insert(node, None)
    }

    /// Add a node inside `parent`.
    pub fn add_child(&self, parent: &NodeHandle, node: FakeNode) -> NodeHandle {
        self.insert(node, Some(parent.as_str().to_string()))
    }

    fn insert(&self, node: FakeNode, parent: Option<String>) -> NodeHandle {
        let mut state = self.state();
        state.next_id += 1;
        let id = format!("node-{}", state.next_id);
        state.entries.insert(
            id.clone(),
            Entry {
                node,
                parent,
                attached: true,
            },
        );
        state.order.push(id.clone());
        NodeHandle::new(id)
    }

    /// Detach a node and its descendants. Handles to them become stale.
    pub fn remove(&self, node: &NodeHandle) {
        let mut state = self.state();
        let ids: Vec<String> = state
            .order
            .iter()
            .filter(|id| *id == node.as_str() || state.is_descendant(id, node.as_str()))
            .cloned()
            .collect();
        for id in ids {
            if let Some(entry) = state.entries.get_mut(&id) {
                entry.attached = false;
            }
        }
    }

    /// Change a node in place.
    pub fn update(&self, node: &NodeHandle, change: impl FnOnce(&mut FakeNode)) {
        if let Some(entry) = self.state().entries.get_mut(node.as_str()) {
            change(&mut entry.node);
        }
    }

    /// Snapshot of a node, including detached ones.
    pub fn node(&self, node: &NodeHandle) -> Option<FakeNode> {
        self.state().entries.get(node.as_str()).map(|e| e.node.clone())
    }

    /// Ready states reported after the next navigation, in order. The last
    /// one repeats.
    pub fn script_ready_states(&self, states: &[&str]) {
        self.state().ready_states = states.iter().map(|s| s.to_string()).collect();
    }

    /// Make every further call fail with `SessionClosed`.
    pub fn close_session(&self) {
        self.state().session_closed = true;
    }

    /// Number of `find_node` calls so far.
    pub fn find_calls(&self) -> usize {
        self.state().find_calls
    }

    /// Ids of clicked nodes, in order.
    pub fn clicks(&self) -> Vec<NodeHandle> {
        self.state().clicks.iter().cloned().map(NodeHandle::new).collect()
    }

    /// URLs in the session history, oldest first. Navigating after going
    /// back discards the forward entries.
    pub fn navigations(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Reject CSS and XPath outside the supported subsets, whether or not
    /// any node is attached.
    fn validate(selector: &Selector) -> BrowserResult<()> {
        match selector.kind {
            SelectorKind::Css => css_captures(selector).map(|_| ()),
            SelectorKind::XPath => xpath_captures(selector).map(|_| ()),
            _ => Ok(()),
        }
    }

    fn matches(node: &FakeNode, selector: &Selector) -> BrowserResult<bool> {
        let value = selector.value.as_str();
        Ok(match selector.kind {
            SelectorKind::Id => node.attribute("id") == Some(value),
            SelectorKind::Name => node.attribute("name") == Some(value),
            SelectorKind::Class => node.has_class(value),
            SelectorKind::TagName => node.tag.eq_ignore_ascii_case(value),
            SelectorKind::Text => node.text.trim() == value,
            SelectorKind::PartialText => node.text.contains(value),
            SelectorKind::Css => Self::matches_css(node, selector)?,
            SelectorKind::XPath => Self::matches_xpath(node, selector)?,
        })
    }

    fn matches_css(node: &FakeNode, selector: &Selector) -> BrowserResult<bool> {
        let captures = css_captures(selector)?;

        let tag = captures
            .name("tag")
            .is_none_or(|tag| node.tag.eq_ignore_ascii_case(tag.as_str()));
        let id = captures
            .name("id")
            .is_none_or(|id| node.attribute("id") == Some(id.as_str()));
        let class = captures
            .name("class")
            .is_none_or(|class| node.has_class(class.as_str()));
        let attribute = match (captures.name("attr"), captures.name("value")) {
            (Some(attr), Some(value)) => node.attribute(attr.as_str()) == Some(value.as_str()),
            _ => true,
        };
        Ok(tag && id && class && attribute)
    }

    fn matches_xpath(node: &FakeNode, selector: &Selector) -> BrowserResult<bool> {
        let captures = xpath_captures(selector)?;

        let tag = captures
            .name("tag")
            .is_none_or(|tag| tag.as_str() == "*" || node.tag.eq_ignore_ascii_case(tag.as_str()));
        let predicate = match (captures.name("attr"), captures.name("text"), captures.name("value")) {
            (Some(attr), _, Some(value)) => node.attribute(attr.as_str()) == Some(value.as_str()),
            (None, Some(_), Some(value)) => node.text.trim() == value.as_str(),
            _ => true,
        };
        Ok(tag && predicate)
    }
}

fn css_captures(selector: &Selector) -> BrowserResult<Captures<'_>> {
    CSS.captures(selector.value.trim())
        .filter(|_| !selector.value.trim().is_empty())
        .ok_or_else(|| invalid(selector, "unsupported CSS selector"))
}

fn xpath_captures(selector: &Selector) -> BrowserResult<Captures<'_>> {
    XPATH
        .captures(selector.value.trim())
        .ok_or_else(|| invalid(selector, "unsupported XPath expression"))
}

fn invalid(selector: &Selector, reason: &str) -> BrowserError {
    BrowserError::InvalidSelector {
        selector: selector.to_string(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn find_node(&self, selector: &Selector) -> BrowserResult<NodeHandle> {
        let mut state = self.state();
        state.check_open()?;
        state.find_calls += 1;
        Self::validate(selector)?;

        let mut found = None;
        for id in state.order.clone() {
            let Some(entry) = state.entries.get_mut(&id) else {
                continue;
            };
            if !entry.attached || !Self::matches(&entry.node, selector)? {
                continue;
            }
            if entry.node.appears_after > 0 {
                entry.node.appears_after -= 1;
                continue;
            }
            found = Some(id);
            break;
        }

        match found {
            Some(id) => {
                trace!("{} matched {}", selector, id);
                Ok(NodeHandle::new(id))
            }
            None => Err(BrowserError::NoSuchNode {
                selector: selector.to_string(),
            }),
        }
    }

    async fn find_nodes_within(
        &self,
        parent: &NodeHandle,
        selector: &Selector,
    ) -> BrowserResult<Vec<NodeHandle>> {
        let state = self.state();
        state.check_open()?;
        state.entry(parent)?;
        Self::validate(selector)?;

        let mut nodes = Vec::new();
        for id in &state.order {
            let Some(entry) = state.entries.get(id) else {
                continue;
            };
            if entry.attached
                && state.is_descendant(id, parent.as_str())
                && Self::matches(&entry.node, selector)?
            {
                nodes.push(NodeHandle::new(id.clone()));
            }
        }
        Ok(nodes)
    }

    async fn click(&self, node: &NodeHandle) -> BrowserResult<()> {
        let mut state = self.state();
        state.check_open()?;
        let entry = state.entry(node)?;
        if !entry.node.visible {
            return Err(BrowserError::NotInteractable {
                reason: format!("{} is hidden", node),
            });
        }

        let tag = entry.node.tag.to_ascii_lowercase();
        let input_type = entry.node.input_type();
        let parent = entry.parent.clone();
        let group = entry.node.attribute("name").map(str::to_string);

        match (tag.as_str(), input_type.as_deref()) {
            ("option", _) => {
                for id in state.order.clone() {
                    if let Some(sibling) = state.entries.get_mut(&id) {
                        if sibling.parent == parent && sibling.node.tag.eq_ignore_ascii_case("option") {
                            sibling.node.selected = id == node.as_str();
                        }
                    }
                }
            }
            ("input", Some("checkbox")) => {
                let entry = state.entry_mut(node)?;
                entry.node.selected = !entry.node.selected;
            }
            ("input", Some("radio")) => {
                for id in state.order.clone() {
                    if let Some(other) = state.entries.get_mut(&id) {
                        if other.node.input_type().as_deref() == Some("radio")
                            && other.node.attribute("name").map(str::to_string) == group
                        {
                            other.node.selected = id == node.as_str();
                        }
                    }
                }
            }
            _ => {}
        }

        debug!("Clicked {}", node);
        state.clicks.push(node.as_str().to_string());
        Ok(())
    }

    async fn text(&self, node: &NodeHandle) -> BrowserResult<String> {
        let state = self.state();
        state.check_open()?;
        Ok(state.entry(node)?.node.text.clone())
    }

    async fn attribute(&self, node: &NodeHandle, name: &str) -> BrowserResult<Option<String>> {
        let state = self.state();
        state.check_open()?;
        Ok(state.entry(node)?.node.attribute(name).map(str::to_string))
    }

    async fn is_visible(&self, node: &NodeHandle) -> BrowserResult<bool> {
        let state = self.state();
        state.check_open()?;
        Ok(state.entry(node)?.node.visible)
    }

    async fn is_enabled(&self, node: &NodeHandle) -> BrowserResult<bool> {
        let state = self.state();
        state.check_open()?;
        Ok(state.entry(node)?.node.enabled)
    }

    async fn is_selected(&self, node: &NodeHandle) -> BrowserResult<bool> {
        let state = self.state();
        state.check_open()?;
        Ok(state.entry(node)?.node.selected)
    }

    async fn clear(&self, node: &NodeHandle) -> BrowserResult<()> {
        let mut state = self.state();
        state.check_open()?;
        state
            .entry_mut(node)?
            .node
            .attributes
            .insert("value".to_string(), String::new());
        Ok(())
    }

    async fn send_keys(&self, node: &NodeHandle, text: &str) -> BrowserResult<()> {
        let mut state = self.state();
        state.check_open()?;
        let entry = state.entry_mut(node)?;
        if !entry.node.enabled {
            return Err(BrowserError::NotInteractable {
                reason: format!("{} is disabled", node),
            });
        }
        entry
            .node
            .attributes
            .entry("value".to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        let mut state = self.state();
        state.check_open()?;
        let position = state.position;
        state.history.truncate(position);
        state.history.push(url.to_string());
        state.position = state.history.len();
        debug!("Navigated to {}", url);
        Ok(())
    }

    async fn current_url(&self) -> BrowserResult<String> {
        let state = self.state();
        state.check_open()?;
        Ok(state
            .position
            .checked_sub(1)
            .and_then(|index| state.history.get(index))
            .cloned()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn ready_state(&self) -> BrowserResult<String> {
        let mut state = self.state();
        state.check_open()?;
        let ready = if state.ready_states.len() > 1 {
            state.ready_states.pop_front()
        } else {
            state.ready_states.front().cloned()
        };
        Ok(ready.unwrap_or_else(|| COMPLETE.to_string()))
    }

    async fn back(&self) -> BrowserResult<()> {
        let mut state = self.state();
        state.check_open()?;
        if state.position > 1 {
            state.position -= 1;
        }
        Ok(())
    }

    async fn forward(&self) -> BrowserResult<()> {
        let mut state = self.state();
        state.check_open()?;
        if state.position < state.history.len() {
            state.position += 1;
        }
        Ok(())
    }

    async fn refresh(&self) -> BrowserResult<()> {
        self.state().check_open()
    }
}
