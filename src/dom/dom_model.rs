use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dom::selector::Selector;
use crate::error::PageError;

// ============================================================================
// Page document (declarative input)
// ============================================================================

/// A page as written in a YAML or JSON fixture: its location plus the
/// element tree of its body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageDocument {
    /// Location of the page; relative form actions resolve against it
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub body: Vec<ElementSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementSpec {
    pub tag: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attrs: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        ElementSpec {
            tag: tag.to_string(),
            attrs: HashMap::new(),
            text: None,
            children: vec![],
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

impl PageDocument {
    pub fn from_yaml(source: &str) -> Result<Self, PageError> {
        serde_yaml::from_str(source).map_err(|e| PageError::Yaml {
            context: "page document".into(),
            source: e,
        })
    }

    pub fn from_json(source: &str) -> Result<Self, PageError> {
        serde_json::from_str(source).map_err(|e| PageError::Json {
            context: "page document".into(),
            source: e,
        })
    }

    /// Load a page document; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, PageError> {
        let content = std::fs::read_to_string(path).map_err(|e| PageError::Load {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }
}

// ============================================================================
// Live DOM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub attrs: HashMap<String, String>,
    /// Text directly owned by this element; child text is not included
    pub text: String,
    /// Current control value (`value` attribute, or textarea text, at load)
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
}

impl Element {
    fn from_spec(spec: &ElementSpec) -> Self {
        let tag = spec.tag.to_ascii_lowercase();
        let attrs: HashMap<String, String> = spec
            .attrs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        let text = spec.text.clone().unwrap_or_default();

        let value = if tag == "textarea" {
            text.clone()
        } else {
            attrs.get("value").cloned().unwrap_or_default()
        };

        Element {
            checked: attrs.contains_key("checked"),
            disabled: attrs.contains_key("disabled"),
            tag,
            attrs,
            text,
            value,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Lowercased `type` attribute with the HTML defaults for inputs and buttons.
    pub fn control_type(&self) -> String {
        match self.attr("type") {
            Some(t) => t.trim().to_ascii_lowercase(),
            None if self.tag == "input" => "text".into(),
            None if self.tag == "button" => "submit".into(),
            None => String::new(),
        }
    }

    /// Whether activating this element submits its form by default.
    pub fn is_submit_control(&self) -> bool {
        match self.tag.as_str() {
            "input" => matches!(self.control_type().as_str(), "submit" | "image"),
            "button" => self.control_type() == "submit",
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// `None` only for the document root
    element: Option<Element>,
}

/// Arena-backed element tree. Node 0 is the document root; every other
/// node is an element.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Dom {
            nodes: vec![Node {
                parent: None,
                children: vec![],
                element: None,
            }],
        }
    }

    pub fn from_specs(specs: &[ElementSpec]) -> Self {
        let mut dom = Dom::new();
        for spec in specs {
            dom.append(dom.root(), spec);
        }
        dom
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append `spec` (and its subtree) as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: vec![],
            element: Some(Element::from_spec(spec)),
        });
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
        }

        for child in &spec.children {
            self.append(id, child);
        }
        id
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0).and_then(|n| n.element.as_ref())
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, PageError> {
        self.nodes
            .get_mut(id.0)
            .and_then(|n| n.element.as_mut())
            .ok_or(PageError::UnknownNode(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// All descendants of `root` in document order, excluding `root` itself.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.query_within(self.root(), selector)
    }

    pub fn query_within(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|el| selector.matches(el)))
            .collect()
    }

    pub fn query_first_within(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.element(*id).is_some_and(|el| selector.matches(el)))
    }

    /// Nearest element matching `selector`, starting at `id` and walking up.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.element(node).is_some_and(|el| selector.matches(el)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Text content: own text followed by the text of every descendant.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(el) = self.element(id) {
            out.push_str(&el.text);
        }
        for child in self.descendants(id) {
            if let Some(el) = self.element(child) {
                out.push_str(&el.text);
            }
        }
        out
    }

    /// Replace the text content of `id`; existing children are detached.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), PageError> {
        let element = self.element_mut(id)?;
        element.text = text.to_string();

        let detached = std::mem::take(&mut self.nodes[id.0].children);
        for child in detached {
            self.nodes[child.0].parent = None;
        }
        Ok(())
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), PageError> {
        let is_select = self.element(id).is_some_and(|el| el.tag == "select");
        if !is_select {
            self.element_mut(id)?.value = value.to_string();
            return Ok(());
        }

        for option in self.query_within(id, &Selector::tag("option")) {
            let matches = option_value(self, option) == value;
            let element = self.element_mut(option)?;
            if matches {
                element.attrs.insert("selected".into(), "selected".into());
            } else {
                element.attrs.remove("selected");
            }
        }
        Ok(())
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<(), PageError> {
        self.element_mut(id)?.checked = checked;
        Ok(())
    }

    /// Number of elements, excluding the document root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Submitted value of an `<option>`: its `value` attribute, else its text.
pub fn option_value(dom: &Dom, option: NodeId) -> String {
    match dom.element(option).and_then(|el| el.attr("value")) {
        Some(v) => v.to_string(),
        None => dom.text(option).trim().to_string(),
    }
}
