use std::collections::HashMap;
use std::rc::Rc;

use url::Url;

use crate::dom::dom_model::{Dom, NodeId, PageDocument};
use crate::dom::selector::Selector;
use crate::error::PageError;
use crate::form::serialize::serialize_form;
use crate::page::event_loop::{Completion, EventLoop};

/// Listener invoked for clicks on the node it was registered on.
pub type ClickListener = Rc<dyn Fn(&mut Page, &mut ClickEvent)>;

type ReadyCallback = Box<dyn FnOnce(&mut Page)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    target: NodeId,
    default_prevented: bool,
}

impl ClickEvent {
    pub fn new(target: NodeId) -> Self {
        ClickEvent {
            target,
            default_prevented: false,
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A native form submission: what the page does when nothing cancels it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub method: Method,
    pub url: Url,
    pub body: String,
}

/// A loaded page: DOM, listeners, ready queue and event loop.
pub struct Page {
    dom: Dom,
    url: Url,
    title: Option<String>,
    loaded: bool,
    ready_queue: Vec<ReadyCallback>,
    listeners: HashMap<NodeId, Vec<ClickListener>>,
    navigations: Vec<Navigation>,
    event_loop: EventLoop,
}

impl Page {
    /// Build the DOM for `document`. The page is still loading: `ready`
    /// callbacks wait for `finish_loading`.
    pub fn parse(document: &PageDocument) -> Result<Page, PageError> {
        let url = Url::parse(&document.url).map_err(|e| PageError::InvalidUrl {
            url: document.url.clone(),
            source: e,
        })?;

        Ok(Page {
            dom: Dom::from_specs(&document.body),
            url,
            title: document.title.clone(),
            loaded: false,
            ready_queue: vec![],
            listeners: HashMap::new(),
            navigations: vec![],
            event_loop: EventLoop::new(),
        })
    }

    /// Parse and finish loading in one step.
    pub fn open(document: &PageDocument) -> Result<Page, PageError> {
        let mut page = Self::parse(document)?;
        page.finish_loading();
        Ok(page)
    }

    pub fn finish_loading(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;

        let queued = std::mem::take(&mut self.ready_queue);
        for callback in queued {
            callback(self);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Run `callback` once the page is loaded; immediately if it already is.
    pub fn ready<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut Page) + 'static,
    {
        if self.loaded {
            callback(self);
        } else {
            self.ready_queue.push(Box::new(callback));
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn set_url(&mut self, url: Url) {
        self.url = url;
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    pub fn add_click_listener(&mut self, node: NodeId, listener: ClickListener) -> Result<(), PageError> {
        if self.dom.element(node).is_none() {
            return Err(PageError::UnknownNode(node));
        }
        self.listeners.entry(node).or_default().push(listener);
        Ok(())
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.get(&node).map_or(0, Vec::len)
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Dispatch a click on `node`, then run its default action unless a
    /// listener prevented it.
    pub fn click(&mut self, node: NodeId) -> Result<ClickEvent, PageError> {
        if self.dom.element(node).is_none() {
            return Err(PageError::UnknownNode(node));
        }

        let mut event = ClickEvent::new(node);
        let listeners = self.listeners.get(&node).cloned().unwrap_or_default();
        for listener in listeners {
            listener(self, &mut event);
        }

        if !event.default_prevented() {
            self.run_default_action(node)?;
        }
        Ok(event)
    }

    fn run_default_action(&mut self, node: NodeId) -> Result<(), PageError> {
        let is_submit = self.dom.element(node).is_some_and(|el| el.is_submit_control());
        if !is_submit {
            return Ok(());
        }
        let Some(form) = self.dom.closest(node, &Selector::tag("form")) else {
            return Ok(());
        };

        let mut url = self.form_action(form)?;
        let encoded = serialize_form(&self.dom, form).encode();
        let method = self.form_method(form);

        let navigation = match method {
            Method::Get => {
                url.set_query(Some(&encoded));
                Navigation { method, url, body: String::new() }
            }
            Method::Post => Navigation { method, url, body: encoded },
        };

        log::info!("native {:?} navigation to {}", navigation.method, navigation.url);
        self.navigations.push(navigation);
        Ok(())
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.navigations
    }

    pub fn has_navigated(&self) -> bool {
        !self.navigations.is_empty()
    }

    // ------------------------------------------------------------------------
    // Forms
    // ------------------------------------------------------------------------

    pub fn forms(&self) -> Vec<NodeId> {
        self.dom.query_selector_all(&Selector::tag("form"))
    }

    /// The form's `action` resolved against the page URL. A missing or blank
    /// action submits to the page itself.
    pub fn form_action(&self, form: NodeId) -> Result<Url, PageError> {
        let action = self
            .dom
            .element(form)
            .and_then(|el| el.attr("action"))
            .map(str::trim)
            .unwrap_or("");

        if action.is_empty() {
            return Ok(self.url.clone());
        }

        self.url.join(action).map_err(|e| PageError::InvalidUrl {
            url: action.to_string(),
            source: e,
        })
    }

    pub fn form_method(&self, form: NodeId) -> Method {
        match self.dom.element(form).and_then(|el| el.attr("method")) {
            Some(m) if m.trim().eq_ignore_ascii_case("post") => Method::Post,
            _ => Method::Get,
        }
    }

    /// Human-readable name for a form: `#id`, `name`, or its position.
    pub fn form_label(&self, form: NodeId) -> String {
        let el = self.dom.element(form);
        if let Some(id) = el.and_then(|e| e.attr("id")) {
            return format!("#{}", id);
        }
        if let Some(name) = el.and_then(|e| e.attr("name")) {
            return name.to_string();
        }
        match self.forms().iter().position(|f| *f == form) {
            Some(index) => format!("form[{}]", index),
            None => format!("{:?}", form),
        }
    }

    // ------------------------------------------------------------------------
    // Event loop
    // ------------------------------------------------------------------------

    pub fn spawn<F>(&mut self, work: F)
    where
        F: FnOnce() -> Completion + Send + 'static,
    {
        self.event_loop.spawn(work);
    }

    pub fn pending_tasks(&self) -> usize {
        self.event_loop.pending()
    }

    /// Apply completions as they arrive until no task is outstanding.
    /// Returns the number of completions applied.
    pub fn run_until_idle(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.event_loop.next_completion() {
            completion(self);
            applied += 1;
        }
        applied
    }
}
