use std::rc::Rc;
use std::sync::Arc;

use url::Url;

use crate::dom::dom_model::NodeId;
use crate::dom::selector::Selector;
use crate::error::PageError;
use crate::form::serialize::serialize_form;
use crate::http::outcome::RequestOutcome;
use crate::http::transport::Transport;
use crate::page::event_loop::Completion;
use crate::page::page::{ClickEvent, ClickListener, Page};
use crate::render::pretty::render_outcome;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

pub const DEFAULT_SUBMIT_SELECTOR: &str = r#"input[type="submit"]"#;
pub const DEFAULT_OUTPUT_SELECTOR: &str = ".similar_games";

/// Turns every submit control on a page into an in-place form POST whose
/// response is rendered into the form's output slot.
pub struct FormInterceptor {
    transport: Arc<dyn Transport>,
    submit_selector: Selector,
    output_selector: Selector,
    tracer: Arc<TraceLogger>,
}

/// What a completion needs to know about the click that started it.
struct ClickContext {
    form: String,
    action: Url,
    output: Option<NodeId>,
    encoded_payload: String,
}

impl FormInterceptor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        FormInterceptor {
            transport,
            submit_selector: Selector::tag("input").with_attr("type", "submit"),
            output_selector: Selector::class("similar_games"),
            tracer: Arc::new(TraceLogger::disabled()),
        }
    }

    pub fn with_selectors(mut self, submit: &str, output: &str) -> Result<Self, PageError> {
        self.submit_selector = Selector::parse(submit)?;
        self.output_selector = Selector::parse(output)?;
        Ok(self)
    }

    pub fn with_tracer(mut self, tracer: Arc<TraceLogger>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Attach once the page is ready.
    pub fn install(self, page: &mut Page) {
        page.ready(move |page| {
            if let Err(e) = self.attach(page) {
                log::error!("failed to attach form interceptor: {}", e);
            }
        });
    }

    /// Attach one click handler to every submit control currently on the
    /// page. Returns the number of handlers attached.
    pub fn attach(self, page: &mut Page) -> Result<usize, PageError> {
        let controls = page.dom().query_selector_all(&self.submit_selector);
        let interceptor = Rc::new(self);

        for control in &controls {
            let handler = Rc::clone(&interceptor);
            let listener: ClickListener =
                Rc::new(move |page: &mut Page, event: &mut ClickEvent| handler.on_click(page, event));
            page.add_click_listener(*control, listener)?;
        }

        log::debug!("attached {} submit handler(s)", controls.len());
        Ok(controls.len())
    }

    fn on_click(&self, page: &mut Page, event: &mut ClickEvent) {
        event.prevent_default();

        let Some(form) = page.dom().closest(event.target(), &Selector::tag("form")) else {
            log::warn!("submit control {:?} is not inside a form; ignoring click", event.target());
            return;
        };

        let action = match page.form_action(form) {
            Ok(url) => url,
            Err(e) => {
                log::error!("cannot submit {}: {}", page.form_label(form), e);
                return;
            }
        };

        let payload = serialize_form(page.dom(), form);
        let context = ClickContext {
            form: page.form_label(form),
            action,
            output: page.dom().query_first_within(form, &self.output_selector),
            encoded_payload: payload.encode(),
        };

        log::debug!("POST {} ({} field(s))", context.action, payload.len());

        let transport = Arc::clone(&self.transport);
        let tracer = Arc::clone(&self.tracer);

        page.spawn(move || -> Completion {
            let outcome = transport.post_form(&context.action, &payload);
            Box::new(move |page: &mut Page| apply_outcome(page, &context, outcome, &tracer))
        });
    }
}

fn apply_outcome(page: &mut Page, context: &ClickContext, outcome: RequestOutcome, tracer: &TraceLogger) {
    let trace = TraceEvent::now(&context.form, context.action.as_str(), &context.encoded_payload);

    match &outcome {
        RequestOutcome::Success { status, body } => {
            log::info!("{} -> {} {}: {}", context.form, context.action, status, body);
        }
        RequestOutcome::Failure { status: Some(status), body, .. } => {
            log::error!("{} -> {} failed with {}: {}", context.form, context.action, status, body);
        }
        RequestOutcome::Failure { status: None, reason, .. } => {
            log::error!(
                "{} -> {} failed: {}",
                context.form,
                context.action,
                reason.as_deref().unwrap_or("no response")
            );
        }
    }

    let text = match render_outcome(&outcome) {
        Ok(text) => text,
        Err(e) => {
            log::error!("{}: {}; output left unchanged", context.form, e);
            tracer.record(&trace.with_outcome(&outcome).malformed(e));
            return;
        }
    };

    let rendered = match context.output {
        Some(slot) => match page.dom_mut().set_text(slot, &text) {
            Ok(()) => true,
            Err(e) => {
                log::error!("{}: could not write output: {}", context.form, e);
                false
            }
        },
        None => {
            log::warn!("{} has no output slot; response not rendered", context.form);
            false
        }
    };

    tracer.record(&trace.with_outcome(&outcome).rendered(rendered));
}
