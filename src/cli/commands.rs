use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::cli::config::AppConfig;
use crate::dom::dom_model::PageDocument;
use crate::dom::selector::Selector;
use crate::error::{PageError, RelayError};
use crate::form::serialize::{fill_field, serialize_form};
use crate::http::transport::{HttpTransport, Transport};
use crate::interceptor::interceptor::FormInterceptor;
use crate::page::page::Page;
use crate::trace::logger::TraceLogger;

/// What a `submit` run left behind on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReport {
    /// (form label, output slot text) for every form that has an output slot
    pub outputs: Vec<(String, String)>,
    pub completed: usize,
    pub navigated: bool,
}

pub fn build_tracer(config: &AppConfig) -> Arc<TraceLogger> {
    match &config.trace_file {
        Some(path) => Arc::new(TraceLogger::open(Path::new(path))),
        None => Arc::new(TraceLogger::disabled()),
    }
}

/// HTTP transport honouring `timeout_ms`; unbounded when it is unset.
pub fn build_transport(config: &AppConfig) -> Result<HttpTransport, RelayError> {
    HttpTransport::new(config.timeout_ms.map(Duration::from_millis))
}

fn load_page(page_path: &str, base_url: Option<&str>) -> Result<Page, PageError> {
    let document = PageDocument::load(Path::new(page_path))?;
    let mut page = Page::parse(&document)?;

    if let Some(base) = base_url {
        let url = Url::parse(base).map_err(|e| PageError::InvalidUrl {
            url: base.to_string(),
            source: e,
        })?;
        page.set_url(url);
    }
    Ok(page)
}

// ============================================================================
// submit subcommand
// ============================================================================

pub fn cmd_submit(
    page_path: &str,
    control: usize,
    assignments: &[(String, String)],
    base_url: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> Result<SubmitReport, Box<dyn std::error::Error>> {
    let page = load_page(page_path, base_url)?;
    let transport = build_transport(config)?;

    if verbose > 0 {
        eprintln!("Submitting control {} on {}...", control, page.url());
    }

    let report = submit_with_transport(page, Arc::new(transport), control, assignments, config)?;

    for (form, text) in &report.outputs {
        println!("== {}", form);
        println!("{}", text);
    }
    if report.navigated {
        println!("(page navigated natively; nothing was intercepted)");
    }

    Ok(report)
}

/// Install the interceptor on a (possibly still loading) page, fill the
/// requested fields, click control `control` and drain the event loop.
pub fn submit_with_transport(
    mut page: Page,
    transport: Arc<dyn Transport>,
    control: usize,
    assignments: &[(String, String)],
    config: &AppConfig,
) -> Result<SubmitReport, RelayError> {
    FormInterceptor::new(transport)
        .with_selectors(&config.submit_selector, &config.output_selector)?
        .with_tracer(build_tracer(config))
        .install(&mut page);
    page.finish_loading();

    let controls = page
        .dom()
        .query_selector_all(&Selector::parse(&config.submit_selector)?);
    let target = *controls.get(control).ok_or(RelayError::NoSubmitControl {
        index: control,
        available: controls.len(),
    })?;

    if !assignments.is_empty() {
        let form = page
            .dom()
            .closest(target, &Selector::tag("form"))
            .ok_or(RelayError::NoEnclosingForm)?;
        for (name, value) in assignments {
            fill_field(page.dom_mut(), form, name, value)?;
        }
    }

    page.click(target)?;
    let completed = page.run_until_idle();

    let output_selector = Selector::parse(&config.output_selector)?;
    let outputs = page
        .forms()
        .into_iter()
        .filter_map(|form| {
            let slot = page.dom().query_first_within(form, &output_selector)?;
            Some((page.form_label(form), page.dom().text(slot)))
        })
        .collect();

    Ok(SubmitReport {
        outputs,
        completed,
        navigated: page.has_navigated(),
    })
}

// ============================================================================
// inspect subcommand
// ============================================================================

pub fn cmd_inspect(page_path: &str, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let page = load_page(page_path, None)?;
    print!("{}", describe_page(&page, config)?);
    Ok(())
}

/// Plain-text summary of every form on the page.
pub fn describe_page(page: &Page, config: &AppConfig) -> Result<String, PageError> {
    let submit_selector = Selector::parse(&config.submit_selector)?;
    let output_selector = Selector::parse(&config.output_selector)?;
    let forms = page.forms();

    let mut out = format!("{} ({} forms)\n", page.url(), forms.len());
    for form in forms {
        let dom = page.dom();
        let submits = dom.query_within(form, &submit_selector).len();
        let has_output = dom.query_first_within(form, &output_selector).is_some();
        let payload = serialize_form(dom, form);

        out.push_str(&format!(
            "  {} {:?} {}\n    submit controls: {}\n    output slot: {}\n    payload: {}\n",
            page.form_label(form),
            page.form_method(form),
            page.form_action(form)?,
            submits,
            if has_output { "yes" } else { "missing" },
            payload.encode(),
        ));
    }
    Ok(out)
}
