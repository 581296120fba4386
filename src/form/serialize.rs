use std::collections::HashSet;

use url::form_urlencoded;

use crate::dom::dom_model::{Dom, NodeId, option_value};
use crate::dom::selector::Selector;
use crate::error::RelayError;

/// Input types that never contribute to a submitted form body.
const EXCLUDED_INPUT_TYPES: &[&str] = &["submit", "button", "image", "reset", "file"];

/// Ordered key/value pairs captured from a form at click time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    pairs: Vec<(String, String)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, value: &str) {
        self.pairs.push((name.to_string(), value.to_string()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `application/x-www-form-urlencoded` body (spaces become `+`).
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    pub fn decode(body: &str) -> Self {
        FormPayload {
            pairs: form_urlencoded::parse(body.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormPayload {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Collect the successful controls of `form` in document order.
pub fn serialize_form(dom: &Dom, form: NodeId) -> FormPayload {
    let mut payload = FormPayload::new();

    for id in form_controls(dom, form) {
        let Some(el) = dom.element(id) else { continue };

        let name = match el.attr("name") {
            Some(n) if !n.is_empty() => n,
            _ => continue,
        };
        if el.disabled || disabled_by_fieldset(dom, id) {
            continue;
        }

        match el.tag.as_str() {
            "input" => {
                let input_type = el.control_type();
                if EXCLUDED_INPUT_TYPES.contains(&input_type.as_str()) {
                    continue;
                }
                if matches!(input_type.as_str(), "checkbox" | "radio") {
                    if el.checked {
                        let value = el.attr("value").unwrap_or("on");
                        push_field(&mut payload, name, value);
                    }
                    continue;
                }
                push_field(&mut payload, name, &el.value);
            }
            "textarea" => push_field(&mut payload, name, &el.value),
            "select" => {
                for value in selected_values(dom, id) {
                    push_field(&mut payload, name, &value);
                }
            }
            _ => {}
        }
    }

    payload
}

/// Elements owned by `form`, in document order: its descendants without a
/// `form` attribute naming another form, plus any element elsewhere whose
/// `form` attribute names this form's id.
pub fn form_controls(dom: &Dom, form: NodeId) -> Vec<NodeId> {
    let form_id = dom.element(form).and_then(|el| el.attr("id"));
    let inside: HashSet<NodeId> = dom.descendants(form).into_iter().collect();

    dom.descendants(dom.root())
        .into_iter()
        .filter(|id| {
            let Some(el) = dom.element(*id) else { return false };
            match (el.attr("form"), form_id) {
                (Some(owner), Some(fid)) => owner == fid,
                (Some(_), None) => false,
                (None, _) => inside.contains(id),
            }
        })
        .collect()
}

/// Whether an ancestor `<fieldset disabled>` disables `id`. Controls inside
/// that fieldset's first `<legend>` stay enabled.
fn disabled_by_fieldset(dom: &Dom, id: NodeId) -> bool {
    let mut child = id;
    let mut current = dom.parent(id);

    while let Some(node) = current {
        let disabled_fieldset = dom
            .element(node)
            .is_some_and(|el| el.tag == "fieldset" && el.disabled);

        if disabled_fieldset {
            let first_legend = dom
                .children(node)
                .iter()
                .copied()
                .find(|c| dom.element(*c).is_some_and(|el| el.tag == "legend"));
            if first_legend != Some(child) {
                return true;
            }
        }

        child = node;
        current = dom.parent(node);
    }
    false
}

/// Line breaks are submitted as CRLF, whatever the field holds.
fn push_field(payload: &mut FormPayload, name: &str, value: &str) {
    payload.push(&normalize_newlines(name), &normalize_newlines(value));
}

fn normalize_newlines(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n").replace('\n', "\r\n")
}

fn selected_values(dom: &Dom, select: NodeId) -> Vec<String> {
    let options = dom.query_within(select, &Selector::tag("option"));
    let multiple = dom
        .element(select)
        .is_some_and(|el| el.attrs.contains_key("multiple"));

    let selected: Vec<String> = options
        .iter()
        .filter(|id| {
            dom.element(**id)
                .is_some_and(|el| el.attrs.contains_key("selected") && !el.disabled)
        })
        .map(|id| option_value(dom, *id))
        .collect();

    if !selected.is_empty() || multiple {
        return if multiple {
            selected
        } else {
            // a single select submits only its last selected option
            selected.into_iter().last().into_iter().collect()
        };
    }

    options
        .first()
        .map(|id| vec![option_value(dom, *id)])
        .unwrap_or_default()
}

/// Set the value of the named field inside `form`.
///
/// Checkboxes are checked unless `value` is empty, `false` or `off`; radio
/// groups check the member whose value matches.
pub fn fill_field(dom: &mut Dom, form: NodeId, name: &str, value: &str) -> Result<(), RelayError> {
    let fields: Vec<NodeId> = form_controls(dom, form)
        .into_iter()
        .filter(|id| dom.element(*id).is_some_and(|el| el.attr("name") == Some(name)))
        .collect();

    let first = *fields
        .first()
        .ok_or_else(|| RelayError::FieldNotFound(name.to_string()))?;

    let control_type = dom
        .element(first)
        .map(|el| el.control_type())
        .unwrap_or_default();

    match control_type.as_str() {
        "checkbox" => {
            let checked = !matches!(value.to_ascii_lowercase().as_str(), "" | "false" | "off");
            dom.set_checked(first, checked)?;
        }
        "radio" => {
            for id in fields {
                let matches = dom
                    .element(id)
                    .is_some_and(|el| el.attr("value").unwrap_or("on") == value);
                dom.set_checked(id, matches)?;
            }
        }
        _ => dom.set_value(first, value)?,
    }

    Ok(())
}
