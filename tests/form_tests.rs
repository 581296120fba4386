mod common;

use form_relay::dom::dom_model::{Dom, ElementSpec, NodeId};
use form_relay::dom::selector::Selector;
use form_relay::error::RelayError;
use form_relay::form::serialize::{FormPayload, fill_field, serialize_form};
use form_relay::page::page::Page;

use common::fixture;

fn form_of(dom: &Dom) -> NodeId {
    dom.query_selector_all(&Selector::tag("form"))[0]
}

fn dom_with(children: Vec<ElementSpec>) -> Dom {
    let mut form = ElementSpec::new("form").attr("action", "/x");
    for child in children {
        form = form.child(child);
    }
    Dom::from_specs(&[form])
}

// =========================================================================
// Encoding
// =========================================================================

#[test]
fn encodes_single_pair() {
    let payload: FormPayload = [("q", "chess")].into_iter().collect();
    assert_eq!(payload.encode(), "q=chess");
}

#[test]
fn encodes_spaces_and_reserved_characters() {
    let payload: FormPayload = [("q", "ticket to ride"), ("tag", "a&b=c")].into_iter().collect();
    assert_eq!(payload.encode(), "q=ticket+to+ride&tag=a%26b%3Dc");
}

#[test]
fn empty_payload_encodes_to_empty_body() {
    assert_eq!(FormPayload::new().encode(), "");
}

#[test]
fn decode_restores_pairs_in_order() {
    let payload = FormPayload::decode("b=2&a=1&a=3");
    assert_eq!(
        payload.pairs(),
        &[
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "3".to_string()),
        ]
    );
}

// =========================================================================
// Successful controls
// =========================================================================

#[test]
fn serializes_fixture_forms() {
    let page = Page::open(&fixture("similar_games.yaml")).unwrap();
    let forms = page.forms();
    assert_eq!(serialize_form(page.dom(), forms[0]).encode(), "game=Catan&count=10");
    assert_eq!(serialize_form(page.dom(), forms[1]).encode(), "bgg_id=13&expansions=on");
}

#[test]
fn skips_buttons_unnamed_and_disabled_fields() {
    let dom = dom_with(vec![
        ElementSpec::new("input").attr("name", "kept").attr("value", "1"),
        ElementSpec::new("input").attr("value", "no name"),
        ElementSpec::new("input").attr("name", "").attr("value", "empty name"),
        ElementSpec::new("input").attr("name", "off").attr("disabled", "disabled"),
        ElementSpec::new("input").attr("type", "submit").attr("name", "go").attr("value", "Go"),
        ElementSpec::new("input").attr("type", "reset").attr("name", "reset"),
        ElementSpec::new("input").attr("type", "file").attr("name", "upload"),
        ElementSpec::new("button").attr("name", "btn").attr("value", "x"),
    ]);
    assert_eq!(serialize_form(&dom, form_of(&dom)).encode(), "kept=1");
}

#[test]
fn checkboxes_and_radios_only_when_checked() {
    let dom = dom_with(vec![
        ElementSpec::new("input").attr("type", "checkbox").attr("name", "a"),
        ElementSpec::new("input").attr("type", "checkbox").attr("name", "b").attr("checked", "").attr("value", "yes"),
        ElementSpec::new("input").attr("type", "radio").attr("name", "r").attr("value", "1"),
        ElementSpec::new("input").attr("type", "radio").attr("name", "r").attr("value", "2").attr("checked", ""),
    ]);
    assert_eq!(serialize_form(&dom, form_of(&dom)).encode(), "b=yes&r=2");
}

#[test]
fn textarea_and_nested_fields_are_included() {
    let dom = dom_with(vec![
        ElementSpec::new("fieldset").child(ElementSpec::new("input").attr("name", "inner").attr("value", "v")),
        ElementSpec::new("textarea").attr("name", "notes").text("hello world"),
    ]);
    assert_eq!(serialize_form(&dom, form_of(&dom)).encode(), "inner=v&notes=hello+world");
}

#[test]
fn select_falls_back_to_first_option() {
    let dom = dom_with(vec![
        ElementSpec::new("select")
            .attr("name", "s")
            .child(ElementSpec::new("option").attr("value", "first").text("First"))
            .child(ElementSpec::new("option").text("Second")),
    ]);
    assert_eq!(serialize_form(&dom, form_of(&dom)).encode(), "s=first");
}

#[test]
fn multiple_select_submits_every_selected_option() {
    let dom = dom_with(vec![
        ElementSpec::new("select")
            .attr("name", "m")
            .attr("multiple", "")
            .child(ElementSpec::new("option").text("a").attr("selected", ""))
            .child(ElementSpec::new("option").text("b"))
            .child(ElementSpec::new("option").text("c").attr("selected", "")),
    ]);
    assert_eq!(serialize_form(&dom, form_of(&dom)).encode(), "m=a&m=c");
}

#[test]
fn empty_form_serializes_to_nothing() {
    let dom = dom_with(vec![ElementSpec::new("input").attr("type", "submit")]);
    let payload = serialize_form(&dom, form_of(&dom));
    assert!(payload.is_empty());
    assert_eq!(payload.encode(), "");
}

#[test]
fn line_breaks_are_submitted_as_crlf() {
    let dom = dom_with(vec![
        ElementSpec::new("textarea").attr("name", "t").text("a\nb"),
        ElementSpec::new("textarea").attr("name", "u").text("c\r\nd\re"),
        ElementSpec::new("input").attr("name", "i").attr("value", "x\ny"),
    ]);
    assert_eq!(
        serialize_form(&dom, form_of(&dom)).encode(),
        "t=a%0D%0Ab&u=c%0D%0Ad%0D%0Ae&i=x%0D%0Ay"
    );
}

#[test]
fn disabled_fieldset_excludes_its_controls_except_first_legend() {
    let dom = dom_with(vec![
        ElementSpec::new("input").attr("name", "before").attr("value", "1"),
        ElementSpec::new("fieldset")
            .attr("disabled", "")
            .child(
                ElementSpec::new("legend")
                    .child(ElementSpec::new("input").attr("name", "in_legend").attr("value", "2")),
            )
            .child(
                ElementSpec::new("legend")
                    .child(ElementSpec::new("input").attr("name", "second_legend").attr("value", "3")),
            )
            .child(ElementSpec::new("input").attr("name", "inside").attr("value", "4"))
            .child(
                ElementSpec::new("div")
                    .child(ElementSpec::new("textarea").attr("name", "deep").text("5")),
            ),
        ElementSpec::new("input").attr("name", "after").attr("value", "6"),
    ]);
    assert_eq!(
        serialize_form(&dom, form_of(&dom)).encode(),
        "before=1&in_legend=2&after=6"
    );
}

#[test]
fn form_attribute_associates_controls_by_id() {
    let dom = Dom::from_specs(&[
        ElementSpec::new("input").attr("name", "lead").attr("form", "f").attr("value", "0"),
        ElementSpec::new("form")
            .attr("id", "f")
            .attr("action", "/x")
            .child(ElementSpec::new("input").attr("name", "own").attr("value", "1"))
            .child(
                ElementSpec::new("input")
                    .attr("name", "elsewhere")
                    .attr("form", "other")
                    .attr("value", "2"),
            ),
        ElementSpec::new("form").attr("id", "other").attr("action", "/y"),
        ElementSpec::new("input").attr("name", "trailing").attr("form", "f").attr("value", "3"),
        ElementSpec::new("input").attr("name", "stray").attr("value", "4"),
    ]);
    let forms = dom.query_selector_all(&Selector::tag("form"));

    assert_eq!(serialize_form(&dom, forms[0]).encode(), "lead=0&own=1&trailing=3");
    assert_eq!(serialize_form(&dom, forms[1]).encode(), "elsewhere=2");
}

#[test]
fn fill_field_reaches_controls_associated_by_form_attribute() {
    let mut dom = Dom::from_specs(&[
        ElementSpec::new("form").attr("id", "f").attr("action", "/x"),
        ElementSpec::new("input").attr("name", "q").attr("form", "f"),
    ]);
    let form = form_of(&dom);

    fill_field(&mut dom, form, "q", "chess").unwrap();
    assert_eq!(serialize_form(&dom, form).encode(), "q=chess");
}

// =========================================================================
// fill_field
// =========================================================================

#[test]
fn fill_field_updates_text_and_select() {
    let mut page = Page::open(&fixture("similar_games.yaml")).unwrap();
    let form = page.forms()[0];

    fill_field(page.dom_mut(), form, "game", "Ticket to Ride").unwrap();
    fill_field(page.dom_mut(), form, "count", "5").unwrap();

    assert_eq!(serialize_form(page.dom(), form).encode(), "game=Ticket+to+Ride&count=5");
}

#[test]
fn fill_field_toggles_checkbox() {
    let mut page = Page::open(&fixture("similar_games.yaml")).unwrap();
    let form = page.forms()[1];

    fill_field(page.dom_mut(), form, "expansions", "false").unwrap();
    assert_eq!(serialize_form(page.dom(), form).encode(), "bgg_id=13");
}

#[test]
fn fill_field_picks_radio_by_value() {
    let mut dom = dom_with(vec![
        ElementSpec::new("input").attr("type", "radio").attr("name", "r").attr("value", "1").attr("checked", ""),
        ElementSpec::new("input").attr("type", "radio").attr("name", "r").attr("value", "2"),
    ]);
    let form = form_of(&dom);
    fill_field(&mut dom, form, "r", "2").unwrap();
    assert_eq!(serialize_form(&dom, form).encode(), "r=2");
}

#[test]
fn fill_field_reports_unknown_name() {
    let mut page = Page::open(&fixture("search.yaml")).unwrap();
    let form = page.forms()[0];
    let err = fill_field(page.dom_mut(), form, "missing", "x").unwrap_err();
    assert!(matches!(err, RelayError::FieldNotFound(name) if name == "missing"));
}
