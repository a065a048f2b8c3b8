use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, QualName, ns};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use reqwest::Url;
use std::cell::RefCell;
use std::rc::Rc;

use crate::catalog::Catalog;
use crate::client::SearchForm;
use crate::view::{Region, ViewState, Visibility};

use super::{DetailView, Disclosure, ProjectBlock, SummaryCard, SummaryList};

pub const PAGE_TITLE: &str = "Faculty Search";

/// Whether collapsible fields are emitted folded (`<details>`) or already
/// expanded. Terminals have nothing to click, so they get the expanded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folding {
    Collapsed,
    Expanded,
}

// =============================================================================
// Tree building on top of markup5ever_rcdom
// =============================================================================

fn element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(
            attrs
                .iter()
                .map(|(name, value)| Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(*name)),
                    value: StrTendril::from_slice(value),
                })
                .collect(),
        ),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

fn text(contents: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(contents)),
    })
}

fn append(parent: &Handle, child: Handle) -> Handle {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
    child
}

fn append_text_element(parent: &Handle, tag: &str, contents: &str) -> Handle {
    let el = append(parent, element(tag, &[]));
    append(&el, text(contents));
    el
}

/// `<p><strong>Label:</strong> value</p>`
fn append_labeled(parent: &Handle, label: &str, value: &str) -> Handle {
    let p = append(parent, element("p", &[]));
    append_text_element(&p, "strong", &format!("{label}:"));
    append(&p, text(&format!(" {value}")));
    p
}

/// Only `http` and `https` URLs become links.
fn is_web_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

fn is_mail_address(email: &str) -> bool {
    email.matches('@').count() == 1
        && !email
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ':' | '/' | '?' | '#' | '<' | '>'))
}

fn append_profile_link(parent: &Handle, url: &str) {
    let p = append(parent, element("p", &[]));
    append_text_element(&p, "strong", "Profile URL:");
    append(&p, text(" "));
    if !is_web_url(url) {
        append(&p, text(url));
        return;
    }
    let a = append(
        &p,
        element("a", &[("href", url), ("target", "_blank"), ("rel", "noopener")]),
    );
    append(&a, text(url));
}

fn append_disclosure(parent: &Handle, value: &Disclosure, folding: Folding) {
    match (value, folding) {
        (Disclosure::Collapsible { summary, full }, Folding::Collapsed) => {
            let details = append(parent, element("details", &[]));
            append_text_element(&details, "summary", summary);
            append_text_element(&details, "p", full);
        }
        _ => {
            append_text_element(parent, "span", value.full());
        }
    }
}

fn fragment() -> Handle {
    Node::new(NodeData::Document)
}

fn to_html(root: &Handle) -> String {
    let mut out = Vec::new();
    let handle: SerializableHandle = root.clone().into();
    // Default traversal serializes the children of `root` only.
    if let Err(e) = serialize(&mut out, &handle, SerializeOpts::default()) {
        tracing::error!("failed to serialize markup: {:#}", e);
    }
    String::from_utf8_lossy(&out).into_owned()
}

// =============================================================================
// Display trees
// =============================================================================

fn append_summary_card(parent: &Handle, card: &SummaryCard) {
    let index = card.index.to_string();
    let div = append(
        parent,
        element("div", &[("class", "result"), ("data-index", index.as_str())]),
    );
    append_text_element(&div, "h3", &card.name);
    append_labeled(&div, "School", &card.school);
    append_labeled(&div, "Department", &card.department);
    append_labeled(&div, "About", &card.about);
    append_profile_link(&div, &card.profile_url);
    let href = format!("/detail/{}#top", card.index);
    let trigger = append(
        &div,
        element("a", &[("class", "detail-trigger"), ("href", href.as_str())]),
    );
    append(&trigger, text("View details"));
}

fn append_summary_list(parent: &Handle, list: &SummaryList) {
    for card in &list.cards {
        append_summary_card(parent, card);
    }
}

fn append_project(parent: &Handle, project: &ProjectBlock, folding: Folding) {
    let div = append(parent, element("div", &[("class", "project")]));
    append_text_element(&div, "h4", &project.project_number);

    let abstract_div = append(&div, element("div", &[("class", "abstract")]));
    append_text_element(&abstract_div, "strong", "Abstract:");
    append(&abstract_div, text(" "));
    append_disclosure(&abstract_div, &project.abstract_text, folding);

    let terms_div = append(&div, element("div", &[("class", "relevant-terms")]));
    append_text_element(&terms_div, "strong", "Relevant Terms:");
    append(&terms_div, text(" "));
    append_disclosure(&terms_div, &project.relevant_terms, folding);

    append_labeled(&div, "Project Dates", &project.dates);
    append_labeled(&div, "Agency IC Admin", &project.agency_ic_admin);
    append_labeled(&div, "Activity Code", &project.activity_code);
}

fn append_detail_view(parent: &Handle, view: &DetailView, folding: Folding) {
    let div = append(parent, element("div", &[("class", "faculty-detail")]));
    append_text_element(&div, "h2", &view.name);
    append_labeled(&div, "School", &view.school);
    append_labeled(&div, "Department", &view.department);
    append_labeled(&div, "About", &view.about);
    append_profile_link(&div, &view.profile_url);

    if !view.emails.is_empty() {
        let p = append(&div, element("p", &[("class", "emails")]));
        append_text_element(&p, "strong", "Email:");
        for (i, email) in view.emails.iter().enumerate() {
            append(&p, text(if i == 0 { " " } else { ", " }));
            if !is_mail_address(email) {
                append(&p, text(email));
                continue;
            }
            let href = format!("mailto:{email}");
            let a = append(&p, element("a", &[("href", href.as_str())]));
            append(&a, text(email));
        }
    }

    if let Some(projects) = &view.projects {
        let section = append(&div, element("div", &[("class", "projects")]));
        append_text_element(&section, "h3", "Projects");
        for project in projects {
            append_project(&section, project, folding);
        }
    }
}

pub fn summary_list_html(list: &SummaryList) -> String {
    let root = fragment();
    append_summary_list(&root, list);
    to_html(&root)
}

pub fn detail_view_html(view: &DetailView) -> String {
    detail_view_html_with(view, Folding::Collapsed)
}

pub fn detail_view_html_with(view: &DetailView, folding: Folding) -> String {
    let root = fragment();
    append_detail_view(&root, view, folding);
    to_html(&root)
}

// =============================================================================
// Full page
// =============================================================================

fn region(
    parent: &Handle,
    tag: &str,
    which: Region,
    extra: &[(&str, &str)],
    state: &ViewState,
) -> Handle {
    let mut attrs = vec![("id", which.element_id())];
    attrs.extend_from_slice(extra);
    if state.visibility(which) == Visibility::Hidden {
        attrs.push(("hidden", ""));
    }
    append(parent, element(tag, &attrs))
}

fn append_select<'a>(
    parent: &Handle,
    label: &str,
    name: &str,
    options: impl IntoIterator<Item = &'a str>,
    selected: Option<&str>,
) {
    let lbl = append(parent, element("label", &[]));
    append(&lbl, text(&format!("{label} ")));
    let select = append(&lbl, element("select", &[("name", name)]));
    let any = append(&select, element("option", &[("value", "")]));
    append(&any, text("Any"));
    for option in options {
        let mut attrs = vec![("value", option)];
        if selected == Some(option) {
            attrs.push(("selected", ""));
        }
        let opt = append(&select, element("option", &attrs));
        append(&opt, text(option));
    }
}

fn append_search_form(parent: &Handle, state: &ViewState, catalog: &Catalog, form: &SearchForm) {
    let el = region(
        parent,
        "form",
        Region::SearchForm,
        &[("action", "/search"), ("method", "get")],
        state,
    );

    let school = form.get("school").filter(|s| !s.is_empty());
    append_select(&el, "School", "school", catalog.schools(), school);

    // Without a school every known department is offered.
    let departments: Vec<&str> = match school {
        Some(school) => catalog.departments(school).iter().map(String::as_str).collect(),
        None => catalog.all_departments(),
    };
    append_select(
        &el,
        "Department",
        "department",
        departments,
        form.get("department"),
    );

    let lbl = append(&el, element("label", &[]));
    append(&lbl, text("Query "));
    append(
        &lbl,
        element(
            "input",
            &[
                ("type", "text"),
                ("name", "query"),
                ("value", form.get("query").unwrap_or("")),
            ],
        ),
    );

    let button = append(&el, element("button", &[("type", "submit")]));
    append(&button, text("Search"));
}

/// Renders the whole page for the current view state.
///
/// `scroll_to_top` adds a one-line script that resets the viewport, used right
/// after the detail view opens.
pub fn page_html(
    state: &ViewState,
    catalog: &Catalog,
    form: &SearchForm,
    scroll_to_top: bool,
) -> String {
    let root = fragment();
    let html = append(&root, element("html", &[("lang", "en")]));
    let head = append(&html, element("head", &[]));
    append(&head, element("meta", &[("charset", "utf-8")]));
    append_text_element(&head, "title", PAGE_TITLE);

    let body = append(&html, element("body", &[("id", "top")]));
    append_text_element(&body, "h1", PAGE_TITLE);
    append_search_form(&body, state, catalog, form);

    let loading = region(&body, "p", Region::Loading, &[], state);
    append(&loading, text("Searching..."));

    let heading = region(&body, "h2", Region::ResultsHeading, &[], state);
    append(&heading, text(&results_heading(state)));

    let results = region(&body, "div", Region::ResultsList, &[], state);
    if let Some(summary) = state.summary() {
        append_summary_list(&results, summary);
    }

    let detail = region(&body, "div", Region::Detail, &[], state);
    if let Some(view) = state.detail() {
        let back = append(&detail, element("a", &[("class", "back"), ("href", "/back")]));
        append(&back, text("Back to search"));
        append_detail_view(&detail, view, Folding::Collapsed);
    }

    if scroll_to_top {
        append_text_element(&body, "script", "window.scrollTo(0, 0);");
    }

    format!("<!DOCTYPE html>\n{}", to_html(&root))
}

fn results_heading(state: &ViewState) -> String {
    match state.summary().map(SummaryList::len) {
        Some(1) => "1 result".to_string(),
        Some(n) => format!("{n} results"),
        None => "Results".to_string(),
    }
}
