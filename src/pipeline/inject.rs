//! Editing-layer injection into proxied HTML.
//!
//! Adds a `<base href>`, the runtime stylesheet, a marker element and the
//! runtime script. Each piece is checked for before it is inserted, so
//! running the step twice equals running it once.

use once_cell::sync::Lazy;
use regex::Regex;

static BASE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<base\s[^>]*href\s*=").expect("static base pattern"));
static HEAD_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<head(\s[^>]*)?>").expect("static head pattern"));
static BODY_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<body(\s[^>]*)?>").expect("static body pattern"));
static BODY_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<body[\s>]").expect("static body pattern"));
static BODY_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</body\s*>").expect("static body pattern"));
static HTML_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<html(\s[^>]*)?>").expect("static html pattern"));
static DOCTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<!doctype[^>]*>").expect("static doctype pattern"));
static HTML_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</html\s*>").expect("static html pattern"));

pub const CSS_ID: &str = "__editor_css";
pub const ROOT_ID: &str = "__editor_root";
pub const SCRIPT_ID: &str = "__editor_js";

/// What to inject for one session.
#[derive(Debug, Clone)]
pub struct Injection<'a> {
    /// `<prefix>/editor/<sid>/<encodedOrigin>/`
    pub base_href: &'a str,
    pub asset_route: &'a str,
    pub session_id: &'a str,
    pub parent_origin: &'a str,
}

impl Injection<'_> {
    fn base_tag(&self) -> String {
        format!(r#"<base href="{}">"#, escape_attr(self.base_href))
    }

    fn stylesheet(&self) -> String {
        format!(r#"<link rel="stylesheet" href="{}/runtime.css" id="{CSS_ID}">"#, self.asset_route)
    }

    fn root(&self) -> String {
        format!(
            r#"<div id="{ROOT_ID}" data-session="{}" data-parent-origin="{}"></div>"#,
            escape_attr(self.session_id),
            escape_attr(self.parent_origin)
        )
    }

    fn script(&self) -> String {
        format!(r#"<script id="{SCRIPT_ID}" src="{}/runtime.js" defer></script>"#, self.asset_route)
    }
}

fn has_element(html: &str, id: &str) -> bool {
    html.contains(&format!(r#"id="{id}""#))
}

/// Inject the editing layer into `html`.
pub fn inject(html: &str, injection: &Injection) -> String {
    let mut html = html.to_string();

    let mut head = String::new();
    if !BASE_TAG.is_match(&html) {
        head.push_str(&injection.base_tag());
    }
    if !has_element(&html, CSS_ID) {
        head.push_str(&injection.stylesheet());
    }
    if !head.is_empty() {
        html = insert_in_head(&html, &head);
    }

    if !has_element(&html, ROOT_ID) {
        html = insert_in_body(&html, &injection.root());
    }

    if !has_element(&html, SCRIPT_ID) {
        html = insert_before_body_end(&html, &injection.script());
    }

    html
}

fn insert_at(html: &str, at: usize, snippet: &str) -> String {
    let mut out = String::with_capacity(html.len() + snippet.len());
    out.push_str(&html[..at]);
    out.push_str(snippet);
    out.push_str(&html[at..]);
    out
}

/// Right after `<head ...>`. A missing head is synthesized before `<body`,
/// else after `<html ...>`, else after the doctype; the doctype stays first.
fn insert_in_head(html: &str, snippet: &str) -> String {
    if let Some(m) = HEAD_OPEN.find(html) {
        return insert_at(html, m.end(), snippet);
    }
    let head = format!("<head>{snippet}</head>\n");
    if let Some(m) = BODY_START.find(html) {
        return insert_at(html, m.start(), &head);
    }
    match HTML_OPEN.find(html).or_else(|| DOCTYPE.find(html)) {
        Some(m) => insert_at(html, m.end(), &head),
        None => format!("{head}{html}"),
    }
}

/// Right after `<body ...>`; a body is synthesized before `</html>` when absent.
fn insert_in_body(html: &str, snippet: &str) -> String {
    if let Some(m) = BODY_OPEN.find(html) {
        return insert_at(html, m.end(), snippet);
    }
    let body = format!("<body>{snippet}</body>\n");
    match HTML_CLOSE.find(html) {
        Some(m) => insert_at(html, m.start(), &body),
        None => format!("{html}{body}"),
    }
}

/// Before the last `</body>`, else before `</html>`, else at the end.
fn insert_before_body_end(html: &str, snippet: &str) -> String {
    if let Some(m) = BODY_CLOSE.find_iter(html).last() {
        return insert_at(html, m.start(), snippet);
    }
    match HTML_CLOSE.find_iter(html).last() {
        Some(m) => insert_at(html, m.start(), &format!("{snippet}\n")),
        None => format!("{html}{snippet}"),
    }
}

/// Escape a value for a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
