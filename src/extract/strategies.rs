//! The content extraction cascade, as a pure function over an HTML document.
//!
//! Order of passes:
//! 1. Content-container selectors, longest result over 100 chars wins
//! 2. Paragraph aggregation, when the best so far is under 200 chars
//! 3. Generic main-content containers, under the same condition
//! 4. JSON-LD `articleBody`/`description`, under the same condition
//! 5. Whole-body text capped at 5000 chars, when the result is under 100 chars
//!
//! JSON-LD blocks are read before noise stripping removes every `<script>`.

use crate::utils::{char_len, collapse_whitespace, normalize_text, take_chars};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Candidates must exceed this many characters to count at all.
pub const MIN_CANDIDATE_CHARS: usize = 100;
/// Below this the cascade keeps looking for something better.
pub const QUALITY_FLOOR_CHARS: usize = 200;
/// Paragraphs this short are treated as navigation or boilerplate.
pub const MIN_PARAGRAPH_CHARS: usize = 50;
/// Cap on the whole-page fallback.
pub const BODY_FALLBACK_MAX_CHARS: usize = 5000;

const NOISE: &str = "script, style, nav, header, footer, aside, .advertisement, .ads, .sidebar, .comments, .social-share, .related-articles";

/// Candidate containers. This is a candidate list, not a preference order:
/// the longest qualifying text across all of them wins.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article .content",
    "article .article-content",
    "article .post-content",
    "article .entry-content",
    "article .story-content",
    "article .article-body",
    "article .post-body",
    "article .content-body",
    ".content",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".story-content",
    ".article-body",
    ".post-body",
    ".content-body",
    ".main-content",
    ".article-text",
    ".story-text",
    ".news-content",
    "article",
];

pub const MAIN_SELECTORS: &[&str] = &["main", "#main", ".main", "#content", ".content"];

fn compile(selectors: &'static [&'static str]) -> Vec<(&'static str, Selector)> {
    selectors
        .iter()
        .map(|&s| (s, Selector::parse(s).unwrap()))
        .collect()
}

static NOISE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(NOISE).unwrap());
static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static CONTENT: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| compile(CONTENT_SELECTORS));
static MAIN: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| compile(MAIN_SELECTORS));

/// Which pass produced the final text.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Selector(&'static str),
    Paragraphs,
    MainContainer(&'static str),
    JsonLd,
    BodyFallback,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Selector(s) => write!(f, "selector `{s}`"),
            Strategy::Paragraphs => f.write_str("paragraphs"),
            Strategy::MainContainer(s) => write!(f, "main container `{s}`"),
            Strategy::JsonLd => f.write_str("json-ld"),
            Strategy::BodyFallback => f.write_str("body fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub text: String,
    pub strategy: Strategy,
}

struct Best {
    text: String,
    len: usize,
    strategy: Strategy,
}

impl Best {
    fn empty() -> Self {
        Self {
            text: String::new(),
            len: 0,
            strategy: Strategy::BodyFallback,
        }
    }

    fn replace(&mut self, text: String, strategy: Strategy) {
        self.len = char_len(&text);
        self.text = text;
        self.strategy = strategy;
    }

    fn offer(&mut self, text: String, strategy: Strategy) {
        if char_len(&text) > self.len {
            self.replace(text, strategy);
        }
    }

    fn below_quality_floor(&self) -> bool {
        self.len < QUALITY_FLOOR_CHARS
    }
}

/// Run the full cascade. `None` means the page has no text at all.
pub fn extract_from_html(html: &str) -> Option<Extracted> {
    let mut document = Html::parse_document(html);
    let json_ld = json_ld_blocks(&document);
    strip_noise(&mut document);

    let mut best = Best::empty();

    for &(selector, ref compiled) in CONTENT.iter() {
        let elements: Vec<ElementRef<'_>> = document.select(compiled).collect();
        if elements.is_empty() {
            continue;
        }
        let text = collapse_whitespace(
            &elements
                .iter()
                .map(|el| element_text(el).trim().to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        );
        let len = char_len(&text);
        debug!(selector, len, "Content selector candidate");
        if len > best.len && len > MIN_CANDIDATE_CHARS {
            best.replace(text, Strategy::Selector(selector));
        }
    }

    if best.below_quality_floor() {
        let paragraphs: Vec<String> = document
            .select(&PARAGRAPH)
            .map(|p| element_text(&p).trim().to_string())
            .filter(|p| char_len(p) > MIN_PARAGRAPH_CHARS)
            .collect();
        debug!(count = paragraphs.len(), "Paragraph candidates");
        if !paragraphs.is_empty() {
            best.replace(paragraphs.join("\n\n"), Strategy::Paragraphs);
        }
    }

    if best.below_quality_floor() {
        for &(selector, ref compiled) in MAIN.iter() {
            let text: String = document.select(compiled).map(|el| element_text(&el)).collect();
            if !text.is_empty() {
                best.offer(collapse_whitespace(&text), Strategy::MainContainer(selector));
            }
        }
    }

    if best.below_quality_floor() {
        for block in &json_ld {
            if let Some(body) = structured_body(block) {
                best.offer(body, Strategy::JsonLd);
            }
        }
    }

    let mut text = normalize_text(&best.text);
    let mut strategy = best.strategy;

    if char_len(&text) < MIN_CANDIDATE_CHARS {
        let body = document
            .select(&BODY)
            .next()
            .map(|b| element_text(&b))
            .unwrap_or_else(|| element_text(&document.root_element()));
        let body = take_chars(&collapse_whitespace(&body), BODY_FALLBACK_MAX_CHARS);
        if !body.is_empty() {
            text = body;
            strategy = Strategy::BodyFallback;
        }
    }

    if text.is_empty() {
        None
    } else {
        Some(Extracted { text, strategy })
    }
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

fn json_ld_blocks(document: &Html) -> Vec<Value> {
    document
        .select(&JSON_LD)
        .filter_map(|script| serde_json::from_str(element_text(&script).trim()).ok())
        .collect()
}

fn strip_noise(document: &mut Html) {
    let noise: Vec<_> = document.select(&NOISE_SELECTOR).map(|el| el.id()).collect();
    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// The longest `articleBody` (else `description`) string in a JSON-LD value,
/// looking through top-level arrays and `@graph` members.
fn structured_body(value: &Value) -> Option<String> {
    match value {
        Value::Array(values) => values
            .iter()
            .filter_map(structured_body)
            .max_by_key(|s| char_len(s)),
        Value::Object(map) => {
            let own = map
                .get("articleBody")
                .and_then(Value::as_str)
                .or_else(|| map.get("description").and_then(Value::as_str))
                .map(str::to_string);
            let graph = map.get("@graph").and_then(structured_body);
            [own, graph]
                .into_iter()
                .flatten()
                .max_by_key(|s| char_len(s))
        }
        _ => None,
    }
}
