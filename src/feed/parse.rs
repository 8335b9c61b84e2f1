//! Strict feed parsing.
//!
//! Two passes over the document:
//! 1. A well-formedness gate on raw `quick_xml` events. Mismatched end tags,
//!    attributes without values and unknown or unterminated entity
//!    references are errors, as is a document with no feed root.
//! 2. `feed_rs` builds the RSS 0.9x/1.0/2.0 or Atom model, which is mapped
//!    onto [`FeedItem`].
//!
//! Tolerance for broken feeds lives in [`super::repair`], never here.

use crate::error::FeedParseError;
use crate::models::FeedItem;
use crate::utils::collapse_whitespace;
use feed_rs::model::Entry;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use scraper::Html;
use url::Url;

/// Parse a feed document into its items, in document order.
///
/// `base` resolves relative item links; pass the feed's own URL.
pub fn parse_feed(xml: &str, base: Option<&Url>) -> Result<Vec<FeedItem>, FeedParseError> {
    check_well_formed(xml)?;
    let feed = feed_rs::parser::parse(xml.as_bytes())?;
    Ok(feed
        .entries
        .into_iter()
        .map(|entry| to_feed_item(entry, base))
        .collect())
}

/// Reject anything a lenient parser would quietly paper over.
pub fn check_well_formed(xml: &str) -> Result<(), FeedParseError> {
    let mut reader = Reader::from_str(xml);
    let mut saw_feed_root = false;

    loop {
        let position = reader.buffer_position();
        let event = reader.read_event().map_err(|e| FeedParseError::Xml {
            position: reader.error_position(),
            message: e.to_string(),
        })?;
        let at = |message: String| FeedParseError::Xml { position, message };

        match event {
            Event::Start(e) | Event::Empty(e) => {
                saw_feed_root |= is_feed_root(&e);
                check_attributes(&e).map_err(at)?;
            }
            Event::Text(t) => {
                let raw = std::str::from_utf8(&t).map_err(|e| at(e.to_string()))?;
                unescape(raw).map_err(|e| at(e.to_string()))?;
            }
            Event::GeneralRef(r) => {
                let name = std::str::from_utf8(&r).map_err(|e| at(e.to_string()))?;
                let reference = format!("&{name};");
                unescape(&reference).map_err(|e| at(e.to_string()))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if saw_feed_root {
        Ok(())
    } else {
        Err(FeedParseError::NotAFeed)
    }
}

fn is_feed_root(e: &BytesStart<'_>) -> bool {
    matches!(
        e.name().as_ref(),
        b"rss" | b"feed" | b"rdf:RDF" | b"channel"
    )
}

/// A bare attribute such as `<guid isPermaLink>` is an error here.
fn check_attributes(e: &BytesStart<'_>) -> Result<(), String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let raw = String::from_utf8_lossy(&attr.value);
        unescape(&raw).map_err(|err| err.to_string())?;
    }
    Ok(())
}

fn to_feed_item(entry: Entry, base: Option<&Url>) -> FeedItem {
    // Atom marks the article link `alternate` (or leaves `rel` off); RSS
    // `<link>` carries no rel at all.
    let link = entry
        .links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .map(|l| collapse_whitespace(&l.href))
        .filter(|href| !href.is_empty())
        .map(|href| resolve_link(&href, base));

    let description = entry
        .summary
        .map(|s| s.content.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            entry
                .content
                .and_then(|c| c.body)
                .map(|body| content_snippet(&body))
        })
        .filter(|d| !d.is_empty());

    FeedItem {
        title: entry
            .title
            .map(|t| collapse_whitespace(&t.content))
            .filter(|t| !t.is_empty()),
        link,
        description,
        published_at: entry.published.or(entry.updated),
    }
}

fn resolve_link(link: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) if Url::parse(link).is_err() => base
            .join(link)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| link.to_string()),
        _ => link.to_string(),
    }
}

/// Plain-text snippet of an HTML content body.
fn content_snippet(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    collapse_whitespace(&fragment.root_element().text().collect::<Vec<_>>().join(" "))
}
