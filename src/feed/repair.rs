//! Textual repairs for feeds that fail strict parsing.
//!
//! Two repairs run over everything outside CDATA sections and comments:
//! valueless attributes are dropped from start tags, and ampersands that do
//! not begin a recognized entity are escaped. Nothing else is touched.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

static PROTECTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>|<!--.*?-->").unwrap());

static START_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z_][\w:.\-]*)(\s[^<>]*?)?(/?)>").unwrap());

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+))?"#).unwrap()
});

static AMPERSAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+;|#x[0-9a-fA-F]+;|amp;|lt;|gt;|quot;|apos;)?").unwrap()
});

/// Apply both repairs to a raw feed body.
///
/// # Examples
///
/// ```ignore
/// let fixed = repair_feed_xml(r#"<guid isPermaLink>AT&T</guid>"#);
/// assert_eq!(fixed, "<guid>AT&amp;T</guid>");
/// ```
pub fn repair_feed_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 16);
    let mut last = 0;
    for protected in PROTECTED.find_iter(raw) {
        out.push_str(&repair_segment(&raw[last..protected.start()]));
        out.push_str(protected.as_str());
        last = protected.end();
    }
    out.push_str(&repair_segment(&raw[last..]));
    out
}

fn repair_segment(segment: &str) -> String {
    let stripped = strip_bare_attributes(segment);
    escape_stray_ampersands(&stripped).into_owned()
}

/// Rewrite each start tag keeping only attributes that have a value.
pub fn strip_bare_attributes(xml: &str) -> Cow<'_, str> {
    START_TAG.replace_all(xml, |caps: &Captures<'_>| {
        let name = &caps[1];
        let self_closing = &caps[3];
        let attrs = caps
            .get(2)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .trim_end_matches('/');

        let mut tag = format!("<{name}");
        for attr in ATTRIBUTE.captures_iter(attrs) {
            if let Some(value) = attr.get(2) {
                tag.push(' ');
                tag.push_str(&attr[1]);
                tag.push('=');
                tag.push_str(value.as_str());
            }
        }
        tag.push_str(self_closing);
        tag.push('>');
        tag
    })
}

/// Escape `&` unless it starts `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`
/// or a numeric character reference.
pub fn escape_stray_ampersands(xml: &str) -> Cow<'_, str> {
    AMPERSAND.replace_all(xml, |caps: &Captures<'_>| match caps.get(1) {
        Some(_) => caps[0].to_string(),
        None => "&amp;".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::parse::parse_feed;

    #[test]
    fn test_escape_stray_ampersands() {
        assert_eq!(
            escape_stray_ampersands("AT&T &amp; M&S &#38; &#x26; &lt;"),
            "AT&amp;T &amp; M&amp;S &#38; &#x26; &lt;"
        );
    }

    #[test]
    fn test_escape_unknown_named_entity() {
        assert_eq!(escape_stray_ampersands("a&nbsp;b"), "a&amp;nbsp;b");
    }

    #[test]
    fn test_strip_bare_attributes() {
        assert_eq!(
            strip_bare_attributes(r#"<guid isPermaLink>x</guid>"#),
            "<guid>x</guid>"
        );
        assert_eq!(
            strip_bare_attributes(r#"<enclosure url="https://e.com/a.mp3" hidden length='12'/>"#),
            r#"<enclosure url="https://e.com/a.mp3" length='12'/>"#
        );
        assert_eq!(strip_bare_attributes("<br/>"), "<br/>");
        assert_eq!(strip_bare_attributes("</item>"), "</item>");
    }

    #[test]
    fn test_text_words_are_not_attributes() {
        let xml = "<title>three plain words</title>";
        assert_eq!(repair_feed_xml(xml), xml);
    }

    #[test]
    fn test_cdata_and_comments_untouched() {
        let xml = "<description><![CDATA[Q&A <b hidden>x</b>]]></description><!-- a&b -->";
        assert_eq!(repair_feed_xml(xml), xml);
    }

    #[test]
    fn test_declaration_untouched() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"></rss>"#;
        assert_eq!(repair_feed_xml(xml), xml);
    }

    #[test]
    fn test_repaired_feed_matches_well_formed_item_count() {
        let well_formed = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <item><title>Q&amp;A with the minister</title><link>https://e.com/1?a=1&amp;b=2</link><guid isPermaLink="true">1</guid></item>
  <item><title>Markets</title><link>https://e.com/2</link><description><![CDATA[R&D up]]></description></item>
  <item><title>Weather</title><link>https://e.com/3</link></item>
</channel></rss>"#;
        let malformed = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <item><title>Q&A with the minister</title><link>https://e.com/1?a=1&b=2</link><guid isPermaLink>1</guid></item>
  <item><title>Markets</title><link>https://e.com/2</link><description><![CDATA[R&D up]]></description></item>
  <item><title>Weather</title><link>https://e.com/3</link></item>
</channel></rss>"#;

        assert!(parse_feed(malformed, None).is_err());
        let expected = parse_feed(well_formed, None).unwrap();
        let repaired = parse_feed(&repair_feed_xml(malformed), None).unwrap();

        assert_eq!(repaired.len(), expected.len());
        assert_eq!(repaired, expected);
    }
}
