//! Per-run outcome tree.
//!
//! Every level of a run (source, category, item) ends in an [`Outcome`]. A
//! failure at one level is recorded and logged through [`isolate`], then its
//! siblings carry on. The finished [`RunReport`] is the only thing a run
//! returns.

use serde::Serialize;
use std::fmt::Display;
use tracing::{error, warn};

/// How one unit of work ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Skipped(String),
    Failed(String),
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }
}

/// Log a failed step at `scope` and fold it into an [`Outcome`].
///
/// On success the value is handed back so the caller can continue with it.
pub fn isolate<T, E: Display>(scope: &str, result: Result<T, E>) -> (Option<T>, Outcome) {
    match result {
        Ok(value) => (Some(value), Outcome::Done),
        Err(e) => {
            error!(scope, error = %e, "Step failed; continuing with siblings");
            (None, Outcome::Failed(e.to_string()))
        }
    }
}

/// Record a skip at `scope` with a warning.
pub fn skip(scope: &str, reason: impl Into<String>) -> Outcome {
    let reason = reason.into();
    warn!(scope, reason = %reason, "Skipped");
    Outcome::Skipped(reason)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub title: String,
    pub link: Option<String>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    pub label: String,
    pub url: String,
    pub outcome: Outcome,
    pub items: Vec<ItemReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub categories: Vec<CategoryReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
    /// Set when the run ended before visiting any source.
    pub aborted: Option<String>,
}

impl RunReport {
    fn items(&self) -> impl Iterator<Item = &ItemReport> {
        self.categories().flat_map(|c| c.items.iter())
    }

    fn categories(&self) -> impl Iterator<Item = &CategoryReport> {
        self.sources.iter().flat_map(|s| s.categories.iter())
    }

    pub fn articles_persisted(&self) -> usize {
        self.items().filter(|i| i.outcome.is_done()).count()
    }

    pub fn items_skipped(&self) -> usize {
        self.items().filter(|i| i.outcome.is_skipped()).count()
    }

    pub fn items_failed(&self) -> usize {
        self.items().filter(|i| i.outcome.is_failed()).count()
    }

    pub fn categories_failed(&self) -> usize {
        self.categories().filter(|c| c.outcome.is_failed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(outcome: Outcome) -> ItemReport {
        ItemReport {
            title: "t".to_string(),
            link: Some("https://e.com".to_string()),
            outcome,
        }
    }

    #[test]
    fn test_isolate_passes_value_through() {
        let (value, outcome) = isolate::<_, String>("item", Ok(3));
        assert_eq!(value, Some(3));
        assert_eq!(outcome, Outcome::Done);

        let (value, outcome) = isolate::<u8, _>("item", Err("boom"));
        assert_eq!(value, None);
        assert_eq!(outcome, Outcome::Failed("boom".to_string()));
    }

    #[test]
    fn test_counters() {
        let report = RunReport {
            sources: vec![SourceReport {
                name: "S".to_string(),
                categories: vec![
                    CategoryReport {
                        label: "World".to_string(),
                        url: "https://e.com/w".to_string(),
                        outcome: Outcome::Done,
                        items: vec![
                            item(Outcome::Done),
                            item(Outcome::Skipped("short".to_string())),
                            item(Outcome::Failed("db".to_string())),
                            item(Outcome::Done),
                        ],
                    },
                    CategoryReport {
                        label: "Business".to_string(),
                        url: "https://e.com/b".to_string(),
                        outcome: Outcome::Failed("404".to_string()),
                        items: vec![],
                    },
                ],
            }],
            aborted: None,
        };

        assert_eq!(report.articles_persisted(), 2);
        assert_eq!(report.items_skipped(), 1);
        assert_eq!(report.items_failed(), 1);
        assert_eq!(report.categories_failed(), 1);
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_string(&Outcome::Skipped("no link".to_string())).unwrap();
        assert_eq!(json, r#"{"status":"skipped","reason":"no link"}"#);
        assert_eq!(
            serde_json::to_string(&Outcome::Done).unwrap(),
            r#"{"status":"done"}"#
        );
    }
}
