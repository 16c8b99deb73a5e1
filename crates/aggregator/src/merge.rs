//! Merge, dedupe and fallback decision

use shared::{normalize_title, Article, Dataset, LawFirm, ProviderError, Record, RecordKind, SettlementRecord};
use std::collections::{HashMap, HashSet};

/// Result of one provider call, tagged with the provider that produced it
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    pub provider: String,
    pub result: Result<Vec<Record>, ProviderError>,
}

impl ProviderOutcome {
    pub fn new(provider: impl Into<String>, result: Result<Vec<Record>, ProviderError>) -> Self {
        Self {
            provider: provider.into(),
            result,
        }
    }
}

/// What [`reduce_outcomes`] decided
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub dataset: Dataset,
    /// Errors of the providers that failed, in priority order
    pub failures: Vec<ProviderError>,
    /// Provider records dropped for lacking a title / name / condition
    pub skipped: usize,
    pub used_fallback: bool,
}

/// Fold per-provider results into one dataset.
///
/// `outcomes` must already be in provider priority order; records are merged
/// in that order so the first provider wins every duplicate. Failed providers
/// contribute nothing. When the merged set is empty the whole answer is
/// replaced by `fallback()`.
pub fn reduce_outcomes<F>(kind: RecordKind, outcomes: Vec<ProviderOutcome>, fallback: F) -> Reduction
where
    F: FnOnce() -> Dataset,
{
    let mut records: Vec<Record> = Vec::new();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(batch) => records.extend(batch),
            Err(e) => failures.push(e),
        }
    }

    let typed = Dataset::from_records(kind, &records);
    let skipped = records.len() - typed.len();

    let merged = match typed {
        Dataset::Articles(v) => Dataset::Articles(dedupe_articles(v)),
        Dataset::LawFirms(v) => Dataset::LawFirms(dedupe_law_firms(v)),
        Dataset::Settlements(v) => Dataset::Settlements(dedupe_settlements(v)),
    };

    if merged.is_empty() {
        Reduction {
            dataset: fallback(),
            failures,
            skipped,
            used_fallback: true,
        }
    } else {
        Reduction {
            dataset: merged,
            failures,
            skipped,
            used_fallback: false,
        }
    }
}

fn first_by_key<T, F>(items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> String,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Collapse articles with the same case-normalized title; first seen wins
pub fn dedupe_articles(articles: Vec<Article>) -> Vec<Article> {
    first_by_key(articles, |a| normalize_title(&a.title))
}

/// Collapse firms with the same case-normalized name; first seen wins
pub fn dedupe_law_firms(firms: Vec<LawFirm>) -> Vec<LawFirm> {
    first_by_key(firms, |f| normalize_title(&f.name))
}

/// Keep one record per `(condition, state)`.
///
/// Within a group the first record carrying a settlement range wins; if none
/// has one, the first record wins. Groups keep the position of their first
/// member.
pub fn dedupe_settlements(records: Vec<SettlementRecord>) -> Vec<SettlementRecord> {
    let mut kept: Vec<SettlementRecord> = Vec::new();
    let mut slots: HashMap<(String, String), usize> = HashMap::new();

    for record in records {
        match slots.get(&record.group_key()) {
            Some(&slot) => {
                if !kept[slot].is_complete() && record.is_complete() {
                    kept[slot] = record;
                }
            }
            None => {
                slots.insert(record.group_key(), kept.len());
                kept.push(record);
            }
        }
    }

    kept
}
