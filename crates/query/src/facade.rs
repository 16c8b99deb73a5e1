//! QueryFacade - public query operations over the aggregation service

use aggregator::{fallback, AggregationService};
use cache::{cache_key, CacheStats, CacheStore};
use serde::Serialize;
use shared::{
    create_slug, Article, Dataset, HubConfig, HubError, LawFirm, Logger, Result,
    SettlementRecord,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Longest article overview quoted in a condition summary
const SUMMARY_OVERVIEW_CHARS: usize = 200;

/// Everything known about one condition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSearch {
    pub condition: String,
    pub articles: Vec<Article>,
    pub law_firms: Vec<LawFirm>,
    pub settlements: Vec<SettlementRecord>,
    pub summary: String,
}

/// Counters of both cache tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCacheStats {
    pub query: CacheStats,
    pub aggregation: CacheStats,
}

/// Query Façade
pub struct QueryFacade {
    aggregator: AggregationService,
    cache: CacheStore<Dataset>,
    ttl: Duration,
    logger: Arc<dyn Logger>,
}

impl QueryFacade {
    pub fn new(aggregator: AggregationService, config: &HubConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            aggregator,
            cache: CacheStore::new(),
            ttl: config.cache.query_ttl(),
            logger,
        }
    }

    /// Builder: use an externally owned cache for this tier
    pub fn with_cache(mut self, cache: CacheStore<Dataset>) -> Self {
        self.cache = cache;
        self
    }

    pub fn aggregator(&self) -> &AggregationService {
        &self.aggregator
    }

    pub async fn get_all_articles(&self) -> Vec<Article> {
        self.cached(cache_key("articles", &[]), move || self.aggregator.articles())
            .await
            .into_articles()
    }

    /// Article whose slug matches `slug` after slug normalization
    pub async fn get_article_by_slug(&self, slug: &str) -> Option<Article> {
        let wanted = create_slug(slug);
        if wanted.is_empty() {
            return None;
        }
        self.get_all_articles()
            .await
            .into_iter()
            .find(|a| a.slug == wanted)
    }

    /// Law firms, filtered by case-insensitive substring on specialty and
    /// location. When nothing matches, the answer comes from the fallback
    /// firms and is never empty.
    pub async fn get_law_firms(&self, specialty: Option<&str>, location: Option<&str>) -> Vec<LawFirm> {
        let specialty = present(specialty);
        let location = present(location);
        let key = cache_key("law_firms", &[("specialty", specialty), ("location", location)]);

        self.cached(key, move || async move {
            let firms = self.aggregator.law_firms().await.into_law_firms();
            Dataset::LawFirms(filter_law_firms(firms, specialty, location))
        })
        .await
        .into_law_firms()
    }

    /// Settlement statistics for `condition`, optionally limited to one state
    pub async fn get_settlement_data(
        &self,
        condition: &str,
        state: Option<&str>,
    ) -> Result<Vec<SettlementRecord>> {
        let condition = present(Some(condition))
            .ok_or_else(|| HubError::usage("condition must not be empty"))?;
        let state = present(state);
        let key = cache_key("settlements", &[("condition", Some(condition)), ("state", state)]);

        let data = self
            .cached(key, move || async move {
                let records = self.aggregator.settlements(Some(condition)).await.into_settlements();
                Dataset::Settlements(filter_settlements(records, condition, state))
            })
            .await;

        Ok(data.into_settlements())
    }

    /// Articles, law firms and settlements for one condition, fetched
    /// concurrently, plus a one-paragraph summary
    pub async fn search_condition(&self, condition: &str) -> Result<ConditionSearch> {
        let condition = present(Some(condition))
            .ok_or_else(|| HubError::usage("condition must not be empty"))?;

        let (articles, law_firms, settlements) = tokio::join!(
            self.get_all_articles(),
            self.get_law_firms(Some(condition), None),
            self.get_settlement_data(condition, None),
        );
        let settlements = settlements?;
        let articles = filter_articles(articles, condition);
        let summary = summarize(condition, articles.first(), settlements.first());

        Ok(ConditionSearch {
            condition: condition.to_string(),
            articles,
            law_firms,
            settlements,
            summary,
        })
    }

    /// Drop both cache tiers; the next query goes to the providers
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.aggregator.clear_cache();
        self.logger.info("Query cache cleared", None);
    }

    pub fn cache_stats(&self) -> QueryCacheStats {
        QueryCacheStats {
            query: self.cache.stats(),
            aggregation: self.aggregator.cache_stats(),
        }
    }

    async fn cached<F, Fut>(&self, key: String, load: F) -> Dataset
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Dataset>,
    {
        if let Some(hit) = self.cache.get(&key, self.ttl) {
            self.logger.debug(&format!("Query cache hit: {}", key), None);
            return hit;
        }
        self.logger.debug(&format!("Query cache miss: {}", key), None);

        let data = load().await;
        self.cache.set(key, data.clone());
        data
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Items passing the first filter pair. When none do, the fallback list is
/// tried with every pair in order, and returned whole if nothing matches.
fn narrow<T: Clone>(
    items: &[T],
    fallback: Vec<T>,
    filters: &[(Option<&str>, Option<&str>)],
    select: impl Fn(&[T], Option<&str>, Option<&str>) -> Vec<T>,
) -> Vec<T> {
    let Some(&(first, second)) = filters.first() else {
        return items.to_vec();
    };
    let found = select(items, first, second);
    if !found.is_empty() {
        return found;
    }

    let relaxed = filters
        .iter()
        .map(|&(first, second)| select(fallback.as_slice(), first, second))
        .find(|relaxed| !relaxed.is_empty());
    relaxed.unwrap_or(fallback)
}

fn filter_articles(articles: Vec<Article>, condition: &str) -> Vec<Article> {
    narrow(
        &articles,
        fallback::articles(),
        &[(Some(condition), None)],
        |pool, condition, _| {
            pool.iter()
                .filter(|a| condition.map_or(true, |c| a.mentions(c)))
                .cloned()
                .collect()
        },
    )
}

/// Strict match first. An empty answer is retried on the fallback firms,
/// strict, then without the location, then without the specialty.
fn filter_law_firms(firms: Vec<LawFirm>, specialty: Option<&str>, location: Option<&str>) -> Vec<LawFirm> {
    narrow(
        &firms,
        fallback::law_firms(),
        &[(specialty, location), (specialty, None), (None, location)],
        |pool, specialty, location| {
            pool.iter()
                .filter(|f| specialty.map_or(true, |s| f.has_specialty(s)))
                .filter(|f| location.map_or(true, |l| f.is_located_in(l)))
                .cloned()
                .collect()
        },
    )
}

/// Same relaxation order as [`filter_law_firms`]: state, then condition
fn filter_settlements(
    records: Vec<SettlementRecord>,
    condition: &str,
    state: Option<&str>,
) -> Vec<SettlementRecord> {
    narrow(
        &records,
        fallback::settlements(),
        &[(Some(condition), state), (Some(condition), None), (None, state)],
        |pool, condition, state| {
            pool.iter()
                .filter(|r| condition.map_or(true, |c| r.matches_condition(c)))
                .filter(|r| state.map_or(true, |s| r.matches_state(s)))
                .cloned()
                .collect()
        },
    )
}

fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(index) if index > 0 => &cut[..index],
        _ => cut.as_str(),
    };
    format!("{}...", cut.trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == '.'))
}

fn summarize(condition: &str, article: Option<&Article>, settlement: Option<&SettlementRecord>) -> String {
    let overview = article
        .map(|a| a.content.overview.trim())
        .filter(|o| !o.is_empty())
        .map(|o| truncate_words(o, SUMMARY_OVERVIEW_CHARS));
    let range = settlement.and_then(|s| s.settlement_range.as_deref());

    match (overview, range) {
        (Some(overview), Some(range)) => {
            format!("{} Settlements typically range from {}.", overview, range)
        }
        (Some(overview), None) => overview,
        (None, Some(range)) => format!(
            "Settlements for {} typically range from {}.",
            condition, range
        ),
        (None, None) => format!(
            "Information about {} is being updated. Please check back soon or speak with a qualified attorney.",
            condition
        ),
    }
}
