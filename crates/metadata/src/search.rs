//! Type-ahead search: short query suggestions and a debouncer that drops
//! superseded requests.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use cinemax_core::types::MediaSummary;
use tracing::debug;

use crate::MetadataError;
use crate::provider::CatalogProvider;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const MIN_QUERY_CHARS: usize = 2;
pub const SUGGESTION_LIMIT: usize = 5;

/// Top movie and show matches for a type-ahead box.
///
/// Queries shorter than [`MIN_QUERY_CHARS`] after trimming return nothing
/// without touching the provider.
pub async fn quick_search(
    provider: &dyn CatalogProvider,
    query: &str,
) -> Result<Vec<MediaSummary>, MetadataError> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(Vec::new());
    }

    let page = provider.search_multi(query, 1).await?;
    Ok(page.results.into_iter().take(SUGGESTION_LIMIT).collect())
}

/// Delays work and lets only the most recent submission through.
///
/// Every call to [`Debouncer::run`] starts a new generation. A call whose
/// generation is overtaken while it waits never runs, and one overtaken while
/// running has its output discarded, so a slow older response can never
/// replace a newer one.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns `None` when a newer call superseded this one.
    pub async fn run<F, Fut, T>(&self, work: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if !self.is_current(generation) {
            debug!(generation, "debounced call superseded before running");
            return None;
        }

        let out = work().await;
        if !self.is_current(generation) {
            debug!(generation, "discarding stale result");
            return None;
        }
        Some(out)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubProvider;
    use cinemax_core::types::MediaKind;

    #[tokio::test]
    async fn short_queries_skip_the_provider() {
        let stub = StubProvider::with_pages(MediaKind::Movie, 1, 20);
        assert!(quick_search(&stub, " a ").await.unwrap().is_empty());
        assert!(quick_search(&stub, "").await.unwrap().is_empty());
        assert_eq!(stub.search_calls(), 0);
    }

    #[tokio::test]
    async fn suggestions_are_capped() {
        let stub = StubProvider::with_pages(MediaKind::Movie, 1, 20);
        let results = quick_search(&stub, "  heat ").await.unwrap();
        assert_eq!(results.len(), SUGGESTION_LIMIT);
        assert_eq!(stub.search_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn single_call_runs_after_delay() {
        let debouncer = Debouncer::default();
        let start = tokio::time::Instant::now();
        let out = debouncer.run(|| async { 7 }).await;
        assert_eq!(out, Some(7));
        assert!(start.elapsed() >= SEARCH_DEBOUNCE);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_calls_only_run_the_last() {
        let debouncer = Debouncer::default();
        let runs = Arc::new(AtomicU64::new(0));

        let first = {
            let d = debouncer.clone();
            let runs = runs.clone();
            tokio::spawn(async move {
                d.run(|| async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    "first"
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let second = {
            let runs = runs.clone();
            debouncer
                .run(|| async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    "second"
                })
                .await
        };

        assert_eq!(first.await.unwrap(), None);
        assert_eq!(second, Some("second"));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_does_not_overwrite_newer_one() {
        let debouncer = Debouncer::new(Duration::from_millis(10));

        let slow = {
            let d = debouncer.clone();
            tokio::spawn(async move {
                d.run(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "slow"
                })
                .await
            })
        };
        // Let the slow call pass its debounce window and start working.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let fast = debouncer.run(|| async { "fast" }).await;
        assert_eq!(fast, Some("fast"));
        assert_eq!(slow.await.unwrap(), None);
    }
}
