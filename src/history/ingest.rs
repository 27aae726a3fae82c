//! Cache-or-fetch retrieval of a repository's complete tag list

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{CacheConfig, PAGE_SIZE};
use crate::history::cache::TagStore;
use crate::history::error::FetchError;
use crate::history::retry::{NoRetry, RetryPolicy};
use crate::history::source::{TagPage, TagSource};
use crate::history::types::VersionRecord;

/// When a cached tag list may be used instead of a live fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub max_age: Duration,
}

impl From<&CacheConfig> for CacheSettings {
    fn from(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_age: Duration::from_secs(config.max_age_seconds),
        }
    }
}

/// Fetches all tags of a repository, serving them from the tag store while
/// the stored list is younger than the configured max age.
///
/// The age of a stored list is measured from the time the store reports it
/// was written. Loading it, walking the pages and saving the result happen
/// under one lock, so concurrent callers never fetch the same stale list
/// twice.
pub struct TagIngestionClient {
    source: Arc<dyn TagSource>,
    store: Arc<dyn TagStore>,
    retry: Box<dyn RetryPolicy>,
    settings: CacheSettings,
    /// Set by `invalidate`, cleared once a fresh list has been saved
    invalidated: Mutex<bool>,
}

impl TagIngestionClient {
    pub fn new(
        source: Arc<dyn TagSource>,
        store: Arc<dyn TagStore>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            source,
            store,
            retry: Box::new(NoRetry),
            settings,
            invalidated: Mutex::new(false),
        }
    }

    pub fn with_retry_policy(mut self, retry: Box<dyn RetryPolicy>) -> Self {
        self.retry = retry;
        self
    }

    /// Ignores the stored list so the next call fetches from the source
    pub async fn invalidate(&self) {
        *self.invalidated.lock().await = true;
    }

    /// Returns all tags of `owner/repo`, newest first as delivered by the source
    pub async fn fetch_all_tags(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<VersionRecord>, FetchError> {
        let mut invalidated = self.invalidated.lock().await;

        if self.settings.enabled && !*invalidated {
            if let Some(cached) = self.store.load(owner, repo) {
                if self.is_fresh(cached.refreshed_at, Utc::now()) {
                    debug!(
                        "Serving {} cached tags of {}/{}",
                        cached.records.len(),
                        owner,
                        repo
                    );
                    return Ok(cached.records);
                }
                debug!(
                    "Cached tags of {}/{} from {} are stale",
                    owner, repo, cached.refreshed_at
                );
            }
        }

        let records = self.fetch_from_source(owner, repo).await?;

        if self.settings.enabled {
            match self.store.save(owner, repo, &records) {
                Ok(()) => *invalidated = false,
                Err(e) => warn!("Failed to write tag cache for {}/{}: {}", owner, repo, e),
            }
        }

        Ok(records)
    }

    fn is_fresh(&self, refreshed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let max_age = TimeDelta::from_std(self.settings.max_age).unwrap_or(TimeDelta::MAX);
        refreshed_at
            .checked_add_signed(max_age)
            .is_none_or(|expires| now <= expires)
    }

    async fn fetch_from_source(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<VersionRecord>, FetchError> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = self.fetch_page(owner, repo, cursor.take()).await?;
            pages += 1;

            let next = page.next_cursor().map(str::to_string);
            records.extend(page.records);

            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        info!(
            "Fetched {} tags of {}/{} in {} pages",
            records.len(),
            owner,
            repo,
            pages
        );
        Ok(records)
    }

    async fn fetch_page(
        &self,
        owner: &str,
        repo: &str,
        after: Option<String>,
    ) -> Result<TagPage, FetchError> {
        let mut attempt = 0;
        loop {
            match self
                .source
                .fetch_page(owner, repo, PAGE_SIZE, after.clone())
                .await
            {
                Ok(page) => return Ok(page),
                Err(e) => match self.retry.delay_for(attempt, &e) {
                    Some(delay) => {
                        warn!(
                            "Fetching tags of {}/{} failed ({}), retrying in {:?}",
                            owner, repo, e, delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }
}
