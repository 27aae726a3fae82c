//! Release notes lookup for a single tag

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::NotesConfig;
use crate::history::error::FetchError;
use crate::history::sources::http_client;

/// Text returned in place of release notes that couldn't be fetched
pub const FETCH_FAILED_PLACEHOLDER: &str = "Failed to fetch release notes!";

/// Response from the GitHub release-by-tag API
#[derive(Debug, Deserialize)]
struct Release {
    body: Option<String>,
}

#[derive(Debug)]
struct CachedNotes {
    body: String,
    stored_at: Instant,
}

/// Release notes cache bounded by entry count and age.
/// The oldest entry is evicted first when full.
#[derive(Debug)]
struct NotesCache {
    capacity: usize,
    ttl: Duration,
    entries: IndexMap<String, CachedNotes>,
}

impl NotesCache {
    fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            entries: IndexMap::with_capacity(capacity),
        }
    }

    fn get(&mut self, tag: &str, now: Instant) -> Option<String> {
        let expired = match self.entries.get(tag) {
            Some(entry) if now.duration_since(entry.stored_at) <= self.ttl => {
                return Some(entry.body.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.shift_remove(tag);
        }
        None
    }

    fn insert(&mut self, tag: &str, body: String, now: Instant) {
        if self.capacity == 0 {
            return;
        }
        self.entries.shift_remove(tag);
        while self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(
            tag.to_string(),
            CachedNotes {
                body,
                stored_at: now,
            },
        );
    }
}

/// Client fetching the release notes of one repository's tags
pub struct ReleaseNotesClient {
    client: reqwest::Client,
    base_url: Url,
    owner: String,
    repo: String,
    token: Option<String>,
    cache: Mutex<NotesCache>,
}

impl ReleaseNotesClient {
    pub fn new(
        base_url: &str,
        owner: &str,
        repo: &str,
        token: Option<String>,
        config: &NotesConfig,
    ) -> Result<Self, FetchError> {
        let invalid = |reason: String| FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }

        Ok(Self {
            client: http_client()?,
            base_url: parsed,
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.filter(|t| !t.is_empty()),
            cache: Mutex::new(NotesCache::new(
                config.capacity,
                Duration::from_secs(config.max_age_seconds),
            )),
        })
    }

    fn lock_cache(&self) -> MutexGuard<'_, NotesCache> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the release notes body of `tag`.
    ///
    /// Never fails: any error is logged and replaced by
    /// [`FETCH_FAILED_PLACEHOLDER`], which is not cached.
    pub async fn fetch_release_notes(&self, tag: &str) -> String {
        if let Some(body) = self.lock_cache().get(tag, Instant::now()) {
            debug!("Serving cached release notes for {}", tag);
            return body;
        }

        match self.request_release_notes(tag).await {
            Ok(body) => {
                self.lock_cache().insert(tag, body.clone(), Instant::now());
                body
            }
            Err(e) => {
                error!(
                    "Failed to fetch release notes for {}/{}@{}: {}",
                    self.owner, self.repo, tag, e
                );
                FETCH_FAILED_PLACEHOLDER.to_string()
            }
        }
    }

    /// `{base}/repos/{owner}/{repo}/releases/tags/{tag}`, each part a single
    /// percent-encoded path segment
    fn release_url(&self, tag: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "repos",
                self.owner.as_str(),
                self.repo.as_str(),
                "releases",
                "tags",
                tag,
            ]);
        }
        url
    }

    async fn request_release_notes(&self, tag: &str) -> Result<String, FetchError> {
        let mut request = self
            .client
            .get(self.release_url(tag))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            return Err(FetchError::QuotaExceeded {
                status: status.as_u16(),
                retry_after_secs: None,
            });
        }

        let body = response.text().await?;
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Protocol {
                status: status.as_u16(),
                body,
            });
        }

        let release: Release = serde_json::from_str(&body).map_err(|e| FetchError::Protocol {
            status: status.as_u16(),
            body: e.to_string(),
        })?;

        Ok(release.body.unwrap_or_default())
    }
}
