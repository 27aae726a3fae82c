//! Consolidation of raw tag records into per-major-version summaries

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::history::error::FetchError;
use crate::history::ingest::TagIngestionClient;
use crate::history::ordering::{OrderingMode, compare_versions, major_key, sort_order};
use crate::history::prerelease::is_pre_release;
use crate::history::types::{MajorVersionSummary, VersionRecord};

/// Groups records by major key and summarizes each group
///
/// Groups are returned in ascending major key order. Within a group,
/// records are sorted by release date; records released at the same
/// instant keep their input order.
pub fn consolidate(records: Vec<VersionRecord>, mode: OrderingMode) -> Vec<MajorVersionSummary> {
    let mut groups: IndexMap<String, Vec<VersionRecord>> = IndexMap::new();
    for record in records {
        groups
            .entry(major_key(&record.tag))
            .or_default()
            .push(record);
    }
    groups.sort_by(|a, _, b, _| compare_versions(a, b, mode));

    groups
        .into_iter()
        .filter_map(|(key, versions)| summarize(key, versions))
        .collect()
}

/// Returns `None` only for an empty group, which grouping never produces
fn summarize(major_key: String, mut all_versions: Vec<VersionRecord>) -> Option<MajorVersionSummary> {
    all_versions.sort_by_key(|r| r.released_at);

    let first_release = all_versions.first()?.released_at;
    let last_release = all_versions.last()?.released_at;

    let pre_versions: Vec<VersionRecord> = all_versions
        .iter()
        .filter(|r| is_pre_release(&r.tag))
        .cloned()
        .collect();
    let last_pre_release = pre_versions
        .last()
        .map_or(last_release, |r| r.released_at);

    Some(MajorVersionSummary {
        major_key,
        first_release,
        last_release,
        last_pre_release,
        release_count: all_versions.len(),
        pre_release_count: pre_versions.len(),
        all_versions,
        pre_versions,
    })
}

/// Sorts records by version, ties broken by release date
pub fn sort_by_version(records: &mut [VersionRecord], mode: OrderingMode) {
    records.sort_by(|a, b| {
        sort_order(&a.tag, &b.tag, mode).then_with(|| a.released_at.cmp(&b.released_at))
    });
}

/// Release statistics of one configured repository
pub struct ReleaseHistory {
    ingest: Arc<TagIngestionClient>,
    owner: String,
    repo: String,
    mode: OrderingMode,
}

impl ReleaseHistory {
    pub fn new(
        ingest: Arc<TagIngestionClient>,
        owner: &str,
        repo: &str,
        mode: OrderingMode,
    ) -> Self {
        Self {
            ingest,
            owner: owner.to_string(),
            repo: repo.to_string(),
            mode,
        }
    }

    pub fn ingest(&self) -> &TagIngestionClient {
        &self.ingest
    }

    /// All tags of the repository sorted by version
    pub async fn version_details(&self) -> Result<Vec<VersionRecord>, FetchError> {
        let mut records = self.ingest.fetch_all_tags(&self.owner, &self.repo).await?;
        sort_by_version(&mut records, self.mode);
        Ok(records)
    }

    /// Per-major-version summaries of the repository, ascending by major key
    pub async fn consolidated_versions(&self) -> Result<Vec<MajorVersionSummary>, FetchError> {
        let records = self.version_details().await?;
        let summaries = consolidate(records, self.mode);
        debug!(
            "Consolidated {}/{} into {} major versions",
            self.owner,
            self.repo,
            summaries.len()
        );
        Ok(summaries)
    }
}
