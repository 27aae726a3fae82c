//! Common types for tag history

use std::hash::{Hash, Hasher};

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

/// A single tag together with its authorship timestamp
///
/// Identity is the tag name: two records with the same tag are equal
/// regardless of their dates or authors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub tag: String,
    pub released_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub author: Option<String>,
}

impl VersionRecord {
    pub fn new(
        tag: impl Into<String>,
        released_at: DateTime<FixedOffset>,
        author: Option<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            released_at,
            author,
        }
    }
}

impl PartialEq for VersionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for VersionRecord {}

impl Hash for VersionRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
    }
}

/// Release statistics for one `<major>.<minor>` group
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorVersionSummary {
    pub major_key: String,
    pub first_release: DateTime<FixedOffset>,
    pub last_release: DateTime<FixedOffset>,
    /// Date of the latest pre-release, or `last_release` if there is none
    pub last_pre_release: DateTime<FixedOffset>,
    pub release_count: usize,
    pub pre_release_count: usize,
    /// All records of the group, oldest first
    pub all_versions: Vec<VersionRecord>,
    /// Pre-release records of the group, oldest first
    pub pre_versions: Vec<VersionRecord>,
}

impl MajorVersionSummary {
    /// Time between the first and the last release of the group
    pub fn release_span(&self) -> TimeDelta {
        self.last_release - self.first_release
    }

    /// Time between the first release and the last pre-release of the group
    pub fn pre_release_span(&self) -> TimeDelta {
        self.last_pre_release - self.first_release
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn records_with_same_tag_are_equal() {
        let a = VersionRecord::new("24.0.0", at("2024-01-01T00:00:00Z"), None);
        let b = VersionRecord::new(
            "24.0.0",
            at("2024-02-01T00:00:00+02:00"),
            Some("octocat".to_string()),
        );

        assert_eq!(a, b);
        assert_eq!(HashSet::from([a, b]).len(), 1);
    }

    #[test]
    fn record_serializes_with_camel_case_and_offset() {
        let record = VersionRecord::new(
            "24.1.0",
            at("2024-03-05T10:00:00+02:00"),
            Some("octocat".to_string()),
        );

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "tag": "24.1.0",
                "releasedAt": "2024-03-05T10:00:00+02:00",
                "author": "octocat"
            })
        );
    }

    #[test]
    fn record_without_author_field_deserializes() {
        let record: VersionRecord =
            serde_json::from_str(r#"{"tag":"1.0.0","releasedAt":"2020-01-01T00:00:00Z"}"#)
                .unwrap();

        assert_eq!(record.author, None);
        assert_eq!(record.released_at, at("2020-01-01T00:00:00Z"));
    }

    #[test]
    fn spans_are_measured_from_first_release() {
        let summary = MajorVersionSummary {
            major_key: "24.0".to_string(),
            first_release: at("2024-01-01T00:00:00Z"),
            last_release: at("2024-01-31T00:00:00Z"),
            last_pre_release: at("2024-01-11T00:00:00Z"),
            release_count: 0,
            pre_release_count: 0,
            all_versions: Vec::new(),
            pre_versions: Vec::new(),
        };

        assert_eq!(summary.release_span(), TimeDelta::days(30));
        assert_eq!(summary.pre_release_span(), TimeDelta::days(10));
    }
}
