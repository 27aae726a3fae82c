//! Plain-text renderings of consolidated tag history

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, TimeDelta};

use crate::history::types::{MajorVersionSummary, VersionRecord};

fn date(at: &DateTime<FixedOffset>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn days(span: TimeDelta) -> i64 {
    span.num_days()
}

/// One line per major version, oldest first
pub fn summary_table(summaries: &[MajorVersionSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:>8} {:>8} {:>12} {:>12} {:>12} {:>6} {:>9}",
        "MAJOR", "RELEASES", "PRE", "FIRST", "LAST", "LAST PRE", "DAYS", "PRE DAYS"
    );
    for s in summaries {
        let _ = writeln!(
            out,
            "{:<10} {:>8} {:>8} {:>12} {:>12} {:>12} {:>6} {:>9}",
            s.major_key,
            s.release_count,
            s.pre_release_count,
            date(&s.first_release),
            date(&s.last_release),
            date(&s.last_pre_release),
            days(s.release_span()),
            days(s.pre_release_span()),
        );
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Raw records as CSV with a `version,released_at,author` header
pub fn export_csv(records: &[VersionRecord]) -> String {
    let mut out = String::from("version,released_at,author\n");
    for r in records {
        let _ = writeln!(
            out,
            "{},{},{}",
            csv_field(&r.tag),
            r.released_at.to_rfc3339(),
            csv_field(r.author.as_deref().unwrap_or_default())
        );
    }
    out
}
