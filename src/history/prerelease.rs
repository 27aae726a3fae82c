//! Pre-release tag classifier

use std::sync::LazyLock;

use regex::Regex;

/// Ends in a `.0` segment, or carries a numbered snapshot/alpha/beta/rc marker
static PRE_RELEASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.0$|(?:SNAPSHOT|alpha|beta|rc)\d+").unwrap());

/// Returns true if the tag names a pre-release
///
/// Zero patch-level releases (`24.0.0`) count as pre-releases alongside
/// snapshots, alphas, betas and release candidates.
pub fn is_pre_release(tag: &str) -> bool {
    PRE_RELEASE_RE.is_match(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("24.0.0", true)]
    #[case("24.0.1", false)]
    #[case("24.1.0-rc1", true)]
    #[case("24.1.5", false)]
    #[case("v24.2.0.beta3", true)]
    #[case("24.2.0-SNAPSHOT12", true)]
    #[case("24.2.alpha1-hotfix", true)] // marker needn't be at the end
    #[case("24.2.10", false)]
    #[case("24.2.1-rc", false)] // marker without a number
    #[case("24.2.1-RC1", false)] // case sensitive
    #[case("1.0", true)]
    fn is_pre_release_returns_expected(#[case] tag: &str, #[case] expected: bool) {
        assert_eq!(is_pre_release(tag), expected, "{tag}");
    }
}
