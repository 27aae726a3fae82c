//! Version ordering over free-form tag names
//!
//! Tags are compared component by component after stripping a leading
//! non-digit prefix (`v24.1.0` and `24.1.0` are the same version) and
//! splitting on `.` and `-`. Each component is compared by its digits
//! first and then by its non-digit suffix, using the precedence
//! `SNAPSHOT < alpha < beta < rc < stable < unknown`.

use std::cmp::Ordering;
use std::fmt;

/// How versions with a different number of components are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingMode {
    /// Only components present in both versions are compared, so
    /// `1.0` and `1.0.1` are equal.
    #[default]
    Prefix,
    /// Missing trailing components count as a stable `0`, and a component
    /// carrying a pre-release suffix sorts below any stable one, so
    /// `24.0.rc1 < 24.0 == 24.0.0 < 24.0.1`. Pre-release components
    /// compare by suffix before digits: `24.0.alpha9 < 24.0.beta1`.
    Strict,
}

impl OrderingMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            OrderingMode::Strict
        } else {
            OrderingMode::Prefix
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Suffix {
    Snapshot,
    Alpha,
    Beta,
    Rc,
    Stable,
    Unknown,
}

/// Declared pre-release precedence, matched by prefix, first match wins
const PRE_RELEASE_ORDER: [(&str, Suffix); 4] = [
    ("SNAPSHOT", Suffix::Snapshot),
    ("alpha", Suffix::Alpha),
    ("beta", Suffix::Beta),
    ("rc", Suffix::Rc),
];

impl Suffix {
    fn classify(suffix: &str) -> Self {
        if suffix.is_empty() {
            return Suffix::Stable;
        }
        PRE_RELEASE_ORDER
            .iter()
            .find(|(name, _)| suffix.starts_with(name))
            .map(|(_, rank)| *rank)
            .unwrap_or(Suffix::Unknown)
    }

    fn is_pre_release(self) -> bool {
        self < Suffix::Stable
    }
}

/// Decimal number of arbitrary length, stored without leading zeros
#[derive(Debug, Clone, PartialEq, Eq)]
struct Number(String);

impl Number {
    fn zero() -> Self {
        Number(String::new())
    }

    fn from_component(component: &str) -> Self {
        let digits: String = component.chars().filter(char::is_ascii_digit).collect();
        Number(digits.trim_start_matches('0').to_string())
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("0")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[derive(Debug, Clone)]
struct Component {
    number: Number,
    suffix: Suffix,
}

impl Component {
    fn parse(component: &str) -> Self {
        let suffix: String = component
            .chars()
            .filter(|c| !c.is_ascii_digit())
            .collect();
        Self {
            number: Number::from_component(component),
            suffix: Suffix::classify(&suffix),
        }
    }

    fn missing() -> Self {
        Self {
            number: Number::zero(),
            suffix: Suffix::Stable,
        }
    }

    fn compare(&self, other: &Self, mode: OrderingMode) -> Ordering {
        let by_number = || {
            self.number
                .cmp(&other.number)
                .then(self.suffix.cmp(&other.suffix))
        };
        match mode {
            OrderingMode::Prefix => by_number(),
            OrderingMode::Strict => {
                match (self.suffix.is_pre_release(), other.suffix.is_pre_release()) {
                    (true, true) => self
                        .suffix
                        .cmp(&other.suffix)
                        .then_with(|| self.number.cmp(&other.number)),
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => by_number(),
                }
            }
        }
    }
}

fn strip_prefix(version: &str) -> &str {
    version.trim_start_matches(|c: char| !c.is_ascii_digit())
}

fn split_components(version: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = strip_prefix(version).split(['.', '-']).collect();
    // "1.0." has two components, not three
    while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

fn components(version: &str) -> Vec<Component> {
    split_components(version)
        .into_iter()
        .map(Component::parse)
        .collect()
}

/// Compare two version strings
///
/// # Examples
/// - `v1.2.0` < `v1.10.0` (numeric, not lexicographic)
/// - `v24.0.SNAPSHOT1` < `v24.0.alpha1` (pre-release precedence)
/// - `1.0` == `1.0.1` in [`OrderingMode::Prefix`], `1.0` < `1.0.1` in [`OrderingMode::Strict`]
pub fn compare_versions(a: &str, b: &str, mode: OrderingMode) -> Ordering {
    let left = components(a);
    let right = components(b);
    let len = match mode {
        OrderingMode::Prefix => left.len().min(right.len()),
        OrderingMode::Strict => left.len().max(right.len()),
    };

    let missing = Component::missing();
    (0..len)
        .map(|i| {
            let l = left.get(i).unwrap_or(&missing);
            let r = right.get(i).unwrap_or(&missing);
            l.compare(r, mode)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Total order for sorting version lists
///
/// Same as [`compare_versions`], except that in [`OrderingMode::Prefix`]
/// a version sorts before its own extensions (`1.0` < `1.0.1`), because
/// prefix equality is not transitive (`1.0.0` = `1.0` = `1.0.1`).
pub fn sort_order(a: &str, b: &str, mode: OrderingMode) -> Ordering {
    compare_versions(a, b, mode).then_with(|| match mode {
        OrderingMode::Prefix => split_components(a).len().cmp(&split_components(b).len()),
        OrderingMode::Strict => Ordering::Equal,
    })
}

/// Derive the `<major>.<minor>` grouping key of a tag
///
/// Uses the digits of the first two components, missing or empty ones
/// counting as `0`: `v24.1.0-rc1` → `24.1`, `7` → `7.0`.
pub fn major_key(tag: &str) -> String {
    let parts = split_components(tag);
    let number = |i: usize| {
        parts
            .get(i)
            .map(|p| Number::from_component(p))
            .unwrap_or_else(Number::zero)
    };
    format!("{}.{}", number(0), number(1))
}
