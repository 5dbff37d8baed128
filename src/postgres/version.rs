//! Server version parsing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal and is covered by unit tests"
)]
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(PostgreSQL\) (?P<major>\d+)\.(?P<minor>\d+)(?:\.(?P<bugfix>\d+))?")
        .expect("version pattern compiles")
});

/// PostgreSQL version as reported by `psql --version`.
///
/// Displays as `<major>.<minor>`, the form used in cluster paths and by the
/// cluster management tools.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PgVersion {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Bugfix component, absent from two-part versions.
    pub bugfix: Option<u32>,
}

impl PgVersion {
    /// Extracts the first `(PostgreSQL) <major>.<minor>[.<bugfix>]` occurrence
    /// from `output`.
    #[must_use]
    pub fn parse(output: &str) -> Option<Self> {
        let captures = VERSION_PATTERN.captures(output)?;
        let major = captures.name("major")?.as_str().parse().ok()?;
        let minor = captures.name("minor")?.as_str().parse().ok()?;
        let bugfix = match captures.name("bugfix") {
            Some(value) => Some(value.as_str().parse().ok()?),
            None => None,
        };
        Some(Self {
            major,
            minor,
            bugfix,
        })
    }
}

impl fmt::Display for PgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
