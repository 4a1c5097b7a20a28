use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease};

use crate::version::error::ParseError;

/// Numeric segments every version is padded to
const MIN_SEGMENTS: usize = 3;

/// A tag interpreted as a semantic version.
///
/// Any number of numeric segments is accepted; missing ones count as zero,
/// so `1.2` equals `1.2.0` and `1.2.3` equals `1.2.3.0`. Pre-releases follow
/// semver precedence. Build metadata is ignored, so `1.2.0+a` and `1.2.0+b`
/// compare equal.
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<u64>,
    pre: Prerelease,
    build: BuildMetadata,
    original: String,
}

impl Version {
    pub fn parse(tag: &str) -> Result<Self, ParseError> {
        parse_version(tag)
    }

    /// The tag this version was parsed from
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    fn segment(&self, idx: usize) -> u64 {
        self.segments.get(idx).copied().unwrap_or(0)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|idx| self.segment(idx).cmp(&other.segment(idx)))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // A release outranks any of its pre-releases
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core: Vec<String> = self.segments.iter().map(u64::to_string).collect();
        f.write_str(&core.join("."))?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_version(s)
    }
}

/// Parse a tag into a Version.
///
/// Strips a leading 'v' and pads to at least three numeric segments.
/// The pre-release may follow the numbers with or without a hyphen, and
/// leading zeros in numeric pre-release identifiers are dropped.
///
/// Examples:
/// - "1" -> 1.0.0
/// - "v1.2" -> 1.2.0
/// - "1.2.3.4" -> 1.2.3.4
/// - "1.0.0rc1" -> 1.0.0-rc1
/// - "1.0.0-01" -> 1.0.0-1
/// - "latest" -> error
pub fn parse_version(tag: &str) -> Result<Version, ParseError> {
    let fail = |reason: String| ParseError {
        tag: tag.to_string(),
        reason,
    };

    let stripped = tag.strip_prefix('v').unwrap_or(tag);
    let core_end = stripped
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(stripped.len());
    let (core, suffix) = stripped.split_at(core_end);

    let mut segments = core
        .split('.')
        .map(|segment| {
            if segment.is_empty() {
                None
            } else {
                segment.parse::<u64>().ok()
            }
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| fail("expected numeric segments such as 1.2.3".to_string()))?;
    if segments.len() < MIN_SEGMENTS {
        segments.resize(MIN_SEGMENTS, 0);
    }

    let (pre, build) = match suffix.split_once('+') {
        Some((pre, build)) => (pre, Some(build)),
        None => (suffix, None),
    };

    let pre = match pre.strip_prefix('-') {
        Some("") => return Err(fail("empty pre-release".to_string())),
        Some(pre) => pre,
        None if pre.is_empty() || pre.starts_with(|c: char| c.is_ascii_alphabetic()) => pre,
        None => return Err(fail(format!("unexpected {pre:?} after version numbers"))),
    };
    let pre =
        Prerelease::new(&strip_numeric_leading_zeros(pre)).map_err(|e| fail(e.to_string()))?;

    let build = match build {
        Some("") => return Err(fail("empty build metadata".to_string())),
        Some(build) => BuildMetadata::new(build).map_err(|e| fail(e.to_string()))?,
        None => BuildMetadata::EMPTY,
    };

    Ok(Version {
        segments,
        pre,
        build,
        original: tag.to_string(),
    })
}

/// "rc.01" -> "rc.1"; alphanumeric identifiers are left alone
fn strip_numeric_leading_zeros(pre: &str) -> String {
    pre.split('.')
        .map(|ident| {
            if ident.len() > 1 && ident.bytes().all(|b| b.is_ascii_digit()) {
                let trimmed = ident.trim_start_matches('0');
                if trimmed.is_empty() { "0" } else { trimmed }
            } else {
                ident
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
