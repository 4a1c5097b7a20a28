//! Include/exclude tag filtering

use regex::Regex;

/// Compiled include and exclude patterns for one watched image
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl TagFilter {
    pub fn new(include: Vec<Regex>, exclude: Vec<Regex>) -> Self {
        Self { include, exclude }
    }

    pub fn include(&self) -> &[Regex] {
        &self.include
    }

    pub fn exclude(&self) -> &[Regex] {
        &self.exclude
    }

    /// Whether a single tag survives the filter
    pub fn matches(&self, tag: &str) -> bool {
        is_included(tag, &self.include) && !is_excluded(tag, &self.exclude)
    }

    pub fn apply<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        filter_tags(tags, &self.include, &self.exclude)
    }
}

/// An empty include set lets every tag through.
pub fn is_included(tag: &str, include: &[Regex]) -> bool {
    include.is_empty() || include.iter().any(|re| re.is_match(tag))
}

pub fn is_excluded(tag: &str, exclude: &[Regex]) -> bool {
    exclude.iter().any(|re| re.is_match(tag))
}

/// Keep tags that pass inclusion and match no exclude pattern.
///
/// Source order is preserved and duplicates are kept.
pub fn filter_tags<S: AsRef<str>>(tags: &[S], include: &[Regex], exclude: &[Regex]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.as_ref())
        .filter(|tag| is_included(tag, include) && !is_excluded(tag, exclude))
        .map(str::to_string)
        .collect()
}
