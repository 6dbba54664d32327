//! Substring predicate applied to candidate lines.

use memchr::memmem;

/// Conjunction of byte-substring tests over a line.
///
/// Each keyword is compiled into a reusable searcher once; a filter built
/// from no keywords matches every line.
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    finders: Vec<memmem::Finder<'static>>,
}

impl LineFilter {
    /// Builds a filter from keyword byte sequences.
    pub fn new<I, K>(keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        Self {
            finders: keywords
                .into_iter()
                .map(|keyword| memmem::Finder::new(keyword.as_ref()).into_owned())
                .collect(),
        }
    }

    /// True when every keyword occurs somewhere in `line`.
    #[must_use]
    pub fn matches(&self, line: &[u8]) -> bool {
        self.finders.iter().all(|finder| finder.find(line).is_some())
    }
}
