//! Opening-marker matching.

use crate::types::ModuleId;
use memchr::memmem::Finder;
use serde::{Deserialize, Serialize};

/// How marker occurrences are counted inside a document body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every non-overlapping occurrence of `[name` counts, including the start of
    /// longer names such as `[name_inner`.
    #[default]
    Prefix,
    /// An occurrence counts only when the marker is not followed by another
    /// identifier byte, so `[vc_row` no longer matches `[vc_row_inner`.
    Boundary,
}

/// The compiled opening marker of one module.
pub struct Marker {
    text: String,
    finder: Finder<'static>,
    mode: MatchMode,
}

impl std::fmt::Debug for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marker")
            .field("text", &self.text)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Marker {
    pub fn for_module(module: &ModuleId, mode: MatchMode) -> Self {
        let text = format!("[{}", module.as_str());
        let finder = Finder::new(text.as_bytes()).into_owned();
        Self { text, finder, mode }
    }

    /// The literal used to prefilter candidate documents.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Count occurrences of the marker in `body`.
    pub fn count_in(&self, body: &str) -> u64 {
        let bytes = body.as_bytes();
        let matches = self.finder.find_iter(bytes);
        let count = match self.mode {
            MatchMode::Prefix => matches.count(),
            MatchMode::Boundary => matches
                .filter(|&start| {
                    bytes
                        .get(start + self.text.len())
                        .is_none_or(|&next| !is_identifier_byte(next))
                })
                .count(),
        };
        count as u64
    }
}

const fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("[block1][block1]", 2)]
    #[case("[block1]", 1)]
    #[case("no markers", 0)]
    #[case("[block1 attr=\"x\"][/block1]", 1)]
    #[case("[block10]", 1)]
    #[case("[BLOCK1]", 0)]
    #[case("", 0)]
    fn test_prefix_counts_literal_occurrences(#[case] body: &str, #[case] expected: u64) {
        let marker = Marker::for_module(&ModuleId::new("block1"), MatchMode::Prefix);
        check!(marker.count_in(body) == expected);
    }

    #[rstest]
    #[case("[vc_row][vc_row_inner][/vc_row_inner][/vc_row]", 1)]
    #[case("[vc_row el_class=\"a\"]", 1)]
    #[case("[vc_row-2]", 0)]
    #[case("text ending in [vc_row", 1)]
    #[case("[vc_row\n]", 1)]
    fn test_boundary_ignores_longer_names(#[case] body: &str, #[case] expected: u64) {
        let marker = Marker::for_module(&ModuleId::new("vc_row"), MatchMode::Boundary);
        check!(marker.count_in(body) == expected);
    }

    #[test]
    fn test_prefix_overcounts_longer_names() {
        let marker = Marker::for_module(&ModuleId::new("vc_row"), MatchMode::Prefix);
        check!(marker.count_in("[vc_row][vc_row_inner][/vc_row_inner][/vc_row]") == 2);
    }

    #[test]
    fn test_closing_tags_are_not_counted() {
        let marker = Marker::for_module(&ModuleId::new("vc_btn"), MatchMode::Prefix);
        check!(marker.as_str() == "[vc_btn");
        check!(marker.count_in("[/vc_btn]") == 0);
    }
}
