//! Splitting in-place attribute values.
//!
//! `Tags:: [[A]] [[B]]` holds two values. The default splitter cuts right
//! after a `]` that is followed by `[`, optionally with exactly one
//! whitespace character in between (which is dropped). Anything else,
//! including two or more spaces, stays in one piece.

use regex::Regex;

/// How to cut an in-place attribute value into individual values.
#[derive(Debug, Clone, Copy)]
pub enum Splitter<'a> {
    /// Boundaries between adjacent bracketed links.
    BracketBoundary,
    /// Every match of the pattern is a separator.
    Pattern(&'a Regex),
}

impl Default for Splitter<'_> {
    fn default() -> Self {
        Self::BracketBoundary
    }
}

impl<'a> From<Option<&'a Regex>> for Splitter<'a> {
    fn from(pattern: Option<&'a Regex>) -> Self {
        pattern.map_or(Self::BracketBoundary, Self::Pattern)
    }
}

impl Splitter<'_> {
    /// Split `value`. Empty pieces are kept; callers filter them.
    pub fn split<'s>(&self, value: &'s str) -> Vec<&'s str> {
        match self {
            Self::BracketBoundary => split_bracket_boundaries(value),
            Self::Pattern(pattern) => pattern.split(value).collect(),
        }
    }
}

/// Cut `value` at every `]`→`[` boundary, allowing one whitespace character
/// between the brackets.
pub fn split_bracket_boundaries(value: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for (i, c) in value.char_indices() {
        if c != ']' {
            continue;
        }
        let boundary = i + 1;
        let mut rest = value[boundary..].chars();
        match rest.next() {
            Some('[') => {
                pieces.push(&value[start..boundary]);
                start = boundary;
            }
            Some(ws) if ws.is_whitespace() && rest.next() == Some('[') => {
                pieces.push(&value[start..boundary]);
                start = boundary + ws.len_utf8();
            }
            _ => {}
        }
    }

    pieces.push(&value[start..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_separated_links() {
        assert_eq!(split_bracket_boundaries("[[A]] [[B]]"), vec!["[[A]]", "[[B]]"]);
    }

    #[test]
    fn test_adjacent_links() {
        assert_eq!(split_bracket_boundaries("[[A]][[B]]"), vec!["[[A]]", "[[B]]"]);
    }

    #[test]
    fn test_two_spaces_do_not_split() {
        assert_eq!(split_bracket_boundaries("[[A]]  [[B]]"), vec!["[[A]]  [[B]]"]);
    }

    #[test]
    fn test_tags_and_trailing_text() {
        assert_eq!(
            split_bracket_boundaries("#[[A]] [[B]] and more"),
            vec!["#[[A]]", "[[B]] and more"]
        );
    }

    #[test]
    fn test_nested_link_is_one_value() {
        assert_eq!(
            split_bracket_boundaries("[[A]] [[B [[C]]]]"),
            vec!["[[A]]", "[[B [[C]]]]"]
        );
    }

    #[test]
    fn test_plain_and_empty() {
        assert_eq!(split_bracket_boundaries("plain"), vec!["plain"]);
        assert_eq!(split_bracket_boundaries(""), vec![""]);
    }

    #[test]
    fn test_other_whitespace_and_unicode() {
        assert_eq!(split_bracket_boundaries("[[É]]\t[[ü]]"), vec!["[[É]]", "[[ü]]"]);
    }

    #[test]
    fn test_pattern_splitter() {
        let comma = Regex::new(r",\s*").unwrap();
        let splitter = Splitter::from(Some(&comma));
        assert_eq!(splitter.split("a, b,c"), vec!["a", "b", "c"]);
        assert_eq!(Splitter::from(None).split("[[a]] [[b]]"), vec!["[[a]]", "[[b]]"]);
    }
}
