//! Case-insensitive prefix matching.

use regex::{Regex, RegexBuilder};

/// Matches candidates that begin with a typed prefix, ignoring case.
///
/// The prefix is escaped, so characters such as `.` or `*` match literally.
/// An empty prefix matches everything.
pub struct PrefixMatcher {
    regex: Option<Regex>,
    lowered: String,
}

impl PrefixMatcher {
    pub fn new(prefix: &str) -> Self {
        let regex = if prefix.is_empty() {
            None
        } else {
            RegexBuilder::new(&format!("^{}", regex::escape(prefix)))
                .case_insensitive(true)
                .build()
                .map_err(|e| tracing::debug!("Prefix {:?} not compiled: {}", prefix, e))
                .ok()
        };
        PrefixMatcher {
            regex,
            lowered: prefix.to_lowercase(),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(candidate),
            None => candidate.to_lowercase().starts_with(&self.lowered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(candidate: &str, prefix: &str) -> bool {
        PrefixMatcher::new(prefix).matches(candidate)
    }

    #[test]
    fn test_case_insensitive_prefix() {
        assert!(matches("class", "CL"));
        assert!(matches("Class", "cla"));
        assert!(matches("class", "class"));
        assert!(!matches("class", "lass"));
        assert!(!matches("cl", "class"));
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        assert!(matches("anything", ""));
        assert!(matches("", ""));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        assert!(matches("a.b", "a."));
        assert!(!matches("axb", "a."));
        assert!(!matches("aaa", "a*"));
        assert!(matches("(x)", "("));
        assert!(matches("$0", "$"));
        assert!(matches("a|b", "a|"));
        assert!(!matches("b", "a|"));
    }

    #[test]
    fn test_matcher_reuse() {
        let m = PrefixMatcher::new("on");
        let matched: Vec<&str> = ["onclick", "OnBlur", "id", "json"]
            .into_iter()
            .filter(|c| m.matches(c))
            .collect();
        assert_eq!(matched, vec!["onclick", "OnBlur"]);
    }
}
