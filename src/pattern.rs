use crate::edit::Edit;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// How many occurrences of a pattern get replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacePolicy {
    /// Replace every non-overlapping occurrence
    #[default]
    All,
    /// Replace only the leftmost occurrence
    First,
}

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid search pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("replacement text is empty")]
    EmptyReplacement,
}

/// A match of the search pattern inside a file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub byte_start: usize,
    pub byte_end: usize,
    /// The matched text
    pub text: String,
}

/// A compiled search regex paired with a literal replacement block.
///
/// The search runs in dot-matches-newline mode so lazy `.*?` can cross
/// line breaks. The replacement is inserted verbatim: `$name` and `${..}`
/// sequences are never expanded as capture-group references.
#[derive(Debug, Clone)]
pub struct ReplacementPattern {
    regex: Regex,
    replacement: String,
    policy: ReplacePolicy,
}

impl ReplacementPattern {
    pub fn new(search: &str, replacement: impl Into<String>) -> Result<Self, PatternError> {
        let replacement = replacement.into();
        if replacement.is_empty() {
            return Err(PatternError::EmptyReplacement);
        }

        let regex = RegexBuilder::new(search).dot_matches_new_line(true).build()?;

        Ok(Self {
            regex,
            replacement,
            policy: ReplacePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: ReplacePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ReplacePolicy {
        self.policy
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Matches selected by the policy, in file order.
    ///
    /// Matches overlapping a copy of the replacement block are skipped, so
    /// re-running on patched content does not patch the patch.
    pub fn find(&self, content: &str) -> Vec<PatternMatch> {
        let limit = match self.policy {
            ReplacePolicy::All => usize::MAX,
            ReplacePolicy::First => 1,
        };
        let applied = self.applied_spans(content);

        self.regex
            .find_iter(content)
            .filter(|m| {
                !applied
                    .iter()
                    .any(|&(start, end)| m.start() < end && start < m.end())
            })
            .take(limit)
            .map(|m| PatternMatch {
                byte_start: m.start(),
                byte_end: m.end(),
                text: m.as_str().to_string(),
            })
            .collect()
    }

    /// True when the literal replacement block is already in `content`.
    pub fn is_applied(&self, content: &str) -> bool {
        content.contains(self.replacement.as_str())
    }

    /// Byte spans of every copy of the replacement block in `content`.
    pub fn applied_spans(&self, content: &str) -> Vec<(usize, usize)> {
        content
            .match_indices(self.replacement.as_str())
            .map(|(start, text)| (start, start + text.len()))
            .collect()
    }

    /// One edit per selected match.
    pub fn edits(&self, content: &str) -> Vec<Edit> {
        self.find(content)
            .into_iter()
            .map(|m| Edit::new(m.byte_start, m.byte_end, self.replacement.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_match_spans_lines() {
        let pattern = ReplacementPattern::new(r"start\{.*?MARK.*?\}", "NEW").unwrap();
        let content = "start{\n a\n MARK\n b\n} tail }";

        let matches = pattern.find(content);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "start{\n a\n MARK\n b\n}");
    }

    #[test]
    fn test_policy_all_and_first() {
        let content = "x=1; x=2; x=3;";
        let all = ReplacementPattern::new(r"x=\d", "y").unwrap();
        assert_eq!(all.find(content).len(), 3);

        let first = all.with_policy(ReplacePolicy::First);
        let matches = first.find(content);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].byte_start, 0);
    }

    #[test]
    fn test_replacement_is_literal() {
        let pattern = ReplacementPattern::new(r"(?P<id>old)", "go(`${id}/$id`)").unwrap();
        let edits = pattern.edits("call old here");
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "go(`${id}/$id`)");
    }

    #[test]
    fn test_find_skips_applied_blocks() {
        let pattern = ReplacementPattern::new(r"h\{[^}]*\}", "h{ done }").unwrap();
        let content = "h{ done } h{ todo }";

        assert!(pattern.is_applied(content));
        assert_eq!(pattern.applied_spans(content), vec![(0, 9)]);

        let matches = pattern.find(content);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "h{ todo }");
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let result = ReplacementPattern::new(r"onClick=\{(", "x");
        assert!(matches!(result, Err(PatternError::InvalidRegex(_))));
    }

    #[test]
    fn test_empty_replacement_rejected() {
        let result = ReplacementPattern::new(r"a", "");
        assert!(matches!(result, Err(PatternError::EmptyReplacement)));
    }
}
