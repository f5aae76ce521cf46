// src/status/matcher.rs

//! Regex-based status inference over a task's plain-text log.

use regex::Regex;

use crate::errors::{DevboardError, Result};
use crate::types::StatusValue;

/// A `pattern -> status` rule for one watch task.
#[derive(Debug, Clone)]
pub struct StatusMatcher {
    pub pattern: Regex,
    pub status: StatusValue,
}

impl StatusMatcher {
    pub fn new(pattern: &str, status: StatusValue) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| DevboardError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern, status })
    }

    /// Start offset of the last non-overlapping match in `text`.
    pub fn last_match_offset(&self, text: &str) -> Option<usize> {
        self.pattern.find_iter(text).last().map(|m| m.start())
    }
}

/// Infer a status from the full plain log.
///
/// The matcher whose *last* match starts furthest into the log wins; on
/// equal offsets the later-declared matcher wins. Returns `None` while no
/// matcher has matched anything, in which case the caller keeps whatever
/// status it had (initially `Loading`).
pub fn compute_status(plain_log: &str, matchers: &[StatusMatcher]) -> Option<StatusValue> {
    let mut winner: Option<(usize, StatusValue)> = None;

    for matcher in matchers {
        let Some(offset) = matcher.last_match_offset(plain_log) else {
            continue;
        };
        if winner.is_none_or(|(best, _)| offset >= best) {
            winner = Some((offset, matcher.status));
        }
    }

    winner.map(|(_, status)| status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matchers(specs: &[(&str, StatusValue)]) -> Vec<StatusMatcher> {
        specs
            .iter()
            .map(|(p, s)| StatusMatcher::new(p, *s).unwrap())
            .collect()
    }

    #[test]
    fn later_offset_wins_over_declaration_order() {
        let m = matchers(&[("ready", StatusValue::Success), ("error", StatusValue::Error)]);
        assert_eq!(
            compute_status("...error... ready...", &m),
            Some(StatusValue::Success)
        );
    }

    #[test]
    fn last_occurrence_of_each_pattern_is_used() {
        let m = matchers(&[("ready", StatusValue::Success), ("error", StatusValue::Error)]);
        // `ready` appears first and last, `error` in between.
        assert_eq!(
            compute_status("ready error ready", &m),
            Some(StatusValue::Success)
        );
        assert_eq!(
            compute_status("ready error ready error", &m),
            Some(StatusValue::Error)
        );
    }

    #[test]
    fn ties_go_to_later_declared_matcher() {
        let m = matchers(&[
            ("compiled", StatusValue::Success),
            ("compiled with warnings", StatusValue::Warning),
        ]);
        assert_eq!(
            compute_status("compiled with warnings", &m),
            Some(StatusValue::Warning)
        );

        let reversed = matchers(&[
            ("compiled with warnings", StatusValue::Warning),
            ("compiled", StatusValue::Success),
        ]);
        assert_eq!(
            compute_status("compiled with warnings", &reversed),
            Some(StatusValue::Success)
        );
    }

    #[test]
    fn no_match_leaves_status_undecided() {
        let m = matchers(&[("ready", StatusValue::Success)]);
        assert_eq!(compute_status("starting up", &m), None);
        assert_eq!(compute_status("anything", &[]), None);
    }

    #[test]
    fn same_status_matchers_act_as_one() {
        let m = matchers(&[
            ("ok", StatusValue::Success),
            ("fail", StatusValue::Error),
            ("done", StatusValue::Success),
        ]);
        assert_eq!(compute_status("ok fail done", &m), Some(StatusValue::Success));
        assert_eq!(compute_status("done ok fail", &m), Some(StatusValue::Error));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = StatusMatcher::new("(unclosed", StatusValue::Error).unwrap_err();
        match err {
            DevboardError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }
}
