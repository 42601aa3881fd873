//! Wildcard matching of `groupId:artifactId[:version]` criteria against artifact coordinates.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};
use crate::maven::coordinates::MavenCoordinates;

const WILDCARD: &str = "*";

/// One or several criterion strings, as written by a rule author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Criteria {
    Single(String),
    Many(Vec<String>),
}
impl Criteria {
    /// Parses every criterion up front, so an invalid one is reported before anything matches
    pub fn parse(&self) -> AuditResult<Vec<MatchCriterion>> {
        match self {
            Criteria::Single(s) => Ok(vec![s.parse()?]),
            Criteria::Many(v) => v.iter()
                .map(|s| s.parse())
                .collect(),
        }
    }
}

impl From<&str> for Criteria {
    fn from(s: &str) -> Criteria {
        Criteria::Single(s.to_string())
    }
}

impl From<String> for Criteria {
    fn from(s: String) -> Criteria {
        Criteria::Single(s)
    }
}

impl From<&[&str]> for Criteria {
    fn from(v: &[&str]) -> Criteria {
        Criteria::Many(v.iter().map(|s| s.to_string()).collect())
    }
}

impl <const N: usize> From<[&str; N]> for Criteria {
    fn from(v: [&str; N]) -> Criteria {
        Criteria::Many(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for Criteria {
    fn from(v: Vec<String>) -> Criteria {
        Criteria::Many(v)
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Any,
    Exact(String),
}
impl Segment {
    fn new(token: &str) -> Segment {
        if token == WILDCARD {
            Segment::Any
        }
        else {
            Segment::Exact(token.to_string())
        }
    }

    fn matches(&self, actual: &str) -> bool {
        match self {
            Segment::Any => true,
            Segment::Exact(expected) => expected == actual,
        }
    }
}

/// A parsed criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCriterion {
    group_id: Segment,
    artifact_id: Segment,
    version: Option<Segment>,
}
impl MatchCriterion {
    pub fn matches(&self, coordinates: &MavenCoordinates) -> bool {
        self.group_id.matches(&coordinates.group_id.0)
            && self.artifact_id.matches(&coordinates.artifact_id.0)
            && self.version.as_ref().map_or(true, |v| v.matches(&coordinates.version.0))
    }
}

impl FromStr for MatchCriterion {
    type Err = AuditError;

    fn from_str(s: &str) -> AuditResult<MatchCriterion> {
        let mut tokens: Vec<&str> = s.split(':').collect();
        // trailing empty tokens do not count as segments, "a:" is not a valid criterion
        while tokens.last().map_or(false, |t| t.is_empty()) {
            tokens.pop();
        }

        if tokens.len() < 2 {
            return Err(AuditError::InvalidMatcher { criterion: s.to_string() });
        }

        Ok(MatchCriterion {
            group_id: Segment::new(tokens[0]),
            artifact_id: Segment::new(tokens[1]),
            version: tokens.get(2).map(|t| Segment::new(t)),
        })
    }
}

/// true iff at least one of the criteria matches
pub fn matches(coordinates: &MavenCoordinates, criteria: &Criteria) -> AuditResult<bool> {
    Ok(criteria.parse()?
        .iter()
        .any(|c| c.matches(coordinates)))
}

/// Number of criteria that match. Criteria are independent, so a coordinate matched by two of
///  them counts twice.
pub fn count_matches(coordinates: &MavenCoordinates, criteria: &Criteria) -> AuditResult<usize> {
    Ok(criteria.parse()?
        .iter()
        .filter(|c| c.matches(coordinates))
        .count())
}

/// Runs `action` once per matching criterion
pub fn on_match<F>(coordinates: &MavenCoordinates, criteria: &Criteria, mut action: F) -> AuditResult<()>
    where F: FnMut() -> AuditResult<()>
{
    for _ in 0..count_matches(coordinates, criteria)? {
        action()?;
    }
    Ok(())
}


#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    fn lib() -> MavenCoordinates {
        MavenCoordinates::new("com.acme", "lib", "2.0")
    }

    #[rstest]
    #[case::group_and_artifact("com.acme:lib", true)]
    #[case::with_version("com.acme:lib:2.0", true)]
    #[case::wrong_version("com.acme:lib:2.1", false)]
    #[case::wildcard_version("com.acme:lib:*", true)]
    #[case::wildcard_group("*:lib", true)]
    #[case::wildcard_artifact("com.acme:*", true)]
    #[case::wildcard_all("*:*", true)]
    #[case::wildcard_all_with_version("*:*:*", true)]
    #[case::wrong_group("com.other:lib", false)]
    #[case::wrong_artifact("com.acme:other", false)]
    #[case::no_partial_wildcards("com.*:lib", false)]
    #[case::trailing_colon("com.acme:lib:", true)]
    #[case::extra_segments_ignored("com.acme:lib:2.0:jar", true)]
    fn test_single(#[case] criterion: &str, #[case] expected: bool) {
        assert_eq!(matches(&lib(), &criterion.into()).unwrap(), expected);
    }

    #[rstest]
    #[case::no_colon("com.acme")]
    #[case::empty("")]
    #[case::only_trailing_colon("com.acme:")]
    #[case::only_colons(":::")]
    fn test_invalid(#[case] criterion: &str) {
        match matches(&lib(), &criterion.into()) {
            Err(AuditError::InvalidMatcher { criterion: c }) => assert_eq!(c, criterion),
            other => panic!("expected invalid matcher, got {:?}", other),
        }
        assert!(on_match(&lib(), &criterion.into(), || panic!("must not run")).is_err());
    }

    #[test]
    fn test_wildcard_matches_everything() {
        for coordinates in [lib(), MavenCoordinates::new("a", "b", "c"), MavenCoordinates::new("x.y.z", "w", "1.0-SNAPSHOT")] {
            assert!(matches(&coordinates, &"*:*".into()).unwrap());
        }
    }

    #[test]
    fn test_many() {
        assert!(matches(&lib(), &["x:y", "com.acme:lib"].into()).unwrap());
        assert!(!matches(&lib(), &["x:y", "com.acme:lib:1.0"].into()).unwrap());
        assert!(!matches(&lib(), &Criteria::Many(vec![])).unwrap());
    }

    #[test]
    fn test_invalid_among_many_fails_before_matching() {
        let mut count = 0;
        let result = on_match(&lib(), &["com.acme:lib", "broken"].into(), || { count += 1; Ok(()) });
        assert!(result.is_err());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_on_match_runs_once_per_matching_criterion() {
        let mut count = 0;
        on_match(&lib(), &["com.acme:lib", "*:*", "x:y"].into(), || { count += 1; Ok(()) }).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_on_match_propagates_action_error() {
        let result = on_match(&lib(), &"*:*".into(), || Err(AuditError::InvalidMatcher { criterion: "from action".to_string() }));
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_criteria() {
        assert_eq!(serde_json::from_str::<Criteria>("\"a:b\"").unwrap(), Criteria::Single("a:b".to_string()));
        assert_eq!(serde_json::from_str::<Criteria>("[\"a:b\", \"c:d\"]").unwrap(), ["a:b", "c:d"].into());
    }
}
