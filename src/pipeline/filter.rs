use std::collections::HashSet;

use tracing::debug;

use crate::artifact::{ArtifactNode, ArtifactSet};
use crate::config::FilterPolicy;
use crate::error::AuditResult;
use crate::maven::coordinates::MavenCoordinates;
use crate::rules::{FilterContext, RuleProgram};

/// Reduces the resolved artifacts to those that ship with this build: built-in exclusions first,
///  then the rule programs' filters. Both only ever remove artifacts.
pub fn filter(mut artifacts: ArtifactSet, programs: &[Box<dyn RuleProgram>], policy: &FilterPolicy) -> AuditResult<ArtifactSet> {
    let excluded = apply_builtin_exclusions(&mut artifacts, policy);
    debug!("built-in exclusions removed {} artifact(s)", excluded);

    for program in programs {
        let before = artifacts.len();
        program.filter(&mut FilterContext::new(&mut artifacts))?;
        debug!("filter {} removed {} artifact(s)", program.name(), before - artifacts.len());
    }

    Ok(artifacts)
}

/// Returns the number of excluded artifacts
pub fn apply_builtin_exclusions(artifacts: &mut ArtifactSet, policy: &FilterPolicy) -> usize {
    let before = artifacts.len();

    // determined before anything is removed, so that dependencies of an optional plugin are
    //  recognized as well
    let plugins: HashSet<MavenCoordinates> = artifacts.values()
        .filter(|node| node.packaging == policy.plugin_packaging)
        .map(|node| node.coordinates.clone())
        .collect();

    artifacts.retain(|coordinates, node| {
        match exclusion_reason(node, &plugins, policy) {
            Some(reason) => {
                debug!("excluding {}: {}", coordinates, reason);
                false
            }
            None => true,
        }
    });

    before - artifacts.len()
}

fn exclusion_reason(node: &ArtifactNode, plugins: &HashSet<MavenCoordinates>, policy: &FilterPolicy) -> Option<String> {
    if node.optional {
        return Some("optional".to_string());
    }

    // trail[0] is the root project, trail[1] the direct dependency this one came in through
    if let Some(via) = node.dependency_trail.get(1) {
        if plugins.contains(via) {
            return Some(format!("transitive dependency of plugin {}", via));
        }
    }

    if !policy.core_marker.is_empty() {
        if let Some(via) = node.dependency_trail.iter().find(|c| c.to_string().contains(&policy.core_marker)) {
            return Some(format!("provided through {}", via));
        }
    }

    None
}


#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;
    use crate::rules::callback::CallbackRuleProgram;

    const ROOT: &str = "com.acme:app:1.0";

    fn c(s: &str) -> MavenCoordinates {
        s.parse().unwrap()
    }

    fn node(coordinates: &str, packaging: &str, optional: bool, trail: &[&str]) -> ArtifactNode {
        let mut result = ArtifactNode::new(c(coordinates));
        result.packaging = packaging.to_string();
        result.optional = optional;
        result.dependency_trail = trail.iter().map(|t| c(t)).collect();
        result
    }

    fn set_of(nodes: Vec<ArtifactNode>) -> ArtifactSet {
        nodes.into_iter()
            .map(|n| (n.coordinates.clone(), n))
            .collect()
    }

    fn sorted_keys(set: &ArtifactSet) -> Vec<String> {
        let mut result: Vec<String> = set.keys().map(|k| k.to_string()).collect();
        result.sort();
        result
    }

    /// a plugin project depending on a library, another plugin (with its own dependencies) and
    ///  core (with its own dependencies)
    fn graph() -> ArtifactSet {
        set_of(vec![
            node("com.acme:lib:2.0", "jar", false, &[ROOT]),
            node("com.acme:lib-dep:1.0", "jar", false, &[ROOT, "com.acme:lib:2.0"]),
            node("org.jenkins-ci.plugins:credentials:1.0", "hpi", false, &[ROOT]),
            node("org.jenkins-ci.plugins:credentials-dep:1.0", "jar", false, &[ROOT, "org.jenkins-ci.plugins:credentials:1.0"]),
            node("org.jenkins-ci.plugins:credentials-dep-dep:1.0", "jar", false, &[ROOT, "org.jenkins-ci.plugins:credentials:1.0", "org.jenkins-ci.plugins:credentials-dep:1.0"]),
            node("org.jenkins-ci.main:jenkins-core:2.401", "jar", false, &[ROOT]),
            node("com.google.guava:guava:11.0", "jar", false, &[ROOT, "org.jenkins-ci.main:jenkins-core:2.401"]),
            node("foo:bar:1.0", "jar", true, &[ROOT]),
        ])
    }

    #[test]
    fn test_builtin_exclusions() {
        let mut set = graph();
        assert_eq!(apply_builtin_exclusions(&mut set, &FilterPolicy::default()), 4);

        assert_eq!(sorted_keys(&set), vec![
            "com.acme:lib-dep:1.0",
            "com.acme:lib:2.0",
            "org.jenkins-ci.main:jenkins-core:2.401",
            "org.jenkins-ci.plugins:credentials:1.0",
        ]);
    }

    #[test]
    fn test_builtin_exclusions_are_idempotent() {
        let mut once = graph();
        apply_builtin_exclusions(&mut once, &FilterPolicy::default());

        let mut twice = once.clone();
        assert_eq!(apply_builtin_exclusions(&mut twice, &FilterPolicy::default()), 0);
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case::plain(&[ROOT])]
    #[case::below_plugin(&[ROOT, "x:plugin:1"])]
    #[case::below_core(&[ROOT, "org.jenkins-ci.main:jenkins-core:2.401"])]
    #[case::no_trail(&[])]
    fn test_optional_never_survives(#[case] trail: &[&str]) {
        let mut set = set_of(vec![
            node("x:plugin:1", "hpi", false, &[ROOT]),
            node("foo:bar:1.0", "jar", true, trail),
        ]);
        apply_builtin_exclusions(&mut set, &FilterPolicy::default());
        assert!(!set.contains_key(&c("foo:bar:1.0")));
    }

    #[test]
    fn test_core_path_excluded_even_if_otherwise_fine() {
        let mut set = set_of(vec![
            node("a:deep:1", "jar", false, &[ROOT, "a:lib:1", "org.jenkins-ci.main:jenkins-core:2.401", "a:other:1"]),
        ]);
        apply_builtin_exclusions(&mut set, &FilterPolicy::default());
        assert!(set.is_empty());
    }

    #[test]
    fn test_short_trails_do_not_trigger_plugin_rule() {
        let mut set = set_of(vec![
            node("x:plugin:1", "hpi", false, &[ROOT]),
            node("x:orphan:1", "jar", false, &[]),
        ]);
        assert_eq!(apply_builtin_exclusions(&mut set, &FilterPolicy::default()), 0);
    }

    #[test]
    fn test_dependencies_of_optional_plugin() {
        let mut set = set_of(vec![
            node("x:plugin:1", "hpi", true, &[ROOT]),
            node("x:plugin-dep:1", "jar", false, &[ROOT, "x:plugin:1"]),
        ]);
        apply_builtin_exclusions(&mut set, &FilterPolicy::default());
        assert!(set.is_empty());
    }

    #[test]
    fn test_custom_policy() {
        let policy = FilterPolicy {
            plugin_packaging: "bundle".to_string(),
            core_marker: "platform-api".to_string(),
        };
        let mut set = set_of(vec![
            node("x:plugin:1", "hpi", false, &[ROOT]),
            node("x:plugin-dep:1", "jar", false, &[ROOT, "x:plugin:1"]),
            node("x:bundle:1", "bundle", false, &[ROOT]),
            node("x:bundle-dep:1", "jar", false, &[ROOT, "x:bundle:1"]),
            node("x:api-dep:1", "jar", false, &[ROOT, "x:platform-api:1"]),
        ]);
        apply_builtin_exclusions(&mut set, &policy);
        assert_eq!(sorted_keys(&set), vec!["x:bundle:1", "x:plugin-dep:1", "x:plugin:1"]);
    }

    #[test]
    fn test_user_filters_run_after_builtins() {
        let programs: Vec<Box<dyn RuleProgram>> = vec![
            Box::new(CallbackRuleProgram::new("check").on_filter(|ctx| {
                // optional artifacts are already gone
                assert!(ctx.artifacts().all(|n| !n.optional));
                ctx.remove_matching(&"com.acme:*".into())?;
                Ok(())
            })),
        ];

        let result = filter(graph(), &programs, &FilterPolicy::default()).unwrap();
        assert_eq!(sorted_keys(&result), vec![
            "org.jenkins-ci.main:jenkins-core:2.401",
            "org.jenkins-ci.plugins:credentials:1.0",
        ]);
    }
}
