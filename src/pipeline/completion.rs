use tracing::trace;

use crate::artifact::ArtifactNode;
use crate::error::AuditResult;
use crate::rules::{CompletionContext, RuleProgram};

/// Gives every rule program, in declaration order, the chance to rewrite the node's licenses
pub fn complete(node: &mut ArtifactNode, root_project: &ArtifactNode, programs: &[Box<dyn RuleProgram>]) -> AuditResult<()> {
    for program in programs {
        trace!("completing {} with {}", node.coordinates, program.name());
        program.complete(&mut CompletionContext::new(node, root_project))?;
    }
    Ok(())
}

/// The root project is its own context root. Rules see it as it was before completion started.
pub fn complete_root(root_project: &mut ArtifactNode, programs: &[Box<dyn RuleProgram>]) -> AuditResult<()> {
    let snapshot = root_project.clone();
    complete(root_project, &snapshot, programs)
}
