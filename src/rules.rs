//! The contract between the pipeline and user supplied rule programs.
//!
//! A rule program is set up once before any phase runs, and then gets a chance to intercept
//!  every phase through its (optional) callbacks. Each callback receives an explicit context
//!  that exposes exactly what the phase allows it to touch.

pub mod callback;
pub mod declarative;

use crate::artifact::{ArtifactNode, ArtifactSet};
use crate::error::AuditResult;
use crate::license::{self, LicenseRef};
use crate::maven::coordinates::MavenCoordinates;
use crate::matcher::{self, Criteria};

pub trait RuleProgram {
    /// for diagnostics
    fn name(&self) -> &str;

    /// Called once per program before any phase runs
    fn setup(&mut self, project: &ArtifactNode) -> AuditResult<()>;

    fn complete(&self, _ctx: &mut CompletionContext) -> AuditResult<()> {
        Ok(())
    }

    fn filter(&self, _ctx: &mut FilterContext) -> AuditResult<()> {
        Ok(())
    }

    fn generate(&self, _ctx: &GenerationContext) -> AuditResult<()> {
        Ok(())
    }
}


/// Exposes the artifact being completed. Only its licenses can be changed.
pub struct CompletionContext<'a> {
    subject: &'a mut ArtifactNode,
    root_project: &'a ArtifactNode,
}
impl <'a> CompletionContext<'a> {
    pub fn new(subject: &'a mut ArtifactNode, root_project: &'a ArtifactNode) -> CompletionContext<'a> {
        CompletionContext {
            subject,
            root_project,
        }
    }

    pub fn subject(&self) -> &ArtifactNode {
        self.subject
    }

    pub fn coordinates(&self) -> &MavenCoordinates {
        &self.subject.coordinates
    }

    pub fn licenses(&self) -> &[LicenseRef] {
        &self.subject.licenses
    }

    pub fn root_project(&self) -> &ArtifactNode {
        self.root_project
    }

    pub fn matches(&self, criteria: &Criteria) -> AuditResult<bool> {
        matcher::matches(&self.subject.coordinates, criteria)
    }

    /// Runs `action` once for every criterion matching the subject
    pub fn on_match<F>(&mut self, criteria: &Criteria, mut action: F) -> AuditResult<()>
        where F: FnMut(&mut CompletionContext<'a>) -> AuditResult<()>
    {
        let count = matcher::count_matches(&self.subject.coordinates, criteria)?;
        for _ in 0..count {
            action(self)?;
        }
        Ok(())
    }

    pub fn rewrite_license(&mut self, expected: &[LicenseRef], to: LicenseRef) -> AuditResult<()> {
        license::rewrite_license(self.subject, expected, to)
    }

    pub fn accept(&mut self, name: &str) {
        license::accept(self.subject, name)
    }

    pub fn license(name: &str, url: &str) -> LicenseRef {
        license::license(name, url)
    }
}


/// Exposes the artifacts surviving the built-in filters. Artifacts can be removed, never added.
pub struct FilterContext<'a> {
    artifacts: &'a mut ArtifactSet,
}
impl <'a> FilterContext<'a> {
    pub fn new(artifacts: &'a mut ArtifactSet) -> FilterContext<'a> {
        FilterContext {
            artifacts,
        }
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &ArtifactNode> {
        self.artifacts.values()
    }

    pub fn get(&self, coordinates: &MavenCoordinates) -> Option<&ArtifactNode> {
        self.artifacts.get(coordinates)
    }

    pub fn contains(&self, coordinates: &MavenCoordinates) -> bool {
        self.artifacts.contains_key(coordinates)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn remove(&mut self, coordinates: &MavenCoordinates) -> Option<ArtifactNode> {
        self.artifacts.remove(coordinates)
    }

    pub fn retain<F>(&mut self, mut keep: F)
        where F: FnMut(&ArtifactNode) -> bool
    {
        self.artifacts.retain(|_, node| keep(node));
    }

    /// Removes every artifact matched by `criteria`, returning how many were removed
    pub fn remove_matching(&mut self, criteria: &Criteria) -> AuditResult<usize> {
        let parsed = criteria.parse()?;
        let before = self.artifacts.len();
        self.artifacts.retain(|coordinates, _| !parsed.iter().any(|c| c.matches(coordinates)));
        Ok(before - self.artifacts.len())
    }
}


/// Exposes the finalized dependency list, root project first
pub struct GenerationContext<'a> {
    pub dependencies: &'a [ArtifactNode],
}
