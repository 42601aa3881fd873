use std::collections::{HashMap, HashSet};

use crate::license::LicenseRef;
use crate::maven::coordinates::MavenCoordinates;

/// One artifact of the graph under evaluation. Only completion mutates `licenses`, everything
///  else is fixed by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNode {
    pub coordinates: MavenCoordinates,
    /// declaration order; empty means 'unknown'
    pub licenses: Vec<LicenseRef>,
    /// root project first, down to the nearest ancestor; the artifact itself is not part of it
    pub dependency_trail: Vec<MavenCoordinates>,
    pub optional: bool,
    pub packaging: String,
    /// POM hierarchy parent, unrelated to the dependency trail
    pub parent: Option<MavenCoordinates>,
}
impl ArtifactNode {
    pub fn new(coordinates: MavenCoordinates) -> ArtifactNode {
        ArtifactNode {
            coordinates,
            licenses: vec![],
            dependency_trail: vec![],
            optional: false,
            packaging: "jar".to_string(),
            parent: None,
        }
    }

    /// Combines the resolver's raw descriptor with the project metadata resolved for it
    pub fn from_resolved(artifact: RuntimeArtifact, metadata: &ProjectMetadata) -> ArtifactNode {
        ArtifactNode {
            coordinates: artifact.coordinates,
            licenses: dedup_by_name(&metadata.licenses),
            dependency_trail: artifact.trail,
            optional: artifact.optional,
            packaging: artifact.packaging,
            parent: metadata.lineage.first().cloned(),
        }
    }

    pub fn has_license_info(&self) -> bool {
        !self.licenses.is_empty()
    }
}

/// first occurrence of a license name wins
fn dedup_by_name(licenses: &[LicenseRef]) -> Vec<LicenseRef> {
    let mut seen = HashSet::new();
    licenses.iter()
        .filter(|l| seen.insert(l.name.clone()))
        .cloned()
        .collect()
}

/// Working collection during filtering. Iteration order is undefined.
pub type ArtifactSet = HashMap<MavenCoordinates, ArtifactNode>;

/// The shipped artifacts: root project first, then the surviving dependencies in resolver order
pub type DependencyList = Vec<ArtifactNode>;


/// Raw descriptor of a resolved runtime dependency, before its project metadata is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeArtifact {
    pub coordinates: MavenCoordinates,
    pub packaging: String,
    pub optional: bool,
    pub trail: Vec<MavenCoordinates>,
}

/// What a resolver knows about a project from its (effective) POM
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectMetadata {
    pub licenses: Vec<LicenseRef>,
    /// `<parent>` chain, nearest first
    pub lineage: Vec<MavenCoordinates>,
}


/// coordinates -> POM parent coordinates, built once after resolution
#[derive(Debug, Clone, Default)]
pub struct AncestryIndex {
    parents: HashMap<MavenCoordinates, MavenCoordinates>,
}
impl AncestryIndex {
    pub fn new() -> AncestryIndex {
        Default::default()
    }

    pub fn record_lineage(&mut self, coordinates: &MavenCoordinates, lineage: &[MavenCoordinates]) {
        let mut child = coordinates;
        for parent in lineage {
            self.parents.entry(child.clone())
                .or_insert_with(|| parent.clone());
            child = parent;
        }
    }

    pub fn parent_of(&self, coordinates: &MavenCoordinates) -> Option<&MavenCoordinates> {
        self.parents.get(coordinates)
    }

    /// All ancestors of `coordinates`, nearest first. Stops at the first repetition so that a
    ///  corrupt index cannot loop forever.
    pub fn ancestors(&self, coordinates: &MavenCoordinates) -> Vec<MavenCoordinates> {
        let mut visited = HashSet::new();
        visited.insert(coordinates);

        let mut result = vec![];
        let mut current = coordinates;
        while let Some(parent) = self.parent_of(current) {
            if !visited.insert(parent) {
                break;
            }
            result.push(parent.clone());
            current = parent;
        }
        result
    }

    /// `g:a:v -> parent-g:parent-a:parent-v -> ...`
    pub fn render_chain(&self, coordinates: &MavenCoordinates) -> String {
        let mut chain = coordinates.to_string();
        for ancestor in self.ancestors(coordinates) {
            chain.push_str(" -> ");
            chain.push_str(&ancestor.to_string());
        }
        chain
    }
}
