//! Where the dependency graph and each artifact's declared metadata come from.
//!
//! Resolving the graph is not this crate's business: a [`DependencyManifest`] describes an
//!  already resolved graph (as exported by the build). Project metadata (licenses and POM
//!  lineage) comes either from the manifest itself or from a remote Maven repository.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::Deserialize;

use crate::artifact::{ArtifactNode, ProjectMetadata, RuntimeArtifact};
use crate::license::LicenseRef;
use crate::maven::coordinates::MavenCoordinates;
use crate::maven::remote_repo::RemoteMavenRepo;

#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// runtime-scope artifacts of the project, in resolution order
    async fn list_runtime_artifacts(&self, root: &ArtifactNode) -> anyhow::Result<Vec<RuntimeArtifact>>;

    async fn resolve_project_metadata(&self, coordinates: &MavenCoordinates) -> anyhow::Result<ProjectMetadata>;
}


#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestProject {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default = "default_packaging")]
    pub packaging: String,
    #[serde(default)]
    pub licenses: Vec<LicenseRef>,
    #[serde(default)]
    pub parent: Option<MavenCoordinates>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(rename = "type", default = "default_packaging")]
    pub packaging: String,
    #[serde(default)]
    pub optional: bool,
    /// root first, either `g:a:v` or Maven's `g:a:type[:classifier]:v` form
    #[serde(default)]
    pub trail: Vec<MavenCoordinates>,
    #[serde(default)]
    pub licenses: Vec<LicenseRef>,
    #[serde(default)]
    pub parent: Option<MavenCoordinates>,
    /// metadata for this artifact can not be resolved
    #[serde(default)]
    pub unresolvable: bool,
}

fn default_packaging() -> String {
    "jar".to_string()
}

impl ManifestArtifact {
    pub fn coordinates(&self) -> MavenCoordinates {
        MavenCoordinates::new(&self.group_id, &self.artifact_id, &self.version)
    }
}

/// A resolved dependency graph, e.g.
///
/// ```json
/// {
///   "project": { "groupId": "com.acme", "artifactId": "app", "version": "1.0", "packaging": "hpi",
///                "licenses": [{ "name": "MIT" }] },
///   "artifacts": [
///     { "groupId": "com.acme", "artifactId": "lib", "version": "2.0", "trail": ["com.acme:app:hpi:1.0"],
///       "parent": "com.acme:parent:3" }
///   ],
///   "parents": { "com.acme:parent:3": "org.example:root-pom:1" }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyManifest {
    pub project: ManifestProject,
    #[serde(default)]
    pub artifacts: Vec<ManifestArtifact>,
    /// POM parents of POMs that are not artifacts themselves
    #[serde(default)]
    pub parents: HashMap<MavenCoordinates, MavenCoordinates>,
}
impl DependencyManifest {
    pub fn load(path: &Path) -> anyhow::Result<DependencyManifest> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading dependency manifest {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("parsing dependency manifest {}", path.display()))
    }

    pub fn root_coordinates(&self) -> MavenCoordinates {
        MavenCoordinates::new(&self.project.group_id, &self.project.artifact_id, &self.project.version)
    }

    pub fn root_artifact(&self) -> RuntimeArtifact {
        RuntimeArtifact {
            coordinates: self.root_coordinates(),
            packaging: self.project.packaging.clone(),
            optional: false,
            trail: vec![],
        }
    }

    pub fn root_metadata(&self) -> ProjectMetadata {
        ProjectMetadata {
            licenses: self.project.licenses.clone(),
            lineage: self.lineage(self.project.parent.as_ref()),
        }
    }

    pub fn runtime_artifacts(&self) -> Vec<RuntimeArtifact> {
        self.artifacts.iter()
            .map(|a| RuntimeArtifact {
                coordinates: a.coordinates(),
                packaging: a.packaging.clone(),
                optional: a.optional,
                trail: a.trail.clone(),
            })
            .collect()
    }

    fn parent_of(&self, coordinates: &MavenCoordinates) -> Option<&MavenCoordinates> {
        self.parents.get(coordinates)
            .or_else(|| self.artifacts.iter()
                .find(|a| &a.coordinates() == coordinates)
                .and_then(|a| a.parent.as_ref()))
    }

    fn lineage(&self, parent: Option<&MavenCoordinates>) -> Vec<MavenCoordinates> {
        let mut result: Vec<MavenCoordinates> = vec![];
        let mut seen = HashSet::new();
        let mut current = parent;
        while let Some(p) = current {
            if !seen.insert(p.clone()) {
                break;
            }
            result.push(p.clone());
            current = self.parent_of(p);
        }
        result
    }
}


/// Takes everything from the manifest
pub struct ManifestResolver {
    manifest: DependencyManifest,
}
impl ManifestResolver {
    pub fn new(manifest: DependencyManifest) -> ManifestResolver {
        ManifestResolver {
            manifest,
        }
    }
}

#[async_trait]
impl MetadataResolver for ManifestResolver {
    async fn list_runtime_artifacts(&self, _root: &ArtifactNode) -> anyhow::Result<Vec<RuntimeArtifact>> {
        Ok(self.manifest.runtime_artifacts())
    }

    async fn resolve_project_metadata(&self, coordinates: &MavenCoordinates) -> anyhow::Result<ProjectMetadata> {
        if coordinates == &self.manifest.root_coordinates() {
            return Ok(self.manifest.root_metadata());
        }

        let artifact = self.manifest.artifacts.iter()
            .find(|a| &a.coordinates() == coordinates)
            .ok_or_else(|| anyhow!("{} is not part of the dependency manifest", coordinates))?;

        if artifact.unresolvable {
            return Err(anyhow!("project metadata of {} is not available", coordinates));
        }

        Ok(ProjectMetadata {
            licenses: artifact.licenses.clone(),
            lineage: self.manifest.lineage(artifact.parent.as_ref()),
        })
    }
}


/// Takes the graph from the manifest, and project metadata from (effective) POMs in a remote
///  repository
pub struct RepositoryResolver {
    manifest: DependencyManifest,
    repo: RemoteMavenRepo,
}
impl RepositoryResolver {
    pub fn new(manifest: DependencyManifest, repo: RemoteMavenRepo) -> RepositoryResolver {
        RepositoryResolver {
            manifest,
            repo,
        }
    }
}

#[async_trait]
impl MetadataResolver for RepositoryResolver {
    async fn list_runtime_artifacts(&self, _root: &ArtifactNode) -> anyhow::Result<Vec<RuntimeArtifact>> {
        Ok(self.manifest.runtime_artifacts())
    }

    async fn resolve_project_metadata(&self, coordinates: &MavenCoordinates) -> anyhow::Result<ProjectMetadata> {
        if coordinates == &self.manifest.root_coordinates() {
            // the project under build is not published yet
            return Ok(self.manifest.root_metadata());
        }
        self.repo.resolve_project_metadata(coordinates).await
    }
}


#[cfg(test)]
mod test {
    use std::sync::atomic::Ordering;

    use crate::maven::remote_repo::test_server::{pom, serve};

    use super::*;

    const MANIFEST: &str = r#"{
        "project": { "groupId": "com.acme", "artifactId": "app", "version": "1.0", "packaging": "hpi",
                     "licenses": [{ "name": "MIT" }], "parent": "com.acme:parent:3" },
        "artifacts": [
            { "groupId": "com.acme", "artifactId": "lib", "version": "2.0", "trail": ["com.acme:app:hpi:1.0"],
              "parent": "com.acme:parent:3", "licenses": [{ "name": "Apache-2.0", "url": "https://www.apache.org/licenses/LICENSE-2.0" }] },
            { "groupId": "org.jenkins-ci.plugins", "artifactId": "credentials", "version": "1.0", "type": "hpi", "optional": true,
              "trail": ["com.acme:app:hpi:1.0"] },
            { "groupId": "broken", "artifactId": "pom", "version": "1", "unresolvable": true }
        ],
        "parents": { "com.acme:parent:3": "org.example:root-pom:1" }
    }"#;

    fn c(s: &str) -> MavenCoordinates {
        s.parse().unwrap()
    }

    fn manifest() -> DependencyManifest {
        serde_json::from_str(MANIFEST).unwrap()
    }

    #[test]
    fn test_root() {
        let manifest = manifest();
        let root = manifest.root_artifact();
        assert_eq!(root.coordinates, c("com.acme:app:1.0"));
        assert_eq!(root.packaging, "hpi");
        assert!(root.trail.is_empty());
        assert_eq!(manifest.root_metadata().lineage, vec![c("com.acme:parent:3"), c("org.example:root-pom:1")]);
    }

    #[test]
    fn test_runtime_artifacts() {
        let artifacts = manifest().runtime_artifacts();
        assert_eq!(artifacts.len(), 3);
        assert_eq!(artifacts[0].trail, vec![c("com.acme:app:1.0")]);
        assert_eq!(artifacts[0].packaging, "jar");
        assert_eq!(artifacts[1].packaging, "hpi");
        assert!(artifacts[1].optional);
    }

    #[tokio::test]
    async fn test_resolve() {
        let resolver = ManifestResolver::new(manifest());

        let lib = resolver.resolve_project_metadata(&c("com.acme:lib:2.0")).await.unwrap();
        assert_eq!(lib.licenses, vec![LicenseRef::new("Apache-2.0", Some("https://www.apache.org/licenses/LICENSE-2.0"))]);
        assert_eq!(lib.lineage, vec![c("com.acme:parent:3"), c("org.example:root-pom:1")]);

        let credentials = resolver.resolve_project_metadata(&c("org.jenkins-ci.plugins:credentials:1.0")).await.unwrap();
        assert!(credentials.licenses.is_empty());
        assert!(credentials.lineage.is_empty());

        assert!(resolver.resolve_project_metadata(&c("broken:pom:1")).await.is_err());
        assert!(resolver.resolve_project_metadata(&c("not:there:1")).await.is_err());
    }

    #[test]
    fn test_lineage_cycle_terminates() {
        let mut manifest = manifest();
        manifest.parents.insert(c("org.example:root-pom:1"), c("com.acme:parent:3"));
        assert_eq!(manifest.root_metadata().lineage, vec![c("com.acme:parent:3"), c("org.example:root-pom:1")]);
    }

    #[tokio::test]
    async fn test_repository_resolver() {
        let (base_uri, request_count) = serve(vec![
            ("com/acme/lib/2.0/lib-2.0.pom", pom(Some("com.acme:parent:3"), "com.acme:lib:2.0", &[])),
            ("com/acme/parent/3/parent-3.pom", pom(None, "com.acme:parent:3", &["EPL-2.0"])),
        ]).await;
        let resolver = RepositoryResolver::new(manifest(), RemoteMavenRepo::new(base_uri).unwrap());

        // the project under build comes from the manifest
        let root = resolver.resolve_project_metadata(&c("com.acme:app:1.0")).await.unwrap();
        assert_eq!(root.licenses, vec![LicenseRef::new("MIT", None)]);
        assert_eq!(request_count.load(Ordering::SeqCst), 0);

        // the manifest's own licenses and parents for lib are ignored in favor of the POMs
        let lib = resolver.resolve_project_metadata(&c("com.acme:lib:2.0")).await.unwrap();
        assert_eq!(lib.licenses, vec![LicenseRef::new("EPL-2.0", None)]);
        assert_eq!(lib.lineage, vec![c("com.acme:parent:3")]);
        assert_eq!(request_count.load(Ordering::SeqCst), 2);

        assert!(resolver.resolve_project_metadata(&c("not:there:1")).await.is_err());

        let artifacts = resolver.list_runtime_artifacts(&ArtifactNode::new(c("com.acme:app:1.0"))).await.unwrap();
        assert_eq!(artifacts, manifest().runtime_artifacts());
        assert_eq!(artifacts[0].trail, vec![c("com.acme:app:1.0")]);
    }
}
