use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_recursion::async_recursion;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::artifact::ProjectMetadata;
use crate::license::LicenseRef;
use crate::maven::coordinates::MavenCoordinates;
use crate::maven::paths::as_pom_path;
use crate::maven::pom::Pom;
use crate::util::validating_http_downloader::ValidatingHttpDownloader;

/// `<parent>` chains longer than this are assumed to be cyclic
const MAX_PARENT_DEPTH: usize = 32;

/// The parts of a POM's effective model needed for license auditing: licenses are inherited
///  from the nearest ancestor that declares them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePom {
    pub licenses: Vec<LicenseRef>,
    /// nearest first
    pub lineage: Vec<MavenCoordinates>,
}

/// Reads project metadata from POMs in a remote Maven repository. Parsed POMs are cached for the
///  lifetime of the instance, since most artifacts of a build share a few parent POMs.
pub struct RemoteMavenRepo {
    downloader: ValidatingHttpDownloader,
    cache: Mutex<HashMap<MavenCoordinates, Arc<EffectivePom>>>,
}

impl RemoteMavenRepo {
    pub fn new(base_uri: String) -> anyhow::Result<RemoteMavenRepo> {
        Ok(RemoteMavenRepo {
            downloader: ValidatingHttpDownloader::new(base_uri)?,
            cache: Default::default(),
        })
    }

    pub async fn resolve_project_metadata(&self, coordinates: &MavenCoordinates) -> anyhow::Result<ProjectMetadata> {
        let effective = self.effective_pom(coordinates, 0).await?;
        Ok(ProjectMetadata {
            licenses: effective.licenses.clone(),
            lineage: effective.lineage.clone(),
        })
    }

    #[async_recursion]
    pub async fn effective_pom(&self, coordinates: &MavenCoordinates, depth: usize) -> anyhow::Result<Arc<EffectivePom>> {
        if let Some(cached) = self.cache.lock().await.get(coordinates) {
            trace!("POM cache hit for {}", coordinates);
            return Ok(cached.clone());
        }

        if depth > MAX_PARENT_DEPTH {
            return Err(anyhow!("parent chain of {} is deeper than {} levels", coordinates, MAX_PARENT_DEPTH));
        }

        debug!("fetching POM for {} from {}", coordinates, self.downloader.base_uri());
        let pom_bytes = self.downloader.get(&as_pom_path(coordinates)).await
            .map_err(|e| if coordinates.version.is_snapshot() {
                e.context(format!("{} is a snapshot, only unqualified snapshot POMs can be resolved", coordinates))
            }
            else {
                e
            })?;
        let pom = Pom::parse(&pom_bytes)?;

        let declared = pom.coordinates()?;
        if &declared != coordinates {
            warn!("POM requested for {} declares coordinates {}", coordinates, declared);
        }

        let effective = match pom.parent_coordinates() {
            Some(parent_coordinates) => {
                let parent = self.effective_pom(&parent_coordinates, depth + 1).await?;

                let mut lineage = vec![parent_coordinates];
                lineage.extend(parent.lineage.iter().cloned());

                EffectivePom {
                    licenses: pom.declared_licenses()
                        .unwrap_or_else(|| parent.licenses.clone()),
                    lineage,
                }
            }
            None => EffectivePom {
                licenses: pom.declared_licenses().unwrap_or_default(),
                lineage: vec![],
            },
        };

        let effective = Arc::new(effective);
        self.cache.lock().await
            .insert(coordinates.clone(), effective.clone());
        Ok(effective)
    }
}




#[cfg(test)]
mod test {
    use std::sync::atomic::Ordering;

    use super::*;
    use super::test_server::{pom, serve};

    fn c(s: &str) -> MavenCoordinates {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_licenses_are_inherited_from_parents() {
        let (base_uri, request_count) = serve(vec![
            ("org/acme/lib/1.0/lib-1.0.pom", pom(Some("org.acme:parent:2"), "org.acme:lib:1.0", &[])),
            ("org/acme/other/1.0/other-1.0.pom", pom(Some("org.acme:parent:2"), "org.acme:other:1.0", &["GPL"])),
            ("org/acme/parent/2/parent-2.pom", pom(Some("org.acme:root:3"), "org.acme:parent:2", &[])),
            ("org/acme/root/3/root-3.pom", pom(None, "org.acme:root:3", &["Apache-2.0", "MIT"])),
        ]).await;
        let repo = RemoteMavenRepo::new(base_uri).unwrap();

        let lib = repo.resolve_project_metadata(&c("org.acme:lib:1.0")).await.unwrap();
        assert_eq!(lib.licenses, vec![LicenseRef::new("Apache-2.0", None), LicenseRef::new("MIT", None)]);
        assert_eq!(lib.lineage, vec![c("org.acme:parent:2"), c("org.acme:root:3")]);
        assert_eq!(request_count.load(Ordering::SeqCst), 3);

        // the parents are cached
        let other = repo.resolve_project_metadata(&c("org.acme:other:1.0")).await.unwrap();
        assert_eq!(other.licenses, vec![LicenseRef::new("GPL", None)]);
        assert_eq!(request_count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_missing_pom_is_error() {
        let (base_uri, _) = serve(vec![
            ("org/acme/lib/1.0/lib-1.0.pom", pom(Some("org.acme:gone:2"), "org.acme:lib:1.0", &[])),
        ]).await;
        let repo = RemoteMavenRepo::new(base_uri).unwrap();

        assert!(repo.resolve_project_metadata(&c("org.acme:lib:1.0")).await.is_err());
        assert!(repo.resolve_project_metadata(&c("org.acme:unknown:1.0")).await.is_err());
    }

    #[tokio::test]
    async fn test_cyclic_parents_are_rejected() {
        let (base_uri, _) = serve(vec![
            ("a/x/1/x-1.pom", pom(Some("a:y:1"), "a:x:1", &[])),
            ("a/y/1/y-1.pom", pom(Some("a:x:1"), "a:y:1", &[])),
        ]).await;
        let repo = RemoteMavenRepo::new(base_uri).unwrap();

        assert!(repo.resolve_project_metadata(&c("a:x:1")).await.is_err());
    }
}
