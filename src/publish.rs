use std::path::{Path, PathBuf};

use tracing::info;

use crate::maven::coordinates::MavenCoordinates;

/// Publishes generated reports alongside the build's own artifacts
pub trait ArtifactPublisher {
    /// `kind` is the attached artifact's type, e.g. "license.xml"
    fn attach(&mut self, project: &MavenCoordinates, kind: &str, file: &Path) -> std::io::Result<()>;
}

/// Copies attached files into a directory, named the way Maven names attached artifacts without
///  classifier: `<artifactId>-<version>.<type>`
pub struct DirectoryPublisher {
    dir: PathBuf,
    attached: Vec<PathBuf>,
}
impl DirectoryPublisher {
    pub fn new(dir: PathBuf) -> DirectoryPublisher {
        DirectoryPublisher {
            dir,
            attached: vec![],
        }
    }

    pub fn attached(&self) -> &[PathBuf] {
        &self.attached
    }
}

impl ArtifactPublisher for DirectoryPublisher {
    fn attach(&mut self, project: &MavenCoordinates, kind: &str, file: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let target = self.dir.join(format!("{}-{}.{}", project.artifact_id.0, project.version.0, kind));
        info!("attaching {} as {}", file.display(), target.display());
        std::fs::copy(file, &target)?;

        self.attached.push(target);
        Ok(())
    }
}
