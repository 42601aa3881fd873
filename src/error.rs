use std::path::PathBuf;

use thiserror::Error;

use crate::license::{format_license_names, LicenseRef};
use crate::maven::coordinates::MavenCoordinates;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Invalid matcher '{criterion}'. Expecting GROUPID:ARTIFACTID")]
    InvalidMatcher { criterion: String },

    #[error("Expecting {} but found {} for dependency {coordinates}", format_license_names(.expected), format_license_names(.actual))]
    LicenseMismatch {
        expected: Vec<LicenseRef>,
        actual: Vec<LicenseRef>,
        coordinates: MavenCoordinates,
    },

    #[error("{report}")]
    IncompleteLicense { report: String },

    #[error("failed to resolve project metadata for {coordinates}: {source}")]
    MetadataResolution {
        coordinates: MavenCoordinates,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to list the runtime dependencies of {coordinates}: {source}")]
    ArtifactListing {
        coordinates: MavenCoordinates,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to parse rules from {source_name}: {source}")]
    RuleParse {
        source_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type AuditResult<T> = Result<T, AuditError>;
