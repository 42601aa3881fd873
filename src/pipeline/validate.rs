use crate::artifact::{AncestryIndex, ArtifactNode};
use crate::error::{AuditError, AuditResult};

pub const MISSING_LICENSES_BANNER: &str = "The following dependencies are missing license information:";
pub const MISSING_LICENSES_REMEDIATION: &str =
    "Add/update your completion rules to fill them, or run with --disable-check to bypass the check.";

/// With `require_complete`, fails if any of the dependencies has no license information. The
///  error lists every such dependency together with its POM ancestry.
pub fn validate(dependencies: &[ArtifactNode], require_complete: bool, ancestry: &AncestryIndex) -> AuditResult<()> {
    if !require_complete {
        return Ok(());
    }

    let missing: Vec<&ArtifactNode> = dependencies.iter()
        .filter(|d| !d.has_license_info())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let mut report = String::from(MISSING_LICENSES_BANNER);
    report.push('\n');
    for node in missing {
        report.push_str("  ");
        report.push_str(&ancestry.render_chain(&node.coordinates));
        report.push('\n');
    }
    report.push('\n');
    report.push_str(MISSING_LICENSES_REMEDIATION);

    Err(AuditError::IncompleteLicense { report })
}
