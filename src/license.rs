use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactNode;
use crate::error::{AuditError, AuditResult};

/// A declared license. Two refs denote the same license iff their names are equal, the URL is
///  informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
impl LicenseRef {
    pub fn new(name: &str, url: Option<&str>) -> LicenseRef {
        LicenseRef {
            name: name.to_string(),
            url: url.map(|s| s.to_string()),
        }
    }

    pub fn is_same_license(&self, other: &LicenseRef) -> bool {
        self.name == other.name
    }
}

/// Creates a new license
pub fn license(name: &str, url: &str) -> LicenseRef {
    LicenseRef::new(name, Some(url))
}

/// Renders license names as `[A,B]`
pub fn format_license_names(licenses: &[LicenseRef]) -> String {
    let names: Vec<&str> = licenses.iter()
        .map(|l| l.name.as_str())
        .collect();
    format!("[{}]", names.join(","))
}

/// Verifies that the node's licenses are exactly `expected` (by name, ignoring order) and
///  replaces them with `to`. This is for completing missing license info (`expected` empty) and
///  for correcting license info that is known to be wrong.
///
/// On mismatch the node is left untouched.
pub fn rewrite_license(node: &mut ArtifactNode, expected: &[LicenseRef], to: LicenseRef) -> AuditResult<()> {
    let actual = &node.licenses;

    let is_match = expected.len() == actual.len()
        && expected.iter().all(|e| actual.iter().any(|a| e.is_same_license(a)))
        && actual.iter().all(|a| expected.iter().any(|e| e.is_same_license(a)));

    if !is_match {
        return Err(AuditError::LicenseMismatch {
            expected: expected.to_vec(),
            actual: actual.clone(),
            coordinates: node.coordinates.clone(),
        });
    }

    node.licenses = vec![to];
    Ok(())
}

/// Picks one license of a multi-licensed artifact. If the artifact does not declare a license
///  with that name, nothing happens.
pub fn accept(node: &mut ArtifactNode, name: &str) {
    if let Some(accepted) = node.licenses.iter().find(|l| l.name == name).cloned() {
        node.licenses = vec![accepted];
    }
}
