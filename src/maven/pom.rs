use std::borrow::Cow;

use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::license::LicenseRef;
use crate::maven::coordinates::MavenCoordinates;

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\$\{([^}]+)\}").unwrap();
}

/// The parts of a `pom.xml` that matter for license auditing. Everything else in the file is
///  ignored.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pom {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub parent: Option<PomParent>,
    #[serde(default)]
    pub licenses: Option<PomLicenses>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PomParent {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct PomLicenses {
    #[serde(default)]
    pub license: Vec<PomLicense>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct PomLicense {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Pom {
    pub fn parse(xml: &[u8]) -> anyhow::Result<Pom> {
        let xml = std::str::from_utf8(xml)?;
        serde_xml_rs::from_str(xml)
            .map_err(|e| anyhow!("not a valid POM: {}", e))
    }

    pub fn parent_coordinates(&self) -> Option<MavenCoordinates> {
        self.parent.as_ref()
            .map(|p| MavenCoordinates::new(p.group_id.trim(), p.artifact_id.trim(), p.version.trim()))
    }

    /// `groupId` and `version` are inherited from the parent if they are not declared
    pub fn coordinates(&self) -> anyhow::Result<MavenCoordinates> {
        let parent = self.parent.as_ref();

        let group_id = non_blank(&self.group_id)
            .or_else(|| parent.map(|p| p.group_id.trim()))
            .ok_or_else(|| anyhow!("POM declares neither groupId nor parent"))?;
        let artifact_id = non_blank(&self.artifact_id)
            .ok_or_else(|| anyhow!("POM does not declare an artifactId"))?;
        let version = non_blank(&self.version)
            .or_else(|| parent.map(|p| p.version.trim()))
            .ok_or_else(|| anyhow!("POM declares neither version nor parent"))?;

        Ok(MavenCoordinates::new(
            &self.interpolate(group_id),
            &self.interpolate(artifact_id),
            &self.interpolate(version),
        ))
    }

    /// `None` if the POM has no `<licenses>` of its own, so that they are inherited from the
    ///  parent
    pub fn declared_licenses(&self) -> Option<Vec<LicenseRef>> {
        let licenses: Vec<LicenseRef> = self.licenses.as_ref()?
            .license.iter()
            .filter_map(|l| {
                let name = non_blank(&l.name)?;
                Some(LicenseRef {
                    name: self.interpolate(name).into_owned(),
                    url: non_blank(&l.url).map(|u| self.interpolate(u).into_owned()),
                })
            })
            .collect();

        if licenses.is_empty() {
            None
        }
        else {
            Some(licenses)
        }
    }

    /// Replaces the well-known `${project.*}` placeholders. Anything else (e.g. user defined
    ///  properties) is left as it is.
    pub fn interpolate<'a>(&self, s: &'a str) -> Cow<'a, str> {
        PLACEHOLDER_REGEX.replace_all(s, |caps: &Captures| {
            let resolved = match &caps[1] {
                "project.groupId" | "pom.groupId" => non_blank(&self.group_id)
                    .or_else(|| self.parent.as_ref().map(|p| p.group_id.trim())),
                "project.artifactId" | "pom.artifactId" => non_blank(&self.artifact_id),
                "project.version" | "pom.version" | "version" => non_blank(&self.version)
                    .or_else(|| self.parent.as_ref().map(|p| p.version.trim())),
                "project.parent.groupId" => self.parent.as_ref().map(|p| p.group_id.trim()),
                "project.parent.version" => self.parent.as_ref().map(|p| p.version.trim()),
                _ => None,
            };

            resolved
                // no recursive placeholders
                .filter(|r| !r.contains("${"))
                .map(|r| r.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
