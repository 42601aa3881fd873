use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

lazy_static! {
    /// `group:artifact:version`, or Maven's rendered trail form `group:artifact:type[:classifier]:version`
    static ref COORDINATES_REGEX: Regex = Regex::new(
        r"^(?P<group>[^:\s]+):(?P<artifact>[^:\s]+)(?::(?P<type>[^:\s]+)(?::(?P<classifier>[^:\s]+))?)?:(?P<version>[^:\s]+)$"
    ).unwrap();
}

#[derive(PartialEq, Eq, Hash, Clone, Debug, PartialOrd, Ord)]
pub struct MavenGroupId(pub String);

#[derive(PartialEq, Eq, Hash, Clone, Debug, PartialOrd, Ord)]
pub struct MavenArtifactId(pub String);

#[derive(PartialEq, Eq, Hash, Clone, Debug, PartialOrd, Ord)]
pub struct MavenVersion(pub String);
impl MavenVersion {
    pub fn is_snapshot(&self) -> bool {
        self.0.ends_with("-SNAPSHOT")
    }
}

/// Identity of an artifact. Equality is per-field string equality, and the rendered form is
///  `group:artifact:version`.
#[derive(PartialEq, Eq, Hash, Clone, Debug, PartialOrd, Ord)]
pub struct MavenCoordinates {
    pub group_id: MavenGroupId,
    pub artifact_id: MavenArtifactId,
    pub version: MavenVersion,
}
impl MavenCoordinates {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> MavenCoordinates {
        MavenCoordinates {
            group_id: MavenGroupId(group_id.to_string()),
            artifact_id: MavenArtifactId(artifact_id.to_string()),
            version: MavenVersion(version.to_string()),
        }
    }
}

impl Display for MavenCoordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id.0, self.artifact_id.0, self.version.0)
    }
}

impl FromStr for MavenCoordinates {
    type Err = anyhow::Error;

    /// Accepts both the plain `group:artifact:version` form and the entries Maven records in a
    ///  dependency trail (`group:artifact:type[:classifier]:version`).
    fn from_str(s: &str) -> anyhow::Result<MavenCoordinates> {
        let captures = COORDINATES_REGEX.captures(s.trim())
            .ok_or_else(|| anyhow!("not a valid Maven coordinate: {:?}", s))?;

        Ok(MavenCoordinates::new(&captures["group"], &captures["artifact"], &captures["version"]))
    }
}

impl Serialize for MavenCoordinates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl <'de> Deserialize<'de> for MavenCoordinates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
