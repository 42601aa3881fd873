use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_PLUGIN_PACKAGING: &str = "hpi";
pub const DEFAULT_CORE_MARKER: &str = "jenkins-core";

/// Policy and output settings threaded through all pipeline phases
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// fail unless every shipped artifact has license information after completion
    pub require_complete_license_info: bool,
    /// skips the whole pipeline
    pub disable_check: bool,
    /// publish the generated reports alongside the build
    pub attach: bool,
    pub generate_license_xml: Option<PathBuf>,
    pub generate_license_html: Option<PathBuf>,
    pub filter: FilterPolicy,
}
impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            require_complete_license_info: false,
            disable_check: false,
            attach: false,
            generate_license_xml: None,
            generate_license_html: None,
            filter: Default::default(),
        }
    }
}
impl PipelineConfig {
    pub fn load(path: &Path) -> anyhow::Result<PipelineConfig> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Command line settings win over file settings: a switch can only turn a setting on,
    ///  a path replaces the configured one
    pub fn merge(mut self, overrides: ConfigOverrides) -> PipelineConfig {
        self.require_complete_license_info |= overrides.require_complete_license_info;
        self.disable_check |= overrides.disable_check;
        self.attach |= overrides.attach;
        if overrides.generate_license_xml.is_some() {
            self.generate_license_xml = overrides.generate_license_xml;
        }
        if overrides.generate_license_html.is_some() {
            self.generate_license_html = overrides.generate_license_html;
        }
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub require_complete_license_info: bool,
    pub disable_check: bool,
    pub attach: bool,
    pub generate_license_xml: Option<PathBuf>,
    pub generate_license_html: Option<PathBuf>,
}

/// Settings for the built-in exclusion rules
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FilterPolicy {
    /// packaging of artifacts that are plugins in their own right; their transitive dependencies
    ///  are bundled by them, not by this build
    pub plugin_packaging: String,
    /// artifacts reached through a dependency whose coordinates contain this are provided at
    ///  runtime
    pub core_marker: String,
}
impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy {
            plugin_packaging: DEFAULT_PLUGIN_PACKAGING.to_string(),
            core_marker: DEFAULT_CORE_MARKER.to_string(),
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert!(!config.require_complete_license_info);
        assert!(!config.disable_check);
        assert!(!config.attach);
        assert_eq!(config.filter.plugin_packaging, "hpi");
        assert_eq!(config.filter.core_marker, "jenkins-core");
    }

    #[test]
    fn test_parse() {
        let config: PipelineConfig = serde_json::from_str(r#"{
            "requireCompleteLicenseInfo": true,
            "generateLicenseXml": "target/licenses.xml",
            "filter": { "coreMarker": "x" }
        }"#).unwrap();

        assert!(config.require_complete_license_info);
        assert_eq!(config.generate_license_xml, Some(PathBuf::from("target/licenses.xml")));
        assert_eq!(config.filter.core_marker, "x");
        assert_eq!(config.filter.plugin_packaging, "hpi");
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("license-audit.json");
        std::fs::write(&path, r#"{ "attach": true, "generateLicenseHtml": "out/licenses.html" }"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert!(config.attach);
        assert!(!config.require_complete_license_info);
        assert_eq!(config.generate_license_html, Some(PathBuf::from("out/licenses.html")));
        assert_eq!(config.filter, FilterPolicy::default());
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = PipelineConfig::load(&missing).unwrap_err();
        assert_eq!(err.to_string(), format!("reading config file {}", missing.display()));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        let err = PipelineConfig::load(&broken).unwrap_err();
        assert_eq!(err.to_string(), format!("parsing config file {}", broken.display()));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(serde_json::from_str::<PipelineConfig>(r#"{ "requireComplete": true }"#).is_err());
    }

    #[test]
    fn test_merge() {
        let file = PipelineConfig {
            require_complete_license_info: true,
            generate_license_xml: Some(PathBuf::from("a.xml")),
            generate_license_html: Some(PathBuf::from("a.html")),
            ..Default::default()
        };

        let merged = file.merge(ConfigOverrides {
            attach: true,
            generate_license_xml: Some(PathBuf::from("b.xml")),
            ..Default::default()
        });

        assert!(merged.require_complete_license_info);
        assert!(merged.attach);
        assert!(!merged.disable_check);
        assert_eq!(merged.generate_license_xml, Some(PathBuf::from("b.xml")));
        assert_eq!(merged.generate_license_html, Some(PathBuf::from("a.html")));
    }
}
