use std::path::PathBuf;

use tracing::info;

use crate::artifact::ArtifactNode;
use crate::error::AuditResult;
use crate::report::{escape, write_report};
use crate::rules::{GenerationContext, RuleProgram};

/// Writes the dependency list as
///
/// ```xml
/// <dependencies>
///   <dependency groupId="..." artifactId="..." version="...">
///     <licenses>
///       <license name="..." url="..."/>
///     </licenses>
///   </dependency>
/// </dependencies>
/// ```
pub struct XmlReportGenerator {
    path: PathBuf,
}
impl XmlReportGenerator {
    pub fn new(path: PathBuf) -> XmlReportGenerator {
        XmlReportGenerator {
            path,
        }
    }
}

pub fn render(dependencies: &[ArtifactNode]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<dependencies>\n");

    for dependency in dependencies {
        let c = &dependency.coordinates;
        xml.push_str(&format!(
            "  <dependency groupId=\"{}\" artifactId=\"{}\" version=\"{}\">\n",
            escape(&c.group_id.0),
            escape(&c.artifact_id.0),
            escape(&c.version.0),
        ));
        xml.push_str("    <licenses>\n");
        for license in &dependency.licenses {
            match &license.url {
                Some(url) => xml.push_str(&format!("      <license name=\"{}\" url=\"{}\"/>\n", escape(&license.name), escape(url))),
                None => xml.push_str(&format!("      <license name=\"{}\"/>\n", escape(&license.name))),
            }
        }
        xml.push_str("    </licenses>\n");
        xml.push_str("  </dependency>\n");
    }

    xml.push_str("</dependencies>\n");
    xml
}

impl RuleProgram for XmlReportGenerator {
    fn name(&self) -> &str {
        "licenses.xml"
    }

    fn setup(&mut self, _project: &ArtifactNode) -> AuditResult<()> {
        Ok(())
    }

    fn generate(&self, ctx: &GenerationContext) -> AuditResult<()> {
        info!("writing license report {}", self.path.display());
        write_report(&self.path, &render(ctx.dependencies))
    }
}
