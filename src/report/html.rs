use std::path::PathBuf;

use tracing::info;

use crate::artifact::ArtifactNode;
use crate::error::AuditResult;
use crate::license::LicenseRef;
use crate::report::{escape, write_report};
use crate::rules::{GenerationContext, RuleProgram};

/// Writes the dependency list as a self-contained HTML page with one table row per dependency
pub struct HtmlReportGenerator {
    path: PathBuf,
}
impl HtmlReportGenerator {
    pub fn new(path: PathBuf) -> HtmlReportGenerator {
        HtmlReportGenerator {
            path,
        }
    }
}

pub fn render(dependencies: &[ArtifactNode]) -> String {
    let title = match dependencies.first() {
        Some(root) => format!("Licenses of {}", escape(&root.coordinates.to_string())),
        None => "Licenses".to_string(),
    };

    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", title));
    html.push_str("<style>table { border-collapse: collapse; } td, th { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }</style>\n");
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", title));
    html.push_str("<table>\n<tr><th>Group</th><th>Artifact</th><th>Version</th><th>Licenses</th></tr>\n");

    for dependency in dependencies {
        let c = &dependency.coordinates;
        let licenses: Vec<String> = dependency.licenses.iter()
            .map(render_license)
            .collect();

        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&c.group_id.0),
            escape(&c.artifact_id.0),
            escape(&c.version.0),
            licenses.join("<br>"),
        ));
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

/// Only http(s) URLs become links, anything else (`javascript:`, `data:`, ...) is shown as text
fn render_license(license: &LicenseRef) -> String {
    match &license.url {
        Some(url) if is_web_url(url) => format!("<a href=\"{}\">{}</a>", escape(url), escape(&license.name)),
        Some(url) => format!("{} ({})", escape(&license.name), escape(url)),
        None => escape(&license.name),
    }
}

fn is_web_url(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    url.starts_with("http://") || url.starts_with("https://")
}

impl RuleProgram for HtmlReportGenerator {
    fn name(&self) -> &str {
        "licenses.html"
    }

    fn setup(&mut self, _project: &ArtifactNode) -> AuditResult<()> {
        Ok(())
    }

    fn generate(&self, ctx: &GenerationContext) -> AuditResult<()> {
        info!("writing license report {}", self.path.display());
        write_report(&self.path, &render(ctx.dependencies))
    }
}
