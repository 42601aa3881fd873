//! Sequences the phases of a license audit:
//!
//! setup -> complete(root) -> resolve -> filter -> complete(each) -> validate -> generate -> attach
//!
//! Data only ever flows forward. A phase never revisits artifacts of an earlier phase.

pub mod completion;
pub mod filter;
pub mod validate;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::artifact::{AncestryIndex, ArtifactNode, ArtifactSet, DependencyList, RuntimeArtifact};
use crate::config::PipelineConfig;
use crate::error::{AuditError, AuditResult};
use crate::maven::coordinates::MavenCoordinates;
use crate::publish::ArtifactPublisher;
use crate::report::{HtmlReportGenerator, XmlReportGenerator};
use crate::resolver::MetadataResolver;
use crate::rules::declarative::DeclarativeRuleProgram;
use crate::rules::{GenerationContext, RuleProgram};

pub const LICENSE_XML_KIND: &str = "license.xml";
pub const LICENSE_HTML_KIND: &str = "license.html";

#[derive(Debug)]
pub enum Outcome {
    /// the check is disabled, nothing ran
    Skipped,
    Completed(DependencyList),
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    programs: Vec<Box<dyn RuleProgram>>,
    resolver: &'a dyn MetadataResolver,
    publisher: Option<&'a mut dyn ArtifactPublisher>,
}
impl <'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig, programs: Vec<Box<dyn RuleProgram>>, resolver: &'a dyn MetadataResolver) -> Pipeline<'a> {
        Pipeline {
            config,
            programs,
            resolver,
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: &'a mut dyn ArtifactPublisher) -> Pipeline<'a> {
        self.publisher = Some(publisher);
        self
    }

    pub async fn run(&mut self, root: RuntimeArtifact) -> AuditResult<Outcome> {
        if self.config.disable_check {
            info!("license check is disabled");
            return Ok(Outcome::Skipped);
        }

        let root_coordinates = root.coordinates.clone();
        let root_metadata = self.resolver.resolve_project_metadata(&root_coordinates).await
            .map_err(|source| AuditError::MetadataResolution { coordinates: root_coordinates.clone(), source })?;

        let mut ancestry = AncestryIndex::new();
        ancestry.record_lineage(&root_coordinates, &root_metadata.lineage);
        let mut root_project = ArtifactNode::from_resolved(root, &root_metadata);

        for program in self.programs.iter_mut() {
            debug!("setting up {}", program.name());
            program.setup(&root_project)?;
        }

        info!("completing {}", root_coordinates);
        completion::complete_root(&mut root_project, &self.programs)?;

        info!("resolving dependencies of {}", root_coordinates);
        let (artifacts, order) = self.resolve_dependencies(&root_project, &mut ancestry).await?;

        info!("filtering {} dependencies", artifacts.len());
        let mut artifacts = filter::filter(artifacts, &self.programs, &self.config.filter)?;

        info!("completing {} dependencies", artifacts.len());
        let mut dependencies: DependencyList = Vec::with_capacity(artifacts.len() + 1);
        let mut shipped = Vec::with_capacity(artifacts.len());
        for coordinates in &order {
            // taking the node out makes every artifact complete exactly once
            if let Some(mut node) = artifacts.remove(coordinates) {
                completion::complete(&mut node, &root_project, &self.programs)?;
                shipped.push(node);
            }
        }
        dependencies.push(root_project);
        dependencies.extend(shipped);

        info!("validating license information");
        validate::validate(&dependencies, self.config.require_complete_license_info, &ancestry)?;

        info!("generating reports");
        let ctx = GenerationContext { dependencies: &dependencies };
        for program in &self.programs {
            debug!("generating with {}", program.name());
            program.generate(&ctx)?;
        }

        if self.config.attach {
            self.attach_reports(&root_coordinates)?;
        }

        Ok(Outcome::Completed(dependencies))
    }

    /// Resolves project metadata for every runtime artifact. An artifact whose metadata can not be
    ///  resolved is logged and left out, it never fails the run.
    async fn resolve_dependencies(&self, root_project: &ArtifactNode, ancestry: &mut AncestryIndex) -> AuditResult<(ArtifactSet, Vec<MavenCoordinates>)> {
        let runtime_artifacts = self.resolver.list_runtime_artifacts(root_project).await
            .map_err(|source| AuditError::ArtifactListing { coordinates: root_project.coordinates.clone(), source })?;

        let mut artifacts = ArtifactSet::new();
        let mut order = Vec::with_capacity(runtime_artifacts.len());

        for artifact in runtime_artifacts {
            let coordinates = artifact.coordinates.clone();
            if coordinates == root_project.coordinates || artifacts.contains_key(&coordinates) {
                continue;
            }

            match self.resolver.resolve_project_metadata(&coordinates).await {
                Ok(metadata) => {
                    ancestry.record_lineage(&coordinates, &metadata.lineage);
                    artifacts.insert(coordinates.clone(), ArtifactNode::from_resolved(artifact, &metadata));
                    order.push(coordinates);
                }
                Err(source) => {
                    warn!("{}, skipping", AuditError::MetadataResolution { coordinates, source });
                }
            }
        }

        Ok((artifacts, order))
    }

    fn attach_reports(&mut self, project: &MavenCoordinates) -> AuditResult<()> {
        let publisher = match &mut self.publisher {
            Some(p) => p,
            None => {
                warn!("attaching reports was requested, but there is nowhere to attach them to");
                return Ok(());
            }
        };

        let reports = [
            (self.config.generate_license_xml.as_deref(), LICENSE_XML_KIND),
            (self.config.generate_license_html.as_deref(), LICENSE_HTML_KIND),
        ];
        for (path, kind) in reports {
            if let Some(path) = path {
                publisher.attach(project, kind, path)
                    .map_err(|source| AuditError::Report { path: path.to_path_buf(), source })?;
            }
        }
        Ok(())
    }
}

/// Rule programs in evaluation order: rule files, the report generators, inline rules
pub fn assemble_programs(config: &PipelineConfig, rules: Option<&Path>, inline_rules: Option<&str>) -> AuditResult<Vec<Box<dyn RuleProgram>>> {
    let mut programs: Vec<Box<dyn RuleProgram>> = vec![];

    if let Some(rules) = rules {
        for program in DeclarativeRuleProgram::load_all(rules)? {
            programs.push(Box::new(program));
        }
    }

    if let Some(path) = &config.generate_license_xml {
        programs.push(Box::new(XmlReportGenerator::new(path.clone())));
    }
    if let Some(path) = &config.generate_license_html {
        programs.push(Box::new(HtmlReportGenerator::new(path.clone())));
    }

    if let Some(json) = inline_rules {
        programs.push(Box::new(DeclarativeRuleProgram::parse("inline rules", json)?));
    }

    Ok(programs)
}
