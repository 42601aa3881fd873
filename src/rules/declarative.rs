use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::artifact::ArtifactNode;
use crate::error::{AuditError, AuditResult};
use crate::license::LicenseRef;
use crate::matcher::Criteria;
use crate::rules::{CompletionContext, FilterContext, RuleProgram};

/// A rule document, e.g.
///
/// ```json
/// {
///   "complete": [
///     { "match": "com.acme:lib", "rewrite": { "to": { "name": "Apache-2.0", "url": "https://www.apache.org/licenses/LICENSE-2.0" } } },
///     { "match": ["org.dual:*"], "accept": "MIT" }
///   ],
///   "filter": [ { "exclude": "org.internal:*" } ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub complete: Vec<CompletionRule>,
    #[serde(default)]
    pub filter: Vec<FilterRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRule {
    #[serde(rename = "match")]
    pub criteria: Criteria,
    #[serde(flatten)]
    pub action: CompletionAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionAction {
    /// replaces the licenses after verifying they are exactly `expected`; an empty (or
    ///  omitted) `expected` supplies a license for an artifact that declares none
    Rewrite {
        #[serde(default)]
        expected: Vec<LicenseRef>,
        to: LicenseRef,
    },
    /// picks one license of a multi-licensed artifact
    Accept(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterRule {
    pub exclude: Criteria,
}


pub struct DeclarativeRuleProgram {
    name: String,
    document: RuleDocument,
}
impl DeclarativeRuleProgram {
    pub fn new(source_name: &str, document: RuleDocument) -> DeclarativeRuleProgram {
        DeclarativeRuleProgram {
            name: document.name.clone().unwrap_or_else(|| source_name.to_string()),
            document,
        }
    }

    pub fn parse(source_name: &str, json: &str) -> AuditResult<DeclarativeRuleProgram> {
        let document = serde_json::from_str(json)
            .map_err(|e| AuditError::RuleParse {
                source_name: source_name.to_string(),
                source: e.into(),
            })?;
        Ok(DeclarativeRuleProgram::new(source_name, document))
    }

    pub fn load(path: &Path) -> AuditResult<DeclarativeRuleProgram> {
        let source_name = path.display().to_string();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", source_name))
            .map_err(|e| AuditError::RuleParse { source_name: source_name.clone(), source: e })?;
        Self::parse(&source_name, &json)
    }

    /// A single rule file, or every `*.json` file in a directory (in file name order)
    pub fn load_all(path: &Path) -> AuditResult<Vec<DeclarativeRuleProgram>> {
        if !path.is_dir() {
            return Ok(vec![Self::load(path)?]);
        }

        let parse_error = |e: std::io::Error| AuditError::RuleParse {
            source_name: path.display().to_string(),
            source: e.into(),
        };

        let mut files: Vec<PathBuf> = std::fs::read_dir(path)
            .map_err(parse_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(parse_error)?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == "json"))
            .collect();
        files.sort();

        files.iter()
            .map(|p| Self::load(p))
            .collect()
    }
}

impl RuleProgram for DeclarativeRuleProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, project: &ArtifactNode) -> AuditResult<()> {
        trace!("setting up rules {} for {}", self.name, project.coordinates);

        // surface malformed matchers before any phase runs
        for rule in &self.document.complete {
            rule.criteria.parse()?;
        }
        for rule in &self.document.filter {
            rule.exclude.parse()?;
        }
        Ok(())
    }

    fn complete(&self, ctx: &mut CompletionContext) -> AuditResult<()> {
        for rule in &self.document.complete {
            ctx.on_match(&rule.criteria, |ctx| {
                debug!("{}: applying {:?} to {}", self.name, rule.action, ctx.coordinates());
                match &rule.action {
                    CompletionAction::Rewrite { expected, to } => ctx.rewrite_license(expected, to.clone()),
                    CompletionAction::Accept(name) => {
                        ctx.accept(name);
                        Ok(())
                    }
                }
            })?;
        }
        Ok(())
    }

    fn filter(&self, ctx: &mut FilterContext) -> AuditResult<()> {
        for rule in &self.document.filter {
            let removed = ctx.remove_matching(&rule.exclude)?;
            debug!("{}: excluding {:?} removed {} artifact(s)", self.name, rule.exclude, removed);
        }
        Ok(())
    }
}
