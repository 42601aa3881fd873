use crate::artifact::ArtifactNode;
use crate::error::AuditResult;
use crate::rules::{CompletionContext, FilterContext, GenerationContext, RuleProgram};

type CompleteFn = Box<dyn Fn(&mut CompletionContext) -> AuditResult<()>>;
type FilterFn = Box<dyn Fn(&mut FilterContext) -> AuditResult<()>>;
type GenerateFn = Box<dyn Fn(&GenerationContext) -> AuditResult<()>>;

/// A rule program assembled from closures, for embedding rules in Rust code. Callbacks that are
///  not registered are no-ops.
pub struct CallbackRuleProgram {
    name: String,
    completer: Option<CompleteFn>,
    filter: Option<FilterFn>,
    generator: Option<GenerateFn>,
}
impl CallbackRuleProgram {
    pub fn new(name: &str) -> CallbackRuleProgram {
        CallbackRuleProgram {
            name: name.to_string(),
            completer: None,
            filter: None,
            generator: None,
        }
    }

    pub fn on_complete(mut self, f: impl Fn(&mut CompletionContext) -> AuditResult<()> + 'static) -> CallbackRuleProgram {
        self.completer = Some(Box::new(f));
        self
    }

    pub fn on_filter(mut self, f: impl Fn(&mut FilterContext) -> AuditResult<()> + 'static) -> CallbackRuleProgram {
        self.filter = Some(Box::new(f));
        self
    }

    pub fn on_generate(mut self, f: impl Fn(&GenerationContext) -> AuditResult<()> + 'static) -> CallbackRuleProgram {
        self.generator = Some(Box::new(f));
        self
    }
}

impl RuleProgram for CallbackRuleProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, _project: &ArtifactNode) -> AuditResult<()> {
        Ok(())
    }

    fn complete(&self, ctx: &mut CompletionContext) -> AuditResult<()> {
        match &self.completer {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }

    fn filter(&self, ctx: &mut FilterContext) -> AuditResult<()> {
        match &self.filter {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }

    fn generate(&self, ctx: &GenerationContext) -> AuditResult<()> {
        match &self.generator {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }
}
