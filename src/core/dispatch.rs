/// The condition renderer: engine selection and double dispatch on
/// (condition kind, rendering engine).
use log::debug;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::core::data::DataAccess;
use crate::core::errors::{ErrorCollector, ExportErrorKind, RenderError};
use crate::core::resolvers::{legacy_resolvers, ConditionResolver, RenderContext};
use crate::core::structured::{structured_resolvers, StructuredRenderer};
use crate::core::templates::TemplateProvider;
use crate::schema::condition::{ConditionKind, ParsedCondition};
use crate::schema::entity::{FlexFieldObject, ProjectId};
use crate::schema::settings::ExportSettings;
use crate::schema::template::{Placeholder, RenderingEngineKind, TemplateKind};

type ResolverMap = FxHashMap<(ConditionKind, RenderingEngineKind), Arc<dyn ConditionResolver>>;

/// Renders condition trees into script code. Built via
/// `ConditionRenderer::builder()` and immutable afterwards, so one
/// renderer can serve many export calls.
pub struct ConditionRenderer {
    templates: Arc<dyn TemplateProvider>,
    data: Arc<dyn DataAccess>,
    resolvers: ResolverMap,
}

/// Builder for constructing a `ConditionRenderer`.
pub struct ConditionRendererBuilder {
    templates: Option<Arc<dyn TemplateProvider>>,
    data: Option<Arc<dyn DataAccess>>,
    resolvers: ResolverMap,
}

impl ConditionRenderer {
    /// A builder with every Legacy resolver registered.
    pub fn builder() -> ConditionRendererBuilder {
        let mut resolvers = ResolverMap::default();
        for (kind, resolver) in legacy_resolvers() {
            resolvers.insert((kind, RenderingEngineKind::Legacy), resolver);
        }
        ConditionRendererBuilder {
            templates: None,
            data: None,
            resolvers,
        }
    }

    pub fn templates(&self) -> &dyn TemplateProvider {
        self.templates.as_ref()
    }

    pub fn data(&self) -> &dyn DataAccess {
        self.data.as_ref()
    }

    pub fn supports(&self, kind: ConditionKind, engine: RenderingEngineKind) -> bool {
        self.resolvers.contains_key(&(kind, engine))
    }

    /// The engine a project renders conditions with, taken from its
    /// condition group template.
    pub fn engine_for(&self, project: &ProjectId) -> Result<RenderingEngineKind, RenderError> {
        Ok(self
            .templates
            .template(project, TemplateKind::ConditionGroup)?
            .engine)
    }

    /// Renders a list of top-level conditions joined with the AND
    /// fragment.
    pub fn render_conditions(
        &self,
        project: &ProjectId,
        conditions: &[ParsedCondition],
        settings: &ExportSettings,
        subject: Option<&FlexFieldObject>,
        errors: &ErrorCollector,
    ) -> Result<String, RenderError> {
        let ctx = self.context(project, settings, subject, errors)?;
        let separator = ctx.fragment(TemplateKind::LogicAnd)?;
        let rendered = conditions
            .iter()
            .enumerate()
            .map(|(index, condition)| {
                errors.with_context(format!("#{}", index + 1), || self.dispatch(condition, &ctx))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join(&separator))
    }

    /// Renders a single condition node.
    pub fn render_condition(
        &self,
        project: &ProjectId,
        condition: &ParsedCondition,
        settings: &ExportSettings,
        subject: Option<&FlexFieldObject>,
        errors: &ErrorCollector,
    ) -> Result<String, RenderError> {
        let ctx = self.context(project, settings, subject, errors)?;
        self.dispatch(condition, &ctx)
    }

    /// Placeholder documentation for a template kind. Fragment templates
    /// (operators, logic joiners) have none.
    pub fn placeholders(
        &self,
        template_kind: TemplateKind,
        engine: RenderingEngineKind,
    ) -> Result<Vec<Placeholder>, RenderError> {
        let Some(kind) = template_kind.condition_kind() else {
            return Ok(Vec::new());
        };
        Ok(self.resolver(kind, engine)?.placeholders(kind))
    }

    fn context<'a>(
        &'a self,
        project: &'a ProjectId,
        settings: &'a ExportSettings,
        subject: Option<&'a FlexFieldObject>,
        errors: &'a ErrorCollector,
    ) -> Result<RenderContext<'a>, RenderError> {
        Ok(RenderContext {
            renderer: self,
            project,
            settings,
            subject,
            errors,
            engine: self.engine_for(project)?,
        })
    }

    fn resolver(
        &self,
        kind: ConditionKind,
        engine: RenderingEngineKind,
    ) -> Result<&Arc<dyn ConditionResolver>, RenderError> {
        self.resolvers
            .get(&(kind, engine))
            .ok_or(RenderError::NoResolver { kind, engine })
    }

    /// Routes one condition to the resolver for its kind and the call's
    /// engine.
    pub(crate) fn dispatch(
        &self,
        condition: &ParsedCondition,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let Some(kind) = condition.condition_kind() else {
            ctx.errors.record(
                ExportErrorKind::UnknownConditionKind,
                format!("unknown condition kind {}", condition.kind),
            );
            return Ok(String::new());
        };
        let resolver = self.resolver(kind, ctx.engine)?;
        debug!(
            "rendering {:?} condition with the {:?} engine",
            kind, ctx.engine
        );
        resolver.render(kind, &condition.data, ctx)
    }
}

impl ConditionRendererBuilder {
    pub fn with_templates(mut self, templates: Arc<dyn TemplateProvider>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn with_data(mut self, data: Arc<dyn DataAccess>) -> Self {
        self.data = Some(data);
        self
    }

    /// Registers `resolver` for one kind and engine, replacing any
    /// resolver registered before.
    pub fn register(
        mut self,
        kind: ConditionKind,
        engine: RenderingEngineKind,
        resolver: Arc<dyn ConditionResolver>,
    ) -> Self {
        self.resolvers.insert((kind, engine), resolver);
        self
    }

    /// Registers resolvers for every kind under the Structured engine,
    /// backed by `renderer`.
    pub fn with_structured_renderer(mut self, renderer: Arc<dyn StructuredRenderer>) -> Self {
        for (kind, resolver) in structured_resolvers(renderer) {
            self.resolvers
                .insert((kind, RenderingEngineKind::Structured), resolver);
        }
        self
    }

    pub fn build(self) -> Result<ConditionRenderer, RenderError> {
        let templates = self.templates.ok_or_else(|| {
            RenderError::Configuration("no template provider configured".to_string())
        })?;
        let data = self
            .data
            .ok_or_else(|| {
                RenderError::Configuration("no data access configured".to_string())
            })?;
        Ok(ConditionRenderer {
            templates,
            data,
            resolvers: self.resolvers,
        })
    }
}
