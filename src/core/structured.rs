/// Structured engine adapter.
///
/// Templates of the Structured engine are rendered by an external template
/// engine against a JSON context instead of marker substitution. The
/// engine itself is a collaborator; this module only builds the context.
///
/// Context shape:
/// - `kind`: condition kind name
/// - `condition`: the raw payload
/// - `project`: project id
/// - `subject`: `{ id, name }` of the export subject, or null
/// - groups additionally get `operator` (`"and"` / `"or"`) and `children`,
///   the rendered child conditions in order
use serde_json::{json, Value};
use std::sync::Arc;

use super::resolvers::{decode, ConditionResolver, RenderContext};
use crate::core::errors::{ExportErrorKind, RenderError};
use crate::schema::condition::{ConditionKind, GroupData};
use crate::schema::template::{Placeholder, TemplateKind};

/// An external template engine.
pub trait StructuredRenderer: Send + Sync {
    fn render(&self, template: &str, context: &Value) -> Result<String, String>;
}

pub struct StructuredResolver {
    renderer: Arc<dyn StructuredRenderer>,
}

impl StructuredResolver {
    pub fn new(renderer: Arc<dyn StructuredRenderer>) -> Self {
        Self { renderer }
    }

    fn group_context(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
        context: &mut Value,
    ) -> Result<(), RenderError> {
        let group: GroupData = decode(kind, data)?;
        let operator = match group.operator {
            0 => "and",
            1 => "or",
            other => {
                ctx.errors.record(
                    ExportErrorKind::UnknownOperator,
                    format!("unknown group operator {}", other),
                );
                context["children"] = json!([]);
                return Ok(());
            }
        };
        let children = group
            .conditions
            .iter()
            .enumerate()
            .map(|(i, child)| {
                ctx.errors
                    .with_context(format!("#{}", i + 1), || ctx.render_child(child))
            })
            .collect::<Result<Vec<_>, _>>()?;
        context["operator"] = json!(operator);
        context["children"] = json!(children);
        Ok(())
    }
}

impl ConditionResolver for StructuredResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let template = ctx.template(TemplateKind::for_condition(kind))?;
        let mut context = json!({
            "kind": format!("{:?}", kind),
            "condition": data,
            "project": ctx.project.0,
            "subject": ctx.subject.map(|s| json!({"id": s.id, "name": s.name})),
        });
        if kind == ConditionKind::Group {
            self.group_context(kind, data, ctx, &mut context)?;
        }
        self.renderer
            .render(&template.code, &context)
            .map_err(RenderError::Structured)
    }

    fn placeholders(&self, kind: ConditionKind) -> Vec<Placeholder> {
        let mut placeholders = vec![
            Placeholder::new("kind", "Name of the condition kind"),
            Placeholder::new("condition", "The condition payload"),
            Placeholder::new("project", "Id of the project"),
            Placeholder::new("subject", "Id and name of the export subject, if any"),
        ];
        if kind == ConditionKind::Group {
            placeholders.push(Placeholder::new("operator", "and / or"));
            placeholders.push(Placeholder::new("children", "Rendered child conditions"));
        }
        placeholders
    }
}

/// One shared structured resolver for every kind.
pub fn structured_resolvers(
    renderer: Arc<dyn StructuredRenderer>,
) -> Vec<(ConditionKind, Arc<dyn ConditionResolver>)> {
    let resolver: Arc<dyn ConditionResolver> = Arc::new(StructuredResolver::new(renderer));
    crate::core::resolvers::shared(resolver, &ConditionKind::ALL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::ConditionRenderer;
    use crate::core::errors::ErrorCollector;
    use crate::core::resolvers::test_support::world;
    use crate::core::templates::{CachedTemplateProvider, InMemoryTemplateStore, TemplateCatalog};
    use crate::schema::condition::ParsedCondition;
    use crate::schema::entity::{FlexFieldObject, ProjectId};
    use crate::schema::settings::ExportSettings;
    use crate::schema::template::{ExportTemplate, RenderingEngineKind};

    /// Replaces `{{ key }}` with the top-level context value, joining
    /// arrays with the group operator.
    struct KeyRenderer;

    impl StructuredRenderer for KeyRenderer {
        fn render(&self, template: &str, context: &Value) -> Result<String, String> {
            let key = template.trim_start_matches("{{ ").trim_end_matches(" }}");
            match &context[key] {
                Value::String(s) => Ok(s.clone()),
                Value::Array(items) => {
                    let joiner = format!(" {} ", context["operator"].as_str().unwrap_or(""));
                    let items: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                    Ok(format!("[{}]", items.join(&joiner)))
                }
                Value::Null => Err(format!("unknown key {}", key)),
                other => Ok(other.to_string()),
            }
        }
    }

    fn structured_renderer() -> ConditionRenderer {
        let mut catalog = TemplateCatalog::builtin().unwrap();
        let overrides = [
            (TemplateKind::ConditionGroup, "{{ children }}"),
            (TemplateKind::GameTime, "{{ kind }}"),
            (TemplateKind::Code, "{{ missing }}"),
            (TemplateKind::NpcValue, "{{ subject }}"),
        ];
        for (kind, code) in overrides {
            catalog.insert(ExportTemplate {
                kind,
                engine: RenderingEngineKind::Structured,
                code: code.to_string(),
            });
        }
        ConditionRenderer::builder()
            .with_templates(Arc::new(CachedTemplateProvider::new(
                InMemoryTemplateStore::new(),
                catalog,
            )))
            .with_data(Arc::new(world()))
            .with_structured_renderer(Arc::new(KeyRenderer))
            .build()
            .unwrap()
    }

    fn render_with(
        condition: ParsedCondition,
        subject: Option<&FlexFieldObject>,
        errors: &ErrorCollector,
    ) -> Result<String, RenderError> {
        structured_renderer().render_condition(
            &ProjectId::new("p1"),
            &condition,
            &ExportSettings::default(),
            subject,
            errors,
        )
    }

    fn render(
        condition: ParsedCondition,
        subject: Option<&FlexFieldObject>,
    ) -> Result<String, RenderError> {
        render_with(condition, subject, &ErrorCollector::new())
    }

    #[test]
    fn group_children_rendered_in_order() {
        let group = ParsedCondition::new(
            ConditionKind::Group,
            json!({"operator": 1, "conditions": [
                {"kind": 12, "data": {"operator": 0, "hour": 1, "minutes": 0}},
                {"kind": 12, "data": {"operator": 0, "hour": 2, "minutes": 0}},
            ]}),
        );
        assert_eq!(render(group, None).unwrap(), "[GameTime or GameTime]");
    }

    #[test]
    fn child_errors_carry_their_position() {
        let group = ParsedCondition::new(
            ConditionKind::Group,
            json!({"operator": 0, "conditions": [
                {"kind": 12, "data": {"operator": 0, "hour": 1, "minutes": 0}},
                {"kind": 6, "data": {}},
            ]}),
        );
        let errors = ErrorCollector::new();
        assert_eq!(
            render_with(group, None, &errors).unwrap(),
            "[GameTime and ]"
        );

        let entries = errors.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ExportErrorKind::UnknownConditionKind);
        assert_eq!(entries[0].context, "#2");
    }

    #[test]
    fn subject_is_exposed() {
        let anna = FlexFieldObject::new("npc-anna", "Anna");
        let condition = ParsedCondition::new(ConditionKind::NpcValue, json!({}));
        let out = render(condition, Some(&anna)).unwrap();
        assert!(out.contains("npc-anna"));
        assert!(out.contains("Anna"));
    }

    #[test]
    fn engine_failure_is_fatal() {
        let condition = ParsedCondition::new(ConditionKind::Code, json!({}));
        assert!(matches!(
            render(condition, None),
            Err(RenderError::Structured(_))
        ));
    }

    #[test]
    fn group_placeholders_include_children() {
        let resolver = StructuredResolver::new(Arc::new(KeyRenderer));
        let names: Vec<String> = resolver
            .placeholders(ConditionKind::Group)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert!(names.contains(&"children".to_string()));
    }
}
