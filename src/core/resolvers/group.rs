/// Group condition — AND/OR over nested conditions.
///
/// Children go back through the dispatch layer, so groups nest to any
/// depth and every child kind is rendered by its own resolver. Children
/// keep their input order, and an empty child still takes its slot in
/// the join.
use serde_json::Value;

use super::{decode, ConditionResolver, RenderContext};
use crate::core::errors::{ExportErrorKind, RenderError};
use crate::core::substitution::substitute_literal;
use crate::schema::condition::{ConditionKind, GroupData};
use crate::schema::template::{Placeholder, TemplateKind};

pub const GROUP_CONTENT: &str = "Condition_Group_Content";

fn joiner(operator: i32) -> Option<TemplateKind> {
    match operator {
        0 => Some(TemplateKind::LogicAnd),
        1 => Some(TemplateKind::LogicOr),
        _ => None,
    }
}

pub struct GroupResolver;

impl ConditionResolver for GroupResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let data: GroupData = decode(kind, data)?;
        let template = ctx.template(TemplateKind::ConditionGroup)?;

        let content = match joiner(data.operator) {
            Some(joiner) => {
                let separator = ctx.fragment(joiner)?;
                let children = data
                    .conditions
                    .iter()
                    .enumerate()
                    .map(|(index, child)| {
                        ctx.errors
                            .with_context(format!("#{}", index + 1), || ctx.render_child(child))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                children.join(&separator)
            }
            None => {
                ctx.errors.record(
                    ExportErrorKind::UnknownOperator,
                    format!("unknown group operator {}", data.operator),
                );
                String::new()
            }
        };

        Ok(substitute_literal(&template.code, GROUP_CONTENT, &content))
    }

    fn placeholders(&self, _kind: ConditionKind) -> Vec<Placeholder> {
        vec![Placeholder::new(
            GROUP_CONTENT,
            "Rendered child conditions joined by the and/or template",
        )]
    }
}
