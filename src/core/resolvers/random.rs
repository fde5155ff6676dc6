/// Random value — compares a random number in a range. Only the six
/// primitive operators make sense here.
use serde_json::Value;

use super::{decode, ConditionResolver, RenderContext};
use crate::core::errors::{ExportErrorKind, RenderError};
use crate::core::operator::CompareOperator;
use crate::core::substitution::substitute_literal;
use crate::schema::condition::{ConditionKind, RandomValueData};
use crate::schema::template::{Placeholder, TemplateKind};

pub struct RandomValueResolver;

impl ConditionResolver for RandomValueResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let data: RandomValueData = decode(kind, data)?;
        let template = ctx.template(TemplateKind::for_condition(kind))?;

        let fragment = match CompareOperator::parse(&data.operator) {
            Some(operator) if operator.is_primitive() => ctx.operator_fragment(operator)?,
            _ => {
                ctx.errors.record(
                    ExportErrorKind::UnknownOperator,
                    format!("unsupported random value operator {:?}", data.operator),
                );
                String::new()
            }
        };

        let mut code = substitute_literal(&template.code, "Condition_Operator", &fragment);
        code = substitute_literal(&code, "Condition_MinValue", &data.min_value.to_string());
        code = substitute_literal(&code, "Condition_MaxValue", &data.max_value.to_string());
        code = substitute_literal(
            &code,
            "Condition_CompareValue",
            &data.compare_value.to_string(),
        );
        Ok(code)
    }

    fn placeholders(&self, _kind: ConditionKind) -> Vec<Placeholder> {
        vec![
            Placeholder::new("Condition_Operator", "Compare operator"),
            Placeholder::new("Condition_MinValue", "Lower bound of the random value"),
            Placeholder::new("Condition_MaxValue", "Upper bound of the random value"),
            Placeholder::new(
                "Condition_CompareValue",
                "Value the random value is compared to",
            ),
        ]
    }
}
