/// Raw code — the designer's script is inserted as written.
use serde_json::Value;

use super::{decode, ConditionResolver, RenderContext};
use crate::core::errors::RenderError;
use crate::core::substitution::substitute_literal;
use crate::schema::condition::{CodeData, ConditionKind};
use crate::schema::template::{Placeholder, TemplateKind};

pub struct CodeResolver;

impl ConditionResolver for CodeResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let data: CodeData = decode(kind, data)?;
        let template = ctx.template(TemplateKind::for_condition(kind))?;
        let code = substitute_literal(&template.code, "Condition_ScriptName", &data.script_name);
        Ok(substitute_literal(
            &code,
            "Condition_Code",
            &data.script_code,
        ))
    }

    fn placeholders(&self, _kind: ConditionKind) -> Vec<Placeholder> {
        vec![
            Placeholder::new("Condition_ScriptName", "Name of the script"),
            Placeholder::new("Condition_Code", "Code of the script"),
        ]
    }
}
