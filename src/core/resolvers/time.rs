/// Game time — compares the in-game clock against a time of day.
use serde_json::Value;

use super::{decode, ConditionResolver, RenderContext};
use crate::core::errors::{ExportErrorKind, RenderError};
use crate::core::substitution::{substitute_block, substitute_literal};
use crate::schema::condition::{ConditionKind, GameTimeData};
use crate::schema::entity::GameTime;
use crate::schema::template::{Placeholder, TemplateKind};

const BEFORE_BLOCK: &str = "Condition_Operator_Before";
const AFTER_BLOCK: &str = "Condition_Operator_After";

pub struct GameTimeResolver;

impl ConditionResolver for GameTimeResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let data: GameTimeData = decode(kind, data)?;
        let template = ctx.template(TemplateKind::for_condition(kind))?;

        let before = match data.operator {
            0 => true,
            1 => false,
            other => {
                ctx.errors.record(
                    ExportErrorKind::UnknownOperator,
                    format!("unknown game time operator {}", other),
                );
                return Ok(String::new());
            }
        };

        let total_minutes = GameTime {
            hours: data.hour,
            minutes: data.minutes,
        }
        .total_minutes();
        let mut code = substitute_block(&template.code, BEFORE_BLOCK, before);
        code = substitute_block(&code, AFTER_BLOCK, !before);
        code = substitute_literal(&code, "Condition_Hours", &data.hour.to_string());
        code = substitute_literal(&code, "Condition_Minutes", &data.minutes.to_string());
        code = substitute_literal(&code, "Condition_TotalMinutes", &total_minutes.to_string());
        Ok(code)
    }

    fn placeholders(&self, _kind: ConditionKind) -> Vec<Placeholder> {
        vec![
            Placeholder::new(
                "Condition_Operator_Before_Start",
                "Start of a block kept if the check is before the time",
            ),
            Placeholder::new("Condition_Operator_Before_End", "End of the before block"),
            Placeholder::new(
                "Condition_Operator_After_Start",
                "Start of a block kept if the check is after the time",
            ),
            Placeholder::new("Condition_Operator_After_End", "End of the after block"),
            Placeholder::new("Condition_Hours", "Hour of the time"),
            Placeholder::new("Condition_Minutes", "Minutes of the time"),
            Placeholder::new("Condition_TotalMinutes", "Time as minutes since midnight"),
        ]
    }
}
