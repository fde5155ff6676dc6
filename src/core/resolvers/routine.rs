/// Daily routine event — whether an event of an NPC's daily routine is
/// enabled or disabled.
use serde_json::Value;

use super::{decode, ConditionResolver, RenderContext};
use crate::core::errors::{ExportErrorKind, RenderError};
use crate::core::flex_field::{fill_flex_field_placeholders, flex_field_placeholders};
use crate::core::substitution::{substitute_literal, substitute_literal_with};
use crate::schema::condition::{ConditionKind, DailyRoutineEventData};
use crate::schema::template::{Placeholder, TemplateKind};

pub struct DailyRoutineEventResolver;

impl ConditionResolver for DailyRoutineEventResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let data: DailyRoutineEventData = decode(kind, data)?;
        let template = ctx.template(TemplateKind::for_condition(kind))?;

        let npc = ctx.data().npc(&data.npc_id)?;
        let Some(npc) = ctx.require_entity(npc, "npc", &data.npc_id) else {
            return Ok(String::new());
        };
        let Some(event) = npc.find_routine_event(&data.event_id) else {
            ctx.errors.record(
                ExportErrorKind::DailyRoutineEventNotFound,
                format!("{} has no daily routine event {}", npc.name, data.event_id),
            );
            return Ok(String::new());
        };

        let mut code = substitute_literal(&template.code, "Condition_Event_Id", &event.event_id);
        code = substitute_literal_with(&code, "Condition_Event_ScriptName", || {
            ctx.settings.escape(&event.script_name)
        });
        code = substitute_literal(
            &code,
            "Condition_Event_EarliestTime_TotalMinutes",
            &event.earliest_time.total_minutes().to_string(),
        );
        code = substitute_literal(
            &code,
            "Condition_Event_LatestTime_TotalMinutes",
            &event.latest_time.total_minutes().to_string(),
        );
        Ok(fill_flex_field_placeholders(
            &code,
            "Condition_Npc",
            &npc,
            ctx.settings,
            ctx.errors,
        ))
    }

    fn placeholders(&self, _kind: ConditionKind) -> Vec<Placeholder> {
        let mut placeholders = vec![
            Placeholder::new("Condition_Event_Id", "Id of the daily routine event"),
            Placeholder::new("Condition_Event_ScriptName", "Script name of the event"),
            Placeholder::new(
                "Condition_Event_EarliestTime_TotalMinutes",
                "Earliest time of the event as minutes since midnight",
            ),
            Placeholder::new(
                "Condition_Event_LatestTime_TotalMinutes",
                "Latest time of the event as minutes since midnight",
            ),
        ];
        placeholders.extend(flex_field_placeholders("Condition_Npc", "npc"));
        placeholders
    }
}
