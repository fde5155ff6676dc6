/// State checks — quest state and NPC alive state. Both pick exactly one of
/// a fixed set of state blocks.
use serde_json::Value;

use super::{decode, ConditionResolver, RenderContext};
use crate::core::errors::{ExportErrorKind, RenderError};
use crate::core::flex_field::{fill_flex_field_placeholders, flex_field_placeholders};
use crate::core::substitution::substitute_block;
use crate::schema::condition::{AliveStateData, ConditionKind, QuestStateData};
use crate::schema::template::{Placeholder, TemplateKind};

const QUEST_STATES: [&str; 4] = [
    "Condition_State_NotStarted",
    "Condition_State_InProgress",
    "Condition_State_Success",
    "Condition_State_Failed",
];

const ALIVE_STATES: [&str; 2] = ["Condition_State_Alive", "Condition_State_Dead"];

/// Keeps the block of `states[selected]` and removes all others.
fn select_state_block(template: &str, states: &[&str], selected: usize) -> String {
    states
        .iter()
        .enumerate()
        .fold(template.to_string(), |code, (index, block)| {
            substitute_block(&code, block, index == selected)
        })
}

fn state_index(ctx: &RenderContext<'_>, state: i32, states: &[&str]) -> Option<usize> {
    let index = usize::try_from(state).ok().filter(|i| *i < states.len());
    if index.is_none() {
        ctx.errors.record(
            ExportErrorKind::UnknownState,
            format!("unknown state value {}", state),
        );
    }
    index
}

fn state_placeholders(states: &[&str]) -> Vec<Placeholder> {
    states
        .iter()
        .flat_map(|block| {
            let label = block.trim_start_matches("Condition_State_");
            [
                Placeholder::new(
                    format!("{}_Start", block),
                    format!("Start of a block kept if the state is {}", label),
                ),
                Placeholder::new(
                    format!("{}_End", block),
                    format!("End of the {} block", label),
                ),
            ]
        })
        .collect()
}

pub struct QuestStateResolver;

impl ConditionResolver for QuestStateResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let data: QuestStateData = decode(kind, data)?;
        let template = ctx.template(TemplateKind::for_condition(kind))?;

        let quest = ctx.data().quest(&data.quest_id)?;
        let Some(quest) = ctx.require_entity(quest, "quest", &data.quest_id) else {
            return Ok(String::new());
        };
        let Some(state) = state_index(ctx, data.state, &QUEST_STATES) else {
            return Ok(String::new());
        };

        let code = select_state_block(&template.code, &QUEST_STATES, state);
        Ok(fill_flex_field_placeholders(
            &code,
            "Condition_Quest",
            &quest,
            ctx.settings,
            ctx.errors,
        ))
    }

    fn placeholders(&self, _kind: ConditionKind) -> Vec<Placeholder> {
        let mut placeholders = state_placeholders(&QUEST_STATES);
        placeholders.extend(flex_field_placeholders("Condition_Quest", "quest"));
        placeholders
    }
}

pub struct AliveStateResolver;

impl ConditionResolver for AliveStateResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let data: AliveStateData = decode(kind, data)?;
        let template = ctx.template(TemplateKind::for_condition(kind))?;

        let npc = ctx.data().npc(&data.npc_id)?;
        let Some(npc) = ctx.require_entity(npc, "npc", &data.npc_id) else {
            return Ok(String::new());
        };
        let Some(state) = state_index(ctx, data.state, &ALIVE_STATES) else {
            return Ok(String::new());
        };

        let code = select_state_block(&template.code, &ALIVE_STATES, state);
        Ok(fill_flex_field_placeholders(
            &code,
            "Condition_Npc",
            &npc,
            ctx.settings,
            ctx.errors,
        ))
    }

    fn placeholders(&self, _kind: ConditionKind) -> Vec<Placeholder> {
        let mut placeholders = state_placeholders(&ALIVE_STATES);
        placeholders.extend(flex_field_placeholders("Condition_Npc", "npc"));
        placeholders
    }
}
