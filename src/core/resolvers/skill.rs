/// Learned skill — whether the player or the subject NPC has learned a
/// skill. The kind alone selects one of four templates.
use serde_json::Value;

use super::{decode, ConditionResolver, RenderContext};
use crate::core::errors::RenderError;
use crate::core::flex_field::{fill_flex_field_placeholders, flex_field_placeholders};
use crate::schema::condition::{ConditionKind, LearnedSkillData};
use crate::schema::template::{Placeholder, TemplateKind};

fn is_npc_kind(kind: ConditionKind) -> bool {
    matches!(
        kind,
        ConditionKind::NpcLearnedSkill | ConditionKind::NpcNotLearnedSkill
    )
}

pub struct LearnedSkillResolver;

impl ConditionResolver for LearnedSkillResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let data: LearnedSkillData = decode(kind, data)?;
        let template = ctx.template(TemplateKind::for_condition(kind))?;

        let npc = if is_npc_kind(kind) {
            match ctx.require_subject("npc") {
                Some(npc) => Some(npc),
                None => return Ok(String::new()),
            }
        } else {
            None
        };

        let skill = ctx.data().skill(&data.skill_id)?;
        let Some(skill) = ctx.require_entity(skill, "skill", &data.skill_id) else {
            return Ok(String::new());
        };

        let mut code = fill_flex_field_placeholders(
            &template.code,
            "Condition_Skill",
            &skill,
            ctx.settings,
            ctx.errors,
        );
        if let Some(npc) = npc {
            code = fill_flex_field_placeholders(
                &code,
                "Condition_Npc",
                &npc,
                ctx.settings,
                ctx.errors,
            );
        }
        Ok(code)
    }

    fn placeholders(&self, kind: ConditionKind) -> Vec<Placeholder> {
        let mut placeholders = flex_field_placeholders("Condition_Skill", "skill");
        if is_npc_kind(kind) {
            placeholders.extend(flex_field_placeholders("Condition_Npc", "npc"));
        }
        placeholders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ExportErrorKind;
    use crate::core::resolvers::test_support::render_one;
    use crate::schema::entity::FlexFieldObject;
    use serde_json::json;

    #[test]
    fn kind_selects_template() {
        let anna = FlexFieldObject::new("npc-anna", "Anna");
        let cases = [
            (ConditionKind::PlayerLearnedSkill, "player_has_skill(\"skill-fire\")"),
            (ConditionKind::PlayerNotLearnedSkill, "not player_has_skill(\"skill-fire\")"),
            (ConditionKind::NpcLearnedSkill, "npc_has_skill(\"npc-anna\", \"skill-fire\")"),
            (
                ConditionKind::NpcNotLearnedSkill,
                "not npc_has_skill(\"npc-anna\", \"skill-fire\")",
            ),
        ];
        for (kind, expected) in cases {
            let (out, errors) = render_one(kind, json!({"skill_id": "skill-fire"}), Some(&anna));
            assert_eq!(out, expected);
            assert!(errors.is_empty());
        }
    }

    #[test]
    fn npc_kind_needs_subject() {
        let (out, errors) = render_one(
            ConditionKind::NpcLearnedSkill,
            json!({"skill_id": "skill-fire"}),
            None,
        );
        assert_eq!(out, "");
        assert_eq!(errors.count(ExportErrorKind::ReferencedEntityNotFound), 1);
    }

    #[test]
    fn player_kind_ignores_subject() {
        let (out, errors) = render_one(
            ConditionKind::PlayerLearnedSkill,
            json!({"skill_id": "skill-fire"}),
            None,
        );
        assert_eq!(out, "player_has_skill(\"skill-fire\")");
        assert!(errors.is_empty());
    }

    #[test]
    fn missing_skill() {
        let (out, errors) = render_one(
            ConditionKind::PlayerLearnedSkill,
            json!({"skill_id": "skill-ice"}),
            None,
        );
        assert_eq!(out, "");
        assert_eq!(errors.count(ExportErrorKind::ReferencedEntityNotFound), 1);
    }
}
