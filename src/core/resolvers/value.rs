/// Value compare — compares a flex field of the player, an NPC, a quest, a
/// skill or an item against an authored value.
use serde_json::Value;

use super::{decode, ConditionResolver, RenderContext};
use crate::core::errors::{ExportErrorKind, RenderError};
use crate::core::flex_field::{fill_flex_field_placeholders, flex_field_placeholders};
use crate::core::operator::CompareOperator;
use crate::core::substitution::{
    substitute_block, substitute_block_by_predicate, substitute_literal,
};
use crate::schema::condition::{ConditionKind, ValueCompareData};
use crate::schema::entity::{FieldType, FlexFieldObject};
use crate::schema::template::{Placeholder, TemplateKind};

pub const VALUE_COMPARE_KINDS: [ConditionKind; 7] = [
    ConditionKind::PlayerValue,
    ConditionKind::NpcValue,
    ConditionKind::ChooseQuestValue,
    ConditionKind::CurrentSkillValue,
    ConditionKind::PlayerSkillValue,
    ConditionKind::NpcSkillValue,
    ConditionKind::ItemValue,
];

/// Which entity a value-compare kind reads its field from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Player,
    Subject(&'static str),
    Quest,
    Skill,
    Item,
}

impl Target {
    fn of(kind: ConditionKind) -> Target {
        match kind {
            ConditionKind::PlayerValue => Self::Player,
            ConditionKind::NpcValue => Self::Subject("npc"),
            ConditionKind::ChooseQuestValue => Self::Quest,
            ConditionKind::CurrentSkillValue => Self::Subject("skill"),
            ConditionKind::PlayerSkillValue | ConditionKind::NpcSkillValue => Self::Skill,
            _ => Self::Item,
        }
    }

    /// Placeholder prefix for the entity's flex fields.
    fn prefix(self) -> &'static str {
        match self {
            Self::Player => "Condition_Player",
            Self::Subject("skill") | Self::Skill => "Condition_Skill",
            Self::Subject(_) => "Condition_Npc",
            Self::Quest => "Condition_Quest",
            Self::Item => "Condition_Item",
        }
    }

    fn entity_name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Subject(name) => name,
            Self::Quest => "quest",
            Self::Skill => "skill",
            Self::Item => "item",
        }
    }
}

pub struct ValueCompareResolver;

impl ValueCompareResolver {
    fn load_entity(
        &self,
        target: Target,
        data: &ValueCompareData,
        ctx: &RenderContext<'_>,
    ) -> Result<Option<FlexFieldObject>, RenderError> {
        let (found, id) = match target {
            Target::Player => (ctx.data().player_npc(ctx.project)?, "(player)".to_string()),
            Target::Subject(entity) => return Ok(ctx.require_subject(entity)),
            Target::Quest => {
                let id = data.quest_id.clone().unwrap_or_default();
                (ctx.data().quest(&id)?, id)
            }
            Target::Skill => {
                let id = data.skill_id.clone().unwrap_or_default();
                (ctx.data().skill(&id)?, id)
            }
            Target::Item => {
                let id = data.item_id.clone().unwrap_or_default();
                (ctx.data().item(&id)?, id)
            }
        };
        Ok(ctx.require_entity(found, target.entity_name(), &id))
    }
}

impl ConditionResolver for ValueCompareResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let data: ValueCompareData = decode(kind, data)?;
        let template = ctx.template(TemplateKind::for_condition(kind))?;
        let target = Target::of(kind);

        let Some(entity) = self.load_entity(target, &data, ctx)? else {
            return Ok(String::new());
        };
        let Some(field) = entity.find_field(&data.field_id, &data.field_name) else {
            ctx.errors.record(
                ExportErrorKind::FieldNotFound,
                format!(
                    "field {} not found on {} {}",
                    data.field_name,
                    target.entity_name(),
                    entity.name
                ),
            );
            return Ok(String::new());
        };

        let operator = CompareOperator::parse(&data.operator);
        if operator.is_none() {
            ctx.errors.record(
                ExportErrorKind::UnknownOperator,
                format!("unknown compare operator {:?}", data.operator),
            );
        }
        // Unknown operators render through the primitive branch with an empty fragment.
        let is_primitive = operator.map_or(true, CompareOperator::is_primitive);
        let is_number = field.field_type == FieldType::Number;
        let field_name = field.name.to_lowercase();

        let mut code = substitute_block(
            &template.code,
            "Condition_IsOperatorPrimitive",
            is_primitive,
        );
        code = substitute_block(&code, "Condition_IsOperatorNonPrimitive", !is_primitive);
        for string_operator in CompareOperator::NON_PRIMITIVE {
            if let Some(block) = string_operator.block_name() {
                code = substitute_block(&code, block, operator == Some(string_operator));
            }
        }
        code = substitute_block(&code, "Condition_IsNumberField", is_number);
        code = substitute_block(&code, "Condition_IsTextField", !is_number);
        code = substitute_block_by_predicate(&code, "Condition_Field_Name_Equals", |name| {
            name.to_lowercase() == field_name
        });

        let fragment = match operator {
            Some(operator) => ctx.operator_fragment(operator)?,
            None => String::new(),
        };
        let compare_value = if is_number {
            data.compare_value.clone()
        } else {
            ctx.settings.escape(&data.compare_value)
        };
        code = substitute_literal(&code, "Condition_Operator", &fragment);
        code = substitute_literal(&code, "Condition_CompareValue", &compare_value);
        code = substitute_literal(
            &code,
            "Condition_Field_Name",
            &ctx.settings.escape(&field.name),
        );
        code = substitute_literal(
            &code,
            "Condition_Field_Value",
            &ctx.settings.escape(&field.value),
        );

        Ok(fill_flex_field_placeholders(
            &code,
            target.prefix(),
            &entity,
            ctx.settings,
            ctx.errors,
        ))
    }

    fn placeholders(&self, kind: ConditionKind) -> Vec<Placeholder> {
        let target = Target::of(kind);
        let mut placeholders = vec![
            Placeholder::new(
                "Condition_IsOperatorPrimitive_Start",
                "Start of a block kept if the operator is a primitive operator (=, !=, <, <=, >, >=)",
            ),
            Placeholder::new(
                "Condition_IsOperatorPrimitive_End",
                "End of the primitive operator block",
            ),
            Placeholder::new(
                "Condition_IsOperatorNonPrimitive_Start",
                "Start of a block kept if the operator is contains, startswith or endswith",
            ),
            Placeholder::new(
                "Condition_IsOperatorNonPrimitive_End",
                "End of the non-primitive operator block",
            ),
            Placeholder::new(
                "Condition_Operator_Contains_Start",
                "Start of a block kept for the contains operator",
            ),
            Placeholder::new(
                "Condition_Operator_Contains_End",
                "End of the contains block",
            ),
            Placeholder::new(
                "Condition_Operator_StartsWith_Start",
                "Start of a block kept for the startswith operator",
            ),
            Placeholder::new(
                "Condition_Operator_StartsWith_End",
                "End of the startswith block",
            ),
            Placeholder::new(
                "Condition_Operator_EndsWith_Start",
                "Start of a block kept for the endswith operator",
            ),
            Placeholder::new(
                "Condition_Operator_EndsWith_End",
                "End of the endswith block",
            ),
            Placeholder::new(
                "Condition_IsNumberField_Start",
                "Start of a block kept if the field is a number field",
            ),
            Placeholder::new(
                "Condition_IsNumberField_End",
                "End of the number field block",
            ),
            Placeholder::new(
                "Condition_IsTextField_Start",
                "Start of a block kept if the field is not a number field",
            ),
            Placeholder::new("Condition_IsTextField_End", "End of the text field block"),
            Placeholder::new(
                "Condition_Field_Name_Equals_FIELDNAME_Start",
                "Start of a block kept if the compared field is named FIELDNAME (case-insensitive)",
            ),
            Placeholder::new(
                "Condition_Field_Name_Equals_End",
                "End of a field name block",
            ),
            Placeholder::new(
                "Condition_Operator",
                "Compare operator, empty for non-primitive operators",
            ),
            Placeholder::new(
                "Condition_CompareValue",
                "Value to compare against, escaped for text fields",
            ),
            Placeholder::new("Condition_Field_Name", "Name of the compared field"),
            Placeholder::new(
                "Condition_Field_Value",
                "Current value of the compared field",
            ),
        ];
        placeholders.extend(flex_field_placeholders(
            target.prefix(),
            target.entity_name(),
        ));
        placeholders
    }
}
