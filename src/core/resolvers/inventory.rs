/// Inventory compare — checks how many of an item the player or the
/// subject NPC carries.
use serde_json::Value;

use super::{decode, ConditionResolver, RenderContext};
use crate::core::errors::{ExportErrorKind, RenderError};
use crate::core::flex_field::{fill_flex_field_placeholders, flex_field_placeholders};
use crate::core::operator::CompareOperator;
use crate::core::substitution::{substitute_block, substitute_literal};
use crate::schema::condition::{ConditionKind, InventoryData};
use crate::schema::template::{Placeholder, TemplateKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InventoryOperator {
    AtLeast,
    AtMost,
}

impl InventoryOperator {
    fn from_code(code: i32) -> Option<InventoryOperator> {
        match code {
            0 => Some(Self::AtLeast),
            1 => Some(Self::AtMost),
            _ => None,
        }
    }

    fn compare_operator(self) -> CompareOperator {
        match self {
            Self::AtLeast => CompareOperator::GreaterOrEqual,
            Self::AtMost => CompareOperator::LessOrEqual,
        }
    }
}

pub struct InventoryResolver;

impl ConditionResolver for InventoryResolver {
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError> {
        let data: InventoryData = decode(kind, data)?;
        let template = ctx.template(TemplateKind::for_condition(kind))?;

        let Some(operator) = InventoryOperator::from_code(data.operator) else {
            ctx.errors.record(
                ExportErrorKind::UnknownOperator,
                format!("unknown inventory operator {}", data.operator),
            );
            return Ok(String::new());
        };

        let npc = if kind == ConditionKind::NpcInventory {
            match ctx.require_subject("npc") {
                Some(npc) => Some(npc),
                None => return Ok(String::new()),
            }
        } else {
            None
        };

        let item = ctx.data().item(&data.item_id)?;
        let Some(item) = ctx.require_entity(item, "item", &data.item_id) else {
            return Ok(String::new());
        };

        let mut code = substitute_block(
            &template.code,
            "Condition_Operator_AtLeast",
            operator == InventoryOperator::AtLeast,
        );
        code = substitute_block(
            &code,
            "Condition_Operator_AtMost",
            operator == InventoryOperator::AtMost,
        );
        let fragment = ctx.operator_fragment(operator.compare_operator())?;
        code = substitute_literal(&code, "Condition_Operator", &fragment);
        code = substitute_literal(&code, "Condition_Quantity", &data.quantity.to_string());

        code = fill_flex_field_placeholders(
            &code,
            "Condition_Item",
            &item,
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
        let mut placeholders = vec![
            Placeholder::new(
                "Condition_Operator_AtLeast_Start",
                "Start of a block kept for the at least operator",
            ),
            Placeholder::new(
                "Condition_Operator_AtLeast_End",
                "End of the at least block",
            ),
            Placeholder::new(
                "Condition_Operator_AtMost_Start",
                "Start of a block kept for the at most operator",
            ),
            Placeholder::new("Condition_Operator_AtMost_End", "End of the at most block"),
            Placeholder::new(
                "Condition_Operator",
                "Compare operator (>= for at least, <= for at most)",
            ),
            Placeholder::new("Condition_Quantity", "Item quantity to compare against"),
        ];
        placeholders.extend(flex_field_placeholders("Condition_Item", "item"));
        if kind == ConditionKind::NpcInventory {
            placeholders.extend(flex_field_placeholders("Condition_Npc", "npc"));
        }
        placeholders
    }
}
