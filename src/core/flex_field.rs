/// Entity placeholders shared by every resolver that exposes an entity.
///
/// For a prefix `P` a template may use:
/// - `{{P_Id}}`, `{{P_Name}}`
/// - `{{P_Value_<field>}}` → value of the named field
/// - `{{P_HasField_<field>_Start}}...{{P_HasField_End}}` → kept only if the
///   entity has the field
///
/// Field names match case-insensitively.
use crate::core::errors::{ErrorCollector, ExportErrorKind};
use crate::core::substitution::{
    substitute_block_by_predicate, substitute_by_function, substitute_literal,
};
use crate::schema::entity::{FieldType, FlexFieldObject};
use crate::schema::settings::ExportSettings;
use crate::schema::template::Placeholder;

/// Fills all entity placeholders for `prefix`.
pub fn fill_flex_field_placeholders(
    template: &str,
    prefix: &str,
    object: &FlexFieldObject,
    settings: &ExportSettings,
    errors: &ErrorCollector,
) -> String {
    let has_field = |name: &str| object.find_field("", name).is_some();
    let code = substitute_block_by_predicate(template, &format!("{}_HasField", prefix), has_field);

    let code = substitute_by_function(&code, &format!("{}_Value", prefix), |name| {
        match object.find_field("", name) {
            Some(field) if field.field_type == FieldType::Number => field.value.clone(),
            Some(field) => settings.escape(&field.value),
            None => {
                errors.record(
                    ExportErrorKind::FieldNotFound,
                    format!("{} has no field named {}", object.name, name),
                );
                String::new()
            }
        }
    });

    let code = substitute_literal(&code, &format!("{}_Id", prefix), &object.id);
    substitute_literal(
        &code,
        &format!("{}_Name", prefix),
        &settings.escape(&object.name),
    )
}

/// Documentation for the placeholders `fill_flex_field_placeholders` fills.
pub fn flex_field_placeholders(prefix: &str, entity: &str) -> Vec<Placeholder> {
    vec![
        Placeholder::new(format!("{}_Id", prefix), format!("Id of the {}", entity)),
        Placeholder::new(
            format!("{}_Name", prefix),
            format!("Name of the {}", entity),
        ),
        Placeholder::new(
            format!("{}_Value_FIELDNAME", prefix),
            format!("Value of the field FIELDNAME of the {}", entity),
        ),
        Placeholder::new(
            format!("{}_HasField_FIELDNAME_Start", prefix),
            format!(
                "Start of a block kept only if the {} has the field FIELDNAME",
                entity
            ),
        ),
        Placeholder::new(
            format!("{}_HasField_End", prefix),
            format!("End of a {} field-existence block", entity),
        ),
    ]
}
