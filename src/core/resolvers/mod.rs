/// Condition resolvers — one per condition kind family.
///
/// Every resolver follows the same steps: decode the payload, fetch its
/// template, resolve referenced entities, then fill the template with
/// blocks first, literals second and entity placeholders last.
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::core::data::DataAccess;
use crate::core::dispatch::ConditionRenderer;
use crate::core::errors::{ErrorCollector, ExportErrorKind, RenderError};
use crate::core::operator::CompareOperator;
use crate::schema::condition::{ConditionKind, ParsedCondition};
use crate::schema::entity::{FlexFieldObject, ProjectId};
use crate::schema::settings::ExportSettings;
use crate::schema::template::{ExportTemplate, Placeholder, RenderingEngineKind, TemplateKind};

pub mod code;
pub mod group;
pub mod inventory;
pub mod random;
pub mod routine;
pub mod skill;
pub mod state;
pub mod time;
pub mod value;

/// Renders the conditions of one or more kinds for one engine.
pub trait ConditionResolver: Send + Sync {
    /// Renders one condition. Data problems are recorded in
    /// `ctx.errors` and yield `Ok(String::new())`; `Err` aborts the whole
    /// render.
    fn render(
        &self,
        kind: ConditionKind,
        data: &Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, RenderError>;

    /// Placeholders the template of `kind` may use.
    fn placeholders(&self, kind: ConditionKind) -> Vec<Placeholder>;
}

/// Everything a resolver needs for one top-level render call. Shared by
/// every nested render of that call.
pub struct RenderContext<'a> {
    pub renderer: &'a ConditionRenderer,
    pub project: &'a ProjectId,
    pub settings: &'a ExportSettings,
    /// The entity the exported object belongs to, e.g. the NPC owning a
    /// dialogue.
    pub subject: Option<&'a FlexFieldObject>,
    pub errors: &'a ErrorCollector,
    pub engine: RenderingEngineKind,
}

impl<'a> RenderContext<'a> {
    pub fn template(&self, kind: TemplateKind) -> Result<Arc<ExportTemplate>, RenderError> {
        Ok(self.renderer.templates().template(self.project, kind)?)
    }

    pub fn data(&self) -> &dyn DataAccess {
        self.renderer.data()
    }

    /// Renders a nested condition through the dispatch layer.
    pub fn render_child(&self, condition: &ParsedCondition) -> Result<String, RenderError> {
        self.renderer.dispatch(condition, self)
    }

    /// Code of a fragment template, e.g. the `>=` operator or the `and`
    /// joiner.
    pub fn fragment(&self, kind: TemplateKind) -> Result<String, RenderError> {
        Ok(self.template(kind)?.code.clone())
    }

    /// Fragment of a primitive compare operator; empty for string
    /// operators.
    pub fn operator_fragment(&self, operator: CompareOperator) -> Result<String, RenderError> {
        match operator.template_kind() {
            Some(kind) => self.fragment(kind),
            None => Ok(String::new()),
        }
    }

    /// Turns a lookup result into the entity, recording a missing one.
    pub fn require_entity(
        &self,
        found: Option<FlexFieldObject>,
        entity: &str,
        id: &str,
    ) -> Option<FlexFieldObject> {
        if found.is_none() {
            self.errors.record(
                ExportErrorKind::ReferencedEntityNotFound,
                format!("{} {} not found", entity, id),
            );
        }
        found
    }

    /// The subject entity, recording its absence.
    pub fn require_subject(&self, entity: &str) -> Option<FlexFieldObject> {
        self.require_entity(self.subject.cloned(), entity, "(export subject)")
    }
}

/// Decodes a payload into the shape a resolver expects. A mismatch is a
/// configuration error, not a data error.
pub fn decode<T: DeserializeOwned>(kind: ConditionKind, data: &Value) -> Result<T, RenderError> {
    T::deserialize(data).map_err(|source| {
        debug!("failed to decode {:?} payload: {}", kind, data);
        RenderError::PayloadDecode { kind, source }
    })
}

/// Registers `resolver` for every kind in `kinds`.
pub(crate) fn shared(
    resolver: Arc<dyn ConditionResolver>,
    kinds: &[ConditionKind],
) -> Vec<(ConditionKind, Arc<dyn ConditionResolver>)> {
    kinds
        .iter()
        .map(|kind| (*kind, Arc::clone(&resolver)))
        .collect()
}

/// The full set of resolvers for the Legacy engine.
pub fn legacy_resolvers() -> Vec<(ConditionKind, Arc<dyn ConditionResolver>)> {
    let mut resolvers = Vec::new();
    resolvers.extend(shared(
        Arc::new(group::GroupResolver),
        &[ConditionKind::Group],
    ));
    resolvers.extend(shared(
        Arc::new(value::ValueCompareResolver),
        &value::VALUE_COMPARE_KINDS,
    ));
    resolvers.extend(shared(
        Arc::new(inventory::InventoryResolver),
        &[ConditionKind::PlayerInventory, ConditionKind::NpcInventory],
    ));
    resolvers.extend(shared(
        Arc::new(state::QuestStateResolver),
        &[ConditionKind::QuestState],
    ));
    resolvers.extend(shared(
        Arc::new(state::AliveStateResolver),
        &[ConditionKind::NpcAliveState],
    ));
    resolvers.extend(shared(
        Arc::new(skill::LearnedSkillResolver),
        &[
            ConditionKind::PlayerLearnedSkill,
            ConditionKind::PlayerNotLearnedSkill,
            ConditionKind::NpcLearnedSkill,
            ConditionKind::NpcNotLearnedSkill,
        ],
    ));
    resolvers.extend(shared(
        Arc::new(time::GameTimeResolver),
        &[ConditionKind::GameTime],
    ));
    resolvers.extend(shared(
        Arc::new(random::RandomValueResolver),
        &[ConditionKind::RandomValue],
    ));
    resolvers.extend(shared(
        Arc::new(routine::DailyRoutineEventResolver),
        &[
            ConditionKind::DailyRoutineEventDisabled,
            ConditionKind::DailyRoutineEventEnabled,
        ],
    ));
    resolvers.extend(shared(Arc::new(code::CodeResolver), &[ConditionKind::Code]));
    resolvers
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::data::InMemoryData;
    use crate::core::templates::{CachedTemplateProvider, InMemoryTemplateStore, TemplateCatalog};
    use crate::schema::entity::{DailyRoutineEvent, FieldType, GameTime};

    pub fn world() -> InMemoryData {
        InMemoryData::new()
            .with_player(
                FlexFieldObject::new("player", "Hero")
                    .with_field("Gold", FieldType::Number, "10")
                    .with_field("Title", FieldType::Text, "Knight"),
            )
            .with_npc(
                FlexFieldObject::new("npc-anna", "Anna")
                    .with_field("Mood", FieldType::Text, "happy")
                    .with_routine_event(DailyRoutineEvent {
                        event_id: "ev-sleep".to_string(),
                        earliest_time: GameTime {
                            hours: 22,
                            minutes: 0,
                        },
                        latest_time: GameTime {
                            hours: 23,
                            minutes: 30,
                        },
                        script_name: "GoToBed".to_string(),
                        enabled_by_default: true,
                    }),
            )
            .with_item(
                FlexFieldObject::new("item-sword", "Sword")
                    .with_field("Damage", FieldType::Number, "7"),
            )
            .with_quest(FlexFieldObject::new("quest-ring", "Find the Ring"))
            .with_skill(
                FlexFieldObject::new("skill-fire", "Fireball")
                    .with_field("Level", FieldType::Number, "2"),
            )
    }

    pub fn renderer() -> ConditionRenderer {
        renderer_with(TemplateCatalog::builtin().unwrap())
    }

    pub fn renderer_with(catalog: TemplateCatalog) -> ConditionRenderer {
        ConditionRenderer::builder()
            .with_templates(Arc::new(CachedTemplateProvider::new(
                InMemoryTemplateStore::new(),
                catalog,
            )))
            .with_data(Arc::new(world()))
            .build()
            .unwrap()
    }

    /// Renders one condition against the builtin catalog with a fresh
    /// collector.
    pub fn render_one(
        kind: ConditionKind,
        data: Value,
        subject: Option<&FlexFieldObject>,
    ) -> (String, ErrorCollector) {
        let renderer = renderer();
        let errors = ErrorCollector::new();
        let project = ProjectId::new("p1");
        let settings = ExportSettings::default();
        let condition = ParsedCondition::new(kind, data);
        let out = renderer
            .render_condition(&project, &condition, &settings, subject, &errors)
            .unwrap();
        (out, errors)
    }
}
