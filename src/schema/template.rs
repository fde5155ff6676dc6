use serde::{Deserialize, Serialize};

use super::condition::ConditionKind;

/// Which template dialect renders a template's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RenderingEngineKind {
    /// `{{Placeholder}}` substitution with conditional blocks.
    #[default]
    Legacy,
    /// Expression-based templating, rendered by an external collaborator.
    Structured,
}

/// Identifies one customizable export template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemplateKind {
    ConditionGroup,
    LogicAnd,
    LogicOr,
    CompareEqual,
    CompareNotEqual,
    CompareLess,
    CompareLessOrEqual,
    CompareGreater,
    CompareGreaterOrEqual,
    PlayerValue,
    NpcValue,
    PlayerInventory,
    NpcInventory,
    ChooseQuestValue,
    QuestState,
    NpcAliveState,
    CurrentSkillValue,
    GameTime,
    PlayerSkillValue,
    NpcSkillValue,
    PlayerLearnedSkill,
    PlayerNotLearnedSkill,
    NpcLearnedSkill,
    NpcNotLearnedSkill,
    RandomValue,
    DailyRoutineEventDisabled,
    DailyRoutineEventEnabled,
    Code,
    ItemValue,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 29] = [
        Self::ConditionGroup,
        Self::LogicAnd,
        Self::LogicOr,
        Self::CompareEqual,
        Self::CompareNotEqual,
        Self::CompareLess,
        Self::CompareLessOrEqual,
        Self::CompareGreater,
        Self::CompareGreaterOrEqual,
        Self::PlayerValue,
        Self::NpcValue,
        Self::PlayerInventory,
        Self::NpcInventory,
        Self::ChooseQuestValue,
        Self::QuestState,
        Self::NpcAliveState,
        Self::CurrentSkillValue,
        Self::GameTime,
        Self::PlayerSkillValue,
        Self::NpcSkillValue,
        Self::PlayerLearnedSkill,
        Self::PlayerNotLearnedSkill,
        Self::NpcLearnedSkill,
        Self::NpcNotLearnedSkill,
        Self::RandomValue,
        Self::DailyRoutineEventDisabled,
        Self::DailyRoutineEventEnabled,
        Self::Code,
        Self::ItemValue,
    ];

    /// The template a condition kind renders with.
    pub fn for_condition(kind: ConditionKind) -> TemplateKind {
        match kind {
            ConditionKind::Group => Self::ConditionGroup,
            ConditionKind::PlayerValue => Self::PlayerValue,
            ConditionKind::NpcValue => Self::NpcValue,
            ConditionKind::PlayerInventory => Self::PlayerInventory,
            ConditionKind::NpcInventory => Self::NpcInventory,
            ConditionKind::ChooseQuestValue => Self::ChooseQuestValue,
            ConditionKind::QuestState => Self::QuestState,
            ConditionKind::NpcAliveState => Self::NpcAliveState,
            ConditionKind::CurrentSkillValue => Self::CurrentSkillValue,
            ConditionKind::GameTime => Self::GameTime,
            ConditionKind::PlayerSkillValue => Self::PlayerSkillValue,
            ConditionKind::NpcSkillValue => Self::NpcSkillValue,
            ConditionKind::PlayerLearnedSkill => Self::PlayerLearnedSkill,
            ConditionKind::PlayerNotLearnedSkill => Self::PlayerNotLearnedSkill,
            ConditionKind::NpcLearnedSkill => Self::NpcLearnedSkill,
            ConditionKind::NpcNotLearnedSkill => Self::NpcNotLearnedSkill,
            ConditionKind::RandomValue => Self::RandomValue,
            ConditionKind::DailyRoutineEventDisabled => Self::DailyRoutineEventDisabled,
            ConditionKind::DailyRoutineEventEnabled => Self::DailyRoutineEventEnabled,
            ConditionKind::Code => Self::Code,
            ConditionKind::ItemValue => Self::ItemValue,
        }
    }

    /// The condition kind whose resolver owns this template, if any.
    /// Logic and compare-operator templates are fragments with no owner.
    pub fn condition_kind(self) -> Option<ConditionKind> {
        ConditionKind::ALL
            .iter()
            .copied()
            .find(|kind| Self::for_condition(*kind) == self)
    }
}

/// A project's template for one `TemplateKind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTemplate {
    pub kind: TemplateKind,
    #[serde(default)]
    pub engine: RenderingEngineKind,
    pub code: String,
}

/// Documentation for one placeholder a template may use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub name: String,
    pub description: String,
}

impl Placeholder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_condition_kind_has_a_template() {
        for kind in ConditionKind::ALL {
            let template_kind = TemplateKind::for_condition(kind);
            assert_eq!(template_kind.condition_kind(), Some(kind));
        }
    }

    #[test]
    fn fragment_templates_have_no_owner() {
        assert_eq!(TemplateKind::LogicAnd.condition_kind(), None);
        assert_eq!(TemplateKind::CompareGreaterOrEqual.condition_kind(), None);
    }

    #[test]
    fn engine_defaults_to_legacy() {
        let template: ExportTemplate = ron::from_str("(kind: Code, code: \"x\")").unwrap();
        assert_eq!(template.engine, RenderingEngineKind::Legacy);
    }
}
