use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The semantic kind of a condition record.
///
/// Discriminants are the persisted tags and are never reused. Tags 6 and 10
/// are reserved gaps and have no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    Group = 1,
    PlayerValue = 2,
    NpcValue = 3,
    PlayerInventory = 4,
    NpcInventory = 5,
    ChooseQuestValue = 7,
    QuestState = 8,
    NpcAliveState = 9,
    CurrentSkillValue = 11,
    GameTime = 12,
    PlayerSkillValue = 13,
    NpcSkillValue = 14,
    PlayerLearnedSkill = 15,
    PlayerNotLearnedSkill = 16,
    NpcLearnedSkill = 17,
    NpcNotLearnedSkill = 18,
    RandomValue = 19,
    DailyRoutineEventDisabled = 20,
    DailyRoutineEventEnabled = 21,
    Code = 22,
    ItemValue = 23,
}

impl ConditionKind {
    /// Every kind, in tag order.
    pub const ALL: [ConditionKind; 21] = [
        Self::Group,
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

    /// Looks up a kind by its persisted tag. Reserved and unknown tags
    /// return `None`.
    pub fn from_tag(tag: u32) -> Option<ConditionKind> {
        Self::ALL.iter().copied().find(|kind| kind.tag() == tag)
    }

    pub fn tag(self) -> u32 {
        self as u32
    }
}

/// A condition record as stored in a dialogue or quest graph.
///
/// The tag is kept raw so that records with an unknown kind still load;
/// the payload is only decoded by the resolver that handles the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCondition {
    pub kind: u32,
    #[serde(default)]
    pub data: Value,
}

impl ParsedCondition {
    pub fn new(kind: ConditionKind, data: Value) -> Self {
        Self {
            kind: kind.tag(),
            data,
        }
    }

    /// The decoded kind, or `None` for reserved and unknown tags.
    pub fn condition_kind(&self) -> Option<ConditionKind> {
        ConditionKind::from_tag(self.kind)
    }
}

/// Payload of a `Group` condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupData {
    pub operator: i32,
    #[serde(default)]
    pub conditions: Vec<ParsedCondition>,
}

/// Payload of every value-compare kind. Which id is set depends on the kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueCompareData {
    #[serde(default)]
    pub field_id: String,
    #[serde(default)]
    pub field_name: String,
    pub operator: String,
    #[serde(default)]
    pub compare_value: String,
    #[serde(default)]
    pub quest_id: Option<String>,
    #[serde(default)]
    pub skill_id: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
}

/// Payload of `PlayerInventory` / `NpcInventory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryData {
    pub item_id: String,
    pub operator: i32,
    pub quantity: i64,
}

/// Payload of `QuestState`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestStateData {
    pub quest_id: String,
    pub state: i32,
}

/// Payload of `NpcAliveState`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliveStateData {
    pub npc_id: String,
    pub state: i32,
}

/// Payload of the four learned-skill kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedSkillData {
    pub skill_id: String,
}

/// Payload of `GameTime`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTimeData {
    pub operator: i32,
    pub hour: u8,
    pub minutes: u8,
}

/// Payload of `RandomValue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomValueData {
    pub operator: String,
    pub min_value: f64,
    pub max_value: f64,
    pub compare_value: f64,
}

/// Payload of the two daily-routine-event kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRoutineEventData {
    pub npc_id: String,
    pub event_id: String,
}

/// Payload of `Code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeData {
    #[serde(default)]
    pub script_name: String,
    #[serde(default)]
    pub script_code: String,
}
