use serde::{Deserialize, Serialize};

/// Newtype wrapper for project IDs. Templates are customized per project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Declared type of a flex field. Only numbers skip string escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Choice,
}

/// A dynamically-typed named attribute on an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexField {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub value: String,
}

/// Time of day inside the game world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameTime {
    pub hours: u8,
    pub minutes: u8,
}

impl GameTime {
    pub fn total_minutes(&self) -> u32 {
        u32::from(self.hours) * 60 + u32::from(self.minutes)
    }
}

/// One entry of an NPC's daily routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRoutineEvent {
    pub event_id: String,
    #[serde(default)]
    pub earliest_time: GameTime,
    #[serde(default)]
    pub latest_time: GameTime,
    #[serde(default)]
    pub script_name: String,
    #[serde(default = "default_true")]
    pub enabled_by_default: bool,
}

fn default_true() -> bool {
    true
}

/// An NPC, item, skill or quest as seen by the export: a name plus flex
/// fields. Only NPCs carry a daily routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexFieldObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FlexField>,
    #[serde(default)]
    pub daily_routine: Vec<DailyRoutineEvent>,
}

impl FlexFieldObject {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
            daily_routine: Vec::new(),
        }
    }

    /// Adds a field. Builder-style, used heavily by tests.
    pub fn with_field(mut self, name: &str, field_type: FieldType, value: &str) -> Self {
        self.fields.push(FlexField {
            id: format!("{}-{}", self.id, name.to_lowercase()),
            name: name.to_string(),
            field_type,
            value: value.to_string(),
        });
        self
    }

    pub fn with_routine_event(mut self, event: DailyRoutineEvent) -> Self {
        self.daily_routine.push(event);
        self
    }

    /// Finds a field by id first, then by case-insensitive name, so
    /// conditions keep working after a field was recreated under the same
    /// name.
    pub fn find_field(&self, field_id: &str, field_name: &str) -> Option<&FlexField> {
        if !field_id.is_empty() {
            if let Some(field) = self.fields.iter().find(|f| f.id == field_id) {
                return Some(field);
            }
        }
        let wanted = field_name.to_lowercase();
        self.fields
            .iter()
            .find(|f| !wanted.is_empty() && f.name.to_lowercase() == wanted)
    }

    pub fn find_routine_event(&self, event_id: &str) -> Option<&DailyRoutineEvent> {
        self.daily_routine.iter().find(|e| e.event_id == event_id)
    }
}
