/// Data access — lookups of the entities conditions refer to.
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::schema::entity::{FlexFieldObject, ProjectId};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Entity lookups used by the resolvers. `Ok(None)` means the entity does
/// not exist, which resolvers report as a recoverable error; `Err` means the
/// source itself failed and aborts the render.
pub trait DataAccess: Send + Sync {
    /// The NPC representing the player in this project.
    fn player_npc(&self, project: &ProjectId) -> Result<Option<FlexFieldObject>, DataError>;
    fn npc(&self, id: &str) -> Result<Option<FlexFieldObject>, DataError>;
    fn item(&self, id: &str) -> Result<Option<FlexFieldObject>, DataError>;
    fn quest(&self, id: &str) -> Result<Option<FlexFieldObject>, DataError>;
    fn skill(&self, id: &str) -> Result<Option<FlexFieldObject>, DataError>;
}

/// An in-memory world for tools and tests. Holds a single project.
#[derive(Debug, Clone, Default)]
pub struct InMemoryData {
    player: Option<FlexFieldObject>,
    npcs: FxHashMap<String, FlexFieldObject>,
    items: FxHashMap<String, FlexFieldObject>,
    quests: FxHashMap<String, FlexFieldObject>,
    skills: FxHashMap<String, FlexFieldObject>,
}

#[derive(Debug, Deserialize)]
struct RonWorld {
    #[serde(default)]
    player: Option<FlexFieldObject>,
    #[serde(default)]
    npcs: Vec<FlexFieldObject>,
    #[serde(default)]
    items: Vec<FlexFieldObject>,
    #[serde(default)]
    quests: Vec<FlexFieldObject>,
    #[serde(default)]
    skills: Vec<FlexFieldObject>,
}

fn index(objects: Vec<FlexFieldObject>) -> FxHashMap<String, FlexFieldObject> {
    objects.into_iter().map(|o| (o.id.clone(), o)).collect()
}

impl InMemoryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_ron(path: &Path) -> Result<InMemoryData, DataError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<InMemoryData, DataError> {
        let world: RonWorld = ron::from_str(input)?;
        Ok(InMemoryData {
            player: world.player,
            npcs: index(world.npcs),
            items: index(world.items),
            quests: index(world.quests),
            skills: index(world.skills),
        })
    }

    pub fn with_player(mut self, player: FlexFieldObject) -> Self {
        self.player = Some(player);
        self
    }

    pub fn with_npc(mut self, npc: FlexFieldObject) -> Self {
        self.npcs.insert(npc.id.clone(), npc);
        self
    }

    pub fn with_item(mut self, item: FlexFieldObject) -> Self {
        self.items.insert(item.id.clone(), item);
        self
    }

    pub fn with_quest(mut self, quest: FlexFieldObject) -> Self {
        self.quests.insert(quest.id.clone(), quest);
        self
    }

    pub fn with_skill(mut self, skill: FlexFieldObject) -> Self {
        self.skills.insert(skill.id.clone(), skill);
        self
    }
}

impl DataAccess for InMemoryData {
    fn player_npc(&self, _project: &ProjectId) -> Result<Option<FlexFieldObject>, DataError> {
        Ok(self.player.clone())
    }

    fn npc(&self, id: &str) -> Result<Option<FlexFieldObject>, DataError> {
        Ok(self.npcs.get(id).cloned())
    }

    fn item(&self, id: &str) -> Result<Option<FlexFieldObject>, DataError> {
        Ok(self.items.get(id).cloned())
    }

    fn quest(&self, id: &str) -> Result<Option<FlexFieldObject>, DataError> {
        Ok(self.quests.get(id).cloned())
    }

    fn skill(&self, id: &str) -> Result<Option<FlexFieldObject>, DataError> {
        Ok(self.skills.get(id).cloned())
    }
}
