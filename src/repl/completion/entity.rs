//! `@` entity completer backed by an externally supplied list

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::candidate::{Completion, CompletionGroup, prefix_score};
use super::completer::Completer;
use crate::error::Result;
use crate::repl::input_state::InputState;

/// Something that can be mentioned with `@`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            icon: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Completes `@name` mentions
///
/// The entity list is owned by whoever knows about entities (an agent
/// client, a workspace index) and pushed in with [`set_entities`](Self::set_entities).
/// Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct EntityCompleter {
    entities: Arc<RwLock<Vec<Entity>>>,
}

impl EntityCompleter {
    pub const NAME: &'static str = "entity";

    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the known entities
    pub fn set_entities(&self, entities: Vec<Entity>) {
        let mut guard = match self.entities.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = entities;
    }

    pub fn entities(&self) -> Vec<Entity> {
        match self.entities.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Completer for EntityCompleter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_relevant(&self, state: &InputState) -> bool {
        state.is_entity_trigger
    }

    async fn get_completions(&self, state: &InputState) -> Result<Vec<Completion>> {
        let prefix = state.trigger.prefix.as_str();

        let completions = self
            .entities()
            .into_iter()
            .filter_map(|entity| {
                let score = prefix_score(&entity.name, prefix);
                if score <= 0.0 {
                    return None;
                }
                let mut completion =
                    Completion::new(&entity.name, CompletionGroup::Entity, score, Self::NAME)
                        .with_display(format!("@{}", entity.name));
                completion.description = entity.description;
                completion.icon = entity.icon;
                Some(completion)
            })
            .collect();

        Ok(completions)
    }
}
