//! In-memory task registry.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::core::model::{TaskDefinition, TaskId};
use crate::core::services::TaskRegistry;
use crate::core::AppResult;

/// Task definitions plus batch membership, kept in insertion order.
#[derive(Default)]
pub struct InMemoryTaskRegistry {
    definitions: RwLock<Vec<TaskDefinition>>,
    batches: RwLock<HashMap<String, Vec<TaskId>>>,
}

impl InMemoryTaskRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition.
    pub fn insert(&self, definition: TaskDefinition) {
        let mut definitions = self.definitions.write();
        if let Some(existing) = definitions.iter_mut().find(|d| d.id == definition.id) {
            *existing = definition;
        } else {
            definitions.push(definition);
        }
    }

    /// Make a task part of a batch.
    pub fn assign_to_batch(&self, batch_id: &str, task_id: TaskId) {
        let mut batches = self.batches.write();
        let members = batches.entry(batch_id.to_owned()).or_default();
        if !members.contains(&task_id) {
            members.push(task_id);
        }
    }

    /// Remove a definition and its batch memberships.
    pub fn remove(&self, task_id: &TaskId) -> Option<TaskDefinition> {
        for members in self.batches.write().values_mut() {
            members.retain(|id| id != task_id);
        }
        let mut definitions = self.definitions.write();
        let position = definitions.iter().position(|d| &d.id == task_id)?;
        Some(definitions.remove(position))
    }
}

impl TaskRegistry for InMemoryTaskRegistry {
    fn list_for_domain(&self, domain_id: &str) -> AppResult<Vec<TaskDefinition>> {
        Ok(self
            .definitions
            .read()
            .iter()
            .filter(|d| d.id.domain_id == domain_id)
            .cloned()
            .collect())
    }

    fn find_all(&self, domain_id: &str, batch_id: &str) -> AppResult<Vec<TaskDefinition>> {
        let batches = self.batches.read();
        let Some(members) = batches.get(batch_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .definitions
            .read()
            .iter()
            .filter(|d| d.id.domain_id == domain_id && members.contains(&d.id))
            .cloned()
            .collect())
    }
}
