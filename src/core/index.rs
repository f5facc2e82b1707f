//! Per-assembly indices over task definitions and job keys.
//!
//! Both indices are built fresh for every assembly call and dropped when it
//! returns; nothing here is cached between batch runs.

use std::collections::HashMap;

use tracing::debug;

use crate::core::model::{BatchRunIdentity, JobKeyEntry, TaskDefinition, TaskId};
use crate::core::services::TaskRegistry;
use crate::core::DispatchError;

/// Task identity to definition lookup for one batch run.
#[derive(Debug, Default)]
pub struct TaskDefinitionIndex {
    by_id: HashMap<TaskId, TaskDefinition>,
}

impl TaskDefinitionIndex {
    /// Read the batch's task definitions from the registry and index them.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Service`] if the registry read fails
    /// - [`DispatchError::DuplicateTaskDefinition`] if a task identity repeats
    pub fn build<R>(registry: &R, identity: &BatchRunIdentity) -> Result<Self, DispatchError>
    where
        R: TaskRegistry + ?Sized,
    {
        let definitions = registry
            .find_all(&identity.domain_id, &identity.batch_id)
            .map_err(DispatchError::Service)?;
        Self::from_definitions(definitions)
    }

    /// Index an already loaded list of definitions.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateTaskDefinition`] if a task identity repeats.
    pub fn from_definitions(definitions: Vec<TaskDefinition>) -> Result<Self, DispatchError> {
        let mut by_id = HashMap::with_capacity(definitions.len());
        for definition in definitions {
            debug!(task_id = %definition.id, kind = %definition.kind, "indexing task");
            if by_id.contains_key(&definition.id) {
                return Err(DispatchError::DuplicateTaskDefinition(definition.id));
            }
            by_id.insert(definition.id.clone(), definition);
        }
        Ok(Self { by_id })
    }

    /// Look up a definition.
    #[must_use]
    pub fn get(&self, task_id: &TaskId) -> Option<&TaskDefinition> {
        self.by_id.get(task_id)
    }

    /// Whether a definition exists.
    #[must_use]
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.by_id.contains_key(task_id)
    }

    /// Number of indexed definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the index holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Job key to entry lookup that keeps declaration order for iteration.
#[derive(Debug, Default)]
pub struct JobKeyIndex {
    entries: Vec<JobKeyEntry>,
    positions: HashMap<String, usize>,
}

impl JobKeyIndex {
    /// Index job key entries.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::EmptyJobKey`] if an entry has a blank key
    /// - [`DispatchError::DuplicateJobKey`] if a key appears twice
    pub fn build(entries: Vec<JobKeyEntry>) -> Result<Self, DispatchError> {
        let mut positions = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            debug!(job_key = %entry.job_key, task_id = %entry.task_id, "indexing job key");
            if entry.job_key.trim().is_empty() {
                return Err(DispatchError::EmptyJobKey);
            }
            if positions.insert(entry.job_key.clone(), position).is_some() {
                return Err(DispatchError::DuplicateJobKey(entry.job_key.clone()));
            }
        }
        Ok(Self { entries, positions })
    }

    /// Look up the entry for a job key.
    #[must_use]
    pub fn get(&self, job_key: &str) -> Option<&JobKeyEntry> {
        self.positions.get(job_key).map(|&i| &self.entries[i])
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &JobKeyEntry> {
        self.entries.iter()
    }

    /// Number of job keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no job keys were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the predecessor graph reported by `predecessors` against the index.
    ///
    /// Every predecessor must be an indexed job key and the graph must be
    /// acyclic; otherwise a gated unit would wait forever.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownPredecessor`] for a predecessor outside the run
    /// - [`DispatchError::DependencyCycle`] if a job key reaches itself
    pub fn check_dependencies<F>(&self, predecessors: F) -> Result<(), DispatchError>
    where
        F: Fn(&str) -> Vec<String>,
    {
        let mut graph: HashMap<&str, Vec<String>> = HashMap::with_capacity(self.entries.len());
        for entry in &self.entries {
            let preds = predecessors(&entry.job_key);
            if let Some(unknown) = preds.iter().find(|p| !self.positions.contains_key(p.as_str())) {
                return Err(DispatchError::UnknownPredecessor {
                    job_key: entry.job_key.clone(),
                    predecessor: unknown.clone(),
                });
            }
            graph.insert(entry.job_key.as_str(), preds);
        }

        let roots = self.entries.iter().map(|e| e.job_key.as_str());
        if let Some(job_key) = find_cycle(&graph, roots) {
            return Err(DispatchError::DependencyCycle(job_key.to_owned()));
        }
        debug!(job_keys = graph.len(), "dependency graph checked");
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Iterative depth-first search; returns a job key that lies on a cycle.
fn find_cycle<'a>(
    graph: &'a HashMap<&'a str, Vec<String>>,
    roots: impl Iterator<Item = &'a str>,
) -> Option<&'a str> {
    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(graph.len());
    for root in roots {
        if marks.contains_key(root) {
            continue;
        }
        marks.insert(root, Mark::Visiting);
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let edges = graph.get(node).map_or(&[][..], Vec::as_slice);
            if let Some(pred) = edges.get(top.1) {
                top.1 += 1;
                match marks.get(pred.as_str()) {
                    Some(Mark::Visiting) => return Some(pred.as_str()),
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(pred.as_str(), Mark::Visiting);
                        stack.push((pred.as_str(), 0));
                    }
                }
            } else {
                marks.insert(node, Mark::Done);
                stack.pop();
            }
        }
    }
    None
}
