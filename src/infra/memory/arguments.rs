//! In-memory argument resolver.

use std::collections::HashMap;

use anyhow::{anyhow, bail};
use parking_lot::RwLock;

use crate::core::model::{ArgumentType, TaskArgument, TaskId};
use crate::core::services::ArgumentResolver;
use crate::core::AppResult;

/// Argument definitions and task bindings held in memory.
#[derive(Default)]
pub struct InMemoryArgumentResolver {
    types: RwLock<HashMap<String, ArgumentType>>,
    bindings: RwLock<Vec<TaskArgument>>,
}

impl InMemoryArgumentResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an argument definition.
    pub fn define(&self, arg_id: &str, arg_type: ArgumentType) {
        self.types.write().insert(arg_id.to_owned(), arg_type);
    }

    /// Bind an argument to a task. Declares its definition if unknown.
    ///
    /// # Errors
    ///
    /// Fails when the binding's type disagrees with the declared definition.
    pub fn bind(&self, argument: TaskArgument) -> AppResult<()> {
        let declared = *self
            .types
            .write()
            .entry(argument.arg_id.clone())
            .or_insert(argument.arg_type);
        if declared != argument.arg_type {
            bail!(
                "argument `{}` is declared {:?}, cannot bind as {:?}",
                argument.arg_id,
                declared,
                argument.arg_type
            );
        }
        self.bindings.write().push(argument);
        Ok(())
    }
}

impl ArgumentResolver for InMemoryArgumentResolver {
    fn arguments(&self, task_id: &TaskId) -> AppResult<Vec<TaskArgument>> {
        let mut args: Vec<_> = self
            .bindings
            .read()
            .iter()
            .filter(|a| &a.task_id == task_id)
            .cloned()
            .collect();
        args.sort_by_key(|a| a.sort_id);
        Ok(args)
    }

    fn argument_type(&self, arg_id: &str) -> AppResult<Option<ArgumentType>> {
        Ok(self.types.read().get(arg_id).copied())
    }

    fn update_value(&self, uuid: &str, value: &str) -> AppResult<()> {
        let mut bindings = self.bindings.write();
        let binding = bindings
            .iter_mut()
            .find(|a| a.uuid == uuid)
            .ok_or_else(|| anyhow!("argument binding `{uuid}` not found"))?;
        let declared = self.types.read().get(&binding.arg_id).copied();
        if declared != Some(ArgumentType::TaskScoped) {
            bail!(
                "argument `{}` is {:?}; only task-scoped values can be updated",
                binding.arg_id,
                declared
            );
        }
        binding.value = Some(value.to_owned());
        Ok(())
    }

    fn update_sort(&self, uuid: &str, sort_id: u32) -> AppResult<()> {
        let mut bindings = self.bindings.write();
        let binding = bindings
            .iter_mut()
            .find(|a| a.uuid == uuid)
            .ok_or_else(|| anyhow!("argument binding `{uuid}` not found"))?;
        binding.sort_id = sort_id;
        Ok(())
    }
}
