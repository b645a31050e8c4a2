use crate::hook::Hook;
use crate::{HookError, Level, LogEntry, RegistryError};
use std::collections::HashMap;
use std::sync::Arc;

/// Hooks indexed by the levels they declared interest in.
#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn Hook>>,
    by_level: HashMap<Level, Vec<Arc<dyn Hook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, hook: Arc<dyn Hook>) -> Result<(), RegistryError> {
        if self.hooks.iter().any(|h| h.id() == hook.id()) {
            return Err(RegistryError::DuplicateId(hook.id().to_string()));
        }
        for level in hook.levels() {
            self.by_level.entry(*level).or_default().push(hook.clone());
        }
        self.hooks.push(hook);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<dyn Hook>> {
        let index = self.hooks.iter().position(|h| h.id() == id)?;
        let hook = self.hooks.remove(index);
        for hooks in self.by_level.values_mut() {
            hooks.retain(|h| h.id() != id);
        }
        self.by_level.retain(|_, hooks| !hooks.is_empty());
        Some(hook)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn wants(&self, level: Level) -> bool {
        self.by_level.contains_key(&level)
    }

    /// Fires every hook interested in `entry.level`, in registration order.
    /// A failing hook does not stop the others; failures come back keyed by hook id.
    pub fn fire(&self, entry: &LogEntry) -> Vec<(String, HookError)> {
        let Some(hooks) = self.by_level.get(&entry.level) else {
            return Vec::new();
        };
        hooks
            .iter()
            .filter_map(|hook| hook.fire(entry).err().map(|err| (hook.id().to_string(), err)))
            .collect()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry").field("ids", &self.ids()).finish()
    }
}
