use std::collections::BTreeMap;

use crate::error::UpkeepError;
use crate::models::Task;

/// Persistence seen by the lifecycle manager. Implementations decide how
/// tasks are backed; the engine only loads and saves whole records.
pub trait TaskStore {
    fn load(&self, id: &str) -> Result<Task, UpkeepError>;
    fn save(&mut self, task: &Task) -> Result<(), UpkeepError>;
    fn load_all(&self) -> Result<Vec<Task>, UpkeepError>;
    fn delete(&mut self, id: &str) -> Result<(), UpkeepError>;
}

/// Process-local store, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tasks: BTreeMap<String, Task>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Task, UpkeepError> {
        self.tasks
            .get(id)
            .cloned()
            .ok_or_else(|| UpkeepError::task_not_found(id))
    }

    fn save(&mut self, task: &Task) -> Result<(), UpkeepError> {
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Task>, UpkeepError> {
        Ok(self.tasks.values().cloned().collect())
    }

    fn delete(&mut self, id: &str) -> Result<(), UpkeepError> {
        self.tasks
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UpkeepError::task_not_found(id))
    }
}

impl<S: TaskStore + ?Sized> TaskStore for &mut S {
    fn load(&self, id: &str) -> Result<Task, UpkeepError> {
        (**self).load(id)
    }

    fn save(&mut self, task: &Task) -> Result<(), UpkeepError> {
        (**self).save(task)
    }

    fn load_all(&self) -> Result<Vec<Task>, UpkeepError> {
        (**self).load_all()
    }

    fn delete(&mut self, id: &str) -> Result<(), UpkeepError> {
        (**self).delete(id)
    }
}
