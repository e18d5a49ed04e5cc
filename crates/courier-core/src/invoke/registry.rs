//! Handler registry and task runtime.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::handler::Handler;
use super::invoker::Invoker;
use crate::domain::{CourierError, DynamicValue, Task, TaskType};

/// Registry of handlers (task_type -> handler).
///
/// Design:
/// - Built during initialization (mutable).
/// - Used during runtime (immutable).
/// This avoids locks and keeps the dispatch path allocation-free.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TaskType, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a task type.
    ///
    /// If you want "last wins", change this to overwrite instead of error.
    pub fn register(
        &mut self,
        task_type: TaskType,
        handler: Arc<dyn Handler>,
    ) -> Result<(), CourierError> {
        if self.handlers.contains_key(&task_type) {
            return Err(CourierError::DuplicateHandler(task_type));
        }
        self.handlers.insert(task_type, handler);
        Ok(())
    }

    pub fn get(&self, task_type: &TaskType) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(task_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Runtime executes a composed `Task` by dispatching to a registered handler.
pub struct Runtime {
    registry: Arc<HandlerRegistry>,
    invoker: Invoker,
}

impl Runtime {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            invoker: Invoker::new(),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Execute one task: registry lookup, then a full invoke round.
    pub async fn execute(&self, task: &Task) -> Result<Vec<DynamicValue>, CourierError> {
        let task_type = task.task_type();
        let handler = self
            .registry
            .get(task_type)
            .ok_or_else(|| CourierError::HandlerNotFound(task_type.clone()))?;

        debug!(task_id = %task.task_id(), task_type = %task_type, "dispatching task");
        self.invoker.invoke(handler.as_ref(), task.args()).await
    }
}
