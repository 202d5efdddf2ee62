use std::fmt;

use super::task::{Task, TaskId, TaskIdGenerator};

/// Called with the current ordered tasks after every mutation.
pub type RenderHook = Box<dyn FnMut(&[Task]) + Send>;

/// Insertion-ordered, in-memory task list.
#[derive(Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    ids: TaskIdGenerator,
    on_render: Option<RenderHook>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_render_hook(hook: impl FnMut(&[Task]) + Send + 'static) -> Self {
        Self {
            on_render: Some(Box::new(hook)),
            ..Self::default()
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn add(&mut self, text: impl Into<String>) -> TaskId {
        let id = self.ids.next_id();
        self.tasks.push(Task::new(id.clone(), text));
        self.render();
        id
    }

    /// Removes the task with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id() != id);
        let removed = self.tasks.len() != before;
        self.render();
        removed
    }

    /// Flips the task's completed flag and returns the new value, or `None`
    /// when no task has `id`.
    pub fn toggle(&mut self, id: &TaskId) -> Option<bool> {
        let completed = self
            .tasks
            .iter_mut()
            .find(|task| task.id() == id)
            .map(Task::toggle);
        self.render();
        completed
    }

    fn render(&mut self) {
        if let Some(hook) = self.on_render.as_mut() {
            hook(&self.tasks);
        }
    }
}

impl fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks)
            .field("on_render", &self.on_render.is_some())
            .finish()
    }
}
