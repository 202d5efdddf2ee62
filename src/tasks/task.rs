use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a task in the list.
///
/// Issued ids are `<unix millis>-<sequence>`; any string a client sends back
/// is accepted for lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for TaskId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out time-based ids that stay unique within one generator even when
/// several are issued in the same millisecond.
#[derive(Debug, Default)]
pub struct TaskIdGenerator {
    issued: u64,
}

impl TaskIdGenerator {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(format!("{}-{}", Utc::now().timestamp_millis(), self.issued));
        self.issued += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    text: String,
    completed: bool,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generator_ids_are_unique() {
        let mut ids = TaskIdGenerator::default();
        let issued: HashSet<_> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(issued.len(), 1000);
    }

    #[test]
    fn test_new_task_is_open() {
        let task = Task::new(TaskId::from("1"), "write report");
        assert_eq!(task.text(), "write report");
        assert!(!task.is_completed());
    }

    #[test]
    fn test_task_serialization() {
        let task = Task::new(TaskId::from("42-0"), "buy milk");
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, r#"{"id":"42-0","text":"buy milk","completed":false}"#);
    }
}
