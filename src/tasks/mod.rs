pub mod store;
pub mod task;

pub use store::{RenderHook, TaskStore};
pub use task::{Task, TaskId, TaskIdGenerator};
