//! Task domain entities.

pub mod model;
pub mod status;

pub use model::{NewTask, Task, TaskPatch};
pub use status::TaskStatus;
