pub mod due;
pub mod task;

pub use due::{ParseDueDateError, parse_due_date};
pub use task::{DEFAULT_PRIORITY, Task};
