use chrono::NaiveDateTime;

/// Priority assigned to tasks created without an explicit one.
pub const DEFAULT_PRIORITY: &str = "medium";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u32,
    pub content: String,
    pub completed: bool,
    /// Stored verbatim; unrecognized values sort after `low`.
    pub priority: String,
    /// Absent means "no deadline".
    pub due_date: Option<NaiveDateTime>,
    /// Set once when the store creates the task, immutable afterwards.
    pub created_date: NaiveDateTime,
}

impl Task {
    pub fn new(id: u32, content: String, created_date: NaiveDateTime) -> Self {
        Self {
            id,
            content,
            completed: false,
            priority: DEFAULT_PRIORITY.to_string(),
            due_date: None,
            created_date,
        }
    }
}
