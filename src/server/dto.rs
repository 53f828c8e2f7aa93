//! Request and response bodies for the JSON API and the HTML forms.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Task;
use crate::query::{DueStatus, TaskQuery};

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: u32,
    pub content: String,
    pub completed: bool,
    pub priority: String,
    pub due_date: Option<NaiveDateTime>,
    pub created_date: NaiveDateTime,
    pub is_overdue: bool,
    pub is_today: bool,
    pub is_this_week: bool,
}

impl TaskResponse {
    pub fn from_task(task: &Task, now: NaiveDateTime) -> Self {
        let flags = DueStatus::of(task, now);
        Self {
            id: task.id,
            content: task.content.clone(),
            completed: task.completed,
            priority: task.priority.clone(),
            due_date: task.due_date,
            created_date: task.created_date,
            is_overdue: flags.overdue,
            is_today: flags.today,
            is_this_week: flags.this_week,
        }
    }
}

/// List body: the ordered view plus the resolved selectors echoed back so
/// clients can reflect what was actually applied.
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub status: String,
    pub priority: String,
    pub due: String,
    pub sort: String,
}

impl TaskListResponse {
    pub fn new(view: &[Task], query: &TaskQuery) -> Self {
        Self {
            tasks: view
                .iter()
                .map(|task| TaskResponse::from_task(task, query.now))
                .collect(),
            status: query.status.as_str().to_string(),
            priority: query.priority.as_str().to_string(),
            due: query.due.as_str().to_string(),
            sort: query.sort.as_str().to_string(),
        }
    }
}

/// Raw query parameters shared by the index page and `GET /api/tasks`.
#[derive(Debug, Deserialize, Default)]
pub struct ViewParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub sort: Option<String>,
}

impl ViewParams {
    pub fn to_query(&self, now: NaiveDateTime) -> TaskQuery {
        TaskQuery::from_params(
            self.status.as_deref(),
            self.priority.as_deref(),
            self.due.as_deref(),
            self.sort.as_deref(),
            now,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub content: String,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateTaskRequest {
    pub content: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    /// Absent, `null`, and a string are three different states: keep,
    /// clear, and set.
    #[serde(default, deserialize_with = "nested_option")]
    pub due_date: Option<Option<String>>,
}

fn nested_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct AddTaskForm {
    pub content: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditTaskForm {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
