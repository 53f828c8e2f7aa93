//! Server-rendered pages. Templates are embedded in the binary and
//! registered once at startup.

use chrono::NaiveDateTime;
use handlebars::Handlebars;
use serde::Serialize;

use crate::models::Task;
use crate::query::{DueStatus, TaskQuery};

pub const INDEX_TEMPLATE: &str = "index";
pub const LOGIN_TEMPLATE: &str = "login";

pub fn build_templates() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.register_template_string(INDEX_TEMPLATE, include_str!("../../templates/index.hbs"))?;
    handlebars.register_template_string(LOGIN_TEMPLATE, include_str!("../../templates/login.hbs"))?;
    Ok(handlebars)
}

#[derive(Debug, Serialize)]
struct PageTask {
    id: u32,
    content: String,
    completed: bool,
    priority: String,
    due: Option<String>,
    created: String,
    overdue: bool,
    today: bool,
    this_week: bool,
}

impl PageTask {
    fn new(task: &Task, now: NaiveDateTime) -> Self {
        let flags = DueStatus::of(task, now);
        Self {
            id: task.id,
            content: task.content.clone(),
            completed: task.completed,
            priority: task.priority.clone(),
            due: task.due_date.map(|due| due.format("%Y-%m-%d %H:%M").to_string()),
            created: task.created_date.format("%Y-%m-%d").to_string(),
            overdue: flags.overdue,
            today: flags.today,
            this_week: flags.this_week,
        }
    }
}

#[derive(Debug, Serialize)]
struct IndexContext {
    tasks: Vec<PageTask>,
    count: usize,
    status: String,
    priority: String,
    due: String,
    sort: String,
    logged_in: bool,
}

pub fn render_index(
    handlebars: &Handlebars,
    view: &[Task],
    query: &TaskQuery,
    logged_in: bool,
) -> Result<String, handlebars::RenderError> {
    let context = IndexContext {
        tasks: view
            .iter()
            .map(|task| PageTask::new(task, query.now))
            .collect(),
        count: view.len(),
        status: query.status.as_str().to_string(),
        priority: query.priority.as_str().to_string(),
        due: query.due.as_str().to_string(),
        sort: query.sort.as_str().to_string(),
        logged_in,
    };
    handlebars.render(INDEX_TEMPLATE, &context)
}

#[derive(Debug, Serialize)]
struct LoginContext {
    error: Option<String>,
}

pub fn render_login(
    handlebars: &Handlebars,
    error: Option<&str>,
) -> Result<String, handlebars::RenderError> {
    let context = LoginContext {
        error: error.map(str::to_string),
    };
    handlebars.render(LOGIN_TEMPLATE, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_due_date;

    fn now() -> NaiveDateTime {
        parse_due_date("2024-01-08 10:00").unwrap()
    }

    #[test]
    fn templates_compile() {
        build_templates().unwrap();
    }

    #[test]
    fn index_escapes_task_content() {
        let handlebars = build_templates().unwrap();
        let task = Task::new(
            1,
            "<script>alert(1)</script>".to_string(),
            parse_due_date("2024-01-01").unwrap(),
        );

        let html = render_index(&handlebars, &[task], &TaskQuery::new(now()), false).unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn index_shows_badges_and_echoes_selectors() {
        let handlebars = build_templates().unwrap();
        let mut task = Task::new(1, "pay rent".to_string(), parse_due_date("2024-01-01").unwrap());
        task.due_date = Some(parse_due_date("2024-01-05").unwrap());

        let mut query = TaskQuery::new(now());
        query.status = crate::query::StatusFilter::Pending;

        let html = render_index(&handlebars, &[task], &query, true).unwrap();
        assert!(html.contains("overdue"));
        assert!(html.contains(r#"value="pending" selected"#));
    }

    #[test]
    fn mutation_forms_only_render_when_logged_in() {
        let handlebars = build_templates().unwrap();
        let task = Task::new(1, "hidden buttons".to_string(), parse_due_date("2024-01-01").unwrap());
        let query = TaskQuery::new(now());

        let anonymous = render_index(&handlebars, std::slice::from_ref(&task), &query, false).unwrap();
        assert!(!anonymous.contains("/delete/1"));

        let logged_in = render_index(&handlebars, &[task], &query, true).unwrap();
        assert!(logged_in.contains("/delete/1"));
    }

    #[test]
    fn login_page_renders_with_and_without_error() {
        let handlebars = build_templates().unwrap();
        let plain = render_login(&handlebars, None).unwrap();
        assert!(plain.contains("form"));

        let with_error = render_login(&handlebars, Some("Invalid username or password")).unwrap();
        assert!(with_error.contains("Invalid username or password"));
    }
}
