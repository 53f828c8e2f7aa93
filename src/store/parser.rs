use std::collections::HashMap;

use crate::models::Task;
use crate::models::due::format_stamp;

/// A task file before field interpretation: the heading line and the raw
/// `key: value` metadata beneath it.
#[derive(Debug)]
pub struct ParsedTask {
    pub heading: String,
    pub metadata: HashMap<String, String>,
}

/// Parse a task file.
/// Format:
/// ```text
/// # Task content
///
/// key: value
/// key2: value2
/// ```
pub fn parse_task_file(text: &str) -> Result<ParsedTask, String> {
    let mut lines = text.lines();

    let heading = lines.next().ok_or_else(|| "empty file".to_string())?;
    if !heading.starts_with('#') {
        return Err("missing heading".to_string());
    }
    let heading = heading.trim_start_matches('#').trim().to_string();
    if heading.is_empty() {
        return Err("empty heading".to_string());
    }

    let mut metadata = HashMap::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                metadata.insert(key.to_string(), value.trim().to_string());
            }
        }
        // Lines that are not key:value are ignored; hand-edited files stay
        // loadable as long as the heading and metadata survive.
    }

    Ok(ParsedTask { heading, metadata })
}

/// Render a task in the file format, fields in a fixed order so files do
/// not churn between saves.
pub fn generate_task_file(task: &Task) -> String {
    let mut output = format!("# {}\n\n", task.content);

    output.push_str(&format!("id: {}\n", task.id));
    output.push_str(&format!("created: {}\n", format_stamp(task.created_date)));
    output.push_str(&format!("completed: {}\n", task.completed));
    output.push_str(&format!("priority: {}\n", task.priority));
    if let Some(due) = task.due_date {
        output.push_str(&format!("due: {}\n", format_stamp(due)));
    }

    output
}
