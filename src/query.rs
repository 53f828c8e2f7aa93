//! Pure filtering, sorting, and due-date classification over a task snapshot.
//!
//! Everything here is a function of the tasks passed in, the selectors, and
//! the reference time carried by the query. No I/O, no clock reads — the
//! caller supplies `now`, so identical inputs always produce identical views.

use std::cmp::Ordering;

use chrono::{Days, NaiveDateTime, NaiveTime};

use crate::models::Task;

/// Completion-state selector. Unrecognized values match nothing but are
/// still echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    Unknown(String),
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "all" => Self::All,
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Unknown(raw) => raw,
        }
    }

    fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
            Self::Unknown(_) => false,
        }
    }
}

/// Priority selector: `all`, or an exact match against the stored string.
/// A value nothing stores simply matches no task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Exact(String),
}

impl PriorityFilter {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "all" => Self::All,
            _ => Self::Exact(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Exact(value) => value,
        }
    }

    fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Exact(value) => task.priority == *value,
        }
    }
}

/// Deadline selector. A task without a due date never matches anything
/// other than `all`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DueFilter {
    #[default]
    All,
    Overdue,
    Today,
    ThisWeek,
    Unknown(String),
}

impl DueFilter {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "all" => Self::All,
            "overdue" => Self::Overdue,
            "today" => Self::Today,
            "this_week" => Self::ThisWeek,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::ThisWeek => "this_week",
            Self::Unknown(raw) => raw,
        }
    }

    fn matches(&self, task: &Task, now: NaiveDateTime) -> bool {
        let Some(due) = task.due_date else {
            return matches!(self, Self::All);
        };

        match self {
            Self::All => true,
            // A completed task is never overdue.
            Self::Overdue => !task.completed && due < now,
            Self::Today => {
                let midnight = start_of_day(now);
                due >= midnight && due < midnight + Days::new(1)
            }
            // Rolling window from `now`, closed on both ends.
            Self::ThisWeek => due >= now && due <= now + Days::new(7),
            Self::Unknown(_) => false,
        }
    }
}

/// Active sort key. Unrecognized values fall back to `created_desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    CreatedAsc,
    #[default]
    CreatedDesc,
    DueAsc,
    Priority,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "created_asc" => Self::CreatedAsc,
            "created_desc" => Self::CreatedDesc,
            "due_asc" => Self::DueAsc,
            "priority" => Self::Priority,
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAsc => "created_asc",
            Self::CreatedDesc => "created_desc",
            Self::DueAsc => "due_asc",
            Self::Priority => "priority",
        }
    }
}

/// Sort precedence for a stored priority string; lower sorts first.
pub fn priority_rank(priority: &str) -> u8 {
    match priority {
        "high" => 0,
        "medium" => 1,
        "low" => 2,
        _ => 3,
    }
}

/// Derived deadline flags for one task, independent of any filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DueStatus {
    pub overdue: bool,
    pub today: bool,
    pub this_week: bool,
}

impl DueStatus {
    pub fn of(task: &Task, now: NaiveDateTime) -> Self {
        let Some(due) = task.due_date else {
            return Self::default();
        };
        let midnight = start_of_day(now);

        Self {
            overdue: !task.completed && due < now,
            today: due >= midnight && due < midnight + Days::new(1),
            this_week: due >= now && due <= now + Days::new(7),
        }
    }
}

/// A fully-resolved query: the four selectors plus the reference time every
/// relative date computation uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub due: DueFilter,
    pub sort: SortKey,
    pub now: NaiveDateTime,
}

impl TaskQuery {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            status: StatusFilter::default(),
            priority: PriorityFilter::default(),
            due: DueFilter::default(),
            sort: SortKey::default(),
            now,
        }
    }

    /// Resolve raw request parameters, absent ones defaulting to "no
    /// constraint" (and `created_desc` for the sort).
    pub fn from_params(
        status: Option<&str>,
        priority: Option<&str>,
        due: Option<&str>,
        sort: Option<&str>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            status: status.map(StatusFilter::parse).unwrap_or_default(),
            priority: priority.map(PriorityFilter::parse).unwrap_or_default(),
            due: due.map(DueFilter::parse).unwrap_or_default(),
            sort: sort.map(SortKey::parse).unwrap_or_default(),
            now,
        }
    }

    /// Produce the ordered view: filter with the AND of the three selector
    /// predicates, then apply the active sort. Input tasks are never
    /// mutated; all sorts are stable, so ties keep the store's order.
    pub fn run(&self, tasks: &[Task]) -> Vec<Task> {
        let mut view: Vec<Task> = tasks
            .iter()
            .filter(|task| self.status.matches(task))
            .filter(|task| self.priority.matches(task))
            .filter(|task| self.due.matches(task, self.now))
            .cloned()
            .collect();

        match self.sort {
            SortKey::CreatedAsc => view.sort_by(|a, b| a.created_date.cmp(&b.created_date)),
            SortKey::CreatedDesc => view.sort_by(|a, b| b.created_date.cmp(&a.created_date)),
            SortKey::DueAsc => view.sort_by(|a, b| compare_due(a.due_date, b.due_date)),
            // Highest priority first; newest first within a rank.
            SortKey::Priority => view.sort_by(|a, b| {
                priority_rank(&a.priority)
                    .cmp(&priority_rank(&b.priority))
                    .then_with(|| b.created_date.cmp(&a.created_date))
            }),
        }

        view
    }
}

/// Nulls-last ordering on due dates: every dated task sorts before every
/// undated one, regardless of direction.
fn compare_due(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(NaiveTime::MIN)
}
