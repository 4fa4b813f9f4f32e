//! Filtering, sorting and statistics over a [`TodoList`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Task, TodoList};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Newest first
    #[default]
    Created,
    /// Earliest due date first, undated last
    DueDate,
    /// High to low
    Priority,
    /// Case-insensitive alphabetical
    Title,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "created" | "newest" => Some(SortOrder::Created),
            "due" | "due_date" => Some(SortOrder::DueDate),
            "priority" => Some(SortOrder::Priority),
            "title" | "name" => Some(SortOrder::Title),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
    Overdue,
    /// Due today
    Today,
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "active" | "open" => Some(StatusFilter::Active),
            "completed" | "done" => Some(StatusFilter::Completed),
            "overdue" => Some(StatusFilter::Overdue),
            "today" => Some(StatusFilter::Today),
            _ => None,
        }
    }

    fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
            StatusFilter::Overdue => task.is_overdue(today),
            StatusFilter::Today => task.is_due_on(today),
        }
    }
}

/// A list query. All conditions must hold.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: StatusFilter,
    /// Category id. `Some("")` selects uncategorized tasks.
    pub category_id: Option<String>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if !self.status.matches(task, today) {
            return false;
        }
        if let Some(category) = &self.category_id {
            let wanted = (!category.is_empty()).then_some(category.as_str());
            if task.category_id.as_deref() != wanted {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                task.title.to_lowercase().contains(&needle)
                    || task.description.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TodoStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
    /// Completed share in percent, 0 for an empty list
    pub completion_rate: f64,
}

fn sort_tasks(tasks: &mut [&Task], order: SortOrder) {
    match order {
        SortOrder::Created => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::DueDate => tasks.sort_by_key(|t| (t.due_date.is_none(), t.due_date)),
        SortOrder::Priority => tasks.sort_by(|a, b| b.priority.cmp(&a.priority)),
        SortOrder::Title => tasks.sort_by_key(|t| t.title.to_lowercase()),
    }
}

impl TodoList {
    /// Tasks matching `filter` in the given order. Completed tasks are
    /// hidden when the settings say so, unless the filter asks for them.
    pub fn query(&self, filter: &TaskFilter, order: SortOrder, today: NaiveDate) -> Vec<&Task> {
        let hide_completed =
            !self.settings.show_completed && filter.status != StatusFilter::Completed;
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| !(hide_completed && t.completed))
            .filter(|t| filter.matches(t, today))
            .collect();
        sort_tasks(&mut tasks, order);
        tasks
    }

    pub fn stats(&self, today: NaiveDate) -> TodoStats {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        let overdue = self.tasks.iter().filter(|t| t.is_overdue(today)).count();
        let completion_rate = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        TodoStats {
            total,
            active: total - completed,
            completed,
            overdue,
            completion_rate,
        }
    }
}
