//! To-do list with categories, priorities and due dates.
//!
//! [`TodoList`] is the explicit application state: tasks, categories and
//! view settings. All mutations go through its methods; callers persist it
//! with a [`JsonStore`](crate::storage::JsonStore) after each change.

pub mod view;

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::form::is_hex_color;
use crate::storage::{merge_by_id, Identified, MergeSummary, ToolKey, Transferable};

pub use view::{SortOrder, StatusFilter, TaskFilter, TodoStats};

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "l" => Some(Priority::Low),
            "medium" | "med" | "m" => Some(Priority::Medium),
            "high" | "h" => Some(Priority::High),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Hex colour, e.g. `#3b82f6`
    pub color: String,
}

impl Identified for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Open and due before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_date == Some(day)
    }
}

impl Identified for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category_id: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

/// Partial update of a task. `None` leaves a field unchanged; the nested
/// options clear the value when set to `Some(None)`.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoSettings {
    pub sort: SortOrder,
    pub show_completed: bool,
}

impl Default for TodoSettings {
    fn default() -> Self {
        Self {
            sort: SortOrder::default(),
            show_completed: true,
        }
    }
}

fn default_categories() -> Vec<Category> {
    [
        ("personal", "Personal", "#3b82f6"),
        ("work", "Work", "#ef4444"),
        ("shopping", "Shopping", "#10b981"),
    ]
    .into_iter()
    .map(|(id, name, color)| Category {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
    })
    .collect()
}

/// Everything the to-do tool persists under its storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoList {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub settings: TodoSettings,
}

impl Default for TodoList {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            categories: default_categories(),
            settings: TodoSettings::default(),
        }
    }
}

/// Index of the record whose id equals `id` or uniquely starts with it.
fn find_index<T: Identified>(records: &[T], id: &str) -> Option<usize> {
    if id.is_empty() {
        return None;
    }
    if let Some(index) = records.iter().position(|r| r.id() == id) {
        return Some(index);
    }
    let mut matches = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.id().starts_with(id));
    match (matches.next(), matches.next()) {
        (Some((index, _)), None) => Some(index),
        _ => None,
    }
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    fn task_index(&self, id: &str) -> Result<usize, ValidationError> {
        find_index(&self.tasks, id).ok_or_else(|| ValidationError::NotFound {
            kind: "task",
            id: id.to_string(),
        })
    }

    fn category_index(&self, id: &str) -> Result<usize, ValidationError> {
        find_index(&self.categories, id).ok_or_else(|| ValidationError::NotFound {
            kind: "category",
            id: id.to_string(),
        })
    }

    /// Category names are unique ignoring case; `skip` is the category
    /// being renamed.
    fn ensure_unique_name(&self, name: &str, skip: Option<usize>) -> Result<(), ValidationError> {
        let taken = self
            .categories
            .iter()
            .enumerate()
            .any(|(index, c)| Some(index) != skip && c.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(ValidationError::invalid("name", format!("'{name}' already exists")));
        }
        Ok(())
    }

    /// Resolve a category by id, id prefix or case-insensitive name.
    pub fn find_category(&self, key: &str) -> Option<&Category> {
        find_index(&self.categories, key)
            .map(|index| &self.categories[index])
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(key.trim()))
            })
    }

    fn resolve_category(&self, key: Option<String>) -> Result<Option<String>, ValidationError> {
        match key {
            None => Ok(None),
            Some(key) if key.trim().is_empty() => Ok(None),
            Some(key) => self
                .find_category(&key)
                .map(|c| Some(c.id.clone()))
                .ok_or(ValidationError::NotFound {
                    kind: "category",
                    id: key,
                }),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        find_index(&self.tasks, id).map(|index| &self.tasks[index])
    }

    /// Create a task.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequired`] for an empty title and
    /// [`ValidationError::NotFound`] for an unknown category.
    pub fn add(&mut self, new: NewTask) -> Result<&Task, ValidationError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(ValidationError::missing("title"));
        }
        let category_id = self.resolve_category(new.category_id)?;
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: new.description.trim().to_string(),
            category_id,
            priority: new.priority,
            due_date: new.due_date,
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
        };
        debug!(id = %task.id, priority = ?task.priority, "task added");
        self.tasks.push(task);
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Apply `patch` to the task `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] for an unknown task or
    /// category and [`ValidationError::MissingRequired`] if the title would
    /// become empty. The task is unchanged on error.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<&Task, ValidationError> {
        let index = self.task_index(id)?;
        let category_id = match patch.category_id {
            Some(key) => Some(self.resolve_category(key)?),
            None => None,
        };
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(ValidationError::missing("title"));
            }
        }

        let task = &mut self.tasks[index];
        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            task.description = description.trim().to_string();
        }
        if let Some(category_id) = category_id {
            task.category_id = category_id;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        Ok(&self.tasks[index])
    }

    /// Flip the completed flag, stamping or clearing the completion time.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] for an unknown id.
    pub fn toggle(&mut self, id: &str) -> Result<&Task, ValidationError> {
        let index = self.task_index(id)?;
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        task.completed_at = task.completed.then(Utc::now);
        debug!(id = %task.id, completed = task.completed, "task toggled");
        Ok(&self.tasks[index])
    }

    /// Remove the task `id`, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] for an unknown id.
    pub fn delete(&mut self, id: &str) -> Result<Task, ValidationError> {
        let index = self.task_index(id)?;
        Ok(self.tasks.remove(index))
    }

    /// Remove every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        before - self.tasks.len()
    }

    /// Create a category. An invalid colour falls back to grey.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequired`] for an empty name and
    /// [`ValidationError::InvalidValue`] if the name is already taken.
    pub fn add_category(&mut self, name: &str, color: &str) -> Result<&Category, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::missing("name"));
        }
        self.ensure_unique_name(name, None)?;
        let color = if is_hex_color(color) {
            color.to_ascii_lowercase()
        } else {
            "#6b7280".to_string()
        };
        self.categories.push(Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            color,
        });
        let index = self.categories.len() - 1;
        Ok(&self.categories[index])
    }

    /// Rename the category `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] for an unknown id,
    /// [`ValidationError::MissingRequired`] for an empty name and
    /// [`ValidationError::InvalidValue`] if another category has the name.
    pub fn rename_category(&mut self, id: &str, name: &str) -> Result<&Category, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::missing("name"));
        }
        let index = self.category_index(id)?;
        self.ensure_unique_name(name, Some(index))?;
        self.categories[index].name = name.to_string();
        Ok(&self.categories[index])
    }

    /// Delete the category `id`. Its tasks become uncategorized.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] for an unknown id.
    pub fn delete_category(&mut self, id: &str) -> Result<Category, ValidationError> {
        let index = self.category_index(id)?;
        let removed = self.categories.remove(index);
        for task in &mut self.tasks {
            if task.category_id.as_deref() == Some(removed.id.as_str()) {
                task.category_id = None;
            }
        }
        Ok(removed)
    }

    pub fn category_name(&self, id: Option<&str>) -> Option<&str> {
        let id = id?;
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }
}

impl Transferable for TodoList {
    const TOOL: ToolKey = ToolKey::Todo;
    const KEYS: &'static [&'static str] = &["tasks", "categories", "settings"];

    fn merge(&mut self, incoming: Self) -> MergeSummary {
        let categories = merge_by_id(&mut self.categories, incoming.categories);
        let tasks = merge_by_id(&mut self.tasks, incoming.tasks);
        debug!(?categories, "categories merged");
        tasks
    }

    fn record_count(&self) -> usize {
        self.tasks.len()
    }
}
