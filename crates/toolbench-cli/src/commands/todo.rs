//! To-do list commands for CLI.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;
use toolbench_core::todo::{
    NewTask, Priority, SortOrder, StatusFilter, Task, TaskFilter, TaskPatch, TodoList,
};
use toolbench_core::{JsonStore, ToolKey};

use super::{
    export_state, import_state, parse_date, print_json, today, CliResult, ImportModeArg,
};

fn parse_priority(raw: &str) -> Result<Priority, String> {
    Priority::parse(raw).ok_or_else(|| format!("unknown priority '{raw}'"))
}

fn parse_sort(raw: &str) -> Result<SortOrder, String> {
    SortOrder::parse(raw).ok_or_else(|| format!("unknown sort order '{raw}'"))
}

fn parse_status(raw: &str) -> Result<StatusFilter, String> {
    StatusFilter::parse(raw).ok_or_else(|| format!("unknown filter '{raw}'"))
}

#[derive(Subcommand)]
pub enum TodoAction {
    /// Add a task
    Add {
        /// Task title
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Category name or ID
        #[arg(long)]
        category: Option<String>,
        /// low, medium or high
        #[arg(long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,
        /// Due date (YYYY-MM-DD, today, tomorrow)
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
    },
    /// List tasks
    List {
        /// all, active, completed, overdue or today
        #[arg(long, value_parser = parse_status, default_value = "all")]
        filter: StatusFilter,
        /// Category name or ID; `none` for uncategorized tasks
        #[arg(long)]
        category: Option<String>,
        /// Text to look for in title or description
        #[arg(long)]
        search: Option<String>,
        /// created, due, priority or title; defaults to the saved setting
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortOrder>,
        #[arg(long)]
        json: bool,
    },
    /// Toggle a task between done and open
    Done {
        /// Task ID or unique prefix
        id: String,
    },
    /// Change a task
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Category name or ID; `none` removes it
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        #[arg(long, value_parser = parse_date, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Delete a task
    Delete { id: String },
    /// Delete all completed tasks
    Clear,
    /// Totals and completion rate
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Category management
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Show or change list settings
    Settings {
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortOrder>,
        #[arg(long)]
        show_completed: Option<bool>,
    },
    /// Export tasks and categories to a file
    Export { path: PathBuf },
    /// Import tasks and categories from a file
    Import {
        path: PathBuf,
        #[arg(long, value_enum, default_value = "merge")]
        mode: ImportModeArg,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories
    List,
    /// Add a category
    Add {
        name: String,
        /// Hex colour, e.g. #8b5cf6
        #[arg(long, default_value = "#6b7280")]
        color: String,
    },
    /// Rename a category
    Rename { id: String, name: String },
    /// Delete a category; its tasks become uncategorized
    Delete { id: String },
}

/// Category flag to a category id; `none` means uncategorized.
fn category_id(list: &TodoList, key: &str) -> Result<String, String> {
    if key.eq_ignore_ascii_case("none") {
        return Ok(String::new());
    }
    list.find_category(key)
        .map(|c| c.id.clone())
        .ok_or_else(|| format!("category not found: {key}"))
}

fn print_task_line(list: &TodoList, task: &Task, today: NaiveDate) {
    let mark = if task.completed { "x" } else { " " };
    let due = match task.due_date {
        Some(due) if task.is_overdue(today) => format!("{due}!"),
        Some(due) => due.to_string(),
        None => String::new(),
    };
    println!(
        "[{mark}] {}  {:<6}  {:<11}  {:<10}  {}",
        task.id.get(..8).unwrap_or(task.id.as_str()),
        task.priority.label(),
        due,
        list.category_name(task.category_id.as_deref()).unwrap_or("-"),
        task.title
    );
}

fn run_category(
    list: &mut TodoList,
    action: CategoryAction,
) -> Result<bool, Box<dyn std::error::Error>> {
    match action {
        CategoryAction::List => {
            for category in &list.categories {
                println!(
                    "{:<10}  {}  {}",
                    category.id.get(..8).unwrap_or(category.id.as_str()),
                    category.color,
                    category.name
                );
            }
            Ok(false)
        }
        CategoryAction::Add { name, color } => {
            let category = list.add_category(&name, &color)?;
            println!("Category created: {}", category.id);
            Ok(true)
        }
        CategoryAction::Rename { id, name } => {
            let id = category_id(list, &id)?;
            let category = list.rename_category(&id, &name)?;
            println!("Category renamed: {}", category.name);
            Ok(true)
        }
        CategoryAction::Delete { id } => {
            let id = category_id(list, &id)?;
            let category = list.delete_category(&id)?;
            println!("Category deleted: {}", category.name);
            Ok(true)
        }
    }
}

pub fn run(action: TodoAction) -> CliResult {
    let store: JsonStore<TodoList> = JsonStore::open(ToolKey::Todo)?;
    let mut list = store.load()?;
    let today = today();

    let changed = match action {
        TodoAction::Add {
            title,
            description,
            category,
            priority,
            due,
        } => {
            let task = list.add(NewTask {
                title,
                description,
                category_id: category,
                priority,
                due_date: due,
            })?;
            println!("Task created: {}", task.id);
            true
        }
        TodoAction::List {
            filter,
            category,
            search,
            sort,
            json,
        } => {
            let filter = TaskFilter {
                status: filter,
                category_id: category.map(|c| category_id(&list, &c)).transpose()?,
                search,
            };
            let tasks = list.query(&filter, sort.unwrap_or(list.settings.sort), today);
            if json {
                print_json(&tasks)?;
            } else if tasks.is_empty() {
                println!("no tasks");
            } else {
                for task in tasks {
                    print_task_line(&list, task, today);
                }
            }
            false
        }
        TodoAction::Done { id } => {
            let task = list.toggle(&id)?;
            if task.completed {
                println!("Task completed: {}", task.title);
            } else {
                println!("Task reopened: {}", task.title);
            }
            true
        }
        TodoAction::Update {
            id,
            title,
            description,
            category,
            priority,
            due,
            clear_due,
        } => {
            let category_id = match category {
                Some(key) if key.eq_ignore_ascii_case("none") => Some(None),
                Some(key) => Some(Some(key)),
                None => None,
            };
            let patch = TaskPatch {
                title,
                description,
                category_id,
                priority,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
            };
            let task = list.update(&id, patch)?;
            println!("Task updated: {}", task.id);
            true
        }
        TodoAction::Delete { id } => {
            let task = list.delete(&id)?;
            println!("Task deleted: {}", task.title);
            true
        }
        TodoAction::Clear => {
            let removed = list.clear_completed();
            println!("{removed} completed task(s) removed");
            removed > 0
        }
        TodoAction::Stats { json } => {
            let stats = list.stats(today);
            if json {
                print_json(&stats)?;
            } else {
                println!(
                    "{} total, {} active, {} completed, {} overdue ({:.0}% done)",
                    stats.total, stats.active, stats.completed, stats.overdue, stats.completion_rate
                );
            }
            false
        }
        TodoAction::Category { action } => run_category(&mut list, action)?,
        TodoAction::Settings {
            sort,
            show_completed,
        } => {
            if let Some(sort) = sort {
                list.settings.sort = sort;
            }
            if let Some(show) = show_completed {
                list.settings.show_completed = show;
            }
            print_json(&list.settings)?;
            sort.is_some() || show_completed.is_some()
        }
        TodoAction::Export { path } => {
            export_state::<TodoList>(&path)?;
            false
        }
        TodoAction::Import { path, mode } => {
            import_state::<TodoList>(&path, mode)?;
            return Ok(());
        }
    };

    if changed {
        store.save(&list)?;
    }
    Ok(())
}
