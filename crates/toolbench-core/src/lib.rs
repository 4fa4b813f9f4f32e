//! # Toolbench Core Library
//!
//! Business logic for a set of small personal productivity tools. All
//! operations are available through the standalone `toolbench` CLI, which is
//! a thin presentation layer over this crate.
//!
//! ## Architecture
//!
//! - **Calculators**: pure functions from an input record to a report
//!   ([`housing`], [`health`], [`sample_size`], [`qr`])
//! - **Planners**: explicit state structs owned by a controller
//!   ([`ContentCalendar`], [`TodoList`])
//! - **Storage**: one JSON file per tool, TOML configuration, and JSON
//!   export/import with merge-by-id
//!
//! ## Key Components
//!
//! - [`FormValues`] / [`FormInput`]: lenient form parsing shared by the calculators
//! - [`JsonStore`]: typed load/save boundary for tool state
//! - [`Config`]: application configuration management

pub mod calendar;
pub mod error;
pub mod form;
pub mod health;
pub mod housing;
pub mod qr;
pub mod sample_size;
pub mod storage;
pub mod todo;

pub use calendar::{ContentCalendar, Platform, Post, PostStatus};
pub use error::{ConfigError, CoreError, ImportError, StorageError, ValidationError};
pub use form::{FormInput, FormValues};
pub use housing::{HousingInput, HousingReport, Recommendation};
pub use storage::{Config, ImportMode, JsonStore, ToolKey, Transferable};
pub use todo::{Priority, Task, TodoList};
