// src/config/mod.rs

//! Workspace file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a workspace file from disk (`loader.rs`).
//! - Validate project dependencies, runner templates and status matchers
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ConfigFile, DashboardSection, DependencyDecl, OrderedTable, ProjectConfig, RawConfigFile,
    RunnerSection, Selection, SelectionOptions, SupervisorSection, TaskConfig,
};
pub use validate::validate_config;
