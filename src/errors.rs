// src/errors.rs

//! Crate-wide error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevboardError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Unsupported dependency kind on task '{task}': {declaration} (only \"name\" and \"^name\" strings are supported)")]
    UnsupportedDependencyKind { task: String, declaration: String },

    #[error("Invalid status matcher pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Prerequisite task '{task}' failed for projects [{}] ({})", .projects.join(", "), describe_code(.code))]
    PrerequisiteFailed {
        task: String,
        projects: Vec<String>,
        code: Option<i32>,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DevboardError>;
