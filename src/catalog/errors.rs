//! Errors raised while loading catalog data.
use std::{fmt, path::PathBuf};

use super::handle::TableId;

#[derive(Debug, Clone)]
pub enum CatalogError {
    Read { path: PathBuf, message: String },
    Parse { origin: String, message: String },
    EmptyRowName { table: TableId },
    DuplicateRow { table: TableId, row: String },
    DuplicateDefinition { kind: &'static str, name: String },
    NoSourceDirectory,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "unable to read {}: {}", path.display(), message)
            }
            Self::Parse { origin, message } => write!(f, "invalid {}: {}", origin, message),
            Self::EmptyRowName { table } => write!(f, "table '{}' has a row with no name", table),
            Self::DuplicateRow { table, row } => {
                write!(f, "table '{}' defines row '{}' more than once", table, row)
            }
            Self::DuplicateDefinition { kind, name } => {
                write!(f, "{} definition '{}' is declared more than once", kind, name)
            }
            Self::NoSourceDirectory => write!(f, "catalog was not loaded from a directory"),
        }
    }
}

impl std::error::Error for CatalogError {}
