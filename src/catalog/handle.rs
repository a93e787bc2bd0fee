//! Typed references into the catalog's data tables.
use std::fmt;

use serde::Deserialize;

/// The four row-based tables held by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableId {
    Resources,
    Recipes,
    Routes,
    Upgrades,
}

impl TableId {
    pub fn label(self) -> &'static str {
        match self {
            TableId::Resources => "resources",
            TableId::Recipes => "recipes",
            TableId::Routes => "routes",
            TableId::Upgrades => "upgrades",
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference to a row in one of the catalog tables.
///
/// Serialized as `{ table = "resources", row = "iron_ore" }`. A handle with no
/// table or an empty row name is unset and never resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct RowHandle {
    pub table: Option<TableId>,
    pub row: String,
}

impl RowHandle {
    pub fn new(table: TableId, row: impl Into<String>) -> Self {
        Self {
            table: Some(table),
            row: row.into(),
        }
    }

    pub fn resource(row: impl Into<String>) -> Self {
        Self::new(TableId::Resources, row)
    }

    pub fn recipe(row: impl Into<String>) -> Self {
        Self::new(TableId::Recipes, row)
    }

    pub fn route(row: impl Into<String>) -> Self {
        Self::new(TableId::Routes, row)
    }

    pub fn upgrade(row: impl Into<String>) -> Self {
        Self::new(TableId::Upgrades, row)
    }

    pub fn is_set(&self) -> bool {
        self.table.is_some() && !self.row.is_empty()
    }

    /// True when the handle is set and points into `table`.
    pub fn points_to(&self, table: TableId) -> bool {
        self.table == Some(table) && !self.row.is_empty()
    }

    /// Storage slots compare by row name only.
    pub fn same_row(&self, other: &RowHandle) -> bool {
        self.row == other.row
    }
}

impl fmt::Display for RowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table {
            Some(table) if !self.row.is_empty() => write!(f, "{}/{}", table, self.row),
            _ => f.write_str("<unset>"),
        }
    }
}
