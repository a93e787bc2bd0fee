//! Row-ordered data tables loaded from JSON exports.
use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize};

use super::{errors::CatalogError, handle::TableId};

#[derive(Deserialize)]
struct RawRow<R> {
    name: String,
    #[serde(flatten)]
    row: R,
}

/// Named rows in file order with a name index.
#[derive(Debug, Clone)]
pub struct DataTable<R> {
    id: TableId,
    rows: Vec<(String, R)>,
    index: HashMap<String, usize>,
}

impl<R> DataTable<R> {
    pub fn empty(id: TableId) -> Self {
        Self {
            id,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn get(&self, name: &str) -> Option<&R> {
        self.index.get(name).map(|&idx| &self.rows[idx].1)
    }

    /// Rows with their names, in file order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &R)> {
        self.rows.iter().map(|(name, row)| (name.as_str(), row))
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn row_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn insert(&mut self, name: impl Into<String>, row: R) -> Result<(), CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::EmptyRowName { table: self.id });
        }
        if self.index.contains_key(&name) {
            return Err(CatalogError::DuplicateRow {
                table: self.id,
                row: name,
            });
        }
        self.index.insert(name.clone(), self.rows.len());
        self.rows.push((name, row));
        Ok(())
    }
}

impl<R: DeserializeOwned> DataTable<R> {
    /// Parses a JSON array of `{ "name": ..., <row fields> }` objects.
    pub fn from_json(id: TableId, text: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawRow<R>> =
            serde_json::from_str(text).map_err(|err| CatalogError::Parse {
                origin: format!("{} table", id),
                message: err.to_string(),
            })?;

        let mut table = Self::empty(id);
        for entry in raw {
            table.insert(entry.name, entry.row)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        #[serde(default)]
        value: u32,
    }

    #[test]
    fn keeps_file_order_and_indexes_names() {
        let table: DataTable<Row> = DataTable::from_json(
            TableId::Resources,
            r#"[{"name": "b", "value": 2}, {"name": "a"}]"#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.row_names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(table.get("a"), Some(&Row { value: 0 }));
        assert!(table.get("c").is_none());
    }

    #[test]
    fn rejects_duplicate_and_empty_names() {
        let duplicate = DataTable::<Row>::from_json(
            TableId::Recipes,
            r#"[{"name": "x"}, {"name": "x"}]"#,
        );
        assert!(matches!(
            duplicate,
            Err(CatalogError::DuplicateRow { ref row, .. }) if row == "x"
        ));

        let empty = DataTable::<Row>::from_json(TableId::Recipes, r#"[{"name": " "}]"#);
        assert!(matches!(empty, Err(CatalogError::EmptyRowName { .. })));
    }

    #[test]
    fn reports_parse_errors_with_table_name() {
        let err = DataTable::<Row>::from_json(TableId::Routes, "{").unwrap_err();
        assert!(err.to_string().contains("routes table"));
    }
}
