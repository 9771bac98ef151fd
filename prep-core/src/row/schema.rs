//! Ordered column descriptors attached to rows.

use super::column::{Column, ColumnId, ColumnType};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Ordered sequence of columns (row metadata).
///
/// Schemas are copy-on-write: cloning shares the column list and the first
/// mutation through a clone detaches it. Two branches of a graph can hold
/// the same schema and still edit it independently.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Arc<Vec<Column>>,
}

impl Schema {
    /// Create a schema from columns, in order.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns: Arc::new(columns),
        }
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no column.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Find a column by id.
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id.as_str() == id)
    }

    /// Find the first column with the given display name.
    pub fn by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether a column with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.column(id).is_some()
    }

    /// Column ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &ColumnId> {
        self.columns.iter().map(|c| &c.id)
    }

    /// Id the next created column receives.
    pub fn next_id(&self) -> ColumnId {
        let next = self
            .columns
            .iter()
            .filter_map(|c| c.id.index())
            .max()
            .map_or(0, |max| max + 1);
        ColumnId::from_index(next)
    }

    /// Whether both schemas share the same column list.
    pub fn shares_columns_with(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.columns, &other.columns)
    }

    /// Rename a column. Returns `false` if the column does not exist.
    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> bool {
        match self.position(id) {
            Some(pos) => {
                Arc::make_mut(&mut self.columns)[pos].name = name.into();
                true
            }
            None => false,
        }
    }

    /// Change the type of a column. Returns `false` if the column does not exist.
    pub fn set_type(&mut self, id: &str, column_type: ColumnType) -> bool {
        match self.position(id) {
            Some(pos) => {
                Arc::make_mut(&mut self.columns)[pos].column_type = column_type;
                true
            }
            None => false,
        }
    }

    /// Remove a column, returning it.
    pub fn remove(&mut self, id: &str) -> Option<Column> {
        let pos = self.position(id)?;
        Some(Arc::make_mut(&mut self.columns).remove(pos))
    }

    /// Insert a column after `anchor`, or at the end when the anchor is
    /// absent or unknown.
    ///
    /// Columns are only created during execution through the action
    /// context, which keeps one id per logical name.
    pub(crate) fn insert_after(&mut self, anchor: Option<&str>, column: Column) {
        let at = anchor
            .and_then(|a| self.position(a))
            .map_or(self.columns.len(), |pos| pos + 1);
        Arc::make_mut(&mut self.columns).insert(at, column);
    }

    /// Re-apply the edits that turned `old_base` into `self` on top of
    /// `new_base`.
    ///
    /// Used when an upstream action changes its output mid-stream: columns
    /// edited or removed relative to `old_base` keep their edited state,
    /// columns added relative to `old_base` are inserted after the same
    /// predecessor, and every other column is taken from `new_base`.
    #[must_use]
    pub fn rebase(&self, old_base: &Schema, new_base: &Schema) -> Schema {
        let mut merged: Vec<Column> = Vec::with_capacity(new_base.len() + 1);
        for column in new_base.columns() {
            match (old_base.column(column.id.as_str()), self.column(column.id.as_str())) {
                (Some(_), None) => {}
                (Some(before), Some(after)) if before != after => merged.push(after.clone()),
                _ => merged.push(column.clone()),
            }
        }

        for (pos, column) in self.columns.iter().enumerate() {
            let id = column.id.as_str();
            if old_base.contains(id) || merged.iter().any(|c| c.id.as_str() == id) {
                continue;
            }
            let at = match pos.checked_sub(1) {
                None => 0,
                Some(prev) => {
                    let anchor = &self.columns[prev].id;
                    merged
                        .iter()
                        .position(|c| &c.id == anchor)
                        .map_or(merged.len(), |p| p + 1)
                }
            };
            merged.insert(at, column.clone());
        }
        Schema::new(merged)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id.as_str() == id)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.shares_columns_with(other) || self.columns == other.columns
    }
}

impl Eq for Schema {}

impl FromIterator<Column> for Schema {
    fn from_iter<T: IntoIterator<Item = Column>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Serialize, Deserialize)]
struct SchemaRepr {
    columns: Vec<Column>,
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SchemaRepr {
            columns: self.columns.to_vec(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = SchemaRepr::deserialize(deserializer)?;
        Ok(Schema::new(repr.columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Schema {
        Schema::new(vec![
            Column::new("0000", "firstname"),
            Column::new("0001", "lastname"),
            Column::new("0002", "city"),
        ])
    }

    fn names(schema: &Schema) -> Vec<&str> {
        schema.columns().iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn next_id_follows_max() {
        assert_eq!(people().next_id().as_str(), "0003");
        assert_eq!(Schema::default().next_id().as_str(), "0000");
        let mixed = Schema::new(vec![Column::new("name", "name"), Column::new("0007", "x")]);
        assert_eq!(mixed.next_id().as_str(), "0008");
    }

    #[test]
    fn clones_detach_on_write() {
        let original = people();
        let mut copy = original.clone();
        assert!(copy.shares_columns_with(&original));

        copy.rename("0000", "given_name");
        assert!(!copy.shares_columns_with(&original));
        assert_eq!(original.column("0000").unwrap().name, "firstname");
        assert_eq!(copy.column("0000").unwrap().name, "given_name");
    }

    #[test]
    fn insert_after_anchor() {
        let mut schema = people();
        schema.insert_after(Some("0000"), Column::new("0003", "firstname_copy"));
        assert_eq!(names(&schema), ["firstname", "firstname_copy", "lastname", "city"]);

        schema.insert_after(Some("missing"), Column::new("0004", "tail"));
        assert_eq!(schema.columns().last().unwrap().name, "tail");
    }

    #[test]
    fn rename_unknown_column() {
        let mut schema = people();
        assert!(!schema.rename("0099", "nope"));
        assert!(schema.remove("0099").is_none());
    }

    #[test]
    fn rebase_keeps_upstream_renames() {
        let old_base = people();
        // the action added a copy of firstname
        let mut edited = old_base.clone();
        edited.insert_after(Some("0000"), Column::new("0003", "firstname_copy"));

        // upstream renamed every column
        let mut new_base = old_base.clone();
        new_base.rename("0000", "John");
        new_base.rename("0001", "Lennon");

        let merged = edited.rebase(&old_base, &new_base);
        assert_eq!(names(&merged), ["John", "firstname_copy", "Lennon", "city"]);
    }

    #[test]
    fn rebase_keeps_own_edits_and_removals() {
        let old_base = people();
        let mut edited = old_base.clone();
        edited.rename("0001", "surname");
        edited.remove("0002");

        let mut new_base = old_base.clone();
        new_base.set_type("0000", ColumnType::Any);

        let merged = edited.rebase(&old_base, &new_base);
        assert_eq!(names(&merged), ["firstname", "surname"]);
        assert_eq!(merged.column("0000").unwrap().column_type, ColumnType::Any);
    }

    #[test]
    fn schema_serde() {
        let json = serde_json::to_string(&people()).unwrap();
        assert!(json.starts_with("{\"columns\":["));
        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, people());
    }
}
