//! # Statement Generator
//!
//! Renders parameterized SQL text from an [`EntityDescriptor`].
//!
//! ## Placeholder Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SampleVersion columns (declared order)                                │
//! │                                                                         │
//! │   #   column            facets          used by                         │
//! │  ──  ───────────────   ─────────────   ────────────────────────────     │
//! │  $1  sample_id         key, foreign    WHERE (key), WHERE (foreign)     │
//! │  $2  version_number    key             WHERE (key)                      │
//! │  $3  create_date                       SET (...) = ($3, ...)            │
//! │  ..  ...                                                                │
//! │                                                                         │
//! │  Every statement takes its numbers from ONE walk over all columns.     │
//! │  A key column keeps its global position: a key declared third is $3    │
//! │  in the WHERE clause, never renumbered to $1.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The output is plain text. Nothing here executes SQL.

use crate::descriptor::{ColumnDescriptor, EntityDescriptor, Facet};
use crate::error::{CoreError, CoreResult};

// =============================================================================
// Numbering
// =============================================================================

/// Pairs every persisted column with its `$n` placeholder.
fn numbered(descriptor: &EntityDescriptor) -> impl Iterator<Item = (String, &ColumnDescriptor)> {
    descriptor
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| (format!("${}", i + 1), c))
}

/// `col = $n AND ...` over columns carrying `facet`.
fn predicate(descriptor: &EntityDescriptor, facet: Facet) -> CoreResult<String> {
    let terms: Vec<String> = numbered(descriptor)
        .filter(|(_, c)| c.has(facet))
        .map(|(p, c)| format!("{} = {}", c.column, p))
        .collect();

    if terms.is_empty() {
        return Err(CoreError::MissingFacet(facet));
    }
    Ok(terms.join(" AND "))
}

// =============================================================================
// Generator
// =============================================================================

/// Renders statements for one (entity, schema, table) triple.
#[derive(Debug, Clone, Copy)]
pub struct StatementGenerator<'a> {
    descriptor: &'a EntityDescriptor,
    schema: &'a str,
    table: &'a str,
}

impl<'a> StatementGenerator<'a> {
    pub fn new(descriptor: &'a EntityDescriptor, schema: &'a str, table: &'a str) -> Self {
        StatementGenerator {
            descriptor,
            schema,
            table,
        }
    }

    /// `schema.table`
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    fn columns(&self) -> CoreResult<String> {
        self.descriptor.ensure_persisted()?;
        Ok(self.descriptor.insert_columns().join(", "))
    }

    /// `SELECT <columns> FROM schema.table`, the prefix of list queries.
    pub fn select_from(&self) -> CoreResult<String> {
        Ok(format!(
            "SELECT {} FROM {}",
            self.columns()?,
            self.qualified_table()
        ))
    }

    /// `SELECT COUNT(*) FROM schema.table`, the prefix of count queries.
    pub fn count_from(&self) -> String {
        format!("SELECT COUNT(*) FROM {}", self.qualified_table())
    }

    /// SELECT filtered on the key columns.
    pub fn select_by_key(&self) -> CoreResult<String> {
        self.select_where(Facet::Key)
    }

    /// SELECT filtered on the foreign-key columns.
    pub fn select_by_foreign(&self) -> CoreResult<String> {
        self.select_where(Facet::Foreign)
    }

    fn select_where(&self, facet: Facet) -> CoreResult<String> {
        Ok(format!(
            "{} WHERE {}",
            self.select_from()?,
            predicate(self.descriptor, facet)?
        ))
    }

    /// INSERT of every persisted column.
    pub fn insert(&self) -> CoreResult<String> {
        let columns = self.columns()?;
        let placeholders: Vec<String> = numbered(self.descriptor).map(|(p, _)| p).collect();

        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.qualified_table(),
            columns,
            placeholders.join(", ")
        ))
    }

    /// INSERT that updates the non-key columns on a key conflict.
    ///
    /// A single update column renders as `SET c = $n`; an entity made only of
    /// key columns renders `DO NOTHING`.
    pub fn upsert(&self) -> CoreResult<String> {
        let insert = self.insert()?;
        let keys = self.descriptor.key_columns();
        if keys.is_empty() {
            return Err(CoreError::MissingFacet(Facet::Key));
        }

        let (columns, placeholders): (Vec<&str>, Vec<String>) = numbered(self.descriptor)
            .filter(|(_, c)| !c.is_key)
            .map(|(p, c)| (c.column, p))
            .unzip();

        let action = match columns.len() {
            0 => "DO NOTHING".to_string(),
            1 => format!("DO UPDATE SET {} = {}", columns[0], placeholders[0]),
            _ => format!(
                "DO UPDATE SET ({}) = ({})",
                columns.join(", "),
                placeholders.join(", ")
            ),
        };

        Ok(format!("{} ON CONFLICT ({}) {}", insert, keys.join(", "), action))
    }

    /// DELETE filtered on the key columns.
    pub fn delete_by_key(&self) -> CoreResult<String> {
        self.delete_where(Facet::Key)
    }

    /// DELETE filtered on the foreign-key columns.
    pub fn delete_by_foreign(&self) -> CoreResult<String> {
        self.delete_where(Facet::Foreign)
    }

    fn delete_where(&self, facet: Facet) -> CoreResult<String> {
        self.descriptor.ensure_persisted()?;
        Ok(format!(
            "DELETE FROM {} WHERE {}",
            self.qualified_table(),
            predicate(self.descriptor, facet)?
        ))
    }
}

// =============================================================================
// Statement Set
// =============================================================================

/// Every statement for one entity table, rendered once.
///
/// ## Usage
/// ```rust
/// use crudkit_core::{EntityDescriptor, Sample, StatementSet};
///
/// let desc = EntityDescriptor::of::<Sample>().unwrap();
/// let set = StatementSet::build(desc, "sample", "sample").unwrap();
/// assert!(set.delete_by_key.ends_with("WHERE sample_id = $1"));
/// assert!(set.select_by_foreign.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementSet {
    pub descriptor: EntityDescriptor,
    pub select_from: String,
    pub count_from: String,
    pub select_by_key: String,
    pub select_by_foreign: Option<String>,
    pub insert: String,
    pub upsert: String,
    pub delete_by_key: String,
    pub delete_by_foreign: Option<String>,
}

impl StatementSet {
    /// Renders all statements. Key-based statements are required; the
    /// foreign-key ones are present only when the entity declares foreign
    /// columns.
    pub fn build(descriptor: EntityDescriptor, schema: &str, table: &str) -> CoreResult<Self> {
        let generator = StatementGenerator::new(&descriptor, schema, table);

        let select_from = generator.select_from()?;
        let count_from = generator.count_from();
        let select_by_key = generator.select_by_key()?;
        let select_by_foreign = optional(generator.select_by_foreign())?;
        let insert = generator.insert()?;
        let upsert = generator.upsert()?;
        let delete_by_key = generator.delete_by_key()?;
        let delete_by_foreign = optional(generator.delete_by_foreign())?;

        Ok(StatementSet {
            descriptor,
            select_from,
            count_from,
            select_by_key,
            select_by_foreign,
            insert,
            upsert,
            delete_by_key,
            delete_by_foreign,
        })
    }
}

/// Maps a missing foreign facet to `None`, keeping other errors.
fn optional(result: CoreResult<String>) -> CoreResult<Option<String>> {
    match result {
        Ok(sql) => Ok(Some(sql)),
        Err(CoreError::MissingFacet(Facet::Foreign)) => Ok(None),
        Err(e) => Err(e),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Field;

    fn widget() -> EntityDescriptor {
        EntityDescriptor::from_fields(&[
            Field::column("id", "id", "key,sort"),
            Field::column("kind", "type", "sort"),
            Field::column("name", "name", ""),
        ])
        .unwrap()
    }

    fn version() -> EntityDescriptor {
        EntityDescriptor::from_fields(&[
            Field::column("note", "note", ""),
            Field::column("parent", "parent_id", "key,foreign"),
            Field::column("number", "version_number", "key"),
            Field::column("label", "label", ""),
        ])
        .unwrap()
    }

    #[test]
    fn test_select_by_key() {
        let desc = widget();
        let generator = StatementGenerator::new(&desc, "s", "t");

        assert_eq!(
            generator.select_by_key().unwrap(),
            "SELECT id, type, name FROM s.t WHERE id = $1"
        );
    }

    #[test]
    fn test_key_placeholders_keep_global_position() {
        let desc = version();
        let generator = StatementGenerator::new(&desc, "s", "v");

        assert_eq!(
            generator.select_by_key().unwrap(),
            "SELECT note, parent_id, version_number, label FROM s.v \
             WHERE parent_id = $2 AND version_number = $3"
        );
        assert_eq!(
            generator.select_by_foreign().unwrap(),
            "SELECT note, parent_id, version_number, label FROM s.v WHERE parent_id = $2"
        );
        assert_eq!(
            generator.delete_by_key().unwrap(),
            "DELETE FROM s.v WHERE parent_id = $2 AND version_number = $3"
        );
        assert_eq!(
            generator.delete_by_foreign().unwrap(),
            "DELETE FROM s.v WHERE parent_id = $2"
        );
    }

    #[test]
    fn test_insert_has_one_placeholder_per_column() {
        let desc = widget();
        let sql = StatementGenerator::new(&desc, "s", "t").insert().unwrap();

        assert_eq!(sql, "INSERT INTO s.t (id, type, name) VALUES ($1, $2, $3)");
        assert_eq!(sql.matches('$').count(), desc.len());
    }

    #[test]
    fn test_upsert_conflict_target_is_key_columns() {
        let desc = version();
        let sql = StatementGenerator::new(&desc, "s", "v").upsert().unwrap();

        assert_eq!(
            sql,
            "INSERT INTO s.v (note, parent_id, version_number, label) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (parent_id, version_number) DO UPDATE SET (note, label) = ($1, $4)"
        );
    }

    #[test]
    fn test_upsert_single_and_no_update_columns() {
        let single = EntityDescriptor::from_fields(&[
            Field::column("id", "id", "key"),
            Field::column("v", "value", ""),
        ])
        .unwrap();
        assert!(StatementGenerator::new(&single, "s", "t")
            .upsert()
            .unwrap()
            .ends_with("ON CONFLICT (id) DO UPDATE SET value = $2"));

        let keys_only = EntityDescriptor::from_fields(&[
            Field::column("a", "a", "key"),
            Field::column("b", "b", "key"),
        ])
        .unwrap();
        assert!(StatementGenerator::new(&keys_only, "s", "t")
            .upsert()
            .unwrap()
            .ends_with("ON CONFLICT (a, b) DO NOTHING"));
    }

    #[test]
    fn test_missing_facets() {
        let desc = widget();
        let generator = StatementGenerator::new(&desc, "s", "t");
        assert_eq!(
            generator.select_by_foreign(),
            Err(CoreError::MissingFacet(Facet::Foreign))
        );

        let no_key = EntityDescriptor::from_fields(&[Field::column("a", "a", "")]).unwrap();
        let generator = StatementGenerator::new(&no_key, "s", "t");
        assert_eq!(generator.upsert(), Err(CoreError::MissingFacet(Facet::Key)));
        assert_eq!(generator.delete_by_key(), Err(CoreError::MissingFacet(Facet::Key)));
    }

    #[test]
    fn test_empty_descriptor_is_a_configuration_error() {
        let empty = EntityDescriptor::default();
        let generator = StatementGenerator::new(&empty, "s", "t");
        assert_eq!(generator.insert(), Err(CoreError::NoPersistedColumns));
        assert_eq!(generator.select_from(), Err(CoreError::NoPersistedColumns));
    }

    #[test]
    fn test_no_trailing_separators() {
        let desc = version();
        let set = StatementSet::build(desc, "s", "v").unwrap();

        for sql in [
            &set.select_by_key,
            &set.insert,
            &set.upsert,
            &set.delete_by_key,
        ] {
            assert!(!sql.ends_with(", "), "{sql}");
            assert!(!sql.ends_with(" AND "), "{sql}");
            assert!(!sql.contains(", )"), "{sql}");
        }
    }

    #[test]
    fn test_statement_set_without_foreign_columns() {
        let set = StatementSet::build(widget(), "s", "t").unwrap();

        assert_eq!(set.select_from, "SELECT id, type, name FROM s.t");
        assert_eq!(set.count_from, "SELECT COUNT(*) FROM s.t");
        assert!(set.select_by_foreign.is_none());
        assert!(set.delete_by_foreign.is_none());
    }
}
