//! # Field Descriptor Extractor
//!
//! Turns an entity's field table into an ordered list of persisted columns.
//!
//! ## From Declaration To Descriptor
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Field Table → Entity Descriptor                      │
//! │                                                                         │
//! │  Field { name: "sample_id",       column: Some("sample_id"),           │
//! │          facets: "key,sort" }                    ──► key + sortable     │
//! │  Field { name: "sample_type",     column: Some("sample_type"),         │
//! │          facets: "sort" }                        ──► sortable          │
//! │  Field { name: "sample_versions", column: None,                        │
//! │          facets: "" }                            ──► ignored           │
//! │                                                                         │
//! │  EntityDescriptor                                                       │
//! │  ├── insert_columns   [sample_id, sample_type, ...]  (declared order)  │
//! │  ├── key_columns      [sample_id]                                      │
//! │  ├── update_columns   [sample_type, ...]             (insert − key)    │
//! │  ├── sort_allow_list  [sample_id, sample_type]                         │
//! │  └── foreign_columns  []                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Is The Contract
//! The declared order fixes the `$n` placeholder numbers used by the
//! [`statement`](crate::statement) module and the value order produced by the
//! [`marshal`](crate::marshal) module. Both walk [`EntityDescriptor::columns`].

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::marshal::Entity;

// =============================================================================
// Field Declaration
// =============================================================================

/// One declared field of an entity type.
///
/// Fields without a `column` are never persisted (nested collections,
/// computed values).
///
/// ## Example
/// ```rust
/// use crudkit_core::descriptor::Field;
///
/// const FIELDS: &[Field] = &[
///     Field::column("id", "id", "key,sort"),
///     Field::column("name", "name", ""),
///     Field::transient("children"),
/// ];
/// assert_eq!(FIELDS.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Source field name, used by the marshaller to look up values.
    pub name: &'static str,

    /// Column name; `None` means the field is not persisted.
    pub column: Option<&'static str>,

    /// Comma-separated facet markers: `key`, `sort`, `foreign`.
    pub facets: &'static str,
}

impl Field {
    /// Declares a persisted field.
    pub const fn column(name: &'static str, column: &'static str, facets: &'static str) -> Self {
        Field {
            name,
            column: Some(column),
            facets,
        }
    }

    /// Declares a field that is never written to or read from a column.
    pub const fn transient(name: &'static str) -> Self {
        Field {
            name,
            column: None,
            facets: "",
        }
    }
}

// =============================================================================
// Facets
// =============================================================================

/// A structural role a column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Primary-key component.
    Key,
    /// Allowed in ORDER BY.
    Sort,
    /// Foreign-key component pointing at a parent entity.
    Foreign,
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facet::Key => write!(f, "key"),
            Facet::Sort => write!(f, "sort"),
            Facet::Foreign => write!(f, "foreign"),
        }
    }
}

/// Independent facet flags of one column. Any combination is valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Facets {
    pub key: bool,
    pub sort: bool,
    pub foreign: bool,
}

impl Facets {
    /// Parses a facet list such as `"key,sort"` or `"key, foreign"`.
    ///
    /// Tokens are matched exactly after trimming; empty tokens are skipped.
    ///
    /// ## Errors
    /// [`CoreError::UnknownFacet`] for any other token.
    pub fn parse(field: &str, raw: &str) -> CoreResult<Self> {
        let mut facets = Facets::default();

        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token {
                "key" => facets.key = true,
                "sort" => facets.sort = true,
                "foreign" => facets.foreign = true,
                other => {
                    return Err(CoreError::UnknownFacet {
                        field: field.to_string(),
                        token: other.to_string(),
                    })
                }
            }
        }

        Ok(facets)
    }

    /// Returns whether the given facet is set.
    pub fn has(&self, facet: Facet) -> bool {
        match facet {
            Facet::Key => self.key,
            Facet::Sort => self.sort,
            Facet::Foreign => self.foreign,
        }
    }
}

// =============================================================================
// Column Descriptor
// =============================================================================

/// A persisted column and the roles it plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Field name on the entity.
    pub field: &'static str,
    /// Column name in the table.
    pub column: &'static str,
    pub is_key: bool,
    pub is_sortable: bool,
    pub is_foreign_key: bool,
}

impl ColumnDescriptor {
    /// Returns whether this column carries the given facet.
    pub fn has(&self, facet: Facet) -> bool {
        match facet {
            Facet::Key => self.is_key,
            Facet::Sort => self.is_sortable,
            Facet::Foreign => self.is_foreign_key,
        }
    }
}

// =============================================================================
// Entity Descriptor
// =============================================================================

/// Ordered persisted columns of one entity type.
///
/// Pure function of the field table; build it once and share it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityDescriptor {
    columns: Vec<ColumnDescriptor>,
}

impl EntityDescriptor {
    /// Extracts the descriptor from a field table.
    ///
    /// A table with no persisted fields yields an empty descriptor, not an
    /// error; see [`EntityDescriptor::ensure_persisted`].
    pub fn from_fields(fields: &[Field]) -> CoreResult<Self> {
        let mut columns = Vec::with_capacity(fields.len());

        for field in fields {
            let Some(column) = field.column else {
                continue;
            };
            let facets = Facets::parse(field.name, field.facets)?;
            columns.push(ColumnDescriptor {
                field: field.name,
                column,
                is_key: facets.key,
                is_sortable: facets.sort,
                is_foreign_key: facets.foreign,
            });
        }

        Ok(EntityDescriptor { columns })
    }

    /// Extracts the descriptor of an [`Entity`] type.
    pub fn of<E: Entity>() -> CoreResult<Self> {
        Self::from_fields(E::fields())
    }

    /// All persisted columns in declared order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Number of persisted columns (and of positional arguments).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Fails with [`CoreError::NoPersistedColumns`] on an empty descriptor.
    pub fn ensure_persisted(&self) -> CoreResult<()> {
        if self.columns.is_empty() {
            return Err(CoreError::NoPersistedColumns);
        }
        Ok(())
    }

    /// Column names carrying the given facet, in declared order.
    pub fn columns_with(&self, facet: Facet) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.has(facet))
            .map(|c| c.column)
            .collect()
    }

    /// Primary-key columns.
    pub fn key_columns(&self) -> Vec<&'static str> {
        self.columns_with(Facet::Key)
    }

    /// Every persisted column.
    pub fn insert_columns(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.column).collect()
    }

    /// Persisted columns minus key columns.
    pub fn update_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| !c.is_key)
            .map(|c| c.column)
            .collect()
    }

    /// Columns a caller may sort by.
    pub fn sort_allow_list(&self) -> Vec<&'static str> {
        self.columns_with(Facet::Sort)
    }

    /// Foreign-key columns.
    pub fn foreign_columns(&self) -> Vec<&'static str> {
        self.columns_with(Facet::Foreign)
    }

    /// Key columns joined for use as the tie-breaking ORDER BY term.
    pub fn base_key(&self) -> String {
        self.key_columns().join(", ")
    }

    /// Checks that a value list matches the placeholder count.
    pub fn check_arity(&self, actual: usize) -> CoreResult<()> {
        if actual != self.columns.len() {
            return Err(CoreError::ArityMismatch {
                expected: self.columns.len(),
                actual,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
