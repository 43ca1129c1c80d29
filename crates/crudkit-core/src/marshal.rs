//! # Argument Marshaller
//!
//! Produces the positional argument list matching a generated statement.
//!
//! ## Pairing With The Statement Generator
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  EntityDescriptor.columns()   (declared order)                          │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  statement::*                        marshal(&entity)                   │
//! │  "... WHERE sample_id = $1"          [Text("S-1"), Text("A"), ...]      │
//! │       │                                   │                             │
//! │       └──────────────┬────────────────────┘                             │
//! │                      ▼                                                  │
//! │           $n  ⇔  values[n - 1]                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both sides walk the same descriptor, so the marshaller cannot reorder or
//! skip a column; it can only fail when an entity's `field_value` does not
//! know a declared field.

use chrono::{DateTime, Utc};

use crate::descriptor::{EntityDescriptor, Field};
use crate::error::{CoreError, CoreResult};

// =============================================================================
// SQL Value
// =============================================================================

/// One positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl SqlValue {
    /// Returns whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

// =============================================================================
// Entity
// =============================================================================

/// A record type with a registration-time field table.
///
/// ## Implementing
/// ```rust
/// use crudkit_core::descriptor::Field;
/// use crudkit_core::marshal::{Entity, SqlValue};
///
/// struct Tag { id: String, label: String }
///
/// impl Entity for Tag {
///     fn fields() -> &'static [Field] {
///         const FIELDS: &[Field] = &[
///             Field::column("id", "tag_id", "key"),
///             Field::column("label", "label", "sort"),
///         ];
///         FIELDS
///     }
///
///     fn field_value(&self, field: &str) -> Option<SqlValue> {
///         match field {
///             "id" => Some((&self.id).into()),
///             "label" => Some((&self.label).into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Entity {
    /// Declared fields, in the order that fixes placeholder numbering.
    fn fields() -> &'static [Field];

    /// Value of a persisted field, or `None` for an unknown field name.
    fn field_value(&self, field: &str) -> Option<SqlValue>;
}

/// Extracts one value per persisted column, in descriptor order.
///
/// ## Errors
/// [`CoreError::UnmappedField`] when the entity cannot produce a value for a
/// declared column.
pub fn marshal<E: Entity>(entity: &E, descriptor: &EntityDescriptor) -> CoreResult<Vec<SqlValue>> {
    descriptor
        .columns()
        .iter()
        .map(|c| {
            entity
                .field_value(c.field)
                .ok_or_else(|| CoreError::UnmappedField(c.field.to_string()))
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
