//! # Domain Types
//!
//! Sample entities served by the repository layer, with their field tables.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────────┐        ┌──────────────────────────┐      │
//! │  │         Sample           │ 1    * │      SampleVersion       │      │
//! │  │  ──────────────────────  │───────►│  ──────────────────────  │      │
//! │  │  sample_id      key,sort │        │  sample_id   key,foreign │      │
//! │  │  sample_type    sort     │        │  version_number      key │      │
//! │  │  sample_name    sort     │        │  audit columns           │      │
//! │  │  description, version    │        └──────────────────────────┘      │
//! │  │  audit columns           │                                          │
//! │  │  sample_versions (nested,│   SampleQuery / SampleVersionQuery       │
//! │  │   not persisted)         │   (list filters, empty = no filter)      │
//! │  └──────────────────────────┘                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Field Tables
//! Each entity's `fields()` is the single declaration of which struct
//! fields map to which columns. Field order here IS placeholder order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::descriptor::Field;
use crate::marshal::{Entity, SqlValue};

// =============================================================================
// Write Action
// =============================================================================

/// Write operation selected by an action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Insert,
    Update,
    Delete,
}

impl WriteAction {
    /// Parses an action code by its first letter: `I…`, `U…`, `D…`.
    ///
    /// ## Example
    /// ```rust
    /// use crudkit_core::WriteAction;
    ///
    /// assert_eq!(WriteAction::parse("INSERT"), Some(WriteAction::Insert));
    /// assert_eq!(WriteAction::parse("U"), Some(WriteAction::Update));
    /// assert_eq!(WriteAction::parse("x"), None);
    /// ```
    pub fn parse(code: &str) -> Option<Self> {
        match code.chars().next()? {
            'I' => Some(WriteAction::Insert),
            'U' => Some(WriteAction::Update),
            'D' => Some(WriteAction::Delete),
            _ => None,
        }
    }
}

// =============================================================================
// Sample
// =============================================================================

/// A sample record with its version history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Business identifier.
    pub sample_id: String,

    /// Category, e.g. `Type_A`.
    pub sample_type: String,

    pub sample_name: String,
    pub sample_description: String,

    /// Version currently in use.
    pub sample_active_version: String,

    /// Version history, attached after the row is read.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sample_versions: Option<Vec<SampleVersion>>,

    #[ts(as = "Option<String>")]
    pub create_date: Option<DateTime<Utc>>,
    pub create_user: String,
    pub create_approver: String,

    #[ts(as = "Option<String>")]
    pub update_date: Option<DateTime<Utc>>,
    pub update_user: String,
    pub update_approver: String,
}

impl Sample {
    /// A sample carrying only its key, for key-based statements.
    pub fn with_id(sample_id: impl Into<String>) -> Self {
        Sample {
            sample_id: sample_id.into(),
            ..Sample::default()
        }
    }
}

impl Entity for Sample {
    fn fields() -> &'static [Field] {
        const FIELDS: &[Field] = &[
            Field::column("sample_id", "sample_id", "key,sort"),
            Field::column("sample_type", "sample_type", "sort"),
            Field::column("sample_name", "sample_name", "sort"),
            Field::column("sample_description", "sample_description", ""),
            Field::column("sample_active_version", "sample_active_version", ""),
            Field::transient("sample_versions"),
            Field::column("create_date", "create_date", ""),
            Field::column("create_user", "create_user", ""),
            Field::column("create_approver", "create_approver", ""),
            Field::column("update_date", "update_date", ""),
            Field::column("update_user", "update_user", ""),
            Field::column("update_approver", "update_approver", ""),
        ];
        FIELDS
    }

    fn field_value(&self, field: &str) -> Option<SqlValue> {
        let value: SqlValue = match field {
            "sample_id" => (&self.sample_id).into(),
            "sample_type" => (&self.sample_type).into(),
            "sample_name" => (&self.sample_name).into(),
            "sample_description" => (&self.sample_description).into(),
            "sample_active_version" => (&self.sample_active_version).into(),
            "create_date" => self.create_date.into(),
            "create_user" => (&self.create_user).into(),
            "create_approver" => (&self.create_approver).into(),
            "update_date" => self.update_date.into(),
            "update_user" => (&self.update_user).into(),
            "update_approver" => (&self.update_approver).into(),
            _ => return None,
        };
        Some(value)
    }
}

// =============================================================================
// Sample Version
// =============================================================================

/// One version of a sample. Keyed by (sample_id, version_number).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SampleVersion {
    /// Owning sample.
    pub sample_id: String,
    pub version_number: String,

    #[ts(as = "Option<String>")]
    pub create_date: Option<DateTime<Utc>>,
    pub create_user: String,
    pub create_approver: String,

    #[ts(as = "Option<String>")]
    pub update_date: Option<DateTime<Utc>>,
    pub update_user: String,
    pub update_approver: String,
}

impl SampleVersion {
    /// A version carrying only its key.
    pub fn with_key(sample_id: impl Into<String>, version_number: impl Into<String>) -> Self {
        SampleVersion {
            sample_id: sample_id.into(),
            version_number: version_number.into(),
            ..SampleVersion::default()
        }
    }
}

impl Entity for SampleVersion {
    fn fields() -> &'static [Field] {
        const FIELDS: &[Field] = &[
            Field::column("sample_id", "sample_id", "key,foreign"),
            Field::column("version_number", "version_number", "key"),
            Field::column("create_date", "create_date", ""),
            Field::column("create_user", "create_user", ""),
            Field::column("create_approver", "create_approver", ""),
            Field::column("update_date", "update_date", ""),
            Field::column("update_user", "update_user", ""),
            Field::column("update_approver", "update_approver", ""),
        ];
        FIELDS
    }

    fn field_value(&self, field: &str) -> Option<SqlValue> {
        let value: SqlValue = match field {
            "sample_id" => (&self.sample_id).into(),
            "version_number" => (&self.version_number).into(),
            "create_date" => self.create_date.into(),
            "create_user" => (&self.create_user).into(),
            "create_approver" => (&self.create_approver).into(),
            "update_date" => self.update_date.into(),
            "update_user" => (&self.update_user).into(),
            "update_approver" => (&self.update_approver).into(),
            _ => return None,
        };
        Some(value)
    }
}

// =============================================================================
// Query Filters
// =============================================================================

/// Filter for sample lists. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SampleQuery {
    pub sample_id: String,
    pub sample_type: String,
}

/// Filter for version lists. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SampleVersionQuery {
    pub sample_id: String,
    pub version_number: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
