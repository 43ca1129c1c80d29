//! # Error Types
//!
//! Configuration error types for crudkit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  crudkit-core errors (this file)                                       │
//! │  └── CoreError        - Entity declaration / argument mistakes          │
//! │                                                                         │
//! │  crudkit-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: CoreError → DbError::Configuration → caller                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Counts As An Error Here
//! Statement generation and marshalling never fail for a well-formed entity
//! declaration. Every variant below is a programming mistake in an entity's
//! field table, surfaced as early as possible (ideally by a unit test).

use thiserror::Error;

use crate::descriptor::Facet;

// =============================================================================
// Core Error
// =============================================================================

/// Entity configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A facet list contains a token other than `key`, `sort` or `foreign`.
    ///
    /// ## When This Occurs
    /// - Typo in a field table: `facets: "kye"`
    /// - A marker from another mapping layer leaked in
    #[error("Unknown facet '{token}' on field {field}")]
    UnknownFacet { field: String, token: String },

    /// The entity declares no persisted column at all.
    #[error("Entity declares no persisted columns")]
    NoPersistedColumns,

    /// A statement needs columns carrying a facet the entity never declares.
    ///
    /// ## When This Occurs
    /// - Rendering DELETE-by-key for an entity without key columns
    /// - Rendering SELECT-by-foreign-key for a root entity
    #[error("Entity declares no {0} columns")]
    MissingFacet(Facet),

    /// The marshaller was asked for a field the entity cannot produce.
    #[error("Entity has no value for persisted field {0}")]
    UnmappedField(String),

    /// A value list does not match the statement's placeholder count.
    #[error("Expected {expected} arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
