//! # crudkit-core: Pure Statement Generation for crudkit
//!
//! This crate turns declarative entity field tables into parameterized SQL
//! text and matching argument lists, and does the page/sort arithmetic for
//! list queries. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        crudkit Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ crudkit-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ descriptor │─►│ statement │  │  marshal  │  │pagination │  │   │
//! │  │   │ Field      │  │ SELECT    │  │ SqlValue  │  │ PageInfo  │  │   │
//! │  │   │ Facets     │─►│ UPSERT .. │  │ Entity    │  │ ORDER BY  │  │   │
//! │  │   └────────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  crudkit-db (Database Layer)                    │   │
//! │  │        executes statements, count + page queries, batches       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`descriptor`] - Field tables → ordered column descriptors
//! - [`statement`] - SELECT/INSERT/UPSERT/DELETE text with `$n` placeholders
//! - [`marshal`] - Entity values → positional argument lists
//! - [`pagination`] - Page requests, ORDER BY allow-listing, page info
//! - [`types`] - Sample entities and their field tables
//! - [`error`] - Configuration error types
//!
//! ## Example Usage
//!
//! ```rust
//! use crudkit_core::{marshal, EntityDescriptor, Sample, StatementGenerator};
//!
//! let desc = EntityDescriptor::of::<Sample>().unwrap();
//! let sql = StatementGenerator::new(&desc, "sample", "sample")
//!     .delete_by_key()
//!     .unwrap();
//! assert_eq!(sql, "DELETE FROM sample.sample WHERE sample_id = $1");
//!
//! let args = marshal(&Sample::with_id("S-1"), &desc).unwrap();
//! assert_eq!(args.len(), desc.len());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod descriptor;
pub mod error;
pub mod marshal;
pub mod pagination;
pub mod statement;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use descriptor::{ColumnDescriptor, EntityDescriptor, Facet, Facets, Field};
pub use error::{CoreError, CoreResult};
pub use marshal::{marshal, Entity, SqlValue};
pub use pagination::{
    compute_page_info, limit_and_offset, resolve_order_clause, PageInfo, PageRequest, RowsPerPage,
    SortDirection,
};
pub use statement::{StatementGenerator, StatementSet};
pub use types::*;
