//! # crudkit-db: Database Layer for crudkit
//!
//! This crate executes the statements rendered by `crudkit-core` against
//! SQLite using sqlx, over separate reader and writer pools.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        crudkit Data Flow                                │
//! │                                                                         │
//! │  Handler (list samples / write sample)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    crudkit-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (sample.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │                │    │              │  │   │
//! │  │   │ reader pool   │◄───│ SampleRepo     │    │ 001_init.sql │  │   │
//! │  │   │ writer pool   │    │ StatementSet×2 │    │              │  │   │
//! │  │   │ DbConfig      │    │ batch tx       │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │           main.sample, main.sample_version                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Pools and configuration (builder + environment)
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Statement-driven repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crudkit_db::{Database, DbConfig};
//! use crudkit_core::{PageRequest, SampleQuery};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let (samples, info) = db
//!     .samples()?
//!     .list(&SampleQuery::default(), &PageRequest::first(20))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ResultExt};
pub use pool::{ConfigError, Database, DbConfig};

// Repository re-exports for convenience
pub use repository::sample::SampleRepository;
