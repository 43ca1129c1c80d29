//! # Repository Module
//!
//! Repositories that execute the statements rendered by crudkit-core.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Statement-Driven Repositories                        │
//! │                                                                         │
//! │  Construction (once)                                                   │
//! │       │  EntityDescriptor::of::<Sample>()                              │
//! │       │  StatementSet::build(desc, schema, "sample")                   │
//! │       ▼                                                                 │
//! │  SampleRepository { samples: StatementSet, versions: StatementSet }    │
//! │       │                                                                 │
//! │       │  repo.upsert(&sample)                                          │
//! │       ▼                                                                 │
//! │  marshal(&sample) ─► [SqlValue; n] ─► bind_all ─► sqlx::query(upsert) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SampleRepository`](sample::SampleRepository) - Samples with nested versions

pub mod sample;

use crudkit_core::SqlValue;
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

/// Binds [`SqlValue`] argument lists onto sqlx queries.
///
/// Values are bound in order, so `$n` receives `values[n - 1]`.
pub(crate) trait BindSql<'q>: Sized {
    /// Binds one value as the next positional argument.
    fn bind_sql(self, value: &SqlValue) -> Self;

    /// Binds every value in order.
    fn bind_all(self, values: &[SqlValue]) -> Self {
        values.iter().fold(self, |query, value| query.bind_sql(value))
    }
}

macro_rules! bind_sql_value {
    ($query:expr, $value:expr) => {
        match $value {
            SqlValue::Text(s) => $query.bind(s.clone()),
            SqlValue::Int(i) => $query.bind(*i),
            SqlValue::Float(f) => $query.bind(*f),
            SqlValue::Bool(b) => $query.bind(*b),
            SqlValue::Timestamp(ts) => $query.bind(*ts),
            SqlValue::Null => $query.bind(None::<String>),
        }
    };
}

impl<'q> BindSql<'q> for Query<'q, Sqlite, SqliteArguments<'q>> {
    fn bind_sql(self, value: &SqlValue) -> Self {
        bind_sql_value!(self, value)
    }
}

impl<'q, O> BindSql<'q> for QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    fn bind_sql(self, value: &SqlValue) -> Self {
        bind_sql_value!(self, value)
    }
}

impl<'q, O> BindSql<'q> for QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
    fn bind_sql(self, value: &SqlValue) -> Self {
        bind_sql_value!(self, value)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sqlx::SqlitePool;

    #[tokio::test]
    async fn test_values_bind_in_placeholder_order() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let values = vec![
            SqlValue::Text("a".to_string()),
            SqlValue::Int(2),
            SqlValue::Null,
        ];

        let (text, int, null): (String, i64, Option<String>) =
            sqlx::query_as("SELECT $1, $2, $3")
                .bind_all(&values)
                .fetch_one(&pool)
                .await
                .unwrap();

        assert_eq!(text, "a");
        assert_eq!(int, 2);
        assert!(null.is_none());
    }

    #[tokio::test]
    async fn test_repeated_placeholder_reuses_value() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let values = vec![SqlValue::Text(String::new())];

        let matched: bool = sqlx::query_scalar("SELECT ($1 IS NULL OR $1 = '')")
            .bind_all(&values)
            .fetch_one(&pool)
            .await
            .unwrap();

        assert!(matched);
    }

    #[tokio::test]
    async fn test_timestamp_round_trips_as_text() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let back: chrono::DateTime<Utc> = sqlx::query_scalar("SELECT $1")
            .bind_all(&[SqlValue::Timestamp(ts)])
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(back, ts);
    }
}
