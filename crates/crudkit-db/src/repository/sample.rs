//! # Sample Repository
//!
//! Database operations for samples and their versions.
//!
//! ## Key Operations
//! - Paged, sorted, searched sample lists with page info
//! - Key-based CRUD for samples and versions
//! - Nested version collections on every returned sample
//! - All-or-nothing batch upsert of versions
//!
//! ## List Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How list() Works                                     │
//! │                                                                         │
//! │  SampleQuery { sample_id, sample_type } + PageRequest                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. SELECT COUNT(*) FROM main.sample WHERE <filter>     (reader)       │
//! │       │  compute_page_info(total)                                      │
//! │       ▼                                                                 │
//! │  2. SELECT <cols> FROM main.sample WHERE <filter>                      │
//! │        ORDER BY <allow-listed column> <DIR>, sample_id                 │
//! │        LIMIT $4 OFFSET $5                               (reader)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. for each row, in order:                                            │
//! │        SELECT <cols> FROM main.sample_version WHERE sample_id = $1     │
//! │        row.sample_versions = Some(versions)                            │
//! │                                                                         │
//! │  Filter: empty sample_id/sample_type/search means "don't filter";      │
//! │  search matches sample_id, sample_type or description, any case.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crudkit_core::{
    compute_page_info, limit_and_offset, marshal, resolve_order_clause, CoreError, Entity,
    EntityDescriptor, Facet, PageInfo, PageRequest, RowsPerPage, Sample, SampleQuery,
    SampleVersion, SampleVersionQuery, SqlValue, StatementSet, WriteAction,
};

use super::BindSql;
use crate::error::{DbError, DbResult, ResultExt};

const SAMPLE_TABLE: &str = "sample";
const VERSION_TABLE: &str = "sample_version";

/// Filter shared by the count and page queries. `$1` id, `$2` type, `$3` search.
const SAMPLE_FILTER: &str = " WHERE ($1 IS NULL OR $1 = '' OR sample_id = $1) \
AND ($2 IS NULL OR $2 = '' OR sample_type = $2) \
AND ($3 IS NULL OR $3 = '' OR $3 = '%%' \
OR lower(sample_id) LIKE lower($3) \
OR lower(sample_type) LIKE lower($3) \
OR lower(sample_description) LIKE lower($3))";

/// `$1` sample id, `$2` version number.
const VERSION_FILTER: &str = " WHERE ($1 IS NULL OR $1 = '' OR sample_id = $1) \
AND ($2 IS NULL OR $2 = '' OR version_number = $2)";

/// Repository for samples and sample versions.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.samples()?;
///
/// let (samples, info) = repo.list(&SampleQuery::default(), &PageRequest::first(20)).await?;
/// repo.apply("U", &sample).await?;
/// repo.batch_upsert_versions(&versions).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SampleRepository {
    reader: SqlitePool,
    writer: SqlitePool,
    samples: StatementSet,
    versions: StatementSet,
    rows_per_page: RowsPerPage,
}

impl SampleRepository {
    /// Creates a repository, rendering every statement once.
    ///
    /// ## Errors
    /// `DbError::Configuration` when a field table is malformed.
    pub fn new(
        reader: SqlitePool,
        writer: SqlitePool,
        schema: &str,
        rows_per_page: RowsPerPage,
    ) -> DbResult<Self> {
        let samples = statements::<Sample>(schema, SAMPLE_TABLE)?;
        let versions = statements::<SampleVersion>(schema, VERSION_TABLE)?;

        debug!(
            schema = %schema,
            upsert = %samples.upsert,
            "Sample statements prepared"
        );

        Ok(SampleRepository {
            reader,
            writer,
            samples,
            versions,
            rows_per_page,
        })
    }

    // =========================================================================
    // Samples
    // =========================================================================

    /// Lists one page of samples with their versions attached.
    ///
    /// ## Returns
    /// The rows of the requested page, in order, and the page info computed
    /// from the total matching count.
    pub async fn list(
        &self,
        filter: &SampleQuery,
        page: &PageRequest,
    ) -> DbResult<(Vec<Sample>, PageInfo)> {
        self.query_samples(filter, page)
            .await
            .context("SampleRepository::list")
    }

    /// First sample matching the filter, or `None`.
    pub async fn get_one(&self, filter: &SampleQuery) -> DbResult<Option<Sample>> {
        let (rows, _) = self
            .query_samples(filter, &PageRequest::first(1))
            .await
            .context("SampleRepository::get_one")?;

        Ok(rows.into_iter().next())
    }

    /// Sample with the same key as `key`, with versions attached.
    pub async fn get_by_key(&self, key: &Sample) -> DbResult<Option<Sample>> {
        self.query_by_key(key)
            .await
            .context("SampleRepository::get_by_key")
    }

    /// Inserts a sample. Fails on an existing key.
    pub async fn insert(&self, sample: &Sample) -> DbResult<u64> {
        debug!(sample_id = %sample.sample_id, "Inserting sample");
        self.execute(&self.samples.insert, sample, &self.samples)
            .await
            .context("SampleRepository::insert")
    }

    /// Inserts a sample or updates every non-key column of the existing row.
    pub async fn upsert(&self, sample: &Sample) -> DbResult<u64> {
        debug!(sample_id = %sample.sample_id, "Upserting sample");
        self.execute(&self.samples.upsert, sample, &self.samples)
            .await
            .context("SampleRepository::upsert")
    }

    /// Deletes the sample with the same key. Returns rows affected.
    pub async fn delete_one(&self, key: &Sample) -> DbResult<u64> {
        debug!(sample_id = %key.sample_id, "Deleting sample");
        self.execute(&self.samples.delete_by_key, key, &self.samples)
            .await
            .context("SampleRepository::delete_one")
    }

    /// Dispatches on an action code: `I…` insert, `U…` upsert, `D…` delete.
    ///
    /// Any other code does nothing and returns `Ok(0)`.
    pub async fn apply(&self, action: &str, sample: &Sample) -> DbResult<u64> {
        match WriteAction::parse(action) {
            Some(WriteAction::Insert) => self.insert(sample).await,
            Some(WriteAction::Update) => self.upsert(sample).await,
            Some(WriteAction::Delete) => self.delete_one(sample).await,
            None => {
                debug!(action = %action, "Ignoring unknown sample action");
                Ok(0)
            }
        }
    }

    // =========================================================================
    // Sample Versions
    // =========================================================================

    /// Versions matching the filter, ordered by key.
    pub async fn list_versions(&self, filter: &SampleVersionQuery) -> DbResult<Vec<SampleVersion>> {
        self.query_versions(filter)
            .await
            .context("SampleRepository::list_versions")
    }

    /// First version matching the filter, or `None`.
    pub async fn get_version(&self, filter: &SampleVersionQuery) -> DbResult<Option<SampleVersion>> {
        let rows = self
            .query_versions(filter)
            .await
            .context("SampleRepository::get_version")?;

        Ok(rows.into_iter().next())
    }

    /// Every version belonging to `sample_id`.
    pub async fn versions_of(&self, sample_id: &str) -> DbResult<Vec<SampleVersion>> {
        self.query_versions_of(sample_id)
            .await
            .context("SampleRepository::versions_of")
    }

    /// Inserts a version. Fails on an existing key or a missing sample.
    pub async fn insert_version(&self, version: &SampleVersion) -> DbResult<u64> {
        self.execute(&self.versions.insert, version, &self.versions)
            .await
            .context("SampleRepository::insert_version")
    }

    /// Inserts a version or updates its audit columns.
    pub async fn upsert_version(&self, version: &SampleVersion) -> DbResult<u64> {
        self.execute(&self.versions.upsert, version, &self.versions)
            .await
            .context("SampleRepository::upsert_version")
    }

    /// Deletes the version with the same (sample_id, version_number).
    pub async fn delete_version(&self, key: &SampleVersion) -> DbResult<u64> {
        self.execute(&self.versions.delete_by_key, key, &self.versions)
            .await
            .context("SampleRepository::delete_version")
    }

    /// Deletes every version belonging to `sample_id`.
    pub async fn delete_versions_of(&self, sample_id: &str) -> DbResult<u64> {
        self.remove_versions_of(sample_id)
            .await
            .context("SampleRepository::delete_versions_of")
    }

    /// Version counterpart of [`apply`](Self::apply).
    pub async fn apply_version(&self, action: &str, version: &SampleVersion) -> DbResult<u64> {
        match WriteAction::parse(action) {
            Some(WriteAction::Insert) => self.insert_version(version).await,
            Some(WriteAction::Update) => self.upsert_version(version).await,
            Some(WriteAction::Delete) => self.delete_version(version).await,
            None => {
                debug!(action = %action, "Ignoring unknown version action");
                Ok(0)
            }
        }
    }

    /// Upserts every version in one writer transaction.
    ///
    /// ## Atomicity
    /// ```text
    /// BEGIN
    ///   upsert v1  ✓
    ///   upsert v2  ✗ ─► transaction dropped (ROLLBACK), error returned
    ///   upsert v3  (never sent)
    /// COMMIT  ← only reached when every statement succeeded
    /// ```
    pub async fn batch_upsert_versions(&self, versions: &[SampleVersion]) -> DbResult<u64> {
        if versions.is_empty() {
            return Ok(0);
        }

        self.upsert_versions_atomically(versions)
            .await
            .context("SampleRepository::batch_upsert_versions")
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn query_samples(
        &self,
        filter: &SampleQuery,
        page: &PageRequest,
    ) -> DbResult<(Vec<Sample>, PageInfo)> {
        let filter_values = [
            SqlValue::from(&filter.sample_id),
            SqlValue::from(&filter.sample_type),
            SqlValue::from(page.search_pattern()),
        ];

        let count_sql = format!("{}{}", self.samples.count_from, SAMPLE_FILTER);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind_all(&filter_values)
            .fetch_one(&self.reader)
            .await?;

        let info = compute_page_info(page, total, self.rows_per_page);

        let descriptor = &self.samples.descriptor;
        let order = resolve_order_clause(&descriptor.base_key(), &descriptor.sort_allow_list(), page);
        // SQLite reads LIMIT -1 as "no limit"
        let (limit, offset) = limit_and_offset(page.page_size, page.page).unwrap_or((-1, 0));

        let page_sql = format!(
            "{}{} ORDER BY {} LIMIT $4 OFFSET $5",
            self.samples.select_from, SAMPLE_FILTER, order
        );

        debug!(
            total = total,
            order = %order,
            limit = limit,
            offset = offset,
            "Listing samples"
        );

        let mut rows: Vec<Sample> = sqlx::query_as(&page_sql)
            .bind_all(&filter_values)
            .bind_sql(&SqlValue::Int(limit))
            .bind_sql(&SqlValue::Int(offset))
            .fetch_all(&self.reader)
            .await?;

        for sample in &mut rows {
            sample.sample_versions = Some(self.query_versions_of(&sample.sample_id).await?);
        }

        Ok((rows, info))
    }

    async fn query_versions(&self, filter: &SampleVersionQuery) -> DbResult<Vec<SampleVersion>> {
        let sql = format!(
            "{}{} ORDER BY {}",
            self.versions.select_from,
            VERSION_FILTER,
            self.versions.descriptor.base_key()
        );

        let rows = sqlx::query_as(&sql)
            .bind_sql(&SqlValue::from(&filter.sample_id))
            .bind_sql(&SqlValue::from(&filter.version_number))
            .fetch_all(&self.reader)
            .await?;

        Ok(rows)
    }

    async fn query_versions_of(&self, sample_id: &str) -> DbResult<Vec<SampleVersion>> {
        let sql = foreign_statement(&self.versions.select_by_foreign)?;
        let values = arguments(&SampleVersion::with_key(sample_id, ""), &self.versions)?;

        let rows = sqlx::query_as(sql)
            .bind_all(&values)
            .fetch_all(&self.reader)
            .await?;

        Ok(rows)
    }

    async fn query_by_key(&self, key: &Sample) -> DbResult<Option<Sample>> {
        let values = arguments(key, &self.samples)?;

        let row: Option<Sample> = sqlx::query_as(&self.samples.select_by_key)
            .bind_all(&values)
            .fetch_optional(&self.reader)
            .await?;

        match row {
            Some(mut sample) => {
                sample.sample_versions = Some(self.query_versions_of(&sample.sample_id).await?);
                Ok(Some(sample))
            }
            None => Ok(None),
        }
    }

    async fn remove_versions_of(&self, sample_id: &str) -> DbResult<u64> {
        let sql = foreign_statement(&self.versions.delete_by_foreign)?;
        self.execute(sql, &SampleVersion::with_key(sample_id, ""), &self.versions)
            .await
    }

    async fn upsert_versions_atomically(&self, versions: &[SampleVersion]) -> DbResult<u64> {
        // Marshal everything before touching the database
        let batch = versions
            .iter()
            .map(|v| arguments(v, &self.versions))
            .collect::<DbResult<Vec<_>>>()?;

        let mut tx = self
            .writer
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut affected = 0;
        for values in &batch {
            // Early return drops `tx`, which rolls back
            affected += sqlx::query(&self.versions.upsert)
                .bind_all(values)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(count = batch.len(), "Version batch committed");
        Ok(affected)
    }

    /// Runs a write statement on the writer with the entity's full argument list.
    async fn execute<E: Entity>(&self, sql: &str, entity: &E, set: &StatementSet) -> DbResult<u64> {
        let values = arguments(entity, set)?;

        let result = sqlx::query(sql)
            .bind_all(&values)
            .execute(&self.writer)
            .await?;

        Ok(result.rows_affected())
    }
}

fn statements<E: Entity>(schema: &str, table: &str) -> DbResult<StatementSet> {
    let descriptor = EntityDescriptor::of::<E>()?;
    descriptor.ensure_persisted()?;
    Ok(StatementSet::build(descriptor, schema, table)?)
}

/// Marshals an entity and checks the list against the statement set.
fn arguments<E: Entity>(entity: &E, set: &StatementSet) -> DbResult<Vec<SqlValue>> {
    let values = marshal(entity, &set.descriptor)?;
    set.descriptor.check_arity(values.len())?;
    Ok(values)
}

fn foreign_statement(sql: &Option<String>) -> DbResult<&str> {
    sql.as_deref()
        .ok_or(DbError::Configuration(CoreError::MissingFacet(Facet::Foreign)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{TimeZone, Utc};

    async fn repo() -> SampleRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.samples().unwrap()
    }

    async fn repo_with(policy: RowsPerPage) -> SampleRepository {
        let db = Database::new(DbConfig::in_memory().rows_per_page(policy))
            .await
            .unwrap();
        db.samples().unwrap()
    }

    fn sample(id: &str, sample_type: &str, name: &str) -> Sample {
        Sample {
            sample_id: id.to_string(),
            sample_type: sample_type.to_string(),
            sample_name: name.to_string(),
            sample_description: format!("{} description", name),
            sample_active_version: "1".to_string(),
            create_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()),
            create_user: "seed".to_string(),
            ..Sample::default()
        }
    }

    /// S-1..S-5, alternating Type_A/Type_B, two versions on S-1.
    async fn seeded() -> SampleRepository {
        let repo = repo().await;
        for (i, name) in ["Echo", "Delta", "Charlie", "Bravo", "Alpha"].iter().enumerate() {
            let sample_type = if i % 2 == 0 { "Type_A" } else { "Type_B" };
            repo.insert(&sample(&format!("S-{}", i + 1), sample_type, name))
                .await
                .unwrap();
        }
        repo.batch_upsert_versions(&[
            SampleVersion::with_key("S-1", "1"),
            SampleVersion::with_key("S-1", "2"),
        ])
        .await
        .unwrap();
        repo
    }

    fn ids(rows: &[Sample]) -> Vec<&str> {
        rows.iter().map(|s| s.sample_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_insert_then_get_by_key() {
        let repo = repo().await;
        let original = sample("S-1", "Type_A", "Alpha");

        assert_eq!(repo.insert(&original).await.unwrap(), 1);

        let found = repo.get_by_key(&Sample::with_id("S-1")).await.unwrap().unwrap();
        assert_eq!(found.sample_name, "Alpha");
        assert_eq!(found.create_date, original.create_date);
        assert_eq!(found.sample_versions, Some(vec![]));

        assert!(repo.get_by_key(&Sample::with_id("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_unique_violation() {
        let repo = repo().await;
        repo.insert(&sample("S-1", "Type_A", "Alpha")).await.unwrap();

        let err = repo.insert(&sample("S-1", "Type_A", "Alpha")).await.unwrap_err();

        assert!(matches!(
            err.root(),
            DbError::UniqueViolation { field, .. } if field == "sample.sample_id"
        ));
        assert!(err.to_string().starts_with("SampleRepository::insert"));
    }

    #[tokio::test]
    async fn test_upsert_updates_non_key_columns() {
        let repo = repo().await;
        repo.upsert(&sample("S-1", "Type_A", "Alpha")).await.unwrap();
        repo.upsert(&sample("S-1", "Type_B", "Renamed")).await.unwrap();

        let found = repo.get_by_key(&Sample::with_id("S-1")).await.unwrap().unwrap();
        assert_eq!(found.sample_type, "Type_B");
        assert_eq!(found.sample_name, "Renamed");

        let (rows, info) = repo
            .list(&SampleQuery::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(info.total_available_items, 1);
    }

    #[tokio::test]
    async fn test_apply_dispatches_on_action_prefix() {
        let repo = repo().await;
        let mut s = sample("S-1", "Type_A", "Alpha");

        assert_eq!(repo.apply("INSERT", &s).await.unwrap(), 1);
        s.sample_name = "Beta".to_string();
        repo.apply("U", &s).await.unwrap();
        assert_eq!(
            repo.get_by_key(&s).await.unwrap().unwrap().sample_name,
            "Beta"
        );

        assert_eq!(repo.apply("x", &s).await.unwrap(), 0);
        assert_eq!(repo.apply("D", &Sample::with_id("S-1")).await.unwrap(), 1);
        assert!(repo.get_by_key(&s).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pages_and_page_info() {
        let repo = seeded().await;
        let page = PageRequest {
            page: 1,
            page_size: 2,
            ..PageRequest::default()
        };

        let (rows, info) = repo.list(&SampleQuery::default(), &page).await.unwrap();

        assert_eq!(ids(&rows), vec!["S-3", "S-4"]);
        assert_eq!(
            info,
            PageInfo {
                current_page_index: 1,
                max_page_index: 2,
                rows_per_page: 2,
                total_available_items: 5,
            }
        );
    }

    #[tokio::test]
    async fn test_list_unbounded_when_page_size_zero() {
        let repo = seeded().await;

        let (rows, info) = repo
            .list(&SampleQuery::default(), &PageRequest::default())
            .await
            .unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(info.rows_per_page, 10);
        assert_eq!(info.max_page_index, 0);
    }

    #[tokio::test]
    async fn test_list_with_huge_page_size_and_page() {
        let repo = seeded().await;

        let first = PageRequest::first(i64::MAX);
        let (rows, info) = repo.list(&SampleQuery::default(), &first).await.unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(info.max_page_index, 0);

        let far = PageRequest {
            page: i64::MAX,
            ..first
        };
        let (rows, info) = repo.list(&SampleQuery::default(), &far).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(info.total_available_items, 5);
    }

    #[tokio::test]
    async fn test_list_sorts_by_allow_listed_column() {
        let repo = seeded().await;
        let page = PageRequest {
            sort_by: "SAMPLE_NAME".to_string(),
            sort_direction: "ASC".to_string(),
            ..PageRequest::default()
        };

        let (rows, _) = repo.list(&SampleQuery::default(), &page).await.unwrap();
        assert_eq!(ids(&rows), vec!["S-5", "S-4", "S-3", "S-2", "S-1"]);

        let desc = PageRequest {
            sort_direction: "DESC".to_string(),
            ..page
        };
        let (rows, _) = repo.list(&SampleQuery::default(), &desc).await.unwrap();
        assert_eq!(ids(&rows), vec!["S-1", "S-2", "S-3", "S-4", "S-5"]);
    }

    #[tokio::test]
    async fn test_list_ignores_unknown_sort_column() {
        let repo = seeded().await;
        let page = PageRequest {
            sort_by: "sample_name; DROP TABLE sample".to_string(),
            sort_direction: "DESC".to_string(),
            ..PageRequest::default()
        };

        let (rows, _) = repo.list(&SampleQuery::default(), &page).await.unwrap();

        assert_eq!(ids(&rows), vec!["S-1", "S-2", "S-3", "S-4", "S-5"]);
    }

    #[tokio::test]
    async fn test_list_filters_and_search() {
        let repo = seeded().await;

        let by_type = SampleQuery {
            sample_type: "Type_B".to_string(),
            ..SampleQuery::default()
        };
        let (rows, info) = repo.list(&by_type, &PageRequest::default()).await.unwrap();
        assert_eq!(ids(&rows), vec!["S-2", "S-4"]);
        assert_eq!(info.total_available_items, 2);

        let search = PageRequest {
            search: "CHARLIE".to_string(),
            ..PageRequest::default()
        };
        let (rows, _) = repo.list(&SampleQuery::default(), &search).await.unwrap();
        assert_eq!(ids(&rows), vec!["S-3"]);
    }

    #[tokio::test]
    async fn test_list_attaches_each_rows_own_versions() {
        let repo = seeded().await;

        let (rows, _) = repo
            .list(&SampleQuery::default(), &PageRequest::default())
            .await
            .unwrap();

        let first = rows[0].sample_versions.as_ref().unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|v| v.sample_id == "S-1"));
        assert_eq!(rows[1].sample_versions, Some(vec![]));
    }

    #[tokio::test]
    async fn test_fetched_count_policy() {
        let repo = repo_with(RowsPerPage::FetchedCount).await;
        for i in 0..3 {
            repo.insert(&sample(&format!("S-{}", i), "Type_A", "n"))
                .await
                .unwrap();
        }

        let (_, info) = repo
            .list(&SampleQuery::default(), &PageRequest::first(2))
            .await
            .unwrap();

        assert_eq!(info.rows_per_page, 3);
        assert_eq!(info.max_page_index, 0);
    }

    #[tokio::test]
    async fn test_get_one() {
        let repo = seeded().await;

        let filter = SampleQuery {
            sample_id: "S-4".to_string(),
            ..SampleQuery::default()
        };
        let found = repo.get_one(&filter).await.unwrap().unwrap();
        assert_eq!(found.sample_name, "Bravo");

        let missing = SampleQuery {
            sample_id: "S-99".to_string(),
            ..SampleQuery::default()
        };
        assert!(repo.get_one(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_version_crud() {
        let repo = seeded().await;
        let mut version = SampleVersion::with_key("S-2", "1");

        assert_eq!(repo.apply_version("I", &version).await.unwrap(), 1);

        version.update_user = "reviewer".to_string();
        repo.apply_version("U", &version).await.unwrap();

        let filter = SampleVersionQuery {
            sample_id: "S-2".to_string(),
            version_number: "1".to_string(),
        };
        let found = repo.get_version(&filter).await.unwrap().unwrap();
        assert_eq!(found.update_user, "reviewer");

        assert_eq!(repo.apply_version("D", &version).await.unwrap(), 1);
        assert!(repo.get_version(&filter).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_versions_and_delete_versions_of() {
        let repo = seeded().await;

        let all = repo
            .list_versions(&SampleVersionQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].version_number, "1");

        assert_eq!(repo.versions_of("S-1").await.unwrap().len(), 2);
        assert_eq!(repo.delete_versions_of("S-1").await.unwrap(), 2);
        assert!(repo.versions_of("S-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_version_for_missing_sample_is_foreign_key_violation() {
        let repo = repo().await;

        let err = repo
            .insert_version(&SampleVersion::with_key("ghost", "1"))
            .await
            .unwrap_err();

        assert!(matches!(err.root(), DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_batch_rolls_back_on_any_failure() {
        let repo = repo().await;
        repo.insert(&sample("S-1", "Type_A", "Alpha")).await.unwrap();

        let batch = [
            SampleVersion::with_key("S-1", "1"),
            SampleVersion::with_key("ghost", "1"),
            SampleVersion::with_key("S-1", "2"),
        ];

        let err = repo.batch_upsert_versions(&batch).await.unwrap_err();
        assert!(matches!(err.root(), DbError::ForeignKeyViolation { .. }));

        assert!(repo.versions_of("S-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_commits_when_all_succeed() {
        let repo = repo().await;
        repo.insert(&sample("S-1", "Type_A", "Alpha")).await.unwrap();

        let batch = [
            SampleVersion::with_key("S-1", "1"),
            SampleVersion::with_key("S-1", "2"),
            SampleVersion::with_key("S-1", "3"),
        ];

        assert_eq!(repo.batch_upsert_versions(&batch).await.unwrap(), 3);
        assert_eq!(repo.versions_of("S-1").await.unwrap().len(), 3);
        assert_eq!(repo.batch_upsert_versions(&[]).await.unwrap(), 0);
    }
}
