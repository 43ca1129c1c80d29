//! # Database Pool Management
//!
//! Reader/writer connection pools and their configuration.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pools                          │
//! │                                                                         │
//! │  Service Startup                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::from_env() / DbConfig::new(path) ← pool + paging settings   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pools + run migrations           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────┐        ┌───────────────────────┐            │
//! │  │   writer SqlitePool   │        │   reader SqlitePool   │            │
//! │  │  insert/upsert/delete │        │  count/list/get       │            │
//! │  │  batch transactions   │        │  child fetches        │            │
//! │  └───────────────────────┘        └───────────────────────┘            │
//! │              ▲                               ▲                          │
//! │              └───── same pool when no ───────┘                          │
//! │                     read_database_path                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.samples()? ← SampleRepository with prebuilt statements             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled so readers don't block
//! the writer and the writer doesn't block readers.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crudkit_core::RowsPerPage;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::sample::SampleRepository;

/// Schema every table lives in when none is configured.
pub const DEFAULT_SCHEMA: &str = "main";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/crudkit.db")
///     .read_database_path("/path/to/replica.db")
///     .max_connections(5)
///     .rows_per_page(RowsPerPage::Requested);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file written by the service.
    pub database_path: PathBuf,

    /// Optional separate database file for reads.
    /// Default: None (reads share the writer pool)
    pub read_database_path: Option<PathBuf>,

    /// Schema that qualifies every generated table name.
    /// Default: "main"
    pub schema: String,

    /// Maximum number of connections per pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// How list responses report `rowsPerPage`.
    /// Default: RowsPerPage::Requested
    pub rows_per_page: RowsPerPage,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            read_database_path: None,
            schema: DEFAULT_SCHEMA.to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            rows_per_page: RowsPerPage::default(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// ## Variables
    /// ```text
    /// CRUDKIT_DATABASE_PATH        writer database file   (default ./crudkit.db)
    /// CRUDKIT_READ_DATABASE_PATH   reader database file   (default: writer)
    /// CRUDKIT_SCHEMA               table schema           (default main)
    /// CRUDKIT_MAX_CONNECTIONS      pool size              (default 5)
    /// CRUDKIT_ROWS_PER_PAGE        requested | fetched    (default requested)
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = DbConfig::new(
            env::var("CRUDKIT_DATABASE_PATH").unwrap_or_else(|_| "./crudkit.db".to_string()),
        );

        config.read_database_path = env::var("CRUDKIT_READ_DATABASE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        if let Ok(schema) = env::var("CRUDKIT_SCHEMA") {
            if schema.trim().is_empty() {
                return Err(ConfigError::InvalidValue("CRUDKIT_SCHEMA".to_string()));
            }
            config.schema = schema;
        }

        config.max_connections = env::var("CRUDKIT_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CRUDKIT_MAX_CONNECTIONS".to_string()))?;

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "CRUDKIT_MAX_CONNECTIONS".to_string(),
            ));
        }
        config.min_connections = config.min_connections.min(config.max_connections);

        if let Ok(policy) = env::var("CRUDKIT_ROWS_PER_PAGE") {
            config.rows_per_page = RowsPerPage::parse(&policy)
                .ok_or_else(|| ConfigError::InvalidValue("CRUDKIT_ROWS_PER_PAGE".to_string()))?;
        }

        Ok(config)
    }

    /// Sets a separate database file for reads.
    pub fn read_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.read_database_path = Some(path.into());
        self
    }

    /// Sets the schema used to qualify table names.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Sets the rows-per-page reporting policy.
    pub fn rows_per_page(mut self, policy: RowsPerPage) -> Self {
        self.rows_per_page = policy;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Reader and writer share the single connection
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            read_database_path: None,
            schema: DEFAULT_SCHEMA.to_string(),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
            rows_per_page: RowsPerPage::default(),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// ## Usage in Handlers
/// ```rust,ignore
/// async fn list_samples(db: &Database, page: PageRequest) -> DbResult<Vec<Sample>> {
///     let (samples, _info) = db.samples()?.list(&SampleQuery::default(), &page).await?;
///     Ok(samples)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// Pool for count/list/get queries.
    reader: SqlitePool,

    /// Pool for inserts, upserts, deletes and batches.
    writer: SqlitePool,

    schema: String,
    rows_per_page: RowsPerPage,
}

impl Database {
    /// Creates the connection pools.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL, NORMAL synchronous, foreign keys on
    /// 3. Creates the writer pool, and a reader pool when a read path is set
    /// 4. Runs migrations on the writer (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            schema = %config.schema,
            "Initializing database connection"
        );

        let writer = connect(&config.database_path, &config).await?;

        let reader = match &config.read_database_path {
            Some(path) => {
                info!(path = %path.display(), "Using separate read database");
                connect(path, &config).await?
            }
            None => writer.clone(),
        };

        info!(
            max_connections = config.max_connections,
            "Database pools created"
        );

        let db = Database {
            reader,
            writer,
            schema: config.schema,
            rows_per_page: config.rows_per_page,
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations against the writer.
    ///
    /// ## When To Call
    /// - Automatically called by `new()` if `run_migrations` is true
    /// - Manually call when migrations are disabled in config
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.writer).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Pool used for reads.
    pub fn reader(&self) -> &SqlitePool {
        &self.reader
    }

    /// Pool used for writes.
    pub fn writer(&self) -> &SqlitePool {
        &self.writer
    }

    /// Returns the sample repository.
    ///
    /// Statements are rendered here, so a bad field table surfaces as
    /// `DbError::Configuration` before any query runs.
    pub fn samples(&self) -> DbResult<SampleRepository> {
        SampleRepository::new(
            self.reader.clone(),
            self.writer.clone(),
            &self.schema,
            self.rows_per_page,
        )
    }

    /// Closes both pools.
    ///
    /// ## Note
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pools");
        self.writer.close().await;
        self.reader.close().await;
    }

    /// Checks if both pools can execute queries.
    pub async fn health_check(&self) -> bool {
        let reader_ok = sqlx::query("SELECT 1").execute(&self.reader).await.is_ok();
        let writer_ok = sqlx::query("SELECT 1").execute(&self.writer).await.is_ok();
        reader_ok && writer_ok
    }
}

/// Opens one pool with the shared SQLite settings.
async fn connect(path: &Path, config: &DbConfig) -> DbResult<SqlitePool> {
    // sqlite://path creates file if not exists
    let connect_url = format!("sqlite://{}?mode=rwc", path.display());

    let connect_options = SqliteConnectOptions::from_str(&connect_url)
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        // SQLite has them disabled by default
        .foreign_keys(true)
        .create_if_missing(true);

    debug!(path = %path.display(), "Connection options configured");

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .connect_with(connect_options)
        .await
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
