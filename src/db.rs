//! Store construction, schema creation and per-request sessions.
//!
//! [`Database`] is built once at startup from a [`DatabaseConfig`]:
//! - **SQLite**: file created on first connect; `:memory:` is pinned to a single
//!   connection that never expires, otherwise each connection would see its own
//!   empty database.
//! - **PostgreSQL**: pooled connections up to `max_connections`.
//! - **Memory**: a [`MemoryStore`] table living in the process.
//!
//! Handlers never share a session. Each request calls [`Database::open_session`]
//! and the pooled connection goes back to the pool when the session is dropped.

use std::{str::FromStr, time::Duration};

use log::LevelFilter;
use sqlx::{
    ConnectOptions, PgPool, SqlitePool,
    postgres::{PgConnectOptions, PgPoolOptions},
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

use crate::{
    config::{DatabaseBackend, DatabaseConfig},
    error::StoreResult,
    repository::{
        HeroRepository, MemoryStore, POSTGRES_SCHEMA, PgHeroRepository, SQLITE_SCHEMA,
        SqliteHeroRepository,
    },
};

#[derive(Debug, Clone)]
pub enum Database {
    Sqlite(SqlitePool),
    Postgres(PgPool),
    Memory(MemoryStore),
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let statement_level = if config.echo {
            LevelFilter::Info
        } else {
            LevelFilter::Debug
        };

        let database = match config.backend {
            DatabaseBackend::Sqlite => {
                let options = SqliteConnectOptions::from_str(&config.url)?
                    .create_if_missing(true)
                    .log_statements(statement_level);

                let mut pool = SqlitePoolOptions::new().max_connections(config.max_connections);
                if config.is_in_memory_sqlite() {
                    pool = pool
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None::<Duration>)
                        .max_lifetime(None::<Duration>);
                }

                Self::Sqlite(pool.connect_with(options).await?)
            }
            DatabaseBackend::Postgres => {
                let options =
                    PgConnectOptions::from_str(&config.url)?.log_statements(statement_level);

                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect_with(options)
                    .await?;

                Self::Postgres(pool)
            }
            DatabaseBackend::Memory => Self::Memory(MemoryStore::new()),
        };

        info!(
            backend = database.backend().as_str(),
            max_connections = config.max_connections,
            "database connected"
        );

        Ok(database)
    }

    /// An in-memory SQLite database, schema included.
    pub async fn sqlite_in_memory() -> StoreResult<Self> {
        let database = Self::connect(&DatabaseConfig::sqlite_in_memory()).await?;
        database.ensure_schema().await?;
        Ok(database)
    }

    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Self::Sqlite(_) => DatabaseBackend::Sqlite,
            Self::Postgres(_) => DatabaseBackend::Postgres,
            Self::Memory(_) => DatabaseBackend::Memory,
        }
    }

    /// Creates the `hero` table and its indexes when they are missing.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        match self {
            Self::Sqlite(pool) => {
                for &statement in SQLITE_SCHEMA {
                    sqlx::query(statement).execute(pool).await?;
                }
            }
            Self::Postgres(pool) => {
                for &statement in POSTGRES_SCHEMA {
                    sqlx::query(statement).execute(pool).await?;
                }
            }
            Self::Memory(_) => {}
        }

        Ok(())
    }

    /// A session owning one connection for the length of a request.
    pub async fn open_session(&self) -> StoreResult<Box<dyn HeroRepository>> {
        let session: Box<dyn HeroRepository> = match self {
            Self::Sqlite(pool) => Box::new(SqliteHeroRepository::new(pool.acquire().await?)),
            Self::Postgres(pool) => Box::new(PgHeroRepository::new(pool.acquire().await?)),
            Self::Memory(store) => Box::new(store.session()),
        };

        Ok(session)
    }

    pub async fn ping(&self) -> StoreResult<()> {
        match self {
            Self::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            Self::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            Self::Memory(_) => {}
        }

        Ok(())
    }

    pub async fn close(&self) {
        match self {
            Self::Sqlite(pool) => pool.close().await,
            Self::Postgres(pool) => pool.close().await,
            Self::Memory(_) => {}
        }
    }
}
