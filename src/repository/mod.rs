//! Persistence gateway for heroes.
//!
//! A [`HeroRepository`] is one request-scoped session against the backing store.
//! It is obtained from [`Database::open_session`](crate::db::Database::open_session)
//! and dropped at the end of the request, which hands the connection back to the pool.
//!
//! | Type | Store |
//! |------|-------|
//! | [`SqliteHeroRepository`] | embedded SQLite file (or `:memory:`) |
//! | [`PgHeroRepository`] | PostgreSQL |
//! | [`MemoryHeroRepository`] | process-local table, for tests and demos |
//!
//! Every operation commits before it returns.

mod memory;
mod postgres;
mod sqlite;

use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::{
    error::StoreResult,
    models::{Hero, HeroChange, NewHero},
};

pub use memory::{MemoryHeroRepository, MemoryStore};
pub use postgres::PgHeroRepository;
pub use sqlite::SqliteHeroRepository;

pub(crate) use postgres::SCHEMA as POSTGRES_SCHEMA;
pub(crate) use sqlite::SCHEMA as SQLITE_SCHEMA;

#[async_trait]
pub trait HeroRepository: Send {
    /// Inserts the hero and returns it with the id the store assigned.
    async fn create(&mut self, hero: NewHero) -> StoreResult<Hero>;

    /// Up to `limit` heroes starting at `offset`, ordered by ascending id.
    async fn read_many(&mut self, offset: i64, limit: i64) -> StoreResult<Vec<Hero>>;

    /// `None` when no hero has this id.
    async fn read_one(&mut self, id: i64) -> StoreResult<Option<Hero>>;

    /// Writes only `changes` onto the stored row and returns the result.
    async fn update(&mut self, hero: Hero, changes: &[HeroChange]) -> StoreResult<Hero>;

    async fn delete(&mut self, hero: Hero) -> StoreResult<()>;
}

/// Separates the `SET` assignments of an `UPDATE` built with [`QueryBuilder`].
fn push_set_prefix<DB: sqlx::Database>(builder: &mut QueryBuilder<'_, DB>, first: &mut bool) {
    if *first {
        *first = false;
    } else {
        builder.push(", ");
    }
}
