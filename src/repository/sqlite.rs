use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, pool::PoolConnection};

use super::{HeroRepository, push_set_prefix};
use crate::{
    error::{StoreError, StoreResult},
    models::{Hero, HeroChange, NewHero},
};

/// `AUTOINCREMENT` keeps SQLite from handing out the id of a deleted row again.
pub(crate) const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS hero (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        age INTEGER,
        gender TEXT,
        secret_name TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_hero_name ON hero (name)",
    "CREATE INDEX IF NOT EXISTS ix_hero_age ON hero (age)",
];

pub struct SqliteHeroRepository {
    conn: PoolConnection<Sqlite>,
}

impl SqliteHeroRepository {
    pub fn new(conn: PoolConnection<Sqlite>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl HeroRepository for SqliteHeroRepository {
    async fn create(&mut self, hero: NewHero) -> StoreResult<Hero> {
        let hero = sqlx::query_as::<_, Hero>(
            r#"
            INSERT INTO hero (name, age, gender, secret_name)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, age, gender, secret_name
            "#,
        )
        .bind(hero.name)
        .bind(hero.age)
        .bind(hero.gender)
        .bind(hero.secret_name)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(hero)
    }

    async fn read_many(&mut self, offset: i64, limit: i64) -> StoreResult<Vec<Hero>> {
        let heroes = sqlx::query_as::<_, Hero>(
            r#"
            SELECT id, name, age, gender, secret_name
            FROM hero
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(heroes)
    }

    async fn read_one(&mut self, id: i64) -> StoreResult<Option<Hero>> {
        let hero = sqlx::query_as::<_, Hero>(
            r#"
            SELECT id, name, age, gender, secret_name
            FROM hero
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(hero)
    }

    async fn update(&mut self, hero: Hero, changes: &[HeroChange]) -> StoreResult<Hero> {
        if changes.is_empty() {
            return Ok(hero);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE hero SET ");
        let mut first = true;

        for change in changes {
            push_set_prefix(&mut builder, &mut first);
            builder.push(change.column()).push(" = ");
            match change {
                HeroChange::Name(name) => builder.push_bind(name.clone()),
                HeroChange::Age(age) => builder.push_bind(*age),
                HeroChange::Gender(gender) => builder.push_bind(gender.clone()),
                HeroChange::SecretName(secret_name) => builder.push_bind(secret_name.clone()),
            };
        }

        builder
            .push(" WHERE id = ")
            .push_bind(hero.id)
            .push(" RETURNING id, name, age, gender, secret_name");

        builder
            .build_query_as::<Hero>()
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(StoreError::Missing(hero.id))
    }

    async fn delete(&mut self, hero: Hero) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM hero WHERE id = ?")
            .bind(hero.id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(hero.id));
        }

        Ok(())
    }
}
