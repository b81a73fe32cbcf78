use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::HeroRepository;
use crate::{
    error::{StoreError, StoreResult},
    models::{Hero, HeroChange, NewHero},
};

#[derive(Debug, Default)]
struct HeroTable {
    last_id: i64,
    rows: BTreeMap<i64, Hero>,
}

/// Process-local hero table shared by every session opened on it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: Arc<RwLock<HeroTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> MemoryHeroRepository {
        MemoryHeroRepository {
            table: Arc::clone(&self.table),
        }
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

pub struct MemoryHeroRepository {
    table: Arc<RwLock<HeroTable>>,
}

#[async_trait]
impl HeroRepository for MemoryHeroRepository {
    async fn create(&mut self, hero: NewHero) -> StoreResult<Hero> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let hero = Hero {
            id: table.last_id,
            name: hero.name,
            age: hero.age,
            gender: hero.gender,
            secret_name: hero.secret_name,
        };
        table.rows.insert(hero.id, hero.clone());

        Ok(hero)
    }

    async fn read_many(&mut self, offset: i64, limit: i64) -> StoreResult<Vec<Hero>> {
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);

        let heroes: Vec<Hero> = self
            .table
            .read()
            .await
            .rows
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(heroes)
    }

    async fn read_one(&mut self, id: i64) -> StoreResult<Option<Hero>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update(&mut self, hero: Hero, changes: &[HeroChange]) -> StoreResult<Hero> {
        let mut table = self.table.write().await;
        let Some(stored) = table.rows.get_mut(&hero.id) else {
            return Err(StoreError::Missing(hero.id));
        };

        stored.apply(changes);
        Ok(stored.clone())
    }

    async fn delete(&mut self, hero: Hero) -> StoreResult<()> {
        match self.table.write().await.rows.remove(&hero.id) {
            Some(_) => Ok(()),
            None => Err(StoreError::Missing(hero.id)),
        }
    }
}
