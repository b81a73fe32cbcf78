//! Business rules for the hero resource.
//!
//! Reads before every write: update and delete fail with
//! [`ServiceError::NotFound`] when the hero is absent, and never reach the
//! gateway's write path in that case.

use tracing::{debug, info};

use crate::{
    db::Database,
    error::{ServiceError, ServiceResult, StoreResult},
    models::{Hero, HeroChange, HeroCreate, HeroUpdate, NewHero},
    repository::HeroRepository,
};

pub struct HeroService {
    repo: Box<dyn HeroRepository>,
}

impl HeroService {
    pub fn new(repo: Box<dyn HeroRepository>) -> Self {
        Self { repo }
    }

    /// Builds a service on a fresh session from `db`.
    pub async fn open(db: &Database) -> StoreResult<Self> {
        Ok(Self::new(db.open_session().await?))
    }

    pub async fn create(&mut self, input: HeroCreate) -> ServiceResult<Hero> {
        let hero = self.repo.create(NewHero::from(input)).await?;
        info!(hero_id = hero.id, "hero created");
        Ok(hero)
    }

    pub async fn read_many(&mut self, offset: i64, limit: i64) -> ServiceResult<Vec<Hero>> {
        let heroes = self.repo.read_many(offset, limit).await?;
        debug!(offset, limit, count = heroes.len(), "heroes listed");
        Ok(heroes)
    }

    pub async fn read_one(&mut self, id: i64) -> ServiceResult<Hero> {
        self.repo
            .read_one(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Applies only the fields the caller set; the rest of the row is untouched.
    pub async fn update(&mut self, id: i64, input: HeroUpdate) -> ServiceResult<Hero> {
        let hero = self.read_one(id).await?;
        let changes = input.changes();

        debug!(
            hero_id = id,
            fields = ?changes.iter().map(HeroChange::column).collect::<Vec<_>>(),
            "updating hero"
        );

        let hero = self.repo.update(hero, &changes).await?;
        info!(hero_id = hero.id, "hero updated");
        Ok(hero)
    }

    pub async fn delete(&mut self, id: i64) -> ServiceResult<()> {
        let hero = self.read_one(id).await?;
        self.repo.delete(hero).await?;
        info!(hero_id = id, "hero deleted");
        Ok(())
    }
}
