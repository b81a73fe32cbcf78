use axum::{Json, extract::State};

use crate::{
    error::{AppError, AppResult},
    extract::{AppJson, AppPath, AppQuery},
    models::{DeleteAck, HealthStatus, HeroCreate, HeroPublic, HeroUpdate, ListHeroesQuery},
    service::HeroService,
    state::AppState,
};

pub async fn healthcheck(State(state): State<AppState>) -> AppResult<Json<HealthStatus>> {
    state.db.ping().await?;

    Ok(Json(HealthStatus {
        status: "ok",
        database: state.db.backend().as_str(),
    }))
}

pub async fn create_hero(
    State(state): State<AppState>,
    AppJson(payload): AppJson<HeroCreate>,
) -> AppResult<Json<HeroPublic>> {
    let mut service = HeroService::open(&state.db).await?;
    let hero = service.create(payload).await?;

    Ok(Json(hero.into()))
}

pub async fn list_heroes(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListHeroesQuery>,
) -> AppResult<Json<Vec<HeroPublic>>> {
    query.validate().map_err(AppError::Validation)?;

    let mut service = HeroService::open(&state.db).await?;
    let heroes = service.read_many(query.offset, query.limit).await?;

    Ok(Json(heroes.into_iter().map(HeroPublic::from).collect()))
}

pub async fn get_hero(
    State(state): State<AppState>,
    AppPath(hero_id): AppPath<i64>,
) -> AppResult<Json<HeroPublic>> {
    let mut service = HeroService::open(&state.db).await?;
    let hero = service.read_one(hero_id).await?;

    Ok(Json(hero.into()))
}

pub async fn update_hero(
    State(state): State<AppState>,
    AppPath(hero_id): AppPath<i64>,
    AppJson(payload): AppJson<HeroUpdate>,
) -> AppResult<Json<HeroPublic>> {
    payload.validate().map_err(AppError::Validation)?;

    let mut service = HeroService::open(&state.db).await?;
    let hero = service.update(hero_id, payload).await?;

    Ok(Json(hero.into()))
}

pub async fn delete_hero(
    State(state): State<AppState>,
    AppPath(hero_id): AppPath<i64>,
) -> AppResult<Json<DeleteAck>> {
    let mut service = HeroService::open(&state.db).await?;
    service.delete(hero_id).await?;

    Ok(Json(DeleteAck { ok: true }))
}
