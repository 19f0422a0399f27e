use crate::AppState;
use crate::api::error::AppError;
use crate::api::forms::{actor_from_form, read_form};
use crate::entities::actors;
use crate::entities::prelude::*;
use crate::models::ActorDto;
use crate::services::storage::UploadedFile;
use crate::utils::pagination::{PaginationQuery, total_records_header};
use crate::utils::search::contains_pattern;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// Storage container for actor pictures.
pub const ACTORS_CONTAINER: &str = "actors";

const SEARCH_LIMIT: u64 = 5;

#[utoipa::path(
    get,
    path = "/api/actors",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of actors ordered by name", body = [ActorDto])
    ),
    security(
        ("jwt" = [])
    ),
    tag = "actors"
)]
pub async fn list(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<(HeaderMap, Json<Vec<ActorDto>>), AppError> {
    let window = pagination.window(state.config.max_records_per_page);
    let paginator = Actors::find()
        .order_by_asc(actors::Column::Name)
        .paginate(&state.db, window.records_per_page);

    let total = paginator.num_items().await?;
    let actors = paginator
        .fetch_page(window.page_index)
        .await?
        .into_iter()
        .map(ActorDto::from)
        .collect();

    Ok((total_records_header(total), Json(actors)))
}

#[utoipa::path(
    get,
    path = "/api/actors/{id}",
    params(
        ("id" = i32, Path, description = "Actor ID")
    ),
    responses(
        (status = 200, description = "Actor", body = ActorDto),
        (status = 404, description = "Actor not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "actors"
)]
pub async fn get_actor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ActorDto>, AppError> {
    let actor = Actors::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(actor.into()))
}

#[utoipa::path(
    post,
    path = "/api/actors/searchByName",
    request_body(content = String, description = "Part of the actor's name"),
    responses(
        (status = 200, description = "Up to five actors ordered by name", body = [ActorDto])
    ),
    security(
        ("jwt" = [])
    ),
    tag = "actors"
)]
pub async fn search_by_name(
    State(state): State<AppState>,
    Json(name): Json<String>,
) -> Result<Json<Vec<ActorDto>>, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let actors = Actors::find()
        .filter(actors::Column::Name.like(contains_pattern(name)))
        .order_by_asc(actors::Column::Name)
        .limit(SEARCH_LIMIT)
        .all(&state.db)
        .await?;

    Ok(Json(actors.into_iter().map(ActorDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/actors",
    request_body(content = Multipart, description = "name, dateOfBirth, biography, picture"),
    responses(
        (status = 201, description = "Actor created; body is the new id", body = i32),
        (status = 400, description = "Validation failed")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "actors"
)]
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<i32>), AppError> {
    let dto = actor_from_form(read_form(multipart).await?)?;
    let mut active = dto.to_active_model();

    let picture = save_picture(&state, dto.picture.as_ref()).await?;
    active.picture = Set(picture.clone());

    match active.insert(&state.db).await {
        Ok(actor) => {
            tracing::info!("🎭 Created actor {} ({})", actor.id, actor.name);
            Ok((StatusCode::CREATED, Json(actor.id)))
        }
        Err(e) => {
            discard_picture(&state, picture.as_deref()).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/actors/{id}",
    params(
        ("id" = i32, Path, description = "Actor ID")
    ),
    request_body(content = Multipart, description = "Same fields as create; picture is replaced only when sent"),
    responses(
        (status = 204, description = "Actor updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Actor not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "actors"
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<StatusCode, AppError> {
    let dto = actor_from_form(read_form(multipart).await?)?;
    let actor = Actors::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let old_picture = actor.picture.clone();
    let mut active = actor.into_active_model();
    dto.apply_to(&mut active);

    let new_picture = save_picture(&state, dto.picture.as_ref()).await?;
    if let Some(route) = &new_picture {
        active.picture = Set(Some(route.clone()));
    }

    // The old picture goes only once the row points at the new one
    match active.update(&state.db).await {
        Ok(_) if new_picture.is_some() => discard_picture(&state, old_picture.as_deref()).await,
        Ok(_) => {}
        Err(e) => {
            discard_picture(&state, new_picture.as_deref()).await;
            return Err(e.into());
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/actors/{id}",
    params(
        ("id" = i32, Path, description = "Actor ID")
    ),
    responses(
        (status = 204, description = "Actor deleted"),
        (status = 404, description = "Actor not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "actors"
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let actor = Actors::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    Actors::delete_by_id(id).exec(&state.db).await?;
    discard_picture(&state, actor.picture.as_deref()).await;

    Ok(StatusCode::NO_CONTENT)
}

async fn save_picture(
    state: &AppState,
    file: Option<&UploadedFile>,
) -> Result<Option<String>, AppError> {
    let Some(file) = file else {
        return Ok(None);
    };

    state
        .storage
        .save_file(ACTORS_CONTAINER, file)
        .await
        .map(Some)
        .map_err(AppError::Storage)
}

/// Removes a picture no row points at; failures are only logged.
async fn discard_picture(state: &AppState, route: Option<&str>) {
    if let Err(e) = state.storage.delete_file(route, ACTORS_CONTAINER).await {
        tracing::warn!("Failed to remove actor picture {:?}: {:?}", route, e);
    }
}
