use crate::AppState;
use crate::api::error::AppError;
use crate::entities::genres;
use crate::entities::prelude::*;
use crate::models::{GenreCreationDto, GenreDto};
use crate::utils::pagination::{PaginationQuery, total_records_header};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryOrder};
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/genres",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of genres ordered by name", body = [GenreDto])
    ),
    security(
        ("jwt" = [])
    ),
    tag = "genres"
)]
pub async fn list(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<(HeaderMap, Json<Vec<GenreDto>>), AppError> {
    let window = pagination.window(state.config.max_records_per_page);
    let paginator = Genres::find()
        .order_by_asc(genres::Column::Name)
        .paginate(&state.db, window.records_per_page);

    let total = paginator.num_items().await?;
    let genres = paginator
        .fetch_page(window.page_index)
        .await?
        .into_iter()
        .map(GenreDto::from)
        .collect();

    Ok((total_records_header(total), Json(genres)))
}

#[utoipa::path(
    get,
    path = "/api/genres/all",
    responses(
        (status = 200, description = "Every genre ordered by name", body = [GenreDto])
    ),
    tag = "genres"
)]
pub async fn all(State(state): State<AppState>) -> Result<Json<Vec<GenreDto>>, AppError> {
    let genres = Genres::find()
        .order_by_asc(genres::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(genres.into_iter().map(GenreDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/genres/{id}",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre", body = GenreDto),
        (status = 404, description = "Genre not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "genres"
)]
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GenreDto>, AppError> {
    let genre = Genres::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(genre.into()))
}

#[utoipa::path(
    post,
    path = "/api/genres",
    request_body = GenreCreationDto,
    responses(
        (status = 201, description = "Genre created; body is the new id", body = i32),
        (status = 400, description = "Validation failed")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "genres"
)]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<GenreCreationDto>,
) -> Result<(StatusCode, Json<i32>), AppError> {
    payload.validate()?;
    let genre = payload.into_active_model().insert(&state.db).await?;
    Ok((StatusCode::CREATED, Json(genre.id)))
}

#[utoipa::path(
    put,
    path = "/api/genres/{id}",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    request_body = GenreCreationDto,
    responses(
        (status = 204, description = "Genre updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Genre not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "genres"
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<GenreCreationDto>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    let mut active = Genres::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?
        .into_active_model();
    payload.apply_to(&mut active);
    active.update(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/genres/{id}",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "genres"
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let result = Genres::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
