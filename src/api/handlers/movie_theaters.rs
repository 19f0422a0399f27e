use crate::AppState;
use crate::api::error::AppError;
use crate::entities::movie_theaters;
use crate::entities::prelude::*;
use crate::models::{MovieTheaterCreationDto, MovieTheaterDto};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, QueryOrder};
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/movietheaters",
    responses(
        (status = 200, description = "Every theater ordered by name", body = [MovieTheaterDto])
    ),
    security(
        ("jwt" = [])
    ),
    tag = "movietheaters"
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<MovieTheaterDto>>, AppError> {
    let theaters = MovieTheaters::find()
        .order_by_asc(movie_theaters::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(theaters.into_iter().map(MovieTheaterDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/movietheaters/{id}",
    params(
        ("id" = i32, Path, description = "Movie theater ID")
    ),
    responses(
        (status = 200, description = "Movie theater", body = MovieTheaterDto),
        (status = 404, description = "Movie theater not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "movietheaters"
)]
pub async fn get_movie_theater(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MovieTheaterDto>, AppError> {
    let theater = MovieTheaters::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(theater.into()))
}

#[utoipa::path(
    post,
    path = "/api/movietheaters",
    request_body = MovieTheaterCreationDto,
    responses(
        (status = 201, description = "Movie theater created; body is the new id", body = i32),
        (status = 400, description = "Validation failed")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "movietheaters"
)]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<MovieTheaterCreationDto>,
) -> Result<(StatusCode, Json<i32>), AppError> {
    payload.validate()?;
    let theater = payload.into_active_model().insert(&state.db).await?;
    Ok((StatusCode::CREATED, Json(theater.id)))
}

#[utoipa::path(
    put,
    path = "/api/movietheaters/{id}",
    params(
        ("id" = i32, Path, description = "Movie theater ID")
    ),
    request_body = MovieTheaterCreationDto,
    responses(
        (status = 204, description = "Movie theater updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Movie theater not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "movietheaters"
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<MovieTheaterCreationDto>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    let mut active = MovieTheaters::find_by_id(id)
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
    path = "/api/movietheaters/{id}",
    params(
        ("id" = i32, Path, description = "Movie theater ID")
    ),
    responses(
        (status = 204, description = "Movie theater deleted"),
        (status = 404, description = "Movie theater not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "movietheaters"
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let result = MovieTheaters::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
