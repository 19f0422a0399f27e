use crate::AppState;
use crate::api::error::AppError;
use crate::api::forms::{movie_from_form, read_form};
use crate::api::handlers::caller_id;
use crate::models::{FilterMoviesDto, HomeDto, MovieDto, MoviePostGetDto, MoviePutGetDto};
use crate::utils::auth::Claims;
use crate::utils::pagination::{PaginationQuery, total_records_header};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
};

#[utoipa::path(
    get,
    path = "/api/movies",
    responses(
        (status = 200, description = "Movies in theaters and upcoming releases", body = HomeDto)
    ),
    tag = "movies"
)]
pub async fn home(State(state): State<AppState>) -> Result<Json<HomeDto>, AppError> {
    Ok(Json(state.movies.home().await?))
}

#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie with genres, theaters, actors and votes", body = MovieDto),
        (status = 404, description = "Movie not found")
    ),
    tag = "movies"
)]
pub async fn get_movie(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<i32>,
) -> Result<Json<MovieDto>, AppError> {
    let user_id = caller_id(&state, claims.as_deref()).await?;
    Ok(Json(state.movies.get(id, user_id.as_deref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/movies/filter",
    params(FilterMoviesDto),
    responses(
        (status = 200, description = "Page of matching movies; total in the totalAmountOfRecords header", body = [MovieDto])
    ),
    tag = "movies"
)]
pub async fn filter(
    State(state): State<AppState>,
    Query(filter): Query<FilterMoviesDto>,
) -> Result<(HeaderMap, Json<Vec<MovieDto>>), AppError> {
    let window = PaginationQuery::new(filter.page, filter.records_per_page)
        .window(state.config.max_records_per_page);
    let (total, movies) = state.movies.filter(&filter, window).await?;
    Ok((total_records_header(total), Json(movies)))
}

#[utoipa::path(
    get,
    path = "/api/movies/PostGet",
    responses(
        (status = 200, description = "Genres and theaters to pick from", body = MoviePostGetDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "movies"
)]
pub async fn post_get(State(state): State<AppState>) -> Result<Json<MoviePostGetDto>, AppError> {
    Ok(Json(state.movies.post_get().await?))
}

#[utoipa::path(
    post,
    path = "/api/movies",
    request_body(content = Multipart, description = "title, summary, inTheaters, trailer, releaseDate, poster, genresIds, movieTheatersIds, actors"),
    responses(
        (status = 201, description = "Movie created; body is the new id", body = i32),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "movies"
)]
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<i32>), AppError> {
    let dto = movie_from_form(read_form(multipart).await?)?;
    let id = state.movies.create(dto).await?;
    Ok((StatusCode::CREATED, Json(id)))
}

#[utoipa::path(
    get,
    path = "/api/movies/putget/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie with selected and non-selected genres and theaters", body = MoviePutGetDto),
        (status = 404, description = "Movie not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "movies"
)]
pub async fn put_get(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<MoviePutGetDto>, AppError> {
    let user_id = caller_id(&state, Some(&claims)).await?;
    Ok(Json(state.movies.put_get(id, user_id.as_deref()).await?))
}

#[utoipa::path(
    put,
    path = "/api/movies/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    request_body(content = Multipart, description = "Same fields as create; poster is replaced only when sent"),
    responses(
        (status = 204, description = "Movie updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Movie not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "movies"
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<StatusCode, AppError> {
    let dto = movie_from_form(read_form(multipart).await?)?;
    state.movies.update(id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/movies/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    responses(
        (status = 204, description = "Movie deleted"),
        (status = 404, description = "Movie not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "movies"
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.movies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
