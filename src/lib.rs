pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::api::handlers::{accounts, actors, genres, health, movie_theaters, movies, ratings};
use crate::api::middleware::auth::{auth_middleware, optional_auth_middleware, require_admin};
use crate::config::{AppConfig, StorageBackend};
use crate::services::identity::IdentityService;
use crate::services::movie_service::MovieService;
use crate::services::storage::FileStorageService;
use crate::utils::pagination::TOTAL_RECORDS_HEADER;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{MethodRouter, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::movies::home,
        api::handlers::movies::get_movie,
        api::handlers::movies::filter,
        api::handlers::movies::post_get,
        api::handlers::movies::create,
        api::handlers::movies::put_get,
        api::handlers::movies::update,
        api::handlers::movies::delete,
        api::handlers::accounts::create,
        api::handlers::accounts::login,
        api::handlers::accounts::make_admin,
        api::handlers::accounts::remove_admin,
        api::handlers::accounts::list_users,
        api::handlers::genres::list,
        api::handlers::genres::all,
        api::handlers::genres::get_genre,
        api::handlers::genres::create,
        api::handlers::genres::update,
        api::handlers::genres::delete,
        api::handlers::actors::list,
        api::handlers::actors::get_actor,
        api::handlers::actors::search_by_name,
        api::handlers::actors::create,
        api::handlers::actors::update,
        api::handlers::actors::delete,
        api::handlers::movie_theaters::list,
        api::handlers::movie_theaters::get_movie_theater,
        api::handlers::movie_theaters::create,
        api::handlers::movie_theaters::update,
        api::handlers::movie_theaters::delete,
        api::handlers::ratings::rate,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::MovieDto,
            models::HomeDto,
            models::MoviePostGetDto,
            models::MoviePutGetDto,
            models::ActorsMoviesDto,
            models::MoviesActorsCreationDto,
            models::GenreDto,
            models::GenreCreationDto,
            models::ActorDto,
            models::MovieTheaterDto,
            models::MovieTheaterCreationDto,
            models::UserCredentials,
            models::AuthenticationResponse,
            models::UserDto,
            models::RatingDto,
            models::IdentityError,
            entities::users::Role,
            api::handlers::health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "movies", description = "Movie catalog"),
        (name = "accounts", description = "Registration, login and admin role"),
        (name = "genres", description = "Genre management"),
        (name = "actors", description = "Actor management"),
        (name = "movietheaters", description = "Movie theater management"),
        (name = "ratings", description = "Movie ratings"),
        (name = "system", description = "Health check")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn FileStorageService>,
    pub config: AppConfig,
    pub movies: Arc<MovieService>,
    pub identity: Arc<IdentityService>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn FileStorageService>,
        config: AppConfig,
    ) -> Self {
        Self {
            movies: Arc::new(MovieService::new(db.clone(), storage.clone())),
            identity: Arc::new(IdentityService::new(db.clone(), &config)),
            db,
            storage,
            config,
        }
    }
}

fn authenticated(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.layer(from_fn_with_state(state.clone(), auth_middleware))
}

fn admin(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    authenticated(state, route.layer(from_fn(require_admin)))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([TOTAL_RECORDS_HEADER])
}

pub fn create_app(state: AppState) -> Router {
    let s = &state;

    let mut app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        // Movies
        .route(
            "/api/movies",
            get(movies::home).merge(admin(s, post(movies::create))),
        )
        .route("/api/movies/filter", get(movies::filter))
        .route("/api/movies/PostGet", admin(s, get(movies::post_get)))
        .route("/api/movies/putget/:id", admin(s, get(movies::put_get)))
        .route(
            "/api/movies/:id",
            get(movies::get_movie)
                .layer(from_fn_with_state(state.clone(), optional_auth_middleware))
                .merge(admin(s, axum::routing::put(movies::update).delete(movies::delete))),
        )
        // Accounts
        .route("/api/accounts/create", post(accounts::create))
        .route("/api/accounts/login", post(accounts::login))
        .route("/api/accounts/makeAdmin", admin(s, post(accounts::make_admin)))
        .route(
            "/api/accounts/removeAdmin",
            admin(s, post(accounts::remove_admin)),
        )
        .route("/api/accounts/listUsers", admin(s, get(accounts::list_users)))
        // Genres
        .route("/api/genres/all", get(genres::all))
        .route(
            "/api/genres",
            admin(s, get(genres::list).post(genres::create)),
        )
        .route(
            "/api/genres/:id",
            admin(
                s,
                get(genres::get_genre)
                    .put(genres::update)
                    .delete(genres::delete),
            ),
        )
        // Actors
        .route(
            "/api/actors",
            admin(s, get(actors::list).post(actors::create)),
        )
        .route(
            "/api/actors/searchByName",
            admin(s, post(actors::search_by_name)),
        )
        .route(
            "/api/actors/:id",
            admin(
                s,
                get(actors::get_actor)
                    .put(actors::update)
                    .delete(actors::delete),
            ),
        )
        // Movie theaters
        .route(
            "/api/movietheaters",
            admin(s, get(movie_theaters::list).post(movie_theaters::create)),
        )
        .route(
            "/api/movietheaters/:id",
            admin(
                s,
                get(movie_theaters::get_movie_theater)
                    .put(movie_theaters::update)
                    .delete(movie_theaters::delete),
            ),
        )
        // Ratings
        .route("/api/ratings", authenticated(s, post(ratings::rate)));

    if state.config.storage_backend == StorageBackend::Local {
        app = app.nest_service(
            "/uploads",
            ServeDir::new(&state.config.local_storage_path),
        );
    }

    app.layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors_layer(&state.config))
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_size,
        ))
        .with_state(state)
}
