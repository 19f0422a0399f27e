use crate::config::AppConfig;
use crate::entities::{
    actors, genres, movie_theaters, movies, movies_actors, movies_genres, movies_movie_theaters,
    ratings, users,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(config: &AppConfig) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", config.database_url);

    // Every connection to an in-memory SQLite database is a separate database
    let max_connections = if config.database_url.contains(":memory:") {
        1
    } else {
        20
    };

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

/// Creates every table from its entity, then the secondary indexes.
pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    // Order matters for foreign keys: roots first, then join tables and ratings
    let stmts = vec![
        (
            "users",
            schema
                .create_table_from_entity(users::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "genres",
            schema
                .create_table_from_entity(genres::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "actors",
            schema
                .create_table_from_entity(actors::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "movie_theaters",
            schema
                .create_table_from_entity(movie_theaters::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "movies",
            schema
                .create_table_from_entity(movies::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "movies_genres",
            schema
                .create_table_from_entity(movies_genres::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "movies_movie_theaters",
            schema
                .create_table_from_entity(movies_movie_theaters::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "movies_actors",
            schema
                .create_table_from_entity(movies_actors::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "ratings",
            schema
                .create_table_from_entity(ratings::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        db.execute(stmt).await.map_err(|e| {
            tracing::error!("   - Failed to create table '{}': {}", name, e);
            e
        })?;
        info!("   - Table '{}' checked/created", name);
    }

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_movies_title ON movies(title)",
        "CREATE INDEX IF NOT EXISTS idx_movies_release_date ON movies(release_date)",
        "CREATE INDEX IF NOT EXISTS idx_movies_genres_genre_id ON movies_genres(genre_id)",
        "CREATE INDEX IF NOT EXISTS idx_movies_movie_theaters_theater_id ON movies_movie_theaters(movie_theater_id)",
        "CREATE INDEX IF NOT EXISTS idx_movies_actors_actor_id ON movies_actors(actor_id)",
        "CREATE INDEX IF NOT EXISTS idx_ratings_movie_user ON ratings(movie_id, user_id)",
    ];

    for query in indexes {
        match db
            .execute(sea_orm::Statement::from_string(builder, query.to_owned()))
            .await
        {
            Ok(_) => tracing::debug!("   - Executed schema update: {}", query),
            Err(e) => tracing::warn!("   - Schema update warning: {} -> {}", query, e),
        }
    }

    Ok(())
}
