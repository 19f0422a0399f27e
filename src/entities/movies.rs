use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    pub in_theaters: bool,
    pub trailer: Option<String>,
    pub release_date: Date,
    pub poster: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movies_genres::Entity")]
    MoviesGenres,
    #[sea_orm(has_many = "super::movies_movie_theaters::Entity")]
    MoviesMovieTheaters,
    #[sea_orm(has_many = "super::movies_actors::Entity")]
    MoviesActors,
    #[sea_orm(has_many = "super::ratings::Entity")]
    Ratings,
}

impl Related<super::movies_genres::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MoviesGenres.def()
    }
}

impl Related<super::movies_movie_theaters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MoviesMovieTheaters.def()
    }
}

impl Related<super::movies_actors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MoviesActors.def()
    }
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
