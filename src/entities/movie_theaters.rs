use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A theater location. The point is persisted as two columns:
/// `longitude` is X and `latitude` is Y.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movie_theaters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movies_movie_theaters::Entity")]
    MoviesMovieTheaters,
}

impl Related<super::movies_movie_theaters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MoviesMovieTheaters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
