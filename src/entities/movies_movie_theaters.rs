use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movies_movie_theaters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub movie_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub movie_theater_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movies::Entity",
        from = "Column::MovieId",
        to = "super::movies::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Movies,
    #[sea_orm(
        belongs_to = "super::movie_theaters::Entity",
        from = "Column::MovieTheaterId",
        to = "super::movie_theaters::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    MovieTheaters,
}

impl Related<super::movies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movies.def()
    }
}

impl Related<super::movie_theaters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieTheaters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
