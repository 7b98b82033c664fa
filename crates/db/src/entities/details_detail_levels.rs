//! `SeaORM` Entity for details_detail_levels table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "details_detail_levels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub detail_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub detail_level_id: Uuid,
    pub is_primary: bool,
    pub position: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::details::Entity",
        from = "Column::DetailId",
        to = "super::details::Column::Id"
    )]
    Details,
    #[sea_orm(
        belongs_to = "super::detail_levels::Entity",
        from = "Column::DetailLevelId",
        to = "super::detail_levels::Column::Id"
    )]
    DetailLevels,
}

impl Related<super::details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl Related<super::detail_levels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DetailLevels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
