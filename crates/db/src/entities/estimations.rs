//! `SeaORM` Entity for estimations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EstimationStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "estimations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub version: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub labor_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub material_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub service_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub contingency_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub total_cost: Decimal,
    pub status: EstimationStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
