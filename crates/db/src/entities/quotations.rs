//! `SeaORM` Entity for quotations table.
//!
//! Line items are stored as JSONB arrays, one column per section.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::QuotationStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "quotations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub estimate_version: i32,
    pub version: i32,
    pub status: QuotationStatus,
    pub locked: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub labor_items: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub material_items: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub service_items: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub contingency_items: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub tax_items: Json,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub total_contingency: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub total_tax: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub grand_total: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub artifact_url: Option<String>,
    pub sent_to: Option<String>,
    pub sent_at: Option<DateTimeWithTimeZone>,
    pub locked_at: Option<DateTimeWithTimeZone>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
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
