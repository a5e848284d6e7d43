use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A quantity of ore of one type held in one warehouse
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ore_batches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub batch_code: String,
    pub ore_type_id: i32,
    pub warehouse_id: i32,
    pub unit_id: i32,
    pub quantity: f64,
    pub quality: Option<f64>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub mined_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ore_type::Entity",
        from = "Column::OreTypeId",
        to = "super::ore_type::Column::Id"
    )]
    OreType,
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id"
    )]
    Unit,
}

impl Related<super::ore_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OreType.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
